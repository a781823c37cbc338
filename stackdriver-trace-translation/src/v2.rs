// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Translation to the current (v2) API.

use crate::id::normalize_trace_id_string;
use crate::labels::{is_server, truncate, LabelExtractor, ERROR_LABEL, KIND_LABEL};
use crate::span::{Kind, Span};
use stackdriver_trace_protobuf::timestamp_from_micros;
use stackdriver_trace_protobuf::v2::attribute_value::Value;
use stackdriver_trace_protobuf::v2::span::time_event::{self, Annotation};
use stackdriver_trace_protobuf::v2::span::{Attributes, SpanKind, TimeEvent, TimeEvents};
use stackdriver_trace_protobuf::v2::{AttributeValue, Span as TraceSpan, TruncatableString};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Display name of spans without a name.
pub const UNKNOWN_SPAN_NAME: &str = "unknown";
/// Maximum length of a span display name.
pub const MAX_DISPLAY_NAME_BYTES: usize = 128;
/// Maximum length of a string attribute value or annotation description.
pub const MAX_ATTRIBUTE_VALUE_BYTES: usize = 256;

/// Resource name of a span: `projects/{project_id}/traces/{trace_id}/spans/{span_id}`.
pub fn span_name(project_id: &str, trace_id: &str, span_id: &str) -> String {
    format!(
        "projects/{project_id}/traces/{}/spans/{span_id}",
        normalize_trace_id_string(trace_id)
    )
}

/// Source of the error attribute of a span.
pub trait ErrorTag: Send + Sync {
    /// Error message of the span, if it failed.
    fn error_message(&self, span: &Span) -> Option<String>;
}

impl<F> ErrorTag for F
where
    F: Fn(&Span) -> Option<String> + Send + Sync,
{
    fn error_message(&self, span: &Span) -> Option<String> {
        self(span)
    }
}

/// Reads the zipkin `error` tag.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorTagValue;

impl ErrorTag for ErrorTagValue {
    fn error_message(&self, span: &Span) -> Option<String> {
        span.tags.get("error").cloned()
    }
}

/// Translates zipkin spans to v2 [`TraceSpan`]s of one project.
#[derive(Clone)]
pub struct SpanTranslator {
    project_id: String,
    labels: LabelExtractor,
    error_tag: Arc<dyn ErrorTag>,
}

impl fmt::Debug for SpanTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanTranslator")
            .field("project_id", &self.project_id)
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

impl SpanTranslator {
    pub fn new(project_id: impl Into<String>, labels: LabelExtractor) -> Self {
        SpanTranslator {
            project_id: project_id.into(),
            labels,
            error_tag: Arc::new(ErrorTagValue),
        }
    }

    /// Replaces the source of the error attribute.
    pub fn with_error_tag(mut self, error_tag: impl ErrorTag + 'static) -> Self {
        self.error_tag = Arc::new(error_tag);
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn labels(&self) -> &LabelExtractor {
        &self.labels
    }

    pub fn translate(&self, span: &Span) -> TraceSpan {
        let start = span.start_timestamp();
        let end = start.map(|start| start.saturating_add(span.duration().unwrap_or(0)));

        TraceSpan {
            name: span_name(&self.project_id, &span.trace_id, &span.id),
            span_id: span.id.clone(),
            parent_span_id: span.parent_id.clone().unwrap_or_default(),
            display_name: Some(truncatable(
                span.non_empty_name().unwrap_or(UNKNOWN_SPAN_NAME),
                MAX_DISPLAY_NAME_BYTES,
            )),
            start_time: start.map(timestamp_from_micros),
            end_time: end.map(timestamp_from_micros),
            attributes: self.attributes(span),
            time_events: time_events(span),
            span_kind: span_kind(span.kind) as i32,
        }
    }

    fn attributes(&self, span: &Span) -> Option<Attributes> {
        let mut attribute_map = BTreeMap::new();
        let mut put = |key: String, value: &str| {
            attribute_map.insert(key, string_value(value));
        };

        self.labels
            .extract_common(span, is_server(span), false, &mut put);
        if let Some(kind) = span.kind {
            put(KIND_LABEL.to_owned(), kind.as_str());
        }
        if let Some(message) = self.error_tag.error_message(span) {
            put(ERROR_LABEL.to_owned(), &message);
        }

        if attribute_map.is_empty() {
            return None;
        }
        Some(Attributes {
            attribute_map,
            dropped_attributes_count: 0,
        })
    }
}

fn span_kind(kind: Option<Kind>) -> SpanKind {
    match kind {
        Some(Kind::Client) => SpanKind::Client,
        Some(Kind::Server) => SpanKind::Server,
        Some(Kind::Producer) => SpanKind::Producer,
        Some(Kind::Consumer) => SpanKind::Consumer,
        None => SpanKind::Unspecified,
    }
}

fn time_events(span: &Span) -> Option<TimeEvents> {
    if span.annotations.is_empty() {
        return None;
    }
    let time_event = span
        .annotations
        .iter()
        .map(|annotation| TimeEvent {
            time: Some(timestamp_from_micros(annotation.timestamp)),
            value: Some(time_event::Value::Annotation(Annotation {
                description: Some(truncatable(&annotation.value, MAX_ATTRIBUTE_VALUE_BYTES)),
                attributes: None,
            })),
        })
        .collect();
    Some(TimeEvents {
        time_event,
        dropped_annotations_count: 0,
        dropped_message_events_count: 0,
    })
}

fn string_value(value: &str) -> AttributeValue {
    AttributeValue {
        value: Some(Value::StringValue(truncatable(
            value,
            MAX_ATTRIBUTE_VALUE_BYTES,
        ))),
    }
}

fn truncatable(value: &str, max_bytes: usize) -> TruncatableString {
    let kept = truncate(value, max_bytes);
    TruncatableString {
        value: kept.to_owned(),
        truncated_byte_count: i32::try_from(value.len() - kept.len()).unwrap_or(i32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{AGENT_LABEL, COMPONENT_LABEL, ENDPOINT_IPV4_KEY};
    use crate::span::{Annotation as ZipkinAnnotation, Endpoint};

    const PROJECT_ID: &str = "test-project";

    fn translator() -> SpanTranslator {
        SpanTranslator::new(PROJECT_ID, LabelExtractor::default())
    }

    fn server_span() -> Span {
        Span {
            parent_id: Some("6b221d5bc9e6496c".to_owned()),
            kind: Some(Kind::Server),
            name: Some("get /api".to_owned()),
            timestamp: Some(1_472_470_996_199_000),
            duration: Some(207_000),
            local_endpoint: Some(Endpoint {
                service_name: Some("backend".to_owned()),
                ipv4: Some("192.168.99.101".to_owned()),
                ..Default::default()
            }),
            ..Span::new("86154a4ba6e91385", "5b4185666d50f68b")
        }
    }

    fn string_attribute<'a>(span: &'a TraceSpan, key: &str) -> Option<&'a TruncatableString> {
        match span.attributes.as_ref()?.attribute_map.get(key)?.value.as_ref()? {
            Value::StringValue(value) => Some(value),
            _ => None,
        }
    }

    #[test]
    fn test_ids_and_resource_name() {
        let span = translator().translate(&server_span());
        assert_eq!(
            span.name,
            "projects/test-project/traces/000000000000000086154a4ba6e91385/spans/5b4185666d50f68b"
        );
        assert_eq!(span.span_id, "5b4185666d50f68b");
        assert_eq!(span.parent_span_id, "6b221d5bc9e6496c");
        assert_eq!(span.span_kind, SpanKind::Server as i32);
    }

    #[test]
    fn test_root_span_has_empty_parent() {
        let span = Span {
            parent_id: None,
            ..server_span()
        };
        let span = translator().translate(&span);
        assert_eq!(span.parent_span_id, "");
        assert_eq!(
            string_attribute(&span, AGENT_LABEL).map(|v| v.value.as_str()),
            Some("zipkin-rust")
        );
    }

    #[test]
    fn test_missing_name_is_unknown() {
        for name in [None, Some(String::new())] {
            let span = Span {
                name,
                ..server_span()
            };
            let display_name = translator().translate(&span).display_name.unwrap();
            assert_eq!(display_name.value, UNKNOWN_SPAN_NAME);
        }
    }

    #[test]
    fn test_display_name_is_truncated() {
        let span = Span {
            name: Some("n".repeat(MAX_DISPLAY_NAME_BYTES + 2)),
            ..server_span()
        };
        let display_name = translator().translate(&span).display_name.unwrap();
        assert_eq!(display_name.value.len(), MAX_DISPLAY_NAME_BYTES);
        assert_eq!(display_name.truncated_byte_count, 2);
    }

    #[test]
    fn test_times() {
        let span = translator().translate(&server_span());
        assert_eq!(
            span.start_time,
            Some(timestamp_from_micros(1_472_470_996_199_000))
        );
        assert_eq!(
            span.end_time,
            Some(timestamp_from_micros(1_472_470_996_406_000))
        );

        let span = translator().translate(&Span {
            duration: None,
            ..server_span()
        });
        assert_eq!(span.start_time, span.end_time);
    }

    #[test]
    fn test_kind_and_component_attributes() {
        let span = translator().translate(&server_span());
        assert_eq!(
            string_attribute(&span, KIND_LABEL).map(|v| v.value.as_str()),
            Some("server")
        );
        assert_eq!(
            string_attribute(&span, COMPONENT_LABEL).map(|v| v.value.as_str()),
            Some("backend")
        );
        assert_eq!(
            string_attribute(&span, ENDPOINT_IPV4_KEY).map(|v| v.value.as_str()),
            Some("192.168.99.101")
        );
    }

    #[test]
    fn test_client_span_has_no_endpoint_attribute() {
        let span = translator().translate(&Span {
            kind: Some(Kind::Client),
            ..server_span()
        });
        assert!(string_attribute(&span, ENDPOINT_IPV4_KEY).is_none());
    }

    #[test]
    fn test_error_attribute() {
        let mut span = server_span();
        span.tags.insert("error".to_owned(), "timeout".to_owned());

        let translated = translator().translate(&span);
        assert_eq!(
            string_attribute(&translated, ERROR_LABEL).map(|v| v.value.as_str()),
            Some("timeout")
        );

        let custom = translator().with_error_tag(|span: &Span| {
            span.tags.get("http.status_code").map(|code| format!("status {code}"))
        });
        span.tags
            .insert("http.status_code".to_owned(), "500".to_owned());
        let translated = custom.translate(&span);
        assert_eq!(
            string_attribute(&translated, ERROR_LABEL).map(|v| v.value.as_str()),
            Some("status 500")
        );
    }

    #[test]
    fn test_long_attribute_is_truncated() {
        let mut span = server_span();
        span.tags
            .insert("big".to_owned(), "é".repeat(MAX_ATTRIBUTE_VALUE_BYTES));
        let translated = translator().translate(&span);
        let value = string_attribute(&translated, "big").unwrap();
        assert_eq!(value.value.len(), MAX_ATTRIBUTE_VALUE_BYTES);
        assert_eq!(value.truncated_byte_count, MAX_ATTRIBUTE_VALUE_BYTES as i32);
    }

    #[test]
    fn test_annotations_become_time_events() {
        let span = Span {
            annotations: vec![
                ZipkinAnnotation::new(1_472_470_996_238_000, "ws"),
                ZipkinAnnotation::new(1_472_470_996_403_000, "wr"),
            ],
            ..server_span()
        };
        let translated = translator().translate(&span);
        let events = &translated.time_events.as_ref().unwrap().time_event;
        let descriptions: Vec<_> = events
            .iter()
            .map(|event| match &event.value {
                Some(time_event::Value::Annotation(annotation)) => {
                    annotation.description.as_ref().unwrap().value.as_str()
                }
                None => "",
            })
            .collect();
        assert_eq!(descriptions, ["ws", "wr"]);
        assert_eq!(
            events[0].time,
            Some(timestamp_from_micros(1_472_470_996_238_000))
        );
        // Annotations are time events, not attributes.
        assert!(string_attribute(&translated, "ws").is_none());
    }

    #[test]
    fn test_span_without_data_has_no_attributes() {
        let span = Span {
            parent_id: Some("1".to_owned()),
            ..Span::new("1", "2")
        };
        let translated = translator().translate(&span);
        assert!(translated.attributes.is_none());
        assert!(translated.time_events.is_none());
        assert_eq!(translated.start_time, None);
    }
}
