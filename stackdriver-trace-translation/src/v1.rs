// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Translation to the legacy (v1) API.
//!
//! The v1 API has no notion of a span recorded by two hosts: a span is either the client or the
//! server side of an RPC. Zipkin spans shared by a client and a server are therefore split into a
//! client span, whose ID is rewritten with [`SPAN_ID_REWRITE_PAD`], and a server span that points
//! at that rewritten ID as its parent.
//!
//! [`SPAN_ID_REWRITE_PAD`]: crate::id::SPAN_ID_REWRITE_PAD

use crate::id::{parse_span_id, rewrite_span_id};
use crate::labels::LabelExtractor;
use crate::span::{Kind, Span, CLIENT_RECV, CLIENT_SEND, SERVER_RECV, SERVER_SEND};
use prost_types::Timestamp;
use stackdriver_trace_protobuf::timestamp_from_micros;
use stackdriver_trace_protobuf::v1::{trace_span::SpanKind, TraceSpan};

/// One single-host part of a zipkin span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fragment {
    Client,
    /// `dual_host` is set when the client side of the same span ID was recorded by another host,
    /// i.e. when this host does not own the span.
    Server {
        dual_host: bool,
    },
    /// Server half of a span that carries both client and server annotations.
    SplitServer,
    Unspecified,
}

impl Fragment {
    fn kind(self) -> SpanKind {
        match self {
            Fragment::Client => SpanKind::RpcClient,
            Fragment::Server { .. } | Fragment::SplitServer => SpanKind::RpcServer,
            Fragment::Unspecified => SpanKind::Unspecified,
        }
    }
}

/// Translates zipkin spans to legacy [`TraceSpan`]s.
#[derive(Clone, Debug, Default)]
pub struct SpanTranslator {
    labels: LabelExtractor,
}

impl SpanTranslator {
    pub fn new(labels: LabelExtractor) -> Self {
        SpanTranslator { labels }
    }

    pub fn labels(&self) -> &LabelExtractor {
        &self.labels
    }

    /// Translates one zipkin span into one or two destination spans.
    pub fn translate(&self, span: &Span) -> Vec<TraceSpan> {
        let mut out = Vec::with_capacity(1);
        self.translate_into(span, &mut out);
        out
    }

    /// Appends the destination spans of `span` to `out`.
    pub fn translate_into(&self, span: &Span, out: &mut Vec<TraceSpan>) {
        let (first, second) = fragments(span);
        out.push(self.translate_fragment(span, first));
        if let Some(second) = second {
            out.push(self.translate_fragment(span, second));
        }
    }

    fn translate_fragment(&self, span: &Span, fragment: Fragment) -> TraceSpan {
        let (span_id, parent_span_id) = rewrite_ids(span, fragment);
        let (start_time, end_time) = times(span, fragment);
        let server = matches!(fragment, Fragment::Server { .. } | Fragment::SplitServer);
        TraceSpan {
            span_id,
            kind: fragment.kind() as i32,
            name: span.name.clone().unwrap_or_default(),
            start_time,
            end_time,
            parent_span_id,
            labels: self.labels.extract(span, server),
        }
    }
}

/// Splits a span into the fragments to send, using the explicit kind when present and the v1
/// annotations otherwise.
fn fragments(span: &Span) -> (Fragment, Option<Fragment>) {
    // A server that did not record the start of the span is the second host of a shared span.
    let dual_host = span.shared || span.start_timestamp().is_none();
    match span.kind {
        Some(Kind::Client) => (Fragment::Client, None),
        Some(Kind::Server) => (Fragment::Server { dual_host }, None),
        Some(Kind::Producer) | Some(Kind::Consumer) => (Fragment::Unspecified, None),
        None => {
            let client = span.has_annotation(CLIENT_SEND) || span.has_annotation(CLIENT_RECV);
            let server = span.has_annotation(SERVER_RECV) || span.has_annotation(SERVER_SEND);
            match (client, server) {
                (true, true) => (Fragment::Client, Some(Fragment::SplitServer)),
                (true, false) => (Fragment::Client, None),
                (false, true) => (Fragment::Server { dual_host }, None),
                (false, false) => (Fragment::Unspecified, None),
            }
        }
    }
}

/// Returns the destination `(span_id, parent_span_id)` of a fragment.
fn rewrite_ids(span: &Span, fragment: Fragment) -> (u64, u64) {
    let span_id = parse_span_id(&span.id);
    let parent_id = span.parent_id.as_deref().map_or(0, parse_span_id);
    match fragment {
        Fragment::Client => (rewrite_span_id(span_id), parent_id),
        // The client half of the same span ID is the parent.
        Fragment::Server { dual_host: true } | Fragment::SplitServer => {
            (span_id, rewrite_span_id(span_id))
        }
        // The server owns the span, its parent is the client span of the calling host.
        Fragment::Server { dual_host: false } => (span_id, rewrite_span_id(parent_id)),
        Fragment::Unspecified => (span_id, parent_id),
    }
}

/// Picks the start and end time of a fragment: span timestamp and duration first, then the client
/// annotations, then the server annotations.
fn times(span: &Span, fragment: Fragment) -> (Option<Timestamp>, Option<Timestamp>) {
    let split_server = fragment == Fragment::SplitServer;

    let explicit = span
        .start_timestamp()
        .zip(span.duration())
        .map(|(start, duration)| (start, start.saturating_add(duration)));
    let client = annotation_pair(span, CLIENT_SEND, CLIENT_RECV);
    let server = annotation_pair(span, SERVER_RECV, SERVER_SEND);

    let chosen = if split_server {
        server
    } else {
        explicit
            .or(client)
            .or(server)
            .or_else(|| span.start_timestamp().map(|start| (start, start)))
    };

    match chosen {
        Some((start, end)) => (
            Some(timestamp_from_micros(start)),
            Some(timestamp_from_micros(end)),
        ),
        None => (None, None),
    }
}

fn annotation_pair(span: &Span, start: &str, end: &str) -> Option<(u64, u64)> {
    span.annotation_timestamp(start)
        .zip(span.annotation_timestamp(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SPAN_ID_REWRITE_PAD;
    use crate::labels::{AGENT_LABEL, ENDPOINT_IPV4_KEY};
    use crate::span::{Annotation, Endpoint};

    const TRACE_ID: &str = "86154a4ba6e91385";

    fn translator() -> SpanTranslator {
        SpanTranslator::default()
    }

    fn client_span() -> Span {
        Span {
            parent_id: Some("0000000000000001".to_owned()),
            kind: Some(Kind::Client),
            name: Some("get".to_owned()),
            timestamp: Some(1_000_000),
            duration: Some(500),
            ..Span::new(TRACE_ID, "0000000000000002")
        }
    }

    #[test]
    fn test_client_span_id_is_rewritten() {
        let spans = translator().translate(&client_span());
        assert_eq!(spans.len(), 1);
        let span = &spans[0];
        assert_eq!(span.span_id, 2 ^ SPAN_ID_REWRITE_PAD);
        assert_eq!(span.parent_span_id, 1);
        assert_eq!(span.kind, SpanKind::RpcClient as i32);
        assert_eq!(span.name, "get");
    }

    #[test]
    fn test_rewrite_is_deterministic() {
        let translator = translator();
        let first = translator.translate(&client_span());
        let second = translator.translate(&client_span());
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_host_server_points_at_rewritten_parent() {
        let span = Span {
            kind: Some(Kind::Server),
            ..client_span()
        };
        let spans = translator().translate(&span);
        assert_eq!(spans[0].span_id, 2);
        assert_eq!(spans[0].parent_span_id, 1 ^ SPAN_ID_REWRITE_PAD);
        assert_eq!(spans[0].kind, SpanKind::RpcServer as i32);
    }

    #[test]
    fn test_dual_host_server_points_at_client_fragment() {
        let client = client_span();
        let server = Span {
            kind: Some(Kind::Server),
            timestamp: None,
            duration: None,
            annotations: vec![
                Annotation::new(1_000_100, SERVER_RECV),
                Annotation::new(1_000_400, SERVER_SEND),
            ],
            ..client_span()
        };

        let translator = translator();
        let client = &translator.translate(&client)[0];
        let server = &translator.translate(&server)[0];
        assert_eq!(server.span_id, 2);
        assert_eq!(server.parent_span_id, client.span_id);
        assert_eq!(client.parent_span_id, 1);
    }

    #[test]
    fn test_shared_server_points_at_client_fragment() {
        let server = Span {
            kind: Some(Kind::Server),
            shared: true,
            ..client_span()
        };
        let spans = translator().translate(&server);
        assert_eq!(spans[0].parent_span_id, 2 ^ SPAN_ID_REWRITE_PAD);
    }

    #[test]
    fn test_root_server_span_has_no_parent() {
        let span = Span {
            kind: Some(Kind::Server),
            parent_id: None,
            ..client_span()
        };
        let spans = translator().translate(&span);
        assert_eq!(spans[0].parent_span_id, 0);
        assert!(spans[0].labels.contains_key(AGENT_LABEL));
    }

    #[test]
    fn test_merged_span_is_split() {
        let span = Span {
            kind: None,
            timestamp: None,
            duration: None,
            annotations: vec![
                Annotation::new(100, CLIENT_SEND),
                Annotation::new(110, SERVER_RECV),
                Annotation::new(190, SERVER_SEND),
                Annotation::new(200, CLIENT_RECV),
            ],
            local_endpoint: Some(Endpoint {
                ipv4: Some("10.0.0.1".to_owned()),
                ..Default::default()
            }),
            ..client_span()
        };

        let spans = translator().translate(&span);
        assert_eq!(spans.len(), 2);
        let (client, server) = (&spans[0], &spans[1]);

        assert_eq!(client.kind, SpanKind::RpcClient as i32);
        assert_eq!(client.span_id, 2 ^ SPAN_ID_REWRITE_PAD);
        assert_eq!(client.parent_span_id, 1);
        assert_eq!(client.start_time, Some(timestamp_from_micros(100)));
        assert_eq!(client.end_time, Some(timestamp_from_micros(200)));
        assert!(!client.labels.contains_key(ENDPOINT_IPV4_KEY));

        assert_eq!(server.kind, SpanKind::RpcServer as i32);
        assert_eq!(server.span_id, 2);
        assert_eq!(server.parent_span_id, client.span_id);
        assert_eq!(server.start_time, Some(timestamp_from_micros(110)));
        assert_eq!(server.end_time, Some(timestamp_from_micros(190)));
        assert!(server.labels.contains_key(ENDPOINT_IPV4_KEY));
    }

    #[test]
    fn test_kind_from_annotations() {
        let span = Span {
            kind: None,
            annotations: vec![Annotation::new(110, SERVER_RECV)],
            ..client_span()
        };
        let spans = translator().translate(&span);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, SpanKind::RpcServer as i32);
        // The span has its own timestamp, so the server owns it.
        assert_eq!(spans[0].parent_span_id, 1 ^ SPAN_ID_REWRITE_PAD);
    }

    #[test]
    fn test_local_span_is_unspecified() {
        let span = Span {
            kind: None,
            ..client_span()
        };
        let spans = translator().translate(&span);
        assert_eq!(spans[0].kind, SpanKind::Unspecified as i32);
        assert_eq!(spans[0].span_id, 2);
        assert_eq!(spans[0].parent_span_id, 1);
    }

    #[test]
    fn test_producer_is_unspecified() {
        let span = Span {
            kind: Some(Kind::Producer),
            ..client_span()
        };
        let spans = translator().translate(&span);
        assert_eq!(spans[0].kind, SpanKind::Unspecified as i32);
        assert_eq!(spans[0].span_id, 2);
    }

    #[test]
    fn test_missing_name_is_empty() {
        let span = Span {
            name: None,
            ..client_span()
        };
        assert_eq!(translator().translate(&span)[0].name, "");
    }

    #[test]
    fn test_explicit_times_win_over_annotations() {
        let span = Span {
            annotations: vec![
                Annotation::new(5, CLIENT_SEND),
                Annotation::new(6, CLIENT_RECV),
            ],
            ..client_span()
        };
        let spans = translator().translate(&span);
        assert_eq!(spans[0].start_time, Some(timestamp_from_micros(1_000_000)));
        assert_eq!(spans[0].end_time, Some(timestamp_from_micros(1_000_500)));
    }

    #[test]
    fn test_client_annotations_win_over_server_annotations() {
        let span = Span {
            kind: Some(Kind::Server),
            timestamp: None,
            duration: None,
            annotations: vec![
                Annotation::new(30, SERVER_RECV),
                Annotation::new(40, SERVER_SEND),
                Annotation::new(10, CLIENT_SEND),
                Annotation::new(50, CLIENT_RECV),
            ],
            ..client_span()
        };
        let spans = translator().translate(&span);
        assert_eq!(spans[0].start_time, Some(timestamp_from_micros(10)));
        assert_eq!(spans[0].end_time, Some(timestamp_from_micros(50)));
    }

    #[test]
    fn test_timestamp_without_duration() {
        let span = Span {
            duration: None,
            ..client_span()
        };
        let spans = translator().translate(&span);
        assert_eq!(spans[0].start_time, Some(timestamp_from_micros(1_000_000)));
        assert_eq!(spans[0].end_time, spans[0].start_time);
    }

    #[test]
    fn test_no_times() {
        let span = Span {
            timestamp: None,
            duration: None,
            ..client_span()
        };
        let spans = translator().translate(&span);
        assert_eq!(spans[0].start_time, None);
        assert_eq!(spans[0].end_time, None);
    }

    #[test]
    fn test_malformed_ids_fall_back_to_zero() {
        let span = Span {
            kind: Some(Kind::Client),
            parent_id: Some("not-hex".to_owned()),
            ..Span::new(TRACE_ID, "zzz")
        };
        let spans = translator().translate(&span);
        assert_eq!(spans[0].span_id, 0);
        assert_eq!(spans[0].parent_span_id, 0);
    }
}
