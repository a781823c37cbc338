// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Encoding of zipkin spans into trace-ID-prefixed buffers.
//!
//! Every buffer starts with the 32 lowercase hex characters of the trace ID, followed by the
//! protobuf encoding of one destination span. The prefix lets requests be grouped by trace without
//! decoding the spans.

use crate::id::{normalize_trace_id, TRACE_ID_LEN};
use crate::labels::LabelExtractor;
use crate::span::Span;
use crate::{v1, v2, ApiVersion};
use prost::Message;

/// Encodes spans for one API version.
#[derive(Clone, Debug)]
pub enum SpanEncoder {
    V1(v1::SpanTranslator),
    V2(v2::SpanTranslator),
}

impl SpanEncoder {
    pub fn new(version: ApiVersion, project_id: &str, labels: LabelExtractor) -> Self {
        match version {
            ApiVersion::V1 => SpanEncoder::V1(v1::SpanTranslator::new(labels)),
            ApiVersion::V2 => SpanEncoder::V2(v2::SpanTranslator::new(project_id, labels)),
        }
    }

    pub fn api_version(&self) -> ApiVersion {
        match self {
            SpanEncoder::V1(_) => ApiVersion::V1,
            SpanEncoder::V2(_) => ApiVersion::V2,
        }
    }

    /// Appends the buffers of `span` to `out`. The legacy API may produce two buffers for one
    /// span.
    pub fn encode_span(&self, span: &Span, out: &mut Vec<Vec<u8>>) {
        let trace_id = normalize_trace_id(&span.trace_id);
        match self {
            SpanEncoder::V1(translator) => {
                for translated in translator.translate(span) {
                    out.push(prefixed(&trace_id, &translated));
                }
            }
            SpanEncoder::V2(translator) => {
                out.push(prefixed(&trace_id, &translator.translate(span)));
            }
        }
    }

    pub fn encode_spans(&self, spans: &[Span]) -> Vec<Vec<u8>> {
        let mut out = Vec::with_capacity(spans.len());
        for span in spans {
            self.encode_span(span, &mut out);
        }
        out
    }

    /// Total length of the buffers [`SpanEncoder::encode_span`] would produce.
    pub fn size_in_bytes(&self, span: &Span) -> usize {
        match self {
            SpanEncoder::V1(translator) => translator
                .translate(span)
                .iter()
                .map(|translated| TRACE_ID_LEN + translated.encoded_len())
                .sum(),
            SpanEncoder::V2(translator) => TRACE_ID_LEN + translator.translate(span).encoded_len(),
        }
    }
}

fn prefixed(trace_id: &[u8; TRACE_ID_LEN], message: &impl Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(TRACE_ID_LEN + message.encoded_len());
    buf.extend_from_slice(trace_id);
    message.encode_raw(&mut buf);
    buf
}

/// Splits a buffer into its trace ID prefix and its encoded span. Buffers shorter than the prefix
/// yield `None`.
pub fn split_buffer(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    if buf.len() < TRACE_ID_LEN {
        return None;
    }
    Some(buf.split_at(TRACE_ID_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{Annotation, Kind, CLIENT_RECV, CLIENT_SEND, SERVER_RECV, SERVER_SEND};
    use stackdriver_trace_protobuf::v1::TraceSpan;
    use stackdriver_trace_protobuf::v2::Span as V2Span;

    fn span() -> Span {
        Span {
            kind: Some(Kind::Client),
            name: Some("get".to_owned()),
            timestamp: Some(1_000),
            duration: Some(10),
            ..Span::new("86154a4ba6e91385", "4d1e00c0db9010db")
        }
    }

    #[test]
    fn test_buffer_is_prefixed_with_padded_trace_id() {
        let encoder = SpanEncoder::new(ApiVersion::V1, "project", LabelExtractor::default());
        let mut out = Vec::new();
        encoder.encode_span(&span(), &mut out);
        assert_eq!(out.len(), 1);

        let (trace_id, message) = split_buffer(&out[0]).unwrap();
        assert_eq!(trace_id, b"000000000000000086154a4ba6e91385");
        let decoded = TraceSpan::decode(message).unwrap();
        assert_eq!(decoded.name, "get");
        assert_eq!(decoded.span_id, 0x4d1e00c0db9010db ^ crate::id::SPAN_ID_REWRITE_PAD);
    }

    #[test]
    fn test_split_span_produces_two_buffers() {
        let merged = Span {
            kind: None,
            annotations: vec![
                Annotation::new(1, CLIENT_SEND),
                Annotation::new(2, SERVER_RECV),
                Annotation::new(3, SERVER_SEND),
                Annotation::new(4, CLIENT_RECV),
            ],
            ..span()
        };
        let encoder = SpanEncoder::new(ApiVersion::V1, "project", LabelExtractor::default());
        let out = encoder.encode_spans(&[merged.clone(), span()]);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|buf| buf.starts_with(b"000000000000000086154a4ba6e91385")));
        assert_eq!(
            encoder.size_in_bytes(&merged),
            out[0].len() + out[1].len()
        );
    }

    #[test]
    fn test_v2_buffer() {
        let encoder = SpanEncoder::new(ApiVersion::V2, "project", LabelExtractor::default());
        assert_eq!(encoder.api_version(), ApiVersion::V2);
        let out = encoder.encode_spans(&[span()]);
        assert_eq!(out.len(), 1);
        assert_eq!(encoder.size_in_bytes(&span()), out[0].len());

        let (_, message) = split_buffer(&out[0]).unwrap();
        let decoded = V2Span::decode(message).unwrap();
        assert_eq!(decoded.span_id, "4d1e00c0db9010db");
        assert_eq!(decoded.display_name.unwrap().value, "get");
    }

    #[test]
    fn test_name_defaults_differ_per_version() {
        let unnamed = Span {
            name: None,
            ..span()
        };
        let v1 = SpanEncoder::new(ApiVersion::V1, "p", LabelExtractor::default());
        let v2 = SpanEncoder::new(ApiVersion::V2, "p", LabelExtractor::default());

        let bufs = v1.encode_spans(&[unnamed.clone()]);
        assert_eq!(TraceSpan::decode(&bufs[0][TRACE_ID_LEN..]).unwrap().name, "");

        let bufs = v2.encode_spans(&[unnamed]);
        let decoded = V2Span::decode(&bufs[0][TRACE_ID_LEN..]).unwrap();
        assert_eq!(decoded.display_name.unwrap().value, "unknown");
    }

    #[test]
    fn test_short_buffer_does_not_split() {
        assert!(split_buffer(b"abc").is_none());
    }
}
