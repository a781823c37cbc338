// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Assembly of request bodies from trace-ID-prefixed buffers.
//!
//! Spans are copied into the request as they are: the buffers already hold encoded spans, so only
//! the enclosing messages are written here.

use crate::collator::{span_bytes, trace_id, TraceCollator, TraceCollatorObserver};
use crate::sizer::{field_size, MessageSizer};
use crate::transport::RpcMethod;
use bytes::{BufMut, Bytes, BytesMut};
use prost::encoding::{encode_key, encode_varint, WireType};
use stackdriver_trace_translation::id::TRACE_ID_LEN;
use stackdriver_trace_translation::ApiVersion;

mod v1_tags {
    pub const REQUEST_PROJECT_ID: u32 = 2;
    pub const REQUEST_TRACES: u32 = 3;
    pub const TRACES_TRACE: u32 = 1;
    pub const TRACE_PROJECT_ID: u32 = 1;
    pub const TRACE_TRACE_ID: u32 = 2;
    pub const TRACE_SPANS: u32 = 3;
}

mod v2_tags {
    pub const REQUEST_NAME: u32 = 1;
    pub const REQUEST_SPANS: u32 = 2;
}

/// An encoded request, ready to be handed to a transport.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedRequest {
    pub method: RpcMethod,
    pub body: Bytes,
    pub span_count: usize,
    pub trace_count: usize,
}

/// Builds the request bodies of one project.
#[derive(Debug)]
pub struct RequestEncoder {
    api_version: ApiVersion,
    project_id: String,
    sizer: MessageSizer,
    collator: TraceCollator,
}

impl RequestEncoder {
    pub fn new(api_version: ApiVersion, project_id: &str) -> Self {
        RequestEncoder {
            api_version,
            project_id: project_id.to_owned(),
            sizer: MessageSizer::new(api_version, project_id),
            collator: TraceCollator::new(),
        }
    }

    pub fn sizer(&mut self) -> &mut MessageSizer {
        &mut self.sizer
    }

    /// Encodes the request carrying `bufs`. An empty input gives an empty body.
    pub fn encode<B: AsRef<[u8]>>(&mut self, bufs: &[B]) -> EncodedRequest {
        let method = RpcMethod::for_version(self.api_version);
        if bufs.is_empty() {
            return EncodedRequest {
                method,
                body: Bytes::new(),
                span_count: 0,
                trace_count: 0,
            };
        }

        let mut out = BytesMut::with_capacity(self.sizer.message_size_in_bytes(bufs));
        let trace_count = match self.api_version {
            ApiVersion::V1 => self.encode_patch_traces(bufs, &mut out),
            ApiVersion::V2 => self.encode_batch_write_spans(bufs, &mut out),
        };
        EncodedRequest {
            method,
            body: out.freeze(),
            span_count: bufs.len(),
            trace_count,
        }
    }

    fn encode_patch_traces<B: AsRef<[u8]>>(&mut self, bufs: &[B], out: &mut BytesMut) -> usize {
        let mut groups = TraceGroups::with_capacity(bufs.len());
        self.collator.collate(bufs, &mut groups);

        let project_id = self.project_id.as_bytes();
        let project_id_field_size = if project_id.is_empty() {
            0
        } else {
            field_size(project_id.len())
        };
        let trace_sizes: Vec<usize> = groups
            .traces()
            .map(|spans| {
                project_id_field_size
                    + field_size(TRACE_ID_LEN)
                    + spans
                        .iter()
                        .map(|buf| field_size(span_bytes(buf).len()))
                        .sum::<usize>()
            })
            .collect();
        let traces_size: usize = trace_sizes.iter().map(|size| field_size(*size)).sum();

        put_bytes(v1_tags::REQUEST_PROJECT_ID, project_id, out);
        put_header(v1_tags::REQUEST_TRACES, traces_size, out);
        for (spans, trace_size) in groups.traces().zip(&trace_sizes) {
            put_header(v1_tags::TRACES_TRACE, *trace_size, out);
            put_bytes(v1_tags::TRACE_PROJECT_ID, project_id, out);
            put_header(v1_tags::TRACE_TRACE_ID, TRACE_ID_LEN, out);
            out.put_slice(trace_id(spans[0]));
            for buf in spans {
                let span = span_bytes(buf);
                put_header(v1_tags::TRACE_SPANS, span.len(), out);
                out.put_slice(span);
            }
        }
        trace_sizes.len()
    }

    fn encode_batch_write_spans<B: AsRef<[u8]>>(&mut self, bufs: &[B], out: &mut BytesMut) -> usize {
        let name = format!("projects/{}", self.project_id);
        put_bytes(v2_tags::REQUEST_NAME, name.as_bytes(), out);
        for buf in bufs {
            let span = span_bytes(buf.as_ref());
            put_header(v2_tags::REQUEST_SPANS, span.len(), out);
            out.put_slice(span);
        }
        count_traces(bufs)
    }
}

/// Writes a length-delimited field key and length.
fn put_header(tag: u32, len: usize, out: &mut BytesMut) {
    encode_key(tag, WireType::LengthDelimited, out);
    encode_varint(len as u64, out);
}

/// Writes a bytes or string field, skipped when empty as protobuf does for default values.
fn put_bytes(tag: u32, value: &[u8], out: &mut BytesMut) {
    if value.is_empty() {
        return;
    }
    put_header(tag, value.len(), out);
    out.put_slice(value);
}

fn count_traces<B: AsRef<[u8]>>(bufs: &[B]) -> usize {
    let mut ids: Vec<&[u8]> = bufs.iter().map(|buf| trace_id(buf.as_ref())).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.len()
}

/// Buffers in collation order, with the index of the first buffer of each trace.
struct TraceGroups<'a> {
    spans: Vec<&'a [u8]>,
    starts: Vec<usize>,
}

impl<'a> TraceGroups<'a> {
    fn with_capacity(capacity: usize) -> Self {
        TraceGroups {
            spans: Vec::with_capacity(capacity),
            starts: Vec::new(),
        }
    }

    fn traces(&self) -> impl Iterator<Item = &[&'a [u8]]> + '_ {
        self.starts.iter().enumerate().map(|(i, start)| {
            let end = self.starts.get(i + 1).copied().unwrap_or(self.spans.len());
            &self.spans[*start..end]
        })
    }
}

impl<'a> TraceCollatorObserver<'a> for TraceGroups<'a> {
    fn first_trace(&mut self, buf: &'a [u8]) {
        self.next_trace(buf);
    }

    fn next_span(&mut self, buf: &'a [u8]) {
        self.spans.push(buf);
    }

    fn next_trace(&mut self, buf: &'a [u8]) {
        self.starts.push(self.spans.len());
        self.spans.push(buf);
    }
}
