// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Exact size of a request, computed without encoding it.
//!
//! The sizes follow the protobuf wire format of the requests built by [`crate::request`]: every
//! length-delimited field costs one byte of key (all tags are below 16), the varint of its
//! length, and its payload.

use crate::collator::{span_bytes, TraceCollator, TraceCollatorObserver};
use stackdriver_trace_translation::id::TRACE_ID_LEN;
use stackdriver_trace_translation::ApiVersion;

/// Number of bytes of the varint encoding of `value`.
pub fn varint_size(value: u64) -> usize {
    // Each byte holds 7 bits, and zero still takes one byte.
    ((64 - (value | 1).leading_zeros() as usize) + 6) / 7
}

/// Size of a length-delimited field with a one byte key and a payload of `len` bytes.
pub fn field_size(len: usize) -> usize {
    1 + varint_size(len as u64) + len
}

/// Size of the trace ID field of a legacy trace.
const TRACE_ID_FIELD_SIZE: usize = 2 + TRACE_ID_LEN;

/// Computes request sizes for one project and API version.
#[derive(Debug)]
pub struct MessageSizer {
    api_version: ApiVersion,
    /// Size of the project ID field of a legacy request or trace, zero when the ID is empty.
    project_id_field_size: usize,
    /// Size of the `projects/{project_id}` name field of a v2 request.
    name_field_size: usize,
    collator: TraceCollator,
}

impl MessageSizer {
    pub fn new(api_version: ApiVersion, project_id: &str) -> Self {
        MessageSizer {
            api_version,
            project_id_field_size: if project_id.is_empty() {
                0
            } else {
                field_size(project_id.len())
            },
            name_field_size: field_size("projects/".len() + project_id.len()),
            collator: TraceCollator::new(),
        }
    }

    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Size of the request carrying `bufs`, or zero when there is nothing to send.
    pub fn message_size_in_bytes<B: AsRef<[u8]>>(&mut self, bufs: &[B]) -> usize {
        match bufs {
            [] => 0,
            [buf] => self.message_size_for_span(buf.as_ref().len()),
            bufs => match self.api_version {
                ApiVersion::V1 => {
                    let mut observer = TracesSize::new(self.project_id_field_size);
                    self.collator.collate(bufs, &mut observer);
                    self.project_id_field_size + field_size(observer.finish())
                }
                ApiVersion::V2 => {
                    self.name_field_size
                        + bufs
                            .iter()
                            .map(|buf| field_size(span_bytes(buf.as_ref()).len()))
                            .sum::<usize>()
                }
            },
        }
    }

    /// Size of a request carrying a single buffer of `buf_len` bytes, trace ID prefix included.
    pub fn message_size_for_span(&self, buf_len: usize) -> usize {
        let span_len = buf_len.saturating_sub(TRACE_ID_LEN);
        match self.api_version {
            ApiVersion::V1 => {
                let trace =
                    self.project_id_field_size + TRACE_ID_FIELD_SIZE + field_size(span_len);
                self.project_id_field_size + field_size(field_size(trace))
            }
            ApiVersion::V2 => self.name_field_size + field_size(span_len),
        }
    }
}

/// Accumulates the size of the `Traces` message of a legacy request.
struct TracesSize {
    project_id_field_size: usize,
    current_trace: usize,
    traces: usize,
}

impl TracesSize {
    fn new(project_id_field_size: usize) -> Self {
        TracesSize {
            project_id_field_size,
            current_trace: 0,
            traces: 0,
        }
    }

    fn start_trace(&mut self, buf: &[u8]) {
        self.current_trace = self.project_id_field_size
            + TRACE_ID_FIELD_SIZE
            + field_size(span_bytes(buf).len());
    }

    fn finish(mut self) -> usize {
        self.traces += field_size(self.current_trace);
        self.traces
    }
}

impl<'a> TraceCollatorObserver<'a> for TracesSize {
    fn first_trace(&mut self, buf: &'a [u8]) {
        self.start_trace(buf);
    }

    fn next_span(&mut self, buf: &'a [u8]) {
        self.current_trace += field_size(span_bytes(buf).len());
    }

    fn next_trace(&mut self, buf: &'a [u8]) {
        self.traces += field_size(self.current_trace);
        self.start_trace(buf);
    }
}
