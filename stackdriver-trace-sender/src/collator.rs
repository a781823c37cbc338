// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Grouping of trace-ID-prefixed buffers by trace.

use stackdriver_trace_translation::id::TRACE_ID_LEN;

/// Receives the buffers of a collation pass, grouped by trace.
///
/// Every buffer is handed over exactly once: the first buffer of the first trace through
/// [`first_trace`](Self::first_trace), the first buffer of each following trace through
/// [`next_trace`](Self::next_trace), and every other buffer through
/// [`next_span`](Self::next_span).
pub trait TraceCollatorObserver<'a> {
    fn first_trace(&mut self, buf: &'a [u8]);
    fn next_span(&mut self, buf: &'a [u8]);
    fn next_trace(&mut self, buf: &'a [u8]);
}

/// Sorts buffers by their trace ID prefix and reports them trace by trace.
///
/// The collator keeps its scratch index buffer between passes, so a long-lived instance does not
/// allocate once warmed up. It is meant to be owned by a single worker.
#[derive(Debug, Default)]
pub struct TraceCollator {
    order: Vec<usize>,
}

impl TraceCollator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one collation pass over `bufs`.
    ///
    /// Buffers of a trace keep their relative input order. Traces are reported in ascending trace
    /// ID order.
    pub fn collate<'a, B, O>(&mut self, bufs: &'a [B], observer: &mut O)
    where
        B: AsRef<[u8]>,
        O: TraceCollatorObserver<'a>,
    {
        self.order.clear();
        self.order.extend(0..bufs.len());
        // Stable, so equal trace IDs keep their input order.
        self.order
            .sort_by(|a, b| trace_id(bufs[*a].as_ref()).cmp(trace_id(bufs[*b].as_ref())));

        let mut order = self.order.iter();
        let Some(&first) = order.next() else {
            return;
        };
        let first: &'a [u8] = bufs[first].as_ref();
        observer.first_trace(first);

        let mut current = trace_id(first);
        for &index in order {
            let buf: &'a [u8] = bufs[index].as_ref();
            let id = trace_id(buf);
            if id == current {
                observer.next_span(buf);
            } else {
                current = id;
                observer.next_trace(buf);
            }
        }
    }
}

/// Trace ID prefix of a buffer.
pub(crate) fn trace_id(buf: &[u8]) -> &[u8] {
    &buf[..TRACE_ID_LEN.min(buf.len())]
}

/// Encoded span of a buffer, following its trace ID prefix.
pub(crate) fn span_bytes(buf: &[u8]) -> &[u8] {
    &buf[TRACE_ID_LEN.min(buf.len())..]
}
