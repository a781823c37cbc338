// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Protobuf messages of the Stackdriver (Cloud Trace) write APIs.
//!
//! [`v1`] holds the legacy `PatchTraces` schema, where spans are grouped into traces and identified
//! by 64-bit integers. [`v2`] holds the `BatchWriteSpans` schema, where spans are sent as a flat
//! list and identified by hex strings.

#[rustfmt::skip]
pub mod v1;
#[rustfmt::skip]
pub mod v2;


/// gRPC path of the legacy `PatchTraces` method.
pub const PATCH_TRACES_PATH: &str = "/google.devtools.cloudtrace.v1.TraceService/PatchTraces";

/// gRPC path of the `BatchWriteSpans` method.
pub const BATCH_WRITE_SPANS_PATH: &str =
    "/google.devtools.cloudtrace.v2.TraceService/BatchWriteSpans";

/// Converts a timestamp in epoch microseconds, the unit used by zipkin, to a protobuf timestamp.
pub fn timestamp_from_micros(epoch_micros: u64) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: (epoch_micros / 1_000_000) as i64,
        nanos: ((epoch_micros % 1_000_000) * 1_000) as i32,
    }
}
