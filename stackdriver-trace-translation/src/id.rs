// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Trace and span identifier handling.
//!
//! Parsing never fails: identifiers that are not valid hex fall back to zero, matching the
//! best-effort nature of the export.

use tracing::debug;

/// Length of a trace ID on the wire, and of the prefix of every encoded span buffer.
pub const TRACE_ID_LEN: usize = 32;

/// Constant xor-ed into client span IDs of the legacy API, so that the client and server halves of
/// a span shared by two hosts get distinct yet deterministic IDs.
pub const SPAN_ID_REWRITE_PAD: u64 = 0x3f6a2ec3c810c2ab;

const ZERO_TRACE_ID: [u8; TRACE_ID_LEN] = [b'0'; TRACE_ID_LEN];

/// Normalizes a zipkin trace ID to the 32 lower-hex characters the destination expects.
///
/// 16 character IDs are left padded with `'0'`. IDs longer than 32 characters keep their last 32.
/// IDs that are not hex become all zeros.
pub fn normalize_trace_id(trace_id: &str) -> [u8; TRACE_ID_LEN] {
    let bytes = trace_id.as_bytes();
    let bytes = &bytes[bytes.len().saturating_sub(TRACE_ID_LEN)..];
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_hexdigit) {
        debug!(trace_id, "Invalid trace id, using zero");
        return ZERO_TRACE_ID;
    }

    let mut normalized = ZERO_TRACE_ID;
    let offset = TRACE_ID_LEN - bytes.len();
    for (dst, src) in normalized[offset..].iter_mut().zip(bytes) {
        *dst = src.to_ascii_lowercase();
    }
    normalized
}

/// Same as [`normalize_trace_id`], as an owned string.
pub fn normalize_trace_id_string(trace_id: &str) -> String {
    // Only ascii hex digits or '0' are ever written by normalize_trace_id.
    normalize_trace_id(trace_id)
        .iter()
        .map(|b| *b as char)
        .collect()
}

/// Parses a hex span ID as an unsigned 64-bit integer.
///
/// Only the last 16 characters are considered, so the lower half of a 128-bit ID is used. Values
/// above `i64::MAX` are valid. Anything that is not hex yields `0`.
pub fn parse_span_id(id: &str) -> u64 {
    // Not a char boundary only when the tail holds non-ascii characters, which are not hex anyway.
    let digits = id.get(id.len().saturating_sub(16)..).unwrap_or_default();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        debug!(id, "Invalid span id, using zero");
        return 0;
    }
    u64::from_str_radix(digits, 16).unwrap_or_default()
}

/// Rewrites a span ID with [`SPAN_ID_REWRITE_PAD`]. Zero, the "no span" value, is left as is.
pub fn rewrite_span_id(id: u64) -> u64 {
    if id == 0 {
        0
    } else {
        id ^ SPAN_ID_REWRITE_PAD
    }
}
