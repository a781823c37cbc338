// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Translation of zipkin spans into Stackdriver trace spans.
//!
//! Spans are translated for one of the two write APIs, see [`ApiVersion`], and encoded into
//! trace-ID-prefixed buffers by [`encoder::SpanEncoder`]. These buffers are what the sender
//! batches into requests.

pub mod encoder;
pub mod id;
pub mod labels;
pub mod span;
pub mod v1;
pub mod v2;

use serde::{Deserialize, Serialize};

pub use encoder::SpanEncoder;
pub use labels::{AgentName, LabelExtractor, LabelNaming};
pub use span::{Annotation, Endpoint, Kind, Span};

/// Version of the destination write API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// Legacy `PatchTraces` API: spans grouped by trace, integer span IDs.
    V1,
    /// `BatchWriteSpans` API: flat span list, hex string span IDs.
    #[default]
    V2,
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiVersion::V1 => f.write_str("v1"),
            ApiVersion::V2 => f.write_str("v2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_version_serde() {
        let version: ApiVersion = serde_json::from_str(r#""v1""#).unwrap();
        assert_eq!(version, ApiVersion::V1);
        assert_eq!(serde_json::to_string(&ApiVersion::V2).unwrap(), r#""v2""#);
        assert_eq!(ApiVersion::V1.to_string(), "v1");
    }
}
