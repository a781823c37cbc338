// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Zipkin v2 span model, the source of every translation.
//!
//! The types deserialize from the zipkin v2 JSON representation, e.g.
//!
//! ```json
//! {
//!   "traceId": "86154a4ba6e91385",
//!   "parentId": "86154a4ba6e91385",
//!   "id": "4d1e00c0db9010db",
//!   "kind": "CLIENT",
//!   "name": "get",
//!   "timestamp": 1472470996199000,
//!   "duration": 207000,
//!   "localEndpoint": { "serviceName": "frontend", "ipv4": "127.0.0.1" },
//!   "tags": { "http.path": "/api" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Client send annotation value of the zipkin v1 model.
pub const CLIENT_SEND: &str = "cs";
/// Client receive annotation value of the zipkin v1 model.
pub const CLIENT_RECV: &str = "cr";
/// Server receive annotation value of the zipkin v1 model.
pub const SERVER_RECV: &str = "sr";
/// Server send annotation value of the zipkin v1 model.
pub const SERVER_SEND: &str = "ss";

/// Role of the recording host in an RPC or messaging exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    Client,
    Server,
    Producer,
    Consumer,
}

impl Kind {
    /// Lowercase name of the kind, as recorded in destination attributes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Client => "client",
            Kind::Server => "server",
            Kind::Producer => "producer",
            Kind::Consumer => "consumer",
        }
    }
}

/// Network context of a node in the service graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// An event that explains latency with a timestamp, in epoch microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub timestamp: u64,
    pub value: String,
}

impl Annotation {
    pub fn new(timestamp: u64, value: impl Into<String>) -> Self {
        Annotation {
            timestamp,
            value: value.into(),
        }
    }
}

/// A zipkin span.
///
/// `timestamp` and `duration` are in microseconds. A zero value is treated the same way as an
/// absent one, as zipkin does.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub trace_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_endpoint: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_endpoint: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub shared: bool,
}

impl Span {
    /// Creates a span with only its identifiers set.
    pub fn new(trace_id: impl Into<String>, id: impl Into<String>) -> Self {
        Span {
            trace_id: trace_id.into(),
            id: id.into(),
            ..Default::default()
        }
    }

    /// Whether the span is the root of its trace.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Start timestamp, if the span carries a non-zero one.
    pub fn start_timestamp(&self) -> Option<u64> {
        self.timestamp.filter(|ts| *ts != 0)
    }

    /// Duration, if the span carries a non-zero one.
    pub fn duration(&self) -> Option<u64> {
        self.duration.filter(|d| *d != 0)
    }

    /// Timestamp of the first annotation with the given value.
    pub fn annotation_timestamp(&self, value: &str) -> Option<u64> {
        self.annotations
            .iter()
            .find(|a| a.value == value)
            .map(|a| a.timestamp)
    }

    pub fn has_annotation(&self, value: &str) -> bool {
        self.annotations.iter().any(|a| a.value == value)
    }

    /// Service name of the local endpoint, when present and not empty.
    pub fn local_service_name(&self) -> Option<&str> {
        self.local_endpoint
            .as_ref()
            .and_then(|e| e.service_name.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// Name of the span, when present and not empty.
    pub fn non_empty_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}
