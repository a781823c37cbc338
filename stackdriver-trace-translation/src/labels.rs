// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Extraction of destination labels from zipkin tags, annotations and endpoints.

use crate::span::{Kind, Span};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Label holding the service name of the local endpoint.
pub const COMPONENT_LABEL: &str = "/component";
/// Label identifying the exporter, set on root spans.
pub const AGENT_LABEL: &str = "/agent";
/// Label holding the span kind, used by the v2 API which has no kind field of its own.
pub const KIND_LABEL: &str = "/kind";
/// Label holding the error message of a failed span.
pub const ERROR_LABEL: &str = "/error/message";
/// Zipkin key of the local IPv4 address label.
pub const ENDPOINT_IPV4_KEY: &str = "endpoint.ipv4";
/// Zipkin key of the local IPv6 address label.
pub const ENDPOINT_IPV6_KEY: &str = "endpoint.ipv6";

/// Default value of the [`AGENT_LABEL`].
pub const DEFAULT_AGENT_NAME: &str = "zipkin-rust";
/// Namespace given to unknown keys with [`LabelNaming::Prefixed`].
pub const DEFAULT_LABEL_PREFIX: &str = "zipkin.io/";
/// Maximum length of a label value in the legacy API.
pub const V1_MAX_LABEL_VALUE_BYTES: usize = 8192;

/// Zipkin keys with a well-known Stackdriver counterpart.
pub fn default_renamed_labels() -> HashMap<String, String> {
    [
        ("http.host", "/http/host"),
        ("http.method", "/http/method"),
        ("http.status_code", "/http/status_code"),
        ("http.request.size", "/request/size"),
        ("http.response.size", "/response/size"),
        ("http.url", "/http/url"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect()
}

/// Value of the [`AGENT_LABEL`].
///
/// Clones share the same value: updating it through any clone is seen by the next translated root
/// span of every translator holding it.
#[derive(Clone, Debug)]
pub struct AgentName(Arc<ArcSwap<String>>);

impl AgentName {
    pub fn new(name: impl Into<String>) -> Self {
        AgentName(Arc::new(ArcSwap::from_pointee(name.into())))
    }

    pub fn get(&self) -> Arc<String> {
        self.0.load_full()
    }

    pub fn set(&self, name: impl Into<String>) {
        self.0.store(Arc::new(name.into()));
    }
}

impl Default for AgentName {
    fn default() -> Self {
        AgentName::new(DEFAULT_AGENT_NAME)
    }
}

/// How keys missing from the rename table are named.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LabelNaming {
    /// Keep the zipkin key.
    #[default]
    Verbatim,
    /// Prepend a namespace to the zipkin key, e.g. `zipkin.io/`.
    Prefixed(String),
}

/// Maps zipkin span data to destination labels.
#[derive(Clone, Debug)]
pub struct LabelExtractor {
    renamed: HashMap<String, String>,
    naming: LabelNaming,
    agent: AgentName,
}

impl Default for LabelExtractor {
    fn default() -> Self {
        LabelExtractor::new(default_renamed_labels(), LabelNaming::Verbatim, AgentName::default())
    }
}

impl LabelExtractor {
    pub fn new(renamed: HashMap<String, String>, naming: LabelNaming, agent: AgentName) -> Self {
        LabelExtractor {
            renamed,
            naming,
            agent,
        }
    }

    pub fn agent(&self) -> &AgentName {
        &self.agent
    }

    /// Destination name of a zipkin key.
    pub fn label_name<'a>(&'a self, key: &'a str) -> Cow<'a, str> {
        if let Some(renamed) = self.renamed.get(key) {
            return Cow::Borrowed(renamed);
        }
        match &self.naming {
            LabelNaming::Verbatim => Cow::Borrowed(key),
            LabelNaming::Prefixed(prefix) => Cow::Owned(format!("{prefix}{key}")),
        }
    }

    /// Labels of a legacy API span.
    ///
    /// `server` tells whether the destination span is the server side of the RPC. Only server
    /// spans carry the local endpoint address, as the address seen by a client may be the one of
    /// a load balancer rather than the final destination.
    pub fn extract(&self, span: &Span, server: bool) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        self.extract_common(span, server, true, |key, value| {
            labels.insert(key, truncate(value, V1_MAX_LABEL_VALUE_BYTES).to_owned());
        });
        labels
    }

    /// Untruncated labels shared by both API versions, in precedence order: later entries override
    /// earlier ones with the same key.
    pub(crate) fn extract_common(
        &self,
        span: &Span,
        server: bool,
        annotations: bool,
        mut put: impl FnMut(String, &str),
    ) {
        for (key, value) in &span.tags {
            put(self.label_name(key).into_owned(), value);
        }

        if server {
            if let Some(endpoint) = &span.local_endpoint {
                if let Some(ipv4) = &endpoint.ipv4 {
                    put(self.label_name(ENDPOINT_IPV4_KEY).into_owned(), ipv4);
                }
                if let Some(ipv6) = &endpoint.ipv6 {
                    put(self.label_name(ENDPOINT_IPV6_KEY).into_owned(), ipv6);
                }
            }
        }

        if annotations {
            for annotation in &span.annotations {
                put(
                    self.label_name(&annotation.value).into_owned(),
                    &format_annotation_timestamp(annotation.timestamp),
                );
            }
        }

        if let Some(service_name) = span.local_service_name() {
            put(COMPONENT_LABEL.to_owned(), service_name);
        }

        if span.is_root() {
            put(AGENT_LABEL.to_owned(), &self.agent.get());
        }
    }
}

/// Whether a span is the server side of an RPC for label purposes.
pub(crate) fn is_server(span: &Span) -> bool {
    span.kind == Some(Kind::Server)
}

/// Truncates `value` to at most `max_bytes` bytes, on a character boundary.
pub fn truncate(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Formats an annotation timestamp, in epoch microseconds, as `2017-01-12 (00:27:44.123456)`.
pub fn format_annotation_timestamp(epoch_micros: u64) -> String {
    match i64::try_from(epoch_micros)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_micros)
    {
        Some(date) => date.format("%Y-%m-%d (%H:%M:%S%.6f)").to_string(),
        None => epoch_micros.to_string(),
    }
}
