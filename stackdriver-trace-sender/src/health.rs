// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Health probing of the trace API.
//!
//! The probe sends a request the API is known to reject: a span without a name or ID. Reaching
//! the validation step proves that the channel, the credentials and the project are usable, so an
//! `INVALID_ARGUMENT` answer means healthy.

use crate::error::SendError;
use crate::transport::RpcMethod;
use bytes::Bytes;
use prost::Message;
use stackdriver_trace_protobuf::{v1, v2};
use stackdriver_trace_translation::ApiVersion;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tonic::{Code, Status};
use tracing::debug;

/// How long a probe result is reused before probing again.
pub const DEFAULT_HEALTH_CHECK_EXPIRATION: Duration = Duration::from_secs(60);

/// Outcome of a health check.
#[derive(Clone, Debug)]
pub struct CheckResult {
    pub ok: bool,
    /// Cause of the failure of an unhealthy result.
    pub error: Option<Arc<SendError>>,
}

impl CheckResult {
    pub fn ok() -> Self {
        CheckResult {
            ok: true,
            error: None,
        }
    }

    pub fn failed(error: SendError) -> Self {
        CheckResult {
            ok: false,
            error: Some(Arc::new(error)),
        }
    }

    /// Classifies the status of a probe call.
    pub fn from_probe(result: Result<(), Status>) -> Self {
        match result {
            Ok(()) => CheckResult::ok(),
            Err(status) if status.code() == Code::InvalidArgument => CheckResult::ok(),
            Err(status) => CheckResult::failed(SendError::Rpc(status)),
        }
    }
}

/// Body of the probe request for `api_version`.
pub fn probe_request(api_version: ApiVersion, project_id: &str) -> (RpcMethod, Bytes) {
    let body = match api_version {
        ApiVersion::V1 => v1::PatchTracesRequest {
            project_id: project_id.to_owned(),
            traces: Some(v1::Traces {
                traces: vec![v1::Trace {
                    spans: vec![v1::TraceSpan::default()],
                    ..Default::default()
                }],
            }),
        }
        .encode_to_vec(),
        ApiVersion::V2 => v2::BatchWriteSpansRequest {
            name: format!("projects/{project_id}"),
            spans: vec![v2::Span::default()],
        }
        .encode_to_vec(),
    };
    (RpcMethod::for_version(api_version), Bytes::from(body))
}

#[derive(Debug)]
struct CachedResult {
    result: CheckResult,
    at: Instant,
}

/// Caches health check results for an expiration window.
#[derive(Debug)]
pub struct HealthCheck {
    expiration: Duration,
    cached: Mutex<Option<CachedResult>>,
}

impl Default for HealthCheck {
    fn default() -> Self {
        HealthCheck::new(DEFAULT_HEALTH_CHECK_EXPIRATION)
    }
}

impl HealthCheck {
    pub fn new(expiration: Duration) -> Self {
        HealthCheck {
            expiration,
            cached: Mutex::new(None),
        }
    }

    /// The cached result, if it has not expired.
    pub fn cached(&self) -> Option<CheckResult> {
        let cached = self.cached.lock().ok()?;
        cached
            .as_ref()
            .filter(|cached| cached.at.elapsed() < self.expiration)
            .map(|cached| cached.result.clone())
    }

    /// Replaces the cached result with a fresher observation, restarting the expiration window.
    pub fn record(&self, result: CheckResult) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(CachedResult {
                result,
                at: Instant::now(),
            });
        }
    }

    /// Returns the cached result, or runs `probe` and caches its result.
    ///
    /// Concurrent callers on an expired cache may each run a probe, the last one to finish wins.
    pub async fn check<F, Fut>(&self, probe: F) -> CheckResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CheckResult>,
    {
        if let Some(result) = self.cached() {
            return result;
        }
        let result = probe().await;
        debug!(ok = result.ok, "Health probe completed");
        self.record(result.clone());
        result
    }
}
