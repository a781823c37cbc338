// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Configuration of the exporter.
//!
//! [`StackdriverConfig`] is the serde-deserializable form, with environment overrides.
//! [`SenderBuilder`] is the programmatic form it resolves to.

use crate::error::ConfigError;
use crate::health::DEFAULT_HEALTH_CHECK_EXPIRATION;
use crate::sender::{Sender, SenderSettings, DEFAULT_MESSAGE_MAX_BYTES};
use crate::transport::{GrpcTransport, RequestInterceptor, Transport};
use serde::{Deserialize, Serialize};
use stackdriver_trace_translation::labels::{default_renamed_labels, DEFAULT_AGENT_NAME};
use stackdriver_trace_translation::{
    AgentName, ApiVersion, LabelExtractor, LabelNaming, SpanEncoder,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::runtime::Handle;

/// Default address of the trace API.
pub const DEFAULT_API_HOST: &str = "https://cloudtrace.googleapis.com:443";

pub const PROJECT_ID_ENV: &str = "STACKDRIVER_PROJECT_ID";
pub const API_HOST_ENV: &str = "STACKDRIVER_API_HOST";
pub const MESSAGE_MAX_BYTES_ENV: &str = "STACKDRIVER_MESSAGE_MAX_BYTES";
pub const AGENT_ENV: &str = "STACKDRIVER_AGENT";

/// Exporter configuration.
///
/// ```json
/// {
///   "project_id": "my-project",
///   "api_version": "v1",
///   "label_renames": { "http.path": "/http/path" }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackdriverConfig {
    pub project_id: Option<String>,
    pub api_host: String,
    pub message_max_bytes: usize,
    /// Whether trace IDs must be sent as 32 hex characters. Must be `true` with the v1 API.
    pub strict_trace_id: bool,
    pub api_version: ApiVersion,
    pub call_timeout_ms: Option<u64>,
    /// Additions and overrides to the default label rename table.
    pub label_renames: HashMap<String, String>,
    /// Prefix of labels missing from the rename table. Keys are kept as is when unset.
    pub label_prefix: Option<String>,
    pub agent_name: String,
    pub health_check_expiration_secs: u64,
}

impl Default for StackdriverConfig {
    fn default() -> Self {
        StackdriverConfig {
            project_id: None,
            api_host: DEFAULT_API_HOST.to_owned(),
            message_max_bytes: DEFAULT_MESSAGE_MAX_BYTES,
            strict_trace_id: true,
            api_version: ApiVersion::default(),
            call_timeout_ms: None,
            label_renames: HashMap::new(),
            label_prefix: None,
            agent_name: DEFAULT_AGENT_NAME.to_owned(),
            health_check_expiration_secs: DEFAULT_HEALTH_CHECK_EXPIRATION.as_secs(),
        }
    }
}

impl StackdriverConfig {
    /// Default configuration with the environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = StackdriverConfig::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overrides settings with the `STACKDRIVER_*` environment variables that are set.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(project_id) = lookup(PROJECT_ID_ENV) {
            self.project_id = Some(project_id);
        }
        if let Some(api_host) = lookup(API_HOST_ENV) {
            self.api_host = api_host;
        }
        if let Some(value) = lookup(MESSAGE_MAX_BYTES_ENV) {
            self.message_max_bytes = value.parse().map_err(|_| ConfigError::InvalidEnv {
                name: MESSAGE_MAX_BYTES_ENV,
                value,
            })?;
        }
        if let Some(agent_name) = lookup(AGENT_ENV) {
            self.agent_name = agent_name;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_settings(
            self.project_id.as_deref(),
            self.api_version,
            self.strict_trace_id,
        )
    }

    /// Label extractor with the configured renames, naming and agent.
    pub fn label_extractor(&self) -> LabelExtractor {
        let mut renamed = default_renamed_labels();
        renamed.extend(
            self.label_renames
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        let naming = match &self.label_prefix {
            Some(prefix) => LabelNaming::Prefixed(prefix.clone()),
            None => LabelNaming::Verbatim,
        };
        LabelExtractor::new(renamed, naming, AgentName::new(self.agent_name.clone()))
    }

    pub fn span_encoder(&self) -> Result<SpanEncoder, ConfigError> {
        self.validate()?;
        Ok(SpanEncoder::new(
            self.api_version,
            self.project_id.as_deref().unwrap_or_default(),
            self.label_extractor(),
        ))
    }

    /// Sender builder holding this configuration.
    pub fn sender_builder(&self) -> SenderBuilder {
        let mut builder = SenderBuilder::new()
            .api_host(self.api_host.clone())
            .api_version(self.api_version)
            .message_max_bytes(self.message_max_bytes)
            .strict_trace_id(self.strict_trace_id)
            .health_check_expiration(Duration::from_secs(self.health_check_expiration_secs));
        if let Some(project_id) = &self.project_id {
            builder = builder.project_id(project_id.clone());
        }
        if let Some(timeout) = self.call_timeout_ms {
            builder = builder.call_timeout(Duration::from_millis(timeout));
        }
        builder
    }
}

/// Builder for [`Sender`].
pub struct SenderBuilder {
    project_id: Option<String>,
    api_host: String,
    api_version: ApiVersion,
    message_max_bytes: usize,
    strict_trace_id: bool,
    call_timeout: Option<Duration>,
    interceptor: Option<RequestInterceptor>,
    health_check_expiration: Duration,
    runtime: Option<Handle>,
}

impl Default for SenderBuilder {
    fn default() -> Self {
        SenderBuilder {
            project_id: None,
            api_host: DEFAULT_API_HOST.to_owned(),
            api_version: ApiVersion::default(),
            message_max_bytes: DEFAULT_MESSAGE_MAX_BYTES,
            strict_trace_id: true,
            call_timeout: None,
            interceptor: None,
            health_check_expiration: DEFAULT_HEALTH_CHECK_EXPIRATION,
            runtime: None,
        }
    }
}

impl SenderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Address of the API, e.g. `https://cloudtrace.googleapis.com:443`. TLS is used for `https`
    /// addresses.
    pub fn api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    pub fn api_version(mut self, api_version: ApiVersion) -> Self {
        self.api_version = api_version;
        self
    }

    /// Maximum size of a request. Default: 1 MiB.
    pub fn message_max_bytes(mut self, message_max_bytes: usize) -> Self {
        self.message_max_bytes = message_max_bytes;
        self
    }

    pub fn strict_trace_id(mut self, strict_trace_id: bool) -> Self {
        self.strict_trace_id = strict_trace_id;
        self
    }

    /// Deadline of each call, sent as `grpc-timeout`.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Hook adding metadata, such as credentials, to every call.
    pub fn interceptor(mut self, interceptor: RequestInterceptor) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    pub fn health_check_expiration(mut self, expiration: Duration) -> Self {
        self.health_check_expiration = expiration;
        self
    }

    /// Runtime running the calls. Defaults to the runtime of the calling context.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds a sender over a gRPC channel to the configured API host.
    pub fn build(self) -> Result<Sender, ConfigError> {
        self.validate()?;
        let runtime = self.resolve_runtime()?;
        // The lazy channel spawns its worker on the current runtime.
        let _guard = runtime.enter();
        let transport =
            GrpcTransport::new(&self.api_host, self.call_timeout, self.interceptor.clone())?;
        self.runtime(runtime).build_with_transport(transport)
    }

    /// Builds a sender over a custom transport.
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<Sender<T>, ConfigError> {
        self.validate()?;
        let runtime = self.resolve_runtime()?;
        let project_id = self.project_id.unwrap_or_default();

        Ok(Sender::new(
            transport,
            SenderSettings {
                api_version: self.api_version,
                project_id,
                message_max_bytes: self.message_max_bytes,
                health_check_expiration: self.health_check_expiration,
            },
            runtime,
        ))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_settings(
            self.project_id.as_deref(),
            self.api_version,
            self.strict_trace_id,
        )
    }

    fn resolve_runtime(&self) -> Result<Handle, ConfigError> {
        match &self.runtime {
            Some(runtime) => Ok(runtime.clone()),
            None => Handle::try_current().map_err(|_| ConfigError::NoRuntime),
        }
    }
}

fn validate_settings(
    project_id: Option<&str>,
    api_version: ApiVersion,
    strict_trace_id: bool,
) -> Result<(), ConfigError> {
    if project_id.is_none_or(str::is_empty) {
        return Err(ConfigError::MissingProjectId);
    }
    // The legacy API only accepts 32 character trace IDs.
    if api_version == ApiVersion::V1 && !strict_trace_id {
        return Err(ConfigError::StrictTraceIdRequired);
    }
    Ok(())
}
