// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types of `stackdriver-trace-sender`.

use thiserror::Error;

/// Errors of a send call.
#[derive(Debug, Error)]
pub enum SendError {
    /// The sender was closed before the call.
    #[error("sender is closed")]
    Closed,

    /// The call was cancelled through its handle.
    #[error("send was cancelled")]
    Cancelled,

    /// The request is larger than the configured maximum.
    #[error("message of {size} bytes exceeds the maximum of {max} bytes")]
    MessageTooLarge {
        /// Size of the request, in bytes.
        size: usize,
        /// Maximum request size, in bytes.
        max: usize,
    },

    /// A buffer is too short to hold a trace ID prefix.
    #[error("buffer {index} of {len} bytes is shorter than its trace id prefix")]
    ShortBuffer {
        /// Position of the buffer in the input.
        index: usize,
        len: usize,
    },

    /// The API rejected the call or could not be reached.
    #[error("rpc failed: {0}")]
    Rpc(#[from] tonic::Status),

    /// The completion callback panicked.
    #[error("callback panicked: {0}")]
    Callback(String),

    /// The call could not be run on the runtime.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl SendError {
    /// gRPC status code of the error, if it came from the API.
    pub fn code(&self) -> Option<tonic::Code> {
        match self {
            SendError::Rpc(status) => Some(status.code()),
            _ => None,
        }
    }
}

/// Errors raised while building a sender from its configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("project id is required")]
    MissingProjectId,

    /// The legacy API requires trace IDs to be exactly 32 hex characters.
    #[error("strict trace ids are required by the v1 api")]
    StrictTraceIdRequired,

    #[error("invalid api host {host}: {reason}")]
    InvalidUri { host: String, reason: String },

    #[error("transport setup failed: {0}")]
    Transport(String),

    /// No tokio runtime was given nor is one running.
    #[error("no tokio runtime available")]
    NoRuntime,

    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_too_large_display() {
        let err = SendError::MessageTooLarge {
            size: 2_000_000,
            max: 1_048_576,
        };
        assert_eq!(
            err.to_string(),
            "message of 2000000 bytes exceeds the maximum of 1048576 bytes"
        );
    }

    #[test]
    fn short_buffer_display() {
        let err = SendError::ShortBuffer { index: 1, len: 3 };
        assert_eq!(
            err.to_string(),
            "buffer 1 of 3 bytes is shorter than its trace id prefix"
        );
    }

    #[test]
    fn rpc_error_code() {
        let err = SendError::from(tonic::Status::invalid_argument("bad span"));
        assert_eq!(err.code(), Some(tonic::Code::InvalidArgument));
        assert!(err.to_string().starts_with("rpc failed: "));
        assert_eq!(SendError::Closed.code(), None);
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidUri {
            host: "::".to_owned(),
            reason: "invalid format".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid api host ::: invalid format");
        assert_eq!(
            ConfigError::StrictTraceIdRequired.to_string(),
            "strict trace ids are required by the v1 api"
        );
    }
}
