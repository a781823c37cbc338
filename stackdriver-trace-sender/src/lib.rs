// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Delivery of encoded zipkin spans to the Stackdriver trace API.
//!
//! Callers hand a [`Sender`] trace-ID-prefixed buffers produced by
//! [`stackdriver_trace_translation::SpanEncoder`]. Each send groups the buffers by trace when the
//! legacy API requires it and issues exactly one unary call. [`Sender::message_size_in_bytes`]
//! reports the exact size of that call, so callers can keep batches under
//! [`Sender::message_max_bytes`].

pub mod collator;
pub mod config;
pub mod consumer;
pub mod error;
pub mod health;
pub mod request;
pub mod sender;
pub mod sizer;
pub mod transport;

pub use collator::{TraceCollator, TraceCollatorObserver};
pub use config::{SenderBuilder, StackdriverConfig};
pub use consumer::{decode_spans, SpanConsumer};
pub use error::{ConfigError, SendError};
pub use health::{CheckResult, HealthCheck};
pub use request::{EncodedRequest, RequestEncoder};
pub use sender::{SendHandle, Sender, DEFAULT_MESSAGE_MAX_BYTES};
pub use sizer::MessageSizer;
pub use transport::{bearer_token, GrpcTransport, RequestInterceptor, RpcMethod, Transport};
