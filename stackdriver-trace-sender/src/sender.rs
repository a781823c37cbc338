// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Sending of trace-ID-prefixed buffers in one request per call.

use crate::error::SendError;
use crate::health::{probe_request, CheckResult, HealthCheck};
use crate::request::{EncodedRequest, RequestEncoder};
use crate::transport::{GrpcTransport, Transport};
use stackdriver_trace_translation::id::TRACE_ID_LEN;
use stackdriver_trace_translation::ApiVersion;
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tonic::Code;
use tracing::{debug, error, warn};

/// Default maximum size of a request, in bytes.
pub const DEFAULT_MESSAGE_MAX_BYTES: usize = 1024 * 1024;

/// Sender settings resolved by the builder.
#[derive(Clone, Debug)]
pub(crate) struct SenderSettings {
    pub api_version: ApiVersion,
    pub project_id: String,
    pub message_max_bytes: usize,
    pub health_check_expiration: Duration,
}

struct Inner<T> {
    transport: T,
    settings: SenderSettings,
    closed: AtomicBool,
    runtime: Handle,
    /// Scratch encoders reused across calls.
    encoders: Mutex<Vec<RequestEncoder>>,
    health: HealthCheck,
}

/// Sends encoded spans to the trace API, one request per call.
///
/// The sender is cheap to clone, clones share the same transport and state. Once
/// [`closed`](Sender::close), every send fails with [`SendError::Closed`] without reaching the
/// transport.
pub struct Sender<T: Transport = GrpcTransport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Sender {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Transport> std::fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender")
            .field("settings", &self.inner.settings)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Sender<T> {
    pub(crate) fn new(transport: T, settings: SenderSettings, runtime: Handle) -> Self {
        let health = HealthCheck::new(settings.health_check_expiration);
        Sender {
            inner: Arc::new(Inner {
                transport,
                settings,
                closed: AtomicBool::new(false),
                runtime,
                encoders: Mutex::new(Vec::with_capacity(1)),
                health,
            }),
        }
    }

    pub fn api_version(&self) -> ApiVersion {
        self.inner.settings.api_version
    }

    pub fn project_id(&self) -> &str {
        &self.inner.settings.project_id
    }

    /// Maximum size of a request. Callers batching spans should keep
    /// [`Sender::message_size_in_bytes`] below it.
    pub fn message_max_bytes(&self) -> usize {
        self.inner.settings.message_max_bytes
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Exact size of the request that would carry `bufs`.
    pub fn message_size_in_bytes<B: AsRef<[u8]>>(&self, bufs: &[B]) -> usize {
        self.with_encoder(|encoder| encoder.sizer().message_size_in_bytes(bufs))
    }

    /// Exact size of the request that would carry a single buffer of `buf_len` bytes.
    pub fn message_size_for_span(&self, buf_len: usize) -> usize {
        self.with_encoder(|encoder| encoder.sizer().message_size_for_span(buf_len))
    }

    /// The health check cache of this sender. Outcomes of sends are recorded into it.
    pub fn health(&self) -> &HealthCheck {
        &self.inner.health
    }

    /// Sends `bufs` in one request.
    ///
    /// An empty input succeeds without any call.
    pub async fn send<B: AsRef<[u8]>>(&self, bufs: &[B]) -> Result<(), SendError> {
        match self.prepare(bufs)? {
            Some(request) => self.inner.call(request).await,
            None => Ok(()),
        }
    }

    /// Sends `bufs` on the sender runtime.
    ///
    /// The returned handle resolves once the call completes, and can cancel it. Dropping the handle
    /// does not cancel the call.
    pub fn enqueue(&self, bufs: Vec<Vec<u8>>) -> SendHandle {
        self.spawn_send(bufs, |result| result)
    }

    /// Same as [`Sender::enqueue`], calling `callback` with the outcome on a runtime thread.
    ///
    /// A panic in the callback resolves the handle with [`SendError::Callback`].
    pub fn enqueue_with_callback<F>(&self, bufs: Vec<Vec<u8>>, callback: F) -> SendHandle
    where
        F: FnOnce(&Result<(), SendError>) + Send + 'static,
    {
        self.spawn_send(bufs, move |result| {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(&result))) {
                Ok(()) => result,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(panic = %message, "Send callback panicked");
                    Err(SendError::Callback(message))
                }
            }
        })
    }

    /// Sends `bufs`, blocking the current thread until the call completes.
    ///
    /// Must not be called from an async context. The sender runtime must be a multi-thread runtime
    /// or be driven by another thread.
    pub fn execute<B: AsRef<[u8]>>(&self, bufs: &[B]) -> Result<(), SendError> {
        if Handle::try_current().is_ok() {
            return Err(SendError::Runtime(
                "execute cannot block within an async context".to_owned(),
            ));
        }
        self.inner.runtime.block_on(self.send(bufs))
    }

    /// Probes the API, reusing a recent result when there is one.
    pub async fn check(&self) -> CheckResult {
        if self.is_closed() {
            return CheckResult::failed(SendError::Closed);
        }
        let inner = &self.inner;
        inner
            .health
            .check(|| async move {
                let (method, body) =
                    probe_request(inner.settings.api_version, &inner.settings.project_id);
                CheckResult::from_probe(inner.transport.unary(method, body).await)
            })
            .await
    }

    /// Closes the sender. Calls in flight are left to complete. Closing twice has no effect.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            debug!("Closing sender");
            self.inner.transport.shutdown();
        }
    }

    fn prepare<B: AsRef<[u8]>>(&self, bufs: &[B]) -> Result<Option<EncodedRequest>, SendError> {
        if self.is_closed() {
            warn!(spans = bufs.len(), "Dropping spans sent after close");
            return Err(SendError::Closed);
        }
        if bufs.is_empty() {
            return Ok(None);
        }
        if let Some((index, buf)) = bufs
            .iter()
            .enumerate()
            .find(|(_, buf)| buf.as_ref().len() < TRACE_ID_LEN)
        {
            let len = buf.as_ref().len();
            warn!(index, len, spans = bufs.len(), "Rejecting buffer without trace id");
            return Err(SendError::ShortBuffer { index, len });
        }

        let max = self.message_max_bytes();
        self.with_encoder(|encoder| {
            let size = encoder.sizer().message_size_in_bytes(bufs);
            if size > max {
                warn!(size, max, spans = bufs.len(), "Rejecting oversized message");
                return Err(SendError::MessageTooLarge { size, max });
            }
            let request = encoder.encode(bufs);
            debug!(
                size,
                spans = request.span_count,
                traces = request.trace_count,
                method = %request.method,
                "Sending spans"
            );
            Ok(Some(request))
        })
    }

    fn with_encoder<R>(&self, f: impl FnOnce(&mut RequestEncoder) -> R) -> R {
        let pooled = self
            .inner
            .encoders
            .lock()
            .ok()
            .and_then(|mut encoders| encoders.pop());
        let mut encoder = pooled.unwrap_or_else(|| {
            RequestEncoder::new(
                self.inner.settings.api_version,
                &self.inner.settings.project_id,
            )
        });
        let result = f(&mut encoder);
        if let Ok(mut encoders) = self.inner.encoders.lock() {
            if encoders.is_empty() {
                encoders.push(encoder);
            }
        }
        result
    }

    fn spawn_send<F>(&self, bufs: Vec<Vec<u8>>, complete: F) -> SendHandle
    where
        F: FnOnce(Result<(), SendError>) -> Result<(), SendError> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let sender = self.clone();
        let task = self.inner.runtime.spawn(async move {
            let result = token
                .run_until_cancelled(sender.send(&bufs))
                .await
                .unwrap_or_else(|| {
                    debug!(spans = bufs.len(), "Send cancelled");
                    Err(SendError::Cancelled)
                });
            complete(result)
        });
        SendHandle { task, cancel }
    }
}

impl<T: Transport> Inner<T> {
    async fn call(&self, request: EncodedRequest) -> Result<(), SendError> {
        let method = request.method;
        match self.transport.unary(method, request.body).await {
            Ok(()) => {
                self.health.record(CheckResult::ok());
                Ok(())
            }
            Err(status)
                if status.code() == Code::Unavailable && self.closed.load(Ordering::Acquire) =>
            {
                debug!(method = %method, spans = request.span_count, "Sender closed during call");
                Err(SendError::Closed)
            }
            Err(status) => {
                error!(
                    code = ?status.code(),
                    status_message = status.message(),
                    method = %method,
                    spans = request.span_count,
                    "Failed to send spans"
                );
                // Rejected spans say nothing about the health of the API.
                if status.code() != Code::InvalidArgument {
                    self.health
                        .record(CheckResult::failed(SendError::Rpc(status.clone())));
                }
                Err(SendError::Rpc(status))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Completion of an enqueued send.
///
/// Resolves exactly once, with the outcome of the call or [`SendError::Cancelled`].
#[derive(Debug)]
pub struct SendHandle {
    task: JoinHandle<Result<(), SendError>>,
    cancel: CancellationToken,
}

impl SendHandle {
    /// Aborts the call if it has not completed yet.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Future for SendHandle {
    type Output = Result<(), SendError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(SendError::Cancelled),
            Err(e) => Err(SendError::Runtime(e.to_string())),
        })
    }
}
