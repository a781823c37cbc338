// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery of encoded request bodies over gRPC.

use crate::error::ConfigError;
use async_trait::async_trait;
use bytes::{Buf, BufMut, Bytes};
use http::uri::PathAndQuery;
use stackdriver_trace_protobuf::{BATCH_WRITE_SPANS_PATH, PATCH_TRACES_PATH};
use stackdriver_trace_translation::ApiVersion;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::metadata::{AsciiMetadataValue, MetadataMap};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::Status;
use tracing::debug;

/// Unary methods of the trace API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    /// Legacy `TraceService/PatchTraces`.
    PatchTraces,
    /// `TraceService/BatchWriteSpans`.
    BatchWriteSpans,
}

impl RpcMethod {
    pub fn for_version(api_version: ApiVersion) -> Self {
        match api_version {
            ApiVersion::V1 => RpcMethod::PatchTraces,
            ApiVersion::V2 => RpcMethod::BatchWriteSpans,
        }
    }

    /// gRPC path of the method.
    pub fn path(&self) -> &'static str {
        match self {
            RpcMethod::PatchTraces => PATCH_TRACES_PATH,
            RpcMethod::BatchWriteSpans => BATCH_WRITE_SPANS_PATH,
        }
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Sends pre-encoded request bodies.
///
/// The response of both trace API methods is empty, so only the status of the call is returned.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Performs one unary call.
    async fn unary(&self, method: RpcMethod, body: Bytes) -> Result<(), Status>;

    /// Releases the resources of the transport. Called once, when the sender is closed. Calls
    /// already in flight are not aborted.
    fn shutdown(&self) {}
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn unary(&self, method: RpcMethod, body: Bytes) -> Result<(), Status> {
        (**self).unary(method, body).await
    }

    fn shutdown(&self) {
        (**self).shutdown()
    }
}

/// Adds call metadata, typically credentials, to every request.
pub type RequestInterceptor = Arc<dyn Fn(&mut MetadataMap) -> Result<(), Status> + Send + Sync>;

/// Returns an interceptor setting a static `authorization: Bearer <token>` header.
pub fn bearer_token(token: &str) -> Result<RequestInterceptor, ConfigError> {
    let value: AsciiMetadataValue = format!("Bearer {token}")
        .parse()
        .map_err(|_| ConfigError::Transport("invalid bearer token".to_owned()))?;
    Ok(Arc::new(move |metadata: &mut MetadataMap| {
        metadata.insert("authorization", value.clone());
        Ok(())
    }))
}

/// [`Transport`] over a lazily connected tonic channel.
pub struct GrpcTransport {
    channel: Mutex<Option<Channel>>,
    timeout: Option<Duration>,
    interceptor: Option<RequestInterceptor>,
}

impl fmt::Debug for GrpcTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrpcTransport")
            .field("timeout", &self.timeout)
            .field("interceptor", &self.interceptor.is_some())
            .finish_non_exhaustive()
    }
}

impl GrpcTransport {
    /// Creates a transport to `api_host`, e.g. `https://cloudtrace.googleapis.com:443`.
    ///
    /// No connection is made until the first call. Must be called from within a tokio runtime.
    pub fn new(
        api_host: &str,
        timeout: Option<Duration>,
        interceptor: Option<RequestInterceptor>,
    ) -> Result<Self, ConfigError> {
        let invalid_uri = |reason: String| ConfigError::InvalidUri {
            host: api_host.to_owned(),
            reason,
        };
        let uri: http::Uri = api_host.parse().map_err(|e| invalid_uri(format!("{e}")))?;
        if uri.host().is_none() {
            return Err(invalid_uri("missing host".to_owned()));
        }

        let mut endpoint = Endpoint::from(uri.clone())
            .user_agent(concat!("stackdriver-trace-sender/", env!("CARGO_PKG_VERSION")))
            .map_err(|e| ConfigError::Transport(e.to_string()))?;
        if uri.scheme_str() == Some("https") {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_webpki_roots())
                .map_err(|e| ConfigError::Transport(e.to_string()))?;
        }

        debug!(api_host, "Creating lazy grpc channel");
        Ok(GrpcTransport {
            channel: Mutex::new(Some(endpoint.connect_lazy())),
            timeout,
            interceptor,
        })
    }

    fn channel(&self) -> Result<Channel, Status> {
        self.channel
            .lock()
            .map_err(|_| Status::internal("transport lock poisoned"))?
            .clone()
            .ok_or_else(|| Status::unavailable("transport is shut down"))
    }
}

#[async_trait]
impl Transport for GrpcTransport {
    async fn unary(&self, method: RpcMethod, body: Bytes) -> Result<(), Status> {
        let mut request = tonic::Request::new(body);
        if let Some(timeout) = self.timeout {
            request.set_timeout(timeout);
        }
        if let Some(interceptor) = &self.interceptor {
            interceptor(request.metadata_mut())?;
        }

        let mut grpc = tonic::client::Grpc::new(self.channel()?);
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("channel not ready: {e}")))?;
        grpc.unary::<Bytes, Bytes, _>(
            request,
            PathAndQuery::from_static(method.path()),
            RawBytesCodec,
        )
        .await?;
        Ok(())
    }

    fn shutdown(&self) {
        if let Ok(mut channel) = self.channel.lock() {
            channel.take();
        }
    }
}

/// Passes already encoded bodies through, and returns response bodies undecoded.
#[derive(Clone, Copy, Debug, Default)]
struct RawBytesCodec;

impl Codec for RawBytesCodec {
    type Encode = Bytes;
    type Decode = Bytes;
    type Encoder = RawBytesCodec;
    type Decoder = RawBytesCodec;

    fn encoder(&mut self) -> Self::Encoder {
        *self
    }

    fn decoder(&mut self) -> Self::Decoder {
        *self
    }
}

impl Encoder for RawBytesCodec {
    type Item = Bytes;
    type Error = Status;

    fn encode(&mut self, item: Bytes, dst: &mut EncodeBuf<'_>) -> Result<(), Status> {
        dst.put(item);
        Ok(())
    }
}

impl Decoder for RawBytesCodec {
    type Item = Bytes;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Bytes>, Status> {
        Ok(Some(src.copy_to_bytes(src.remaining())))
    }
}
