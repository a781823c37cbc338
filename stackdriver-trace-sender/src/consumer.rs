// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Storage front accepting decoded zipkin spans.

use crate::config::StackdriverConfig;
use crate::error::{ConfigError, SendError};
use crate::health::CheckResult;
use crate::sender::{SendHandle, Sender};
use crate::transport::{GrpcTransport, Transport};
use stackdriver_trace_translation::{Span, SpanEncoder};
use tracing::debug;

/// Decodes a zipkin v2 JSON list of spans.
pub fn decode_spans(json: &[u8]) -> Result<Vec<Span>, serde_json::Error> {
    serde_json::from_slice(json)
}

/// Encodes zipkin spans with the configured encoder and sends each accepted list in one call.
#[derive(Debug)]
pub struct SpanConsumer<T: Transport = GrpcTransport> {
    encoder: SpanEncoder,
    sender: Sender<T>,
}

impl SpanConsumer {
    /// Builds a consumer over a gRPC channel. Must be called from within a tokio runtime.
    pub fn from_config(config: &StackdriverConfig) -> Result<Self, ConfigError> {
        let encoder = config.span_encoder()?;
        let sender = config.sender_builder().build()?;
        Ok(SpanConsumer::new(encoder, sender))
    }
}

impl<T: Transport> SpanConsumer<T> {
    pub fn new(encoder: SpanEncoder, sender: Sender<T>) -> Self {
        SpanConsumer { encoder, sender }
    }

    pub fn encoder(&self) -> &SpanEncoder {
        &self.encoder
    }

    pub fn sender(&self) -> &Sender<T> {
        &self.sender
    }

    /// Sends `spans` in one request.
    pub async fn accept(&self, spans: &[Span]) -> Result<(), SendError> {
        let bufs = self.encode(spans);
        self.sender.send(&bufs).await
    }

    /// Sends `spans` on the sender runtime.
    pub fn enqueue(&self, spans: &[Span]) -> SendHandle {
        self.sender.enqueue(self.encode(spans))
    }

    pub async fn check(&self) -> CheckResult {
        self.sender.check().await
    }

    pub fn close(&self) {
        self.sender.close();
    }

    fn encode(&self, spans: &[Span]) -> Vec<Vec<u8>> {
        let bufs = self.encoder.encode_spans(spans);
        debug!(spans = spans.len(), buffers = bufs.len(), "Encoded spans");
        bufs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SenderBuilder;
    use crate::transport::RpcMethod;
    use async_trait::async_trait;
    use bytes::Bytes;
    use prost::Message;
    use stackdriver_trace_protobuf::v1;
    use stackdriver_trace_translation::{ApiVersion, Kind};
    use std::sync::{Arc, Mutex};
    use tonic::Status;

    #[derive(Default)]
    struct RecordingTransport {
        bodies: Mutex<Vec<(RpcMethod, Bytes)>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn unary(&self, method: RpcMethod, body: Bytes) -> Result<(), Status> {
            self.bodies.lock().unwrap().push((method, body));
            Ok(())
        }
    }

    const SPANS: &str = r#"[
        {
            "traceId": "86154a4ba6e91385",
            "id": "4d1e00c0db9010db",
            "kind": "CLIENT",
            "name": "get",
            "timestamp": 1472470996199000,
            "duration": 207000,
            "localEndpoint": { "serviceName": "frontend", "ipv4": "127.0.0.1" },
            "tags": { "http.path": "/api" }
        },
        {
            "traceId": "86154a4ba6e91385",
            "parentId": "4d1e00c0db9010db",
            "id": "5b4185666d50f68b",
            "kind": "SERVER",
            "name": "get",
            "timestamp": 1472470996250000,
            "duration": 100000,
            "localEndpoint": { "serviceName": "backend" }
        }
    ]"#;

    #[test]
    fn test_decode_spans() {
        let spans = decode_spans(SPANS.as_bytes()).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].kind, Some(Kind::Client));
        assert_eq!(spans[1].parent_id.as_deref(), Some("4d1e00c0db9010db"));
        assert!(decode_spans(b"{").is_err());
    }

    #[tokio::test]
    async fn test_accept_sends_one_request() {
        let config = StackdriverConfig {
            project_id: Some("demo".to_owned()),
            api_version: ApiVersion::V1,
            ..Default::default()
        };
        let transport = Arc::new(RecordingTransport::default());
        let sender = config
            .sender_builder()
            .build_with_transport(transport.clone())
            .unwrap();
        let consumer = SpanConsumer::new(config.span_encoder().unwrap(), sender);

        let spans = decode_spans(SPANS.as_bytes()).unwrap();
        consumer.accept(&spans).await.unwrap();

        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        let (method, body) = &bodies[0];
        assert_eq!(*method, RpcMethod::PatchTraces);
        let request = v1::PatchTracesRequest::decode(body.clone()).unwrap();
        assert_eq!(request.project_id, "demo");
        let traces = request.traces.unwrap().traces;
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].trace_id, "000000000000000086154a4ba6e91385");
        assert_eq!(traces[0].spans.len(), 2);
    }

    #[tokio::test]
    async fn test_closed_consumer_rejects_spans() {
        let transport = Arc::new(RecordingTransport::default());
        let sender = SenderBuilder::new()
            .project_id("demo")
            .build_with_transport(transport.clone())
            .unwrap();
        let encoder = StackdriverConfig {
            project_id: Some("demo".to_owned()),
            ..Default::default()
        }
        .span_encoder()
        .unwrap();
        let consumer = SpanConsumer::new(encoder, sender);
        assert_eq!(consumer.encoder().api_version(), ApiVersion::V2);

        consumer.close();
        let spans = decode_spans(SPANS.as_bytes()).unwrap();
        assert!(matches!(
            consumer.enqueue(&spans).await,
            Err(SendError::Closed)
        ));
        assert!(transport.bodies.lock().unwrap().is_empty());
    }
}
