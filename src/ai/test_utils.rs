//! Shared test utilities for the `ai` module.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use crate::ai::error::{AiError, Result};
use crate::ai::provider::Provider;
use crate::ai::transport::{Connector, RawOutput, Transport, TransportRequest};

type ResponseQueue = Arc<Mutex<VecDeque<Result<RawOutput>>>>;
type RequestLog = Arc<Mutex<Vec<(Provider, TransportRequest)>>>;
type ConnectLog = Arc<Mutex<Vec<(Provider, String)>>>;

/// Mock connector with a pre-programmed queue of transport outputs.
///
/// Outputs are returned in FIFO order across every transport the connector
/// hands out. When the queue is exhausted, further sends fail with a network
/// error.
///
/// Every `connect` records the `(provider, api_key)` pair and every `send`
/// records the `(provider, request)` pair. Use [`handle`](Self::handle) to
/// inspect both after the connector has been moved into a
/// [`Songwriter`](crate::ai::Songwriter).
pub(crate) struct MockConnector {
    responses: ResponseQueue,
    requests: RequestLog,
    connects: ConnectLog,
}

impl MockConnector {
    /// Creates a connector whose transports return `responses` in order.
    pub(crate) fn new(responses: Vec<Result<RawOutput>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
            connects: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a connector that answers every call with the given texts.
    pub(crate) fn with_texts(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|text| Ok(RawOutput::Text((*text).to_string())))
                .collect(),
        )
    }

    /// Returns a shared handle onto the recorded calls.
    pub(crate) fn handle(&self) -> MockHandle {
        MockHandle {
            responses: self.responses.clone(),
            requests: self.requests.clone(),
            connects: self.connects.clone(),
        }
    }
}

/// Shared handle to a mock connector's logs and queue.
pub(crate) struct MockHandle {
    responses: ResponseQueue,
    requests: RequestLog,
    connects: ConnectLog,
}

impl MockHandle {
    /// Returns every `(provider, api_key)` pair passed to `connect`.
    pub(crate) fn connects(&self) -> Vec<(Provider, String)> {
        self.connects.lock().unwrap().clone()
    }

    /// Returns every `(provider, request)` pair that was sent.
    pub(crate) fn requests(&self) -> Vec<(Provider, TransportRequest)> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the only request sent, panicking if there was not exactly one.
    pub(crate) fn single_request(&self) -> (Provider, TransportRequest) {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }

    /// Returns the number of unconsumed outputs.
    pub(crate) fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl Connector for MockConnector {
    fn connect(&self, provider: Provider, api_key: &str) -> Result<Box<dyn Transport>> {
        self.connects
            .lock()
            .unwrap()
            .push((provider, api_key.to_string()));
        Ok(Box::new(MockTransport {
            provider,
            responses: self.responses.clone(),
            requests: self.requests.clone(),
        }))
    }
}

struct MockTransport {
    provider: Provider,
    responses: ResponseQueue,
    requests: RequestLog,
}

impl Transport for MockTransport {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn send<'a>(
        &'a self,
        request: &'a TransportRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawOutput>> + Send + 'a>> {
        Box::pin(async move {
            self.requests
                .lock()
                .unwrap()
                .push((self.provider, request.clone()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(AiError::Network {
                        provider: self.provider,
                        message: "no more mock responses".to_string(),
                    })
                })
        })
    }
}
