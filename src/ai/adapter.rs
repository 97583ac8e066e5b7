//! Capability adapter: routes one operation to one provider call.

use std::fmt;

use tracing::{debug, info, warn};

use crate::ai::error::{AiError, Result};
use crate::ai::operation::{Operation, OperationKind, OperationRequest};
use crate::ai::profile::profile_for;
use crate::ai::provider::{mask_key, AiSettings, Provider};
use crate::ai::transport::{Connector, HttpConnector, RawOutput, TransportRequest};

/// A resolved provider call, ready to send.
#[derive(Clone, PartialEq)]
pub struct Route {
    /// Operation being served.
    pub operation: OperationKind,
    /// Provider the call goes to.
    pub provider: Provider,
    /// Key for that provider.
    pub api_key: String,
    /// Composed request.
    pub request: TransportRequest,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("operation", &self.operation)
            .field("provider", &self.provider)
            .field("api_key", &mask_key(&self.api_key))
            .field("request", &self.request)
            .finish()
    }
}

/// Selects a provider profile and transport for each operation.
///
/// Makes exactly one attempt per call. Failures propagate unchanged and are
/// never retried on the other provider.
pub struct CapabilityAdapter<C: Connector = HttpConnector> {
    connector: C,
}

impl<C: Connector> CapabilityAdapter<C> {
    /// Creates an adapter that builds transports with `connector`.
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Resolves provider, credential and request without any I/O.
    ///
    /// Cover art always routes to the image-capable provider and fails with
    /// [`AiError::NoImageProvider`] when its key is absent. Every other
    /// operation routes to the active provider and needs its key.
    pub fn route(&self, request: &OperationRequest<'_>) -> Result<Route> {
        let operation = request.operation.kind();
        let (provider, api_key) = resolve_credential(operation, request.settings)?;

        let transport_request = profile_for(provider)
            .compose(&request.operation)
            .ok_or(AiError::UnsupportedMode {
                provider,
                mode: "image",
            })?;

        Ok(Route {
            operation,
            provider,
            api_key: api_key.to_string(),
            request: transport_request,
        })
    }

    /// Routes and sends one operation.
    pub async fn dispatch(&self, operation: Operation, settings: &AiSettings) -> Result<RawOutput> {
        let route = self.route(&OperationRequest::new(operation, settings))?;

        info!(
            operation = %route.operation,
            provider = %route.provider,
            mode = route.request.mode.name(),
            web_search = route.request.web_search,
            "Dispatching operation"
        );
        debug!(
            prompt_len = route.request.prompt.len(),
            system_len = route.request.system_instruction.as_ref().map_or(0, String::len),
            temperature = ?route.request.temperature,
            "Composed provider request"
        );

        let transport = self.connector.connect(route.provider, &route.api_key)?;
        transport.send(&route.request).await.inspect_err(|e| {
            warn!(
                operation = %route.operation,
                provider = %route.provider,
                error = %e,
                "Provider call failed"
            );
        })
    }
}

/// Picks the provider an operation runs on and its key.
fn resolve_credential(operation: OperationKind, settings: &AiSettings) -> Result<(Provider, &str)> {
    if operation == OperationKind::GenerateCoverImage {
        let provider = Provider::image_capable();
        let key = settings
            .credentials
            .get(provider)
            .ok_or(AiError::NoImageProvider)?;
        if settings.provider != provider {
            debug!(active = %settings.provider, "Cover image routed to {}", provider);
        }
        return Ok((provider, key));
    }
    let provider = settings.provider;
    let key = settings.credentials.require(provider)?;
    Ok((provider, key))
}
