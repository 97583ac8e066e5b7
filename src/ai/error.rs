//! Error taxonomy for the AI adapter layer.

use thiserror::Error;

use crate::ai::operation::OperationKind;
use crate::ai::provider::Provider;
use crate::ai::schema::Contract;

/// Result alias used throughout the adapter layer.
pub type Result<T, E = AiError> = std::result::Result<T, E>;

/// Coarse classification of an [`AiError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration is missing; the caller must fix it before retrying.
    Precondition,
    /// The provider call itself failed.
    Transport,
    /// A response arrived but did not match the expected contract.
    Normalization,
    /// The provider reported success but returned nothing usable.
    EmptyResult,
}

/// Errors raised by the transports, the adapter and the normalizer.
#[derive(Error, Debug)]
pub enum AiError {
    /// No credential configured for the provider the operation routes to.
    #[error("{provider} API key is not configured")]
    MissingCredential {
        /// Provider the operation was routed to.
        provider: Provider,
    },

    /// Cover art needs the image-capable provider and its key is absent.
    #[error("cover image generation requires a {} API key, none is configured", Provider::image_capable())]
    NoImageProvider,

    /// Non-success HTTP status from a provider.
    #[error("{provider} API request failed (HTTP {status}): {message}")]
    ApiRequestFailed {
        /// Provider that rejected the request.
        provider: Provider,
        /// HTTP status code.
        status: u16,
        /// Provider-reported message.
        message: String,
    },

    /// The request never produced an HTTP response.
    #[error("network error talking to {provider}: {message}")]
    Network {
        /// Provider being called.
        provider: Provider,
        /// Underlying transport message.
        message: String,
    },

    /// The transport cannot honour the requested response mode.
    #[error("{provider} does not support {mode} responses")]
    UnsupportedMode {
        /// Provider being called.
        provider: Provider,
        /// Name of the unsupported mode.
        mode: &'static str,
    },

    /// The provider's response envelope could not be decoded.
    #[error("invalid response format from {provider}: {message}")]
    InvalidResponse {
        /// Provider that answered.
        provider: Provider,
        /// Decoder message.
        message: String,
    },

    /// The payload did not parse into the expected contract.
    #[error("failed to parse {contract} result: {message}")]
    MalformedPayload {
        /// Contract the payload was parsed against.
        contract: Contract,
        /// Parser message.
        message: String,
    },

    /// The provider returned no text.
    #[error("{operation} returned an empty response")]
    EmptyResponse {
        /// Operation that produced nothing.
        operation: OperationKind,
    },

    /// An image request succeeded without an inline image part.
    #[error("no image was produced")]
    NoImageProduced,
}

impl AiError {
    /// Classifies the error into one of the four failure kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential { .. } | Self::NoImageProvider => ErrorKind::Precondition,
            Self::ApiRequestFailed { .. } | Self::Network { .. } | Self::UnsupportedMode { .. } => {
                ErrorKind::Transport
            }
            Self::InvalidResponse { .. } | Self::MalformedPayload { .. } => {
                ErrorKind::Normalization
            }
            Self::EmptyResponse { .. } | Self::NoImageProduced => ErrorKind::EmptyResult,
        }
    }

    /// Returns true when retrying the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Returns the provider named by the error, if any.
    pub fn provider(&self) -> Option<Provider> {
        match self {
            Self::MissingCredential { provider }
            | Self::ApiRequestFailed { provider, .. }
            | Self::Network { provider, .. }
            | Self::UnsupportedMode { provider, .. }
            | Self::InvalidResponse { provider, .. } => Some(*provider),
            Self::NoImageProvider => Some(Provider::image_capable()),
            _ => None,
        }
    }
}
