//! Provider-agnostic AI core for songwriting.
//!
//! [`Songwriter`] exposes the operations. Each call is routed by the
//! [`CapabilityAdapter`] to a [`ProviderProfile`], sent through a
//! [`Transport`], and the raw output is turned into a typed result by the
//! [`normalize`] functions.

pub mod adapter;
pub mod error;
pub mod gemini;
pub mod normalize;
pub mod operation;
pub mod profile;
pub mod prompts;
pub mod provider;
pub mod schema;
pub mod songwriter;
pub mod transport;
pub mod types;
pub mod zhipu;

#[cfg(test)]
pub(crate) mod test_utils;

pub use adapter::{CapabilityAdapter, Route};
pub use error::{AiError, ErrorKind, Result};
pub use operation::{Operation, OperationKind, OperationRequest};
pub use profile::{profile_for, GeminiProfile, ProviderProfile, ZhipuProfile};
pub use provider::{AiSettings, Credentials, Provider};
pub use schema::{render, Contract, RenderedSchema};
pub use songwriter::Songwriter;
pub use transport::{Connector, Endpoints, HttpConnector, RawOutput, Transport, TransportRequest};
pub use types::{
    AnalysisResult, CoverImage, GeneratedSong, Scores, SongAssets, SuggestedSettings,
    SunoTagsCheck, VocalGender,
};
