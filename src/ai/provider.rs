//! Provider selection and caller-owned credentials.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::error::{AiError, Result};

/// The two interchangeable model backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Gemini: native structured output, image output, search tool.
    Gemini,
    /// Zhipu GLM chat completions: text only, optional JSON-object mode.
    Zhipu,
}

impl Provider {
    /// Every provider, in display order.
    pub const ALL: [Self; 2] = [Self::Gemini, Self::Zhipu];

    /// Short identifier used in configuration files and CLI flags.
    pub fn id(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Zhipu => "zhipu",
        }
    }

    /// Whether the provider enforces a response schema server-side.
    pub fn supports_native_schema(self) -> bool {
        matches!(self, Self::Gemini)
    }

    /// Whether the provider can return generated images.
    pub fn supports_images(self) -> bool {
        matches!(self, Self::Gemini)
    }

    /// Whether the provider exposes a live web-search tool.
    pub fn supports_web_search(self) -> bool {
        matches!(self, Self::Gemini)
    }

    /// The provider cover-art requests are always routed to.
    pub const fn image_capable() -> Self {
        Self::Gemini
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "Gemini"),
            Self::Zhipu => write!(f, "Zhipu GLM"),
        }
    }
}

/// Error returned when a provider name is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown provider '{0}' (expected 'gemini' or 'zhipu')")]
pub struct ParseProviderError(String);

impl FromStr for Provider {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "zhipu" | "glm" | "bigmodel" => Ok(Self::Zhipu),
            _ => Err(ParseProviderError(s.to_string())),
        }
    }
}

/// One opaque API key per provider, either of which may be absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Gemini API key.
    pub gemini_key: Option<String>,
    /// Zhipu API key.
    pub zhipu_key: Option<String>,
}

impl Credentials {
    /// Returns the key for `provider`, treating blank strings as absent.
    pub fn get(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::Gemini => self.gemini_key.as_deref(),
            Provider::Zhipu => self.zhipu_key.as_deref(),
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }

    /// Returns the key for `provider` or a precondition error.
    pub fn require(&self, provider: Provider) -> Result<&str> {
        self.get(provider)
            .ok_or(AiError::MissingCredential { provider })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("gemini_key", &self.get(Provider::Gemini).map(mask_key))
            .field("zhipu_key", &self.get(Provider::Zhipu).map(mask_key))
            .finish()
    }
}

/// Masks all but the last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

/// Caller-supplied configuration passed into every operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AiSettings {
    /// The active provider.
    pub provider: Provider,
    /// Keys for both providers.
    pub credentials: Credentials,
}

impl AiSettings {
    /// Creates settings for `provider` with no credentials.
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            credentials: Credentials::default(),
        }
    }

    /// Sets the key for `provider`.
    #[must_use]
    pub fn with_key(mut self, provider: Provider, key: impl Into<String>) -> Self {
        let key = Some(key.into());
        match provider {
            Provider::Gemini => self.credentials.gemini_key = key,
            Provider::Zhipu => self.credentials.zhipu_key = key,
        }
        self
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self::new(Provider::Gemini)
    }
}
