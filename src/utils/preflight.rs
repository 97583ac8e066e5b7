//! Preflight validation checks for early failure detection
//!
//! Resolves provider choice, credentials and endpoints from the environment
//! (with the settings-file fallback) before any request is made, so commands
//! fail fast with clear messages.

use anyhow::{bail, Context, Result};
use url::Url;

use vars::*;

use crate::ai::transport::Endpoints;
use crate::ai::{AiSettings, Provider};

/// Names of the configuration variables.
pub mod vars {
    /// Active provider, `gemini` or `zhipu`.
    pub const PROVIDER: &str = "SONGCRAFT_PROVIDER";
    /// Gemini key variables, in lookup order.
    pub const GEMINI_KEYS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];
    /// Zhipu key variable.
    pub const ZHIPU_KEY: &str = "ZHIPU_API_KEY";
    /// Gemini REST base URL override.
    pub const GEMINI_API_BASE: &str = "GEMINI_API_BASE";
    /// Gemini text model override.
    pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
    /// Gemini image model override.
    pub const GEMINI_IMAGE_MODEL: &str = "GEMINI_IMAGE_MODEL";
    /// Zhipu chat-completions URL override.
    pub const ZHIPU_API_URL: &str = "ZHIPU_API_URL";
    /// Zhipu model override.
    pub const ZHIPU_MODEL: &str = "ZHIPU_MODEL";
}

/// Returns the first variable in `keys` that `lookup` finds.
fn first_of<L>(lookup: &L, keys: &[&str]) -> Option<String>
where
    L: Fn(&str) -> Option<String>,
{
    keys.iter().find_map(|&key| lookup(key))
}

/// Resolves the active provider and both credentials.
///
/// `provider_override` wins over the configured provider. Credentials are
/// loaded for both providers whichever is active, since cover art always needs
/// the Gemini key.
pub fn resolve_ai_settings<L>(lookup: L, provider_override: Option<Provider>) -> Result<AiSettings>
where
    L: Fn(&str) -> Option<String>,
{
    let provider = match provider_override {
        Some(provider) => provider,
        None => match lookup(PROVIDER) {
            Some(value) => value
                .parse()
                .with_context(|| format!("Invalid {PROVIDER} setting"))?,
            None => Provider::Gemini,
        },
    };

    let mut settings = AiSettings::new(provider);
    settings.credentials.gemini_key = first_of(&lookup, GEMINI_KEYS);
    settings.credentials.zhipu_key = lookup(ZHIPU_KEY);
    Ok(settings)
}

/// Resolves endpoint and model overrides, validating URLs.
pub fn resolve_endpoints<L>(lookup: L) -> Result<Endpoints>
where
    L: Fn(&str) -> Option<String>,
{
    let mut endpoints = Endpoints::default();
    if let Some(base) = lookup(GEMINI_API_BASE) {
        endpoints.gemini_base_url = validate_url(GEMINI_API_BASE, &base)?;
    }
    if let Some(url) = lookup(ZHIPU_API_URL) {
        endpoints.zhipu_url = validate_url(ZHIPU_API_URL, &url)?;
    }
    if let Some(model) = lookup(GEMINI_MODEL) {
        endpoints.gemini_text_model = model;
    }
    if let Some(model) = lookup(GEMINI_IMAGE_MODEL) {
        endpoints.gemini_image_model = model;
    }
    if let Some(model) = lookup(ZHIPU_MODEL) {
        endpoints.zhipu_model = model;
    }
    Ok(endpoints)
}

/// Checks that `value` is an absolute http(s) URL.
fn validate_url(key: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    let url = Url::parse(trimmed).with_context(|| format!("{key} is not a valid URL: {trimmed}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{key} must use http or https, got '{}'", url.scheme());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Validates the active provider's credential before processing.
pub fn check_ai_credentials(settings: &AiSettings) -> Result<()> {
    if settings.credentials.get(settings.provider).is_some() {
        return Ok(());
    }
    bail!("{}", missing_key_help(settings.provider))
}

/// Validates the image-capable provider's credential before cover art.
pub fn check_image_credentials(settings: &AiSettings) -> Result<()> {
    let provider = Provider::image_capable();
    if settings.credentials.get(provider).is_some() {
        return Ok(());
    }
    bail!(
        "Cover art is only available through {provider}.\n{}",
        missing_key_help(provider)
    )
}

/// Explains which variables supply `provider`'s key.
fn missing_key_help(provider: Provider) -> String {
    let keys: &[&str] = match provider {
        Provider::Gemini => GEMINI_KEYS,
        Provider::Zhipu => &[ZHIPU_KEY],
    };
    let list: Vec<String> = keys.iter().map(|key| format!(" - {key}")).collect();
    format!(
        "{provider} API key not found.\n\
         Set one of these environment variables (or add it to ~/.songcraft/settings.json):\n{}",
        list.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_gemini() {
        let settings = resolve_ai_settings(lookup(&[]), None).unwrap();
        assert_eq!(settings.provider, Provider::Gemini);
        assert!(settings.credentials.gemini_key.is_none());
        assert!(settings.credentials.zhipu_key.is_none());
    }

    #[test]
    fn reads_provider_and_both_keys() {
        let settings = resolve_ai_settings(
            lookup(&[
                ("SONGCRAFT_PROVIDER", "GLM"),
                ("GOOGLE_API_KEY", "google-key"),
                ("ZHIPU_API_KEY", "zhipu-key"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(settings.provider, Provider::Zhipu);
        assert_eq!(settings.credentials.get(Provider::Gemini), Some("google-key"));
        assert_eq!(settings.credentials.get(Provider::Zhipu), Some("zhipu-key"));
    }

    #[test]
    fn gemini_key_takes_precedence_over_google_key() {
        let settings = resolve_ai_settings(
            lookup(&[("GEMINI_API_KEY", "gemini"), ("GOOGLE_API_KEY", "google")]),
            None,
        )
        .unwrap();
        assert_eq!(settings.credentials.get(Provider::Gemini), Some("gemini"));
    }

    #[test]
    fn override_beats_configured_provider() {
        let settings = resolve_ai_settings(
            lookup(&[("SONGCRAFT_PROVIDER", "zhipu")]),
            Some(Provider::Gemini),
        )
        .unwrap();
        assert_eq!(settings.provider, Provider::Gemini);
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let err = resolve_ai_settings(lookup(&[("SONGCRAFT_PROVIDER", "openai")]), None)
            .unwrap_err();
        assert!(format!("{err:#}").contains("unknown provider 'openai'"));
    }

    #[test]
    fn endpoint_overrides_are_applied() {
        let endpoints = resolve_endpoints(lookup(&[
            ("GEMINI_API_BASE", "http://localhost:8080/v1beta/"),
            ("ZHIPU_MODEL", "glm-4-flash"),
        ]))
        .unwrap();
        assert_eq!(endpoints.gemini_base_url, "http://localhost:8080/v1beta");
        assert_eq!(endpoints.zhipu_model, "glm-4-flash");
        assert_eq!(endpoints.gemini_text_model, "gemini-2.5-flash");
    }

    #[test]
    fn invalid_urls_are_rejected() {
        assert!(resolve_endpoints(lookup(&[("ZHIPU_API_URL", "not a url")])).is_err());
        let err = resolve_endpoints(lookup(&[("GEMINI_API_BASE", "ftp://example.com")]))
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn credential_checks_name_the_variables() {
        let settings = AiSettings::new(Provider::Zhipu).with_key(Provider::Zhipu, "zk");
        assert!(check_ai_credentials(&settings).is_ok());

        let err = check_image_credentials(&settings).unwrap_err().to_string();
        assert!(err.contains("GEMINI_API_KEY"));
        assert!(err.contains("GOOGLE_API_KEY"));

        let err = check_ai_credentials(&AiSettings::new(Provider::Zhipu))
            .unwrap_err()
            .to_string();
        assert!(err.contains("Zhipu GLM API key not found"));
        assert!(err.contains("ZHIPU_API_KEY"));
    }
}
