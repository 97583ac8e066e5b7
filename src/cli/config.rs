//! Configuration-related CLI commands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::ai::provider::mask_key;
use crate::ai::{AiSettings, Endpoints, Provider};
use crate::cli::{print_structured, GlobalArgs};
use crate::utils::{resolve_ai_settings, resolve_endpoints, Settings};

/// Configuration operations.
#[derive(Parser)]
pub struct ConfigCommand {
    /// Configuration subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Shows the resolved provider, credentials and endpoints.
    Show(ShowCommand),
}

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {}

/// Resolved configuration as printed by `config show`.
#[derive(Serialize, Debug)]
struct ConfigReport {
    settings_file: String,
    provider: Provider,
    credentials: CredentialReport,
    capabilities: CapabilityReport,
    endpoints: EndpointReport,
}

#[derive(Serialize, Debug)]
struct CredentialReport {
    gemini: Option<String>,
    zhipu: Option<String>,
}

#[derive(Serialize, Debug)]
struct CapabilityReport {
    native_schema: bool,
    web_search: bool,
    cover_art: bool,
}

#[derive(Serialize, Debug)]
struct EndpointReport {
    gemini_base_url: String,
    gemini_model: String,
    gemini_image_model: String,
    zhipu_url: String,
    zhipu_model: String,
}

impl ConfigReport {
    fn new(settings_file: String, settings: &AiSettings, endpoints: Endpoints) -> Self {
        let provider = settings.provider;
        let image_provider = Provider::image_capable();
        Self {
            settings_file,
            provider,
            credentials: CredentialReport {
                gemini: settings.credentials.get(Provider::Gemini).map(mask_key),
                zhipu: settings.credentials.get(Provider::Zhipu).map(mask_key),
            },
            capabilities: CapabilityReport {
                native_schema: provider.supports_native_schema(),
                web_search: provider.supports_web_search(),
                cover_art: settings.credentials.get(image_provider).is_some(),
            },
            endpoints: EndpointReport {
                gemini_base_url: endpoints.gemini_base_url,
                gemini_model: endpoints.gemini_text_model,
                gemini_image_model: endpoints.gemini_image_model,
                zhipu_url: endpoints.zhipu_url,
                zhipu_model: endpoints.zhipu_model,
            },
        }
    }
}

impl ConfigCommand {
    /// Executes the config command.
    pub fn execute(self, global: &GlobalArgs) -> Result<()> {
        match self.command {
            ConfigSubcommands::Show(show_cmd) => show_cmd.execute(global),
        }
    }
}

impl ShowCommand {
    /// Executes the show command.
    pub fn execute(self, global: &GlobalArgs) -> Result<()> {
        let settings_path = Settings::get_settings_path()?;
        let file_settings = Settings::load_from_path(&settings_path)?;
        let lookup = |key: &str| file_settings.get_env_var(key);

        let settings = resolve_ai_settings(lookup, global.provider)?;
        let endpoints = resolve_endpoints(lookup)?;
        let report = ConfigReport::new(settings_path.display().to_string(), &settings, endpoints);
        print_structured(&report, global)
    }
}
