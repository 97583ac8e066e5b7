//! CLI interface for songcraft.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::ai::{AiError, AiSettings, Provider, Songwriter};
use crate::library::Library;
use crate::utils::{resolve_ai_settings, resolve_endpoints, Settings};

pub mod config;
pub mod lyrics;
pub mod release;
pub mod templates;
pub mod tips;

/// songcraft: AI-assisted worship songwriting for Suno.
#[derive(Parser)]
#[command(name = "songcraft")]
#[command(about = "AI-assisted worship songwriting for Suno", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Options shared by every command.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Provider to use for this run (gemini or zhipu), overriding SONGCRAFT_PROVIDER.
    #[arg(long, global = true)]
    pub provider: Option<Provider>,

    /// Prints structured results as JSON instead of YAML.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Scores lyrics against the five pillars and checks structure tags.
    Analyze(lyrics::AnalyzeCommand),
    /// Writes a complete song from a theme.
    Generate(lyrics::GenerateCommand),
    /// Rewrites lyrics applying one or more suggestions.
    Optimize(lyrics::OptimizeCommand),
    /// Produces release assets: caption, stylized title and cover art.
    Assets(release::AssetsCommand),
    /// Answers a question about Suno tags, metatags and style prompts.
    Tips(tips::TipsCommand),
    /// Lists or shows the example lyrics.
    Templates(templates::TemplatesCommand),
    /// Prints the structure-tag cheat sheet.
    Tags(templates::TagsCommand),
    /// Configuration information.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        let global = self.global;
        match self.command {
            Commands::Analyze(cmd) => cmd.execute(&global).await,
            Commands::Generate(cmd) => cmd.execute(&global).await,
            Commands::Optimize(cmd) => cmd.execute(&global).await,
            Commands::Assets(cmd) => cmd.execute(&global).await,
            Commands::Tips(cmd) => cmd.execute(&global).await,
            Commands::Templates(cmd) => cmd.execute(&global),
            Commands::Tags(cmd) => cmd.execute(&global),
            Commands::Config(cmd) => cmd.execute(&global),
        }
    }
}

/// Resolved settings plus a ready songwriter for one command run.
pub struct Session {
    /// Active provider and credentials.
    pub settings: AiSettings,
    /// Operation facade.
    pub writer: Songwriter,
}

impl Session {
    /// Resolves configuration and builds the HTTP songwriter.
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        let file_settings = Settings::load()?;
        let lookup = |key: &str| file_settings.get_env_var(key);
        let settings = resolve_ai_settings(lookup, global.provider)?;
        let endpoints = resolve_endpoints(lookup)?;
        let writer = Songwriter::new(endpoints).context("Failed to build HTTP client")?;
        Ok(Self { settings, writer })
    }

    /// The active provider.
    pub fn provider(&self) -> Provider {
        self.settings.provider
    }
}

/// Notice naming the provider whose request failed.
pub(crate) fn provider_notice(provider: Provider) -> String {
    format!("{provider} request failed. Check your {provider} API key and settings.")
}

/// Wraps a core failure with a notice for the provider the error names,
/// or `fallback` when the error names none.
pub(crate) fn provider_failure(fallback: Provider) -> impl FnOnce(AiError) -> anyhow::Error {
    move |err| {
        let provider = err.provider().unwrap_or(fallback);
        anyhow::Error::new(err).context(provider_notice(provider))
    }
}

/// Where lyric text comes from.
#[derive(Args, Clone, Debug, Default)]
pub struct LyricsSource {
    /// Reads lyrics from this file instead of stdin.
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    /// Uses an example from `songcraft templates list` (id or number).
    #[arg(long, conflicts_with = "file")]
    pub template: Option<String>,
}

impl LyricsSource {
    /// Reads the lyric text.
    pub fn read(&self) -> Result<String> {
        let text = if let Some(path) = &self.file {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read lyrics file: {}", path.display()))?
        } else if let Some(key) = &self.template {
            let library = Library::load()?;
            library
                .find(key)
                .map(|example| example.content.clone())
                .with_context(|| format!("No example named '{key}'"))?
        } else {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read lyrics from stdin")?;
            buffer
        };

        if text.trim().is_empty() {
            bail!("No lyrics provided. Use --file, --template or pipe lyrics on stdin.");
        }
        Ok(text)
    }
}

/// Prints a structured value as YAML, or JSON when requested.
pub(crate) fn print_structured<T: Serialize>(value: &T, global: &GlobalArgs) -> Result<()> {
    let rendered = if global.json {
        serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")?
    } else {
        serde_yaml::to_string(value).context("Failed to serialize output as YAML")?
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["songcraft", "tags", "--provider", "glm", "--json"]).unwrap();
        assert_eq!(cli.global.provider, Some(Provider::Zhipu));
        assert!(cli.global.json);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(Cli::try_parse_from(["songcraft", "--provider", "openai", "tags"]).is_err());
    }

    #[test]
    fn failure_notice_names_the_provider_from_the_error() {
        let err = provider_failure(Provider::Zhipu)(AiError::ApiRequestFailed {
            provider: Provider::Gemini,
            status: 403,
            message: "forbidden".to_string(),
        });
        assert_eq!(err.to_string(), provider_notice(Provider::Gemini));
        assert!(format!("{err:#}").contains("forbidden"));

        let err = provider_failure(Provider::Zhipu)(AiError::NoImageProvider);
        assert_eq!(err.to_string(), provider_notice(Provider::Gemini));
    }

    #[test]
    fn failure_notice_falls_back_when_the_error_names_no_provider() {
        let err = provider_failure(Provider::Gemini)(AiError::NoImageProduced);
        assert_eq!(err.to_string(), provider_notice(Provider::Gemini));
    }

    #[test]
    fn lyrics_from_file_and_template() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("song.txt");
        fs::write(&path, "[Intro]\n[Verse]\n").unwrap();

        let source = LyricsSource {
            file: Some(path),
            template: None,
        };
        assert_eq!(source.read().unwrap(), "[Intro]\n[Verse]\n");

        let source = LyricsSource {
            file: None,
            template: Some("river-of-life".to_string()),
        };
        assert!(source.read().unwrap().starts_with("[Intro]"));
    }

    #[test]
    fn blank_lyrics_file_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("blank.txt");
        fs::write(&path, "  \n").unwrap();
        let source = LyricsSource {
            file: Some(path),
            template: None,
        };
        assert!(source.read().is_err());
    }
}
