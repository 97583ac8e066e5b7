//! Lyric commands: analyze, generate, optimize.

use anyhow::{bail, Result};
use clap::Parser;
use serde::Serialize;

use crate::ai::{AnalysisResult, GeneratedSong};
use crate::cli::{print_structured, provider_failure, GlobalArgs, LyricsSource, Session};
use crate::utils::check_ai_credentials;

/// Analyze command options.
#[derive(Parser)]
pub struct AnalyzeCommand {
    /// Lyric input.
    #[command(flatten)]
    pub source: LyricsSource,
}

impl AnalyzeCommand {
    /// Executes the analyze command.
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let lyrics = self.source.read()?;
        let session = Session::open(global)?;
        check_ai_credentials(&session.settings)?;

        let analysis = session
            .writer
            .analyze(&session.settings, &lyrics)
            .await
            .map_err(provider_failure(session.provider()))?;
        print_structured(&analysis, global)
    }
}

/// Generate command options.
#[derive(Parser)]
pub struct GenerateCommand {
    /// Theme or story of the song.
    #[arg(long, short)]
    pub theme: String,

    /// Style reference.
    #[arg(long, short, default_value = "Modern Worship")]
    pub style: String,

    /// Also scores the generated lyrics.
    #[arg(long)]
    pub analyze: bool,
}

/// A generated song with its analysis.
#[derive(Serialize)]
struct ReviewedSong {
    song: GeneratedSong,
    analysis: AnalysisResult,
}

impl GenerateCommand {
    /// Executes the generate command.
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        if self.theme.trim().is_empty() {
            bail!("--theme must not be empty");
        }
        let session = Session::open(global)?;
        check_ai_credentials(&session.settings)?;

        if self.analyze {
            let (song, analysis) = session
                .writer
                .generate_and_analyze(&session.settings, &self.theme, &self.style)
                .await
                .map_err(provider_failure(session.provider()))?;
            return print_structured(&ReviewedSong { song, analysis }, global);
        }

        let song = session
            .writer
            .generate(&session.settings, &self.theme, &self.style)
            .await
            .map_err(provider_failure(session.provider()))?;
        print_structured(&song, global)
    }
}

/// Optimize command options.
#[derive(Parser)]
pub struct OptimizeCommand {
    /// Lyric input.
    #[command(flatten)]
    pub source: LyricsSource,

    /// Suggestion to apply; repeat for several.
    #[arg(long = "suggestion", short = 'S', required = true)]
    pub suggestions: Vec<String>,

    /// Also scores the rewritten lyrics.
    #[arg(long)]
    pub analyze: bool,
}

/// Rewritten lyrics with their analysis.
#[derive(Serialize)]
struct ReviewedLyrics {
    lyrics: String,
    analysis: AnalysisResult,
}

impl OptimizeCommand {
    /// Executes the optimize command.
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let lyrics = self.source.read()?;
        let session = Session::open(global)?;
        check_ai_credentials(&session.settings)?;

        if self.analyze {
            let (lyrics, analysis) = session
                .writer
                .optimize_and_analyze(&session.settings, &lyrics, &self.suggestions)
                .await
                .map_err(provider_failure(session.provider()))?;
            return print_structured(&ReviewedLyrics { lyrics, analysis }, global);
        }

        let rewritten = session
            .writer
            .optimize(&session.settings, &lyrics, &self.suggestions)
            .await
            .map_err(provider_failure(session.provider()))?;
        println!("{rewritten}");
        Ok(())
    }
}
