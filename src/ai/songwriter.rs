//! The songwriting operations.

use tracing::info;

use crate::ai::adapter::CapabilityAdapter;
use crate::ai::error::Result;
use crate::ai::normalize;
use crate::ai::operation::Operation;
use crate::ai::provider::AiSettings;
use crate::ai::transport::{Connector, Endpoints, HttpConnector, RawOutput};
use crate::ai::types::{AnalysisResult, CoverImage, GeneratedSong, SongAssets};

/// Entry point for every operation.
///
/// Holds no state beyond its connector, so one instance can serve
/// overlapping calls. Provider choice and keys come in with each call.
pub struct Songwriter<C: Connector = HttpConnector> {
    adapter: CapabilityAdapter<C>,
}

impl Songwriter {
    /// Creates a songwriter talking to the given endpoints over HTTP.
    pub fn new(endpoints: Endpoints) -> reqwest::Result<Self> {
        Ok(Self::with_connector(HttpConnector::new(endpoints)?))
    }
}

impl<C: Connector> Songwriter<C> {
    /// Creates a songwriter that builds transports with `connector`.
    pub fn with_connector(connector: C) -> Self {
        Self {
            adapter: CapabilityAdapter::new(connector),
        }
    }

    async fn run(&self, operation: Operation, settings: &AiSettings) -> Result<RawOutput> {
        self.adapter.dispatch(operation, settings).await
    }

    /// Scores lyrics.
    pub async fn analyze(&self, settings: &AiSettings, lyrics: &str) -> Result<AnalysisResult> {
        let raw = self
            .run(
                Operation::Analyze {
                    lyrics: lyrics.to_string(),
                },
                settings,
            )
            .await?;
        normalize::parse_analysis(&normalize::output_text(raw))
    }

    /// Writes a song from a theme. The lyrics always open with an Intro.
    pub async fn generate(
        &self,
        settings: &AiSettings,
        theme: &str,
        style: &str,
    ) -> Result<GeneratedSong> {
        let raw = self
            .run(
                Operation::Generate {
                    theme: theme.to_string(),
                    style: style.to_string(),
                },
                settings,
            )
            .await?;
        normalize::parse_generation(&normalize::output_text(raw))
    }

    /// Rewrites lyrics applying `suggestions`, one or many.
    pub async fn optimize(
        &self,
        settings: &AiSettings,
        lyrics: &str,
        suggestions: &[String],
    ) -> Result<String> {
        let raw = self
            .run(
                Operation::Optimize {
                    lyrics: lyrics.to_string(),
                    suggestions: suggestions.to_vec(),
                },
                settings,
            )
            .await?;
        normalize::clean_lyrics(&normalize::output_text(raw))
    }

    /// Produces a caption and stylized title.
    ///
    /// An unusable payload degrades to defaults; only precondition and
    /// transport failures are returned as errors.
    pub async fn generate_assets(
        &self,
        settings: &AiSettings,
        title: &str,
        lyrics: &str,
        style: &str,
    ) -> Result<SongAssets> {
        let raw = self
            .run(
                Operation::GenerateAssets {
                    title: title.to_string(),
                    lyrics: lyrics.to_string(),
                    style: style.to_string(),
                },
                settings,
            )
            .await?;
        Ok(normalize::parse_assets(&normalize::output_text(raw), title))
    }

    /// Draws cover art. Needs the image-capable provider's key whichever
    /// provider is active.
    pub async fn generate_cover_image(
        &self,
        settings: &AiSettings,
        title: &str,
        lyrics: &str,
    ) -> Result<CoverImage> {
        let raw = self
            .run(
                Operation::GenerateCoverImage {
                    title: title.to_string(),
                    lyrics: lyrics.to_string(),
                },
                settings,
            )
            .await?;
        normalize::extract_image(raw)
    }

    /// Answers a question about Suno usage.
    pub async fn search_tips(&self, settings: &AiSettings, query: &str) -> Result<String> {
        let raw = self
            .run(
                Operation::SearchTips {
                    query: query.to_string(),
                },
                settings,
            )
            .await?;
        normalize::clean_prose(&normalize::output_text(raw))
    }

    /// Writes a song, then scores its lyrics.
    pub async fn generate_and_analyze(
        &self,
        settings: &AiSettings,
        theme: &str,
        style: &str,
    ) -> Result<(GeneratedSong, AnalysisResult)> {
        let song = self.generate(settings, theme, style).await?;
        info!(title = %song.title, "Generated song, analyzing lyrics");
        let analysis = self.analyze(settings, &song.lyrics).await?;
        Ok((song, analysis))
    }

    /// Rewrites lyrics, then scores the rewrite.
    pub async fn optimize_and_analyze(
        &self,
        settings: &AiSettings,
        lyrics: &str,
        suggestions: &[String],
    ) -> Result<(String, AnalysisResult)> {
        let rewritten = self.optimize(settings, lyrics, suggestions).await?;
        let analysis = self.analyze(settings, &rewritten).await?;
        Ok((rewritten, analysis))
    }
}
