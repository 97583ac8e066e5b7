//! Release-kit command: caption, stylized title and cover art.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::ai::{Provider, SongAssets};
use crate::cli::{print_structured, provider_failure, GlobalArgs, LyricsSource, Session};
use crate::utils::{check_ai_credentials, check_image_credentials};

/// Assets command options.
#[derive(Parser)]
pub struct AssetsCommand {
    /// Song title.
    #[arg(long)]
    pub title: String,

    /// Style tags of the song.
    #[arg(long, short, default_value = "Contemporary Worship")]
    pub style: String,

    /// Lyric input.
    #[command(flatten)]
    pub source: LyricsSource,

    /// Also generates cover art and writes it to this path.
    #[arg(long, value_name = "PATH")]
    pub cover: Option<PathBuf>,

    /// Skips caption and title, only generates cover art.
    #[arg(long, requires = "cover")]
    pub cover_only: bool,
}

/// Printed summary of the generated assets.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetsReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stylized_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover: Option<CoverReport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CoverReport {
    path: String,
    mime_type: String,
    bytes: usize,
}

impl AssetsCommand {
    /// Executes the assets command.
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let lyrics = self.source.read()?;
        let session = Session::open(global)?;

        let mut assets = SongAssets::default();
        if !self.cover_only {
            check_ai_credentials(&session.settings)?;
            let text_assets = session
                .writer
                .generate_assets(&session.settings, &self.title, &lyrics, &self.style)
                .await
                .map_err(provider_failure(session.provider()))?;
            assets.merge(text_assets);
        }

        let mut written = None;
        if let Some(path) = &self.cover {
            check_image_credentials(&session.settings)?;
            let image = session
                .writer
                .generate_cover_image(&session.settings, &self.title, &lyrics)
                .await
                .map_err(provider_failure(Provider::image_capable()))?;
            let bytes = image.decode().context("Cover image is not valid base64")?;
            fs::write(path, &bytes)
                .with_context(|| format!("Failed to write cover image: {}", path.display()))?;
            info!(path = %path.display(), bytes = bytes.len(), "Wrote cover image");

            written = Some((path.display().to_string(), bytes.len()));
            assets = assets.with_cover(image);
        }

        let cover = assets
            .cover_image
            .zip(written)
            .map(|(image, (path, bytes))| CoverReport {
                path,
                mime_type: image.mime_type,
                bytes,
            });
        let report = AssetsReport {
            caption: assets.caption,
            stylized_title: assets.stylized_title,
            cover,
        };
        print_structured(&report, global)
    }
}
