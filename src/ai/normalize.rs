//! Response normalization.
//!
//! Turns raw transport output into typed results and enforces the
//! invariants the contracts promise but providers do not:
//!
//! - wrapping code fences are removed before anything else looks at the text;
//! - Analysis and Generation payloads must parse, or the call fails with
//!   [`AiError::MalformedPayload`];
//! - Assets payloads never fail, they degrade to a default record;
//! - generated lyrics always open with an Intro section.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::ai::error::{AiError, Result};
use crate::ai::operation::OperationKind;
use crate::ai::prompts::{INTRO_MARKER, SYNTHETIC_INTRO};
use crate::ai::schema::Contract;
use crate::ai::transport::{CandidatePart, RawOutput};
use crate::ai::types::{AnalysisResult, CoverImage, GeneratedSong, SongAssets, SuggestedSettings};

/// Caption used when the assets payload is unusable.
pub const DEFAULT_CAPTION: &str = "Check out my new song!";

/// MIME type assumed when an inline image part does not report one.
pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/png";

/// Message attached when a provider marks tags invalid without saying why.
const UNEXPLAINED_TAGS_MESSAGE: &str =
    "Structure tags are incomplete, but the provider did not say which ones.";

// Whole-text fenced block: opening fence with optional info string, body,
// closing fence.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A\s*```[^\n`]*\n(.*?)\r?\n?```\s*\z").unwrap()
});

/// Removes a fenced-code wrapper around the whole text.
///
/// Text that is not wrapped is returned unchanged. When it is wrapped, only the
/// fence lines are removed and the body is returned byte-for-byte. The opening
/// line may carry any info string (`json`, `json title`). A CRLF line break
/// before the closing fence belongs to the fence, so a body ending in `\r` loses
/// that `\r`.
pub fn strip_code_fences(text: &str) -> &str {
    FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |body| body.as_str())
}

/// Flattens raw output to text. Candidates contribute the text parts of the
/// first candidate.
pub fn output_text(raw: RawOutput) -> String {
    match raw {
        RawOutput::Text(text) => text,
        RawOutput::Candidates(candidates) => candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .parts
                    .into_iter()
                    .filter_map(|part| match part {
                        CandidatePart::Text(text) => Some(text),
                        CandidatePart::InlineData { .. } => None,
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Returns the outermost `{ ... }` slice of `text`, if any.
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Parses cleaned text as JSON, retrying on the outermost object when the
/// provider wrapped it in prose.
fn parse_value(text: &str, contract: Contract) -> Result<Value> {
    let cleaned = strip_code_fences(text).trim();
    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(first) => {
            if let Some(slice) = outermost_object(cleaned).filter(|s| s.len() < cleaned.len()) {
                if let Ok(value) = serde_json::from_str(slice) {
                    debug!(%contract, "Recovered JSON object from surrounding text");
                    return Ok(value);
                }
            }
            Err(AiError::MalformedPayload {
                contract,
                message: first.to_string(),
            })
        }
    }
}

/// Deserializes a parsed value into the contract's result type.
fn decode<T: DeserializeOwned>(value: Value, contract: Contract) -> Result<T> {
    serde_json::from_value(value).map_err(|e| AiError::MalformedPayload {
        contract,
        message: e.to_string(),
    })
}

/// Fails with [`AiError::EmptyResponse`] when `text` has no content.
fn require_text(text: &str, operation: OperationKind) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AiError::EmptyResponse { operation });
    }
    Ok(())
}

/// Parses an Analysis payload.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult> {
    require_text(text, OperationKind::Analyze)?;
    let value = parse_value(text, Contract::Analysis)?;
    let mut analysis: AnalysisResult = decode(value, Contract::Analysis)?;

    let check = &mut analysis.suno_tags_check;
    if !check.valid && check.missing_tags.is_empty() && check.message.trim().is_empty() {
        warn!("Provider marked structure tags invalid without detail");
        check.message = UNEXPLAINED_TAGS_MESSAGE.to_string();
    }
    Ok(analysis)
}

/// Parses a Generation payload and applies the Intro invariant.
///
/// A malformed `suggestedSettings` block is dropped rather than failing the
/// whole song.
pub fn parse_generation(text: &str) -> Result<GeneratedSong> {
    require_text(text, OperationKind::Generate)?;
    let mut value = parse_value(text, Contract::Generation)?;
    let settings = value
        .as_object_mut()
        .and_then(|object| object.remove("suggestedSettings"));
    let mut song: GeneratedSong = decode(value, Contract::Generation)?;

    song.suggested_settings = match settings {
        None | Some(Value::Null) => None,
        Some(raw) => match serde_json::from_value::<SuggestedSettings>(raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(error = %e, "Dropping malformed suggestedSettings");
                None
            }
        },
    };
    song.lyrics = ensure_intro(&song.lyrics);
    Ok(song)
}

/// Returns `lyrics` opening with an Intro section, prepending one if needed.
pub fn ensure_intro(lyrics: &str) -> String {
    let body = lyrics.trim_start();
    if body
        .to_lowercase()
        .starts_with(&INTRO_MARKER.to_lowercase())
    {
        return lyrics.to_string();
    }
    warn!("Generated lyrics lack an Intro section, prepending one");
    format!("{SYNTHETIC_INTRO}{body}")
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetsPayload {
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    stylized_title: Option<String>,
}

/// Parses an Assets payload. Never fails: unusable fields fall back to
/// [`DEFAULT_CAPTION`] and the song title.
pub fn parse_assets(text: &str, title: &str) -> SongAssets {
    let payload = parse_value(text, Contract::Assets)
        .and_then(|value| decode::<AssetsPayload>(value, Contract::Assets))
        .unwrap_or_else(|e| {
            warn!(error = %e, "Asset generation degraded to defaults");
            AssetsPayload {
                caption: None,
                stylized_title: None,
            }
        });

    let non_empty = |field: Option<String>| field.filter(|s| !s.trim().is_empty());
    SongAssets {
        cover_image: None,
        caption: Some(non_empty(payload.caption).unwrap_or_else(|| DEFAULT_CAPTION.to_string())),
        stylized_title: Some(non_empty(payload.stylized_title).unwrap_or_else(|| title.to_string())),
    }
}

/// Strips fences and surrounding whitespace from freeform output.
fn clean_text(text: &str, operation: OperationKind) -> Result<String> {
    let cleaned = strip_code_fences(text).trim();
    if cleaned.is_empty() {
        return Err(AiError::EmptyResponse { operation });
    }
    Ok(cleaned.to_string())
}

/// Cleans rewritten lyrics.
pub fn clean_lyrics(text: &str) -> Result<String> {
    clean_text(text, OperationKind::Optimize)
}

/// Cleans a tips answer.
pub fn clean_prose(text: &str) -> Result<String> {
    clean_text(text, OperationKind::SearchTips)
}

/// Pulls the image out of the first part of the first candidate.
pub fn extract_image(raw: RawOutput) -> Result<CoverImage> {
    let RawOutput::Candidates(candidates) = raw else {
        return Err(AiError::NoImageProduced);
    };
    let first_part = candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.parts.into_iter().next());
    match first_part {
        Some(CandidatePart::InlineData { mime_type, data }) if !data.is_empty() => {
            Ok(CoverImage {
                data,
                mime_type: mime_type.unwrap_or_else(|| DEFAULT_IMAGE_MIME_TYPE.to_string()),
            })
        }
        _ => Err(AiError::NoImageProduced),
    }
}
