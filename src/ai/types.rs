//! Typed results returned by the operation facade.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserializes any JSON number into a score clamped to `0..=100`.
fn clamped_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_score(raw))
}

/// Clamps and rounds a raw score into `0..=100`. NaN maps to 0.
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 100.0).round() as u8
}

/// Deserializes any JSON number into a level clamped to `1..=10`.
fn clamped_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_level(raw))
}

/// Clamps and rounds a raw level into `1..=10`. NaN maps to 1.
pub fn clamp_level(raw: f64) -> u8 {
    if raw.is_nan() {
        return 1;
    }
    raw.clamp(1.0, 10.0).round() as u8
}

/// The five independent sub-scores of an analysis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    /// Biblical depth and accuracy.
    #[serde(deserialize_with = "clamped_score")]
    pub theology: u8,
    /// Section structure and tag usage.
    #[serde(deserialize_with = "clamped_score")]
    pub structure: u8,
    /// Rhythm, rhyme and singability.
    #[serde(deserialize_with = "clamped_score")]
    pub flow: u8,
    /// Emotional impact and metaphor.
    #[serde(deserialize_with = "clamped_score")]
    pub imagery: u8,
    /// Creativity.
    #[serde(deserialize_with = "clamped_score")]
    pub innovation: u8,
}

/// Structural-validity verdict on the lyric's section markers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SunoTagsCheck {
    /// Whether the structure tags are acceptable.
    pub valid: bool,
    /// Standard markers that are missing.
    pub missing_tags: Vec<String>,
    /// Explanation of the verdict.
    pub message: String,
}

/// Result of the Analyze operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Per-pillar scores.
    pub scores: Scores,
    /// Overall score.
    #[serde(deserialize_with = "clamped_score")]
    pub overall_score: u8,
    /// Summary critique.
    pub feedback: String,
    /// Ordered, actionable suggestions.
    pub suggestions: Vec<String>,
    /// Structural-validity verdict.
    pub suno_tags_check: SunoTagsCheck,
}

/// Preferred lead vocal for a generated song.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VocalGender {
    /// Male lead.
    Male,
    /// Female lead.
    Female,
}

impl FromStr for VocalGender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(format!("unknown vocal gender '{other}'")),
        }
    }
}

impl<'de> Deserialize<'de> for VocalGender {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for VocalGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Suno generation settings suggested alongside a song.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedSettings {
    /// Experimentalism, 1 to 10.
    #[serde(deserialize_with = "clamped_level")]
    pub experimentalism: u8,
    /// Style adherence, 1 to 10.
    #[serde(deserialize_with = "clamped_level")]
    pub style_adherence: u8,
    /// Optional vocal preference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocal_gender: Option<VocalGender>,
}

/// Result of the Generate operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSong {
    /// Song title.
    pub title: String,
    /// Comma-separated style tags.
    pub style_prompts: String,
    /// Comma-separated styles to avoid.
    pub negative_prompts: String,
    /// Full lyric text, always opening with an Intro section.
    pub lyrics: String,
    /// Optional Suno settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_settings: Option<SuggestedSettings>,
}

/// A generated cover image, carried base64-encoded.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    /// Base64 image bytes.
    pub data: String,
    /// MIME type reported by the provider.
    pub mime_type: String,
}

impl CoverImage {
    /// Decodes the image bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.data.as_bytes())
    }

    /// File extension matching the MIME type.
    pub fn file_extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

impl fmt::Debug for CoverImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverImage")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Release assets, filled in piecemeal by independent operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongAssets {
    /// Cover art.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<CoverImage>,
    /// Social media caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Decorated title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylized_title: Option<String>,
}

impl SongAssets {
    /// Copies every populated field of `other` into `self`, leaving the
    /// rest untouched.
    pub fn merge(&mut self, other: Self) {
        if other.cover_image.is_some() {
            self.cover_image = other.cover_image;
        }
        if other.caption.is_some() {
            self.caption = other.caption;
        }
        if other.stylized_title.is_some() {
            self.stylized_title = other.stylized_title;
        }
    }

    /// Returns the assets with `image` attached.
    #[must_use]
    pub fn with_cover(mut self, image: CoverImage) -> Self {
        self.cover_image = Some(image);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scores_are_clamped_on_parse() {
        let scores: Scores = serde_json::from_str(
            r#"{"theology":120,"structure":-5,"flow":70.4,"imagery":59.6,"innovation":55}"#,
        )
        .unwrap();
        assert_eq!(scores.theology, 100);
        assert_eq!(scores.structure, 0);
        assert_eq!(scores.flow, 70);
        assert_eq!(scores.imagery, 60);
        assert_eq!(scores.innovation, 55);
    }

    #[test]
    fn string_scores_are_rejected() {
        let result: Result<Scores, _> = serde_json::from_str(
            r#"{"theology":"high","structure":1,"flow":1,"imagery":1,"innovation":1}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn vocal_gender_is_case_insensitive() {
        let settings: SuggestedSettings = serde_json::from_str(
            r#"{"experimentalism":12,"styleAdherence":0,"vocalGender":"Female"}"#,
        )
        .unwrap();
        assert_eq!(settings.experimentalism, 10);
        assert_eq!(settings.style_adherence, 1);
        assert_eq!(settings.vocal_gender, Some(VocalGender::Female));
    }

    #[test]
    fn merge_keeps_existing_fields() {
        let mut assets = SongAssets {
            cover_image: Some(CoverImage {
                data: "aGk=".to_string(),
                mime_type: "image/png".to_string(),
            }),
            caption: None,
            stylized_title: Some("〖 Old 〗".to_string()),
        };
        assets.merge(SongAssets {
            cover_image: None,
            caption: Some("New caption".to_string()),
            stylized_title: None,
        });
        assert!(assets.cover_image.is_some());
        assert_eq!(assets.caption.as_deref(), Some("New caption"));
        assert_eq!(assets.stylized_title.as_deref(), Some("〖 Old 〗"));
    }

    #[test]
    fn cover_image_decodes() {
        let image = CoverImage {
            data: "aGVsbG8=".to_string(),
            mime_type: "image/jpeg".to_string(),
        };
        assert_eq!(image.decode().unwrap(), b"hello");
        assert_eq!(image.file_extension(), "jpg");
    }

    #[test]
    fn serializes_with_original_field_names() {
        let song = GeneratedSong {
            title: "过红海".to_string(),
            style_prompts: "Worship, Piano".to_string(),
            negative_prompts: "Rap".to_string(),
            lyrics: "[Intro]\n".to_string(),
            suggested_settings: None,
        };
        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(json["stylePrompts"], "Worship, Piano");
        assert!(json.get("suggestedSettings").is_none());
    }

    proptest! {
        #[test]
        fn clamp_score_stays_in_range(raw in proptest::num::f64::ANY) {
            prop_assert!(clamp_score(raw) <= 100);
        }

        #[test]
        fn clamp_level_stays_in_range(raw in proptest::num::f64::ANY) {
            let level = clamp_level(raw);
            prop_assert!((1..=10).contains(&level));
        }
    }
}
