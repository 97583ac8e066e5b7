//! Example lyrics and structure-tag reference
//!
//! Loaded from an embedded YAML file so the binary needs no data directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const LIBRARY_YAML: &str = include_str!("templates/library.yaml");

/// A complete example song to start from.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExampleLyric {
    /// Short identifier used on the command line
    pub id: String,
    /// Display title
    pub title: String,
    /// Suno style prompt
    pub style: String,
    /// Structure tags the example demonstrates
    pub tags: Vec<String>,
    /// Full lyric text
    pub content: String,
}

/// One entry of the structure-tag cheat sheet.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TagHint {
    /// Tag as written in lyrics, e.g. `[Chorus]`
    pub label: String,
    /// What the tag does
    pub description: String,
}

/// The embedded library.
#[derive(Debug, Deserialize)]
pub struct Library {
    /// Example songs, in display order
    pub examples: Vec<ExampleLyric>,
    /// Tag cheat sheet, in display order
    pub tags: Vec<TagHint>,
}

impl Library {
    /// Loads the embedded library.
    pub fn load() -> Result<Self> {
        serde_yaml::from_str(LIBRARY_YAML).context("Failed to parse embedded template library")
    }

    /// Finds an example by id or by 1-based position.
    pub fn find(&self, key: &str) -> Option<&ExampleLyric> {
        let key = key.trim();
        if let Ok(position) = key.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|index| self.examples.get(index));
        }
        self.examples
            .iter()
            .find(|example| example.id.eq_ignore_ascii_case(key))
    }
}
