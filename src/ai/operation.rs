//! Operation requests routed through the capability adapter.

use std::fmt;

use crate::ai::provider::AiSettings;
use crate::ai::schema::Contract;

/// The six operations the facade exposes, with their payloads.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    /// Score lyrics against the Analysis contract.
    Analyze {
        /// Lyric text to score.
        lyrics: String,
    },
    /// Write a new song from a theme.
    Generate {
        /// Free-form theme prompt.
        theme: String,
        /// Style reference, e.g. "Modern Worship".
        style: String,
    },
    /// Rewrite lyrics applying a list of suggestions.
    Optimize {
        /// Lyrics to rewrite.
        lyrics: String,
        /// Suggestions to apply.
        suggestions: Vec<String>,
    },
    /// Produce a social caption and a stylized title.
    GenerateAssets {
        /// Song title.
        title: String,
        /// Lyric text, truncated before it is embedded.
        lyrics: String,
        /// Style tags.
        style: String,
    },
    /// Produce cover art.
    GenerateCoverImage {
        /// Song title.
        title: String,
        /// Lyric text, truncated before it is embedded.
        lyrics: String,
    },
    /// Answer a question about Suno usage.
    SearchTips {
        /// Free-text question.
        query: String,
    },
}

impl Operation {
    /// Returns the payload-free tag of this operation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Analyze { .. } => OperationKind::Analyze,
            Self::Generate { .. } => OperationKind::Generate,
            Self::Optimize { .. } => OperationKind::Optimize,
            Self::GenerateAssets { .. } => OperationKind::GenerateAssets,
            Self::GenerateCoverImage { .. } => OperationKind::GenerateCoverImage,
            Self::SearchTips { .. } => OperationKind::SearchTips,
        }
    }
}

/// Payload-free operation tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// See [`Operation::Analyze`].
    Analyze,
    /// See [`Operation::Generate`].
    Generate,
    /// See [`Operation::Optimize`].
    Optimize,
    /// See [`Operation::GenerateAssets`].
    GenerateAssets,
    /// See [`Operation::GenerateCoverImage`].
    GenerateCoverImage,
    /// See [`Operation::SearchTips`].
    SearchTips,
}

impl OperationKind {
    /// Sampling temperature: low for evaluation, higher for creative work.
    pub fn temperature(self) -> Option<f32> {
        match self {
            Self::Analyze => Some(0.4),
            Self::Optimize => Some(0.6),
            Self::Generate => Some(0.7),
            Self::GenerateAssets => Some(0.8),
            Self::GenerateCoverImage | Self::SearchTips => None,
        }
    }

    /// Structured-output contract the result is parsed against, if any.
    pub fn contract(self) -> Option<Contract> {
        match self {
            Self::Analyze => Some(Contract::Analysis),
            Self::Generate => Some(Contract::Generation),
            Self::GenerateAssets => Some(Contract::Assets),
            Self::Optimize | Self::GenerateCoverImage | Self::SearchTips => None,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Analyze => "analyze",
            Self::Generate => "generate",
            Self::Optimize => "optimize",
            Self::GenerateAssets => "generate-assets",
            Self::GenerateCoverImage => "generate-cover-image",
            Self::SearchTips => "search-tips",
        };
        f.write_str(name)
    }
}

/// An operation together with the caller's provider selection and keys.
#[derive(Clone, Debug)]
pub struct OperationRequest<'a> {
    /// What to do.
    pub operation: Operation,
    /// Active provider and credentials for this call.
    pub settings: &'a AiSettings,
}

impl<'a> OperationRequest<'a> {
    /// Bundles an operation with the settings it runs under.
    pub fn new(operation: Operation, settings: &'a AiSettings) -> Self {
        Self {
            operation,
            settings,
        }
    }
}
