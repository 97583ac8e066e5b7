//! Per-provider request composition.
//!
//! Each provider gets one [`ProviderProfile`] implementation that turns every
//! operation into a [`TransportRequest`]. The adapter picks a profile by
//! provider tag and never branches on the provider itself.

use crate::ai::operation::{Operation, OperationKind};
use crate::ai::prompts;
use crate::ai::provider::Provider;
use crate::ai::transport::{ResponseMode, TransportRequest};

/// Builds provider-specific requests for every operation.
pub trait ProviderProfile: Send + Sync {
    /// Provider this profile composes for.
    fn provider(&self) -> Provider;

    /// Shapes a text request by the output contract of `kind`, in the
    /// provider's preferred form. Operations without a contract get
    /// freeform text.
    fn structured(
        &self,
        kind: OperationKind,
        system_instruction: &str,
        prompt: String,
    ) -> TransportRequest;

    /// Request for a tips answer.
    fn search_tips(&self, query: &str) -> TransportRequest;

    /// Request for lyric analysis.
    fn analyze(&self, lyrics: &str) -> TransportRequest {
        self.structured(
            OperationKind::Analyze,
            prompts::ANALYSIS_SYSTEM_INSTRUCTION,
            prompts::analysis_prompt(lyrics),
        )
    }

    /// Request for song generation.
    fn generate(&self, theme: &str, style: &str) -> TransportRequest {
        self.structured(
            OperationKind::Generate,
            prompts::GENERATION_SYSTEM_INSTRUCTION,
            prompts::generation_prompt(theme, style),
        )
    }

    /// Request for release assets.
    fn generate_assets(&self, title: &str, lyrics: &str, style: &str) -> TransportRequest {
        self.structured(
            OperationKind::GenerateAssets,
            prompts::ASSET_GENERATION_SYSTEM_INSTRUCTION,
            prompts::assets_prompt(title, lyrics, style),
        )
    }

    /// Request for lyric rewriting. Freeform text for every provider.
    fn optimize(&self, lyrics: &str, suggestions: &[String]) -> TransportRequest {
        self.structured(
            OperationKind::Optimize,
            prompts::OPTIMIZATION_SYSTEM_INSTRUCTION,
            prompts::optimization_prompt(lyrics, suggestions),
        )
    }

    /// Request for cover art, or `None` if the provider cannot draw.
    fn cover_image(&self, title: &str, lyrics: &str) -> Option<TransportRequest> {
        if !self.provider().supports_images() {
            return None;
        }
        Some(TransportRequest {
            system_instruction: None,
            prompt: prompts::cover_image_prompt(title, lyrics),
            temperature: OperationKind::GenerateCoverImage.temperature(),
            mode: ResponseMode::Image,
            web_search: false,
        })
    }

    /// Dispatches `operation` to the matching builder.
    fn compose(&self, operation: &Operation) -> Option<TransportRequest> {
        let request = match operation {
            Operation::Analyze { lyrics } => self.analyze(lyrics),
            Operation::Generate { theme, style } => self.generate(theme, style),
            Operation::Optimize {
                lyrics,
                suggestions,
            } => self.optimize(lyrics, suggestions),
            Operation::GenerateAssets {
                title,
                lyrics,
                style,
            } => self.generate_assets(title, lyrics, style),
            Operation::GenerateCoverImage { title, lyrics } => {
                return self.cover_image(title, lyrics)
            }
            Operation::SearchTips { query } => self.search_tips(query),
        };
        Some(request)
    }
}

/// Gemini: native schemas, search tool, image output.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeminiProfile;

impl ProviderProfile for GeminiProfile {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn structured(
        &self,
        kind: OperationKind,
        system_instruction: &str,
        prompt: String,
    ) -> TransportRequest {
        let mode = kind.contract().map_or(ResponseMode::Text, |contract| {
            ResponseMode::NativeSchema(contract.native_schema())
        });
        TransportRequest {
            system_instruction: Some(system_instruction.to_string()),
            prompt,
            temperature: kind.temperature(),
            mode,
            web_search: false,
        }
    }

    fn search_tips(&self, query: &str) -> TransportRequest {
        TransportRequest {
            system_instruction: None,
            prompt: prompts::search_tips_prompt(query),
            temperature: OperationKind::SearchTips.temperature(),
            mode: ResponseMode::Text,
            web_search: true,
        }
    }
}

/// Zhipu: JSON-object mode with the shape spelled out in the prompt.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZhipuProfile;

impl ProviderProfile for ZhipuProfile {
    fn provider(&self) -> Provider {
        Provider::Zhipu
    }

    fn structured(
        &self,
        kind: OperationKind,
        system_instruction: &str,
        prompt: String,
    ) -> TransportRequest {
        let (prompt, mode) = match kind.contract() {
            Some(contract) => (
                prompts::with_inline_schema(&prompt, &contract.inline_description()),
                ResponseMode::JsonObject,
            ),
            None => (prompt, ResponseMode::Text),
        };
        TransportRequest {
            system_instruction: Some(system_instruction.to_string()),
            prompt,
            temperature: kind.temperature(),
            mode,
            web_search: false,
        }
    }

    // No search tool: the answer comes from model knowledge and may be stale.
    fn search_tips(&self, query: &str) -> TransportRequest {
        TransportRequest {
            system_instruction: Some(prompts::TIPS_SYSTEM_INSTRUCTION.to_string()),
            prompt: prompts::knowledge_tips_prompt(query),
            temperature: OperationKind::SearchTips.temperature(),
            mode: ResponseMode::Text,
            web_search: false,
        }
    }
}

/// Returns the profile for `provider`.
pub fn profile_for(provider: Provider) -> &'static dyn ProviderProfile {
    match provider {
        Provider::Gemini => &GeminiProfile,
        Provider::Zhipu => &ZhipuProfile,
    }
}
