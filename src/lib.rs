//! # songcraft
//!
//! AI-assisted songwriting for Suno, backed by interchangeable providers.
//!
//! ## Features
//!
//! - Analyze lyrics, generate songs, apply rewrite suggestions
//! - Release assets: captions, stylized titles and cover art
//! - Gemini and Zhipu GLM behind one operation facade
//!
//! ## Quick Start
//!
//! ```no_run
//! use songcraft::ai::{AiSettings, Endpoints, Provider, Songwriter};
//!
//! # async fn demo() -> songcraft::ai::Result<()> {
//! let writer = Songwriter::new(Endpoints::default()).expect("HTTP client");
//! let settings = AiSettings::new(Provider::Gemini).with_key(Provider::Gemini, "your-key");
//! let song = writer.generate(&settings, "Red Sea crossing", "Modern Worship").await?;
//! println!("{}", song.lyrics);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ai;
pub mod cli;
pub mod library;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of songcraft.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
