//! Utility functions and helpers.

pub mod preflight;
pub mod settings;

pub use preflight::{
    check_ai_credentials, check_image_credentials, resolve_ai_settings, resolve_endpoints,
};
pub use settings::Settings;
