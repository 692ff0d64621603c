//! Internationalization module
//!
//! This module handles multi-language support for the DownMate bot.
//! It provides translation loading, language detection, and message
//! formatting with fallback to the default language and finally the key.

pub mod loader;

// Re-export commonly used i18n components
pub use loader::{I18n, TranslationParams};
