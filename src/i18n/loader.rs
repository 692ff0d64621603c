//! Translation loader and i18n management
//!
//! This module provides the core internationalization functionality including
//! translation loading, language detection, and message formatting. All
//! user-facing strings resolve through a single registry; a missing key
//! falls back to the default language and finally to the key itself.

use std::collections::HashMap;
use std::path::Path;
use serde_json::{Value, Map};
use tokio::fs;
use tracing::{info, warn, error, debug};
use crate::utils::errors::{DownMateError, Result};
use crate::config::I18nConfig;

/// Main internationalization manager
#[derive(Debug, Clone)]
pub struct I18n {
    /// Loaded translations by language code
    translations: HashMap<String, Map<String, Value>>,
    /// Default language code
    default_language: String,
    /// Supported language codes
    supported_languages: Vec<String>,
}

/// Translation parameters for message formatting
pub type TranslationParams = HashMap<String, String>;

impl I18n {
    /// Create a new I18n instance
    pub fn new(config: &I18nConfig) -> Self {
        Self {
            translations: HashMap::new(),
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
        }
    }

    /// Load all translation files from the translations directory
    pub async fn load_translations(&mut self) -> Result<()> {
        let translations_dir = Path::new("translations");

        if !translations_dir.exists() {
            warn!("Translations directory not found, creating it");
            fs::create_dir_all(translations_dir).await?;
        }

        let supported_languages = self.supported_languages.clone();
        for lang_code in &supported_languages {
            let file_path = translations_dir.join(format!("{}.json", lang_code));

            if file_path.exists() {
                match self.load_language_file(&file_path, lang_code).await {
                    Ok(_) => info!("Loaded translations for language: {}", lang_code),
                    Err(e) => {
                        error!("Failed to load translations for {}: {}", lang_code, e);
                        if lang_code == &self.default_language {
                            return Err(DownMateError::Config(
                                format!("Failed to load default language translations: {}", e)
                            ));
                        }
                    }
                }
            } else {
                warn!("Translation file not found: {}", file_path.display());
                if lang_code == &self.default_language {
                    return Err(DownMateError::Config(
                        format!("Default language translation file not found: {}", file_path.display())
                    ));
                }
            }
        }

        Ok(())
    }

    /// Load a single language file
    async fn load_language_file(&mut self, file_path: &Path, lang_code: &str) -> Result<()> {
        let content = fs::read_to_string(file_path).await?;
        let translations: Value = serde_json::from_str(&content)?;

        if let Value::Object(map) = translations {
            debug!("Loaded {} top-level translation keys for {}", map.len(), lang_code);
            self.translations.insert(lang_code.to_string(), map);
        } else {
            return Err(DownMateError::Config(
                format!("Invalid translation file format for {}", lang_code)
            ));
        }

        Ok(())
    }

    /// Get a translated message
    pub fn t(&self, key: &str, lang: &str, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);

        match self.get_translation_value(key, &effective_lang) {
            Some(translation) => {
                let text = self.extract_text_from_value(&translation);
                self.format_message(&text, params)
            }
            None => {
                // Fallback to default language if not found
                if effective_lang != self.default_language {
                    match self.get_translation_value(key, &self.default_language) {
                        Some(translation) => {
                            let text = self.extract_text_from_value(&translation);
                            self.format_message(&text, params)
                        }
                        None => {
                            warn!("Translation key '{}' not found in any language", key);
                            key.to_string()
                        }
                    }
                } else {
                    warn!("Translation key '{}' not found in default language", key);
                    key.to_string()
                }
            }
        }
    }

    /// Check if a language is supported
    pub fn is_language_supported(&self, lang: &str) -> bool {
        self.supported_languages.contains(&lang.to_string())
    }

    /// Get the effective language (fallback to default if not supported)
    fn get_effective_language(&self, lang: &str) -> String {
        if self.is_language_supported(lang) && self.translations.contains_key(lang) {
            lang.to_string()
        } else {
            self.default_language.clone()
        }
    }

    /// Get translation value from nested JSON structure
    fn get_translation_value(&self, key: &str, lang: &str) -> Option<Value> {
        let translations = self.translations.get(lang)?;

        // Support nested keys like "commands.start.welcome"
        let keys: Vec<&str> = key.split('.').collect();
        let mut current = Value::Object(translations.clone());

        for k in keys {
            current = current.get(k)?.clone();
        }

        Some(current)
    }

    /// Extract text from a JSON value
    fn extract_text_from_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            _ => value.to_string(),
        }
    }

    /// Format message with parameters
    fn format_message(&self, template: &str, params: Option<&TranslationParams>) -> String {
        if let Some(params) = params {
            let mut result = template.to_string();
            for (key, value) in params {
                let placeholder = format!("{{{}}}", key);
                result = result.replace(&placeholder, value);
            }
            result
        } else {
            template.to_string()
        }
    }

    /// Get supported languages
    pub fn supported_languages(&self) -> &[String] {
        &self.supported_languages
    }

    /// Get default language
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Detect user language from Telegram language code
    pub fn detect_user_language(&self, telegram_lang: Option<&str>) -> String {
        if let Some(lang) = telegram_lang {
            // Extract language code from locale (e.g., "en-US" -> "en")
            let lang_code = lang.split('-').next().unwrap_or(lang);

            if self.is_language_supported(lang_code) {
                return lang_code.to_string();
            }
        }

        self.default_language.clone()
    }

    #[cfg(test)]
    pub(crate) fn insert_language(&mut self, lang: &str, table: Map<String, Value>) {
        self.translations.insert(lang.to_string(), table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::I18nConfig;

    fn create_test_config() -> I18nConfig {
        I18nConfig {
            default_language: "en".to_string(),
            supported_languages: vec!["en".to_string(), "fa".to_string()],
        }
    }

    fn create_test_i18n() -> I18n {
        let mut i18n = I18n::new(&create_test_config());

        let en = serde_json::json!({
            "commands": {
                "start": { "welcome": "Hello {name}!" }
            },
            "only_english": "english only"
        });
        let fa = serde_json::json!({
            "commands": {
                "start": { "welcome": "سلام {name}!" }
            }
        });

        if let Value::Object(map) = en {
            i18n.insert_language("en", map);
        }
        if let Value::Object(map) = fa {
            i18n.insert_language("fa", map);
        }
        i18n
    }

    #[test]
    fn test_language_detection() {
        let i18n = I18n::new(&create_test_config());

        assert_eq!(i18n.detect_user_language(Some("en-US")), "en");
        assert_eq!(i18n.detect_user_language(Some("fa")), "fa");
        assert_eq!(i18n.detect_user_language(Some("fr")), "en"); // fallback
        assert_eq!(i18n.detect_user_language(None), "en"); // fallback
    }

    #[test]
    fn test_message_formatting() {
        let i18n = I18n::new(&create_test_config());

        let mut params = HashMap::new();
        params.insert("name".to_string(), "John".to_string());
        params.insert("count".to_string(), "5".to_string());

        let result = i18n.format_message("Hello {name}, you have {count} messages", Some(&params));
        assert_eq!(result, "Hello John, you have 5 messages");
    }

    #[test]
    fn test_nested_key_lookup() {
        let i18n = create_test_i18n();
        let mut params = HashMap::new();
        params.insert("name".to_string(), "Sam".to_string());

        assert_eq!(i18n.t("commands.start.welcome", "en", Some(&params)), "Hello Sam!");
        assert_eq!(i18n.t("commands.start.welcome", "fa", Some(&params)), "سلام Sam!");
    }

    #[test]
    fn test_fallback_to_default_language() {
        let i18n = create_test_i18n();
        assert_eq!(i18n.t("only_english", "fa", None), "english only");
    }

    #[test]
    fn test_fallback_to_key() {
        let i18n = create_test_i18n();
        assert_eq!(i18n.t("does.not.exist", "en", None), "does.not.exist");
    }
}
