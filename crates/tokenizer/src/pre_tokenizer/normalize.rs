//! Unicode normalization for pre-tokenization.
//!
//! Applied to the whole text before splitting, identically for training and
//! encoding, so a model only ever sees normalized symbols.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

/// Normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationForm {
    /// Canonical composition
    NFC,
    /// Canonical decomposition
    NFD,
    /// Compatibility composition
    NFKC,
    /// Compatibility decomposition
    NFKD,
    /// No normalization
    #[default]
    None,
}

/// Unicode normalizer with optional lowercasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Normalizer {
    /// Normalization form to apply
    form: NormalizationForm,
    /// Lowercase after normalizing
    lowercase: bool,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new(form: NormalizationForm, lowercase: bool) -> Self {
        Self { form, lowercase }
    }

    /// Create an NFC normalizer.
    pub fn nfc() -> Self {
        Self::new(NormalizationForm::NFC, false)
    }

    pub fn form(&self) -> NormalizationForm {
        self.form
    }

    pub fn lowercase(&self) -> bool {
        self.lowercase
    }

    /// Normalize text, borrowing it unchanged when nothing is configured.
    pub fn normalize<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if !self.is_enabled() {
            return Cow::Borrowed(text);
        }

        let normalized: String = match self.form {
            NormalizationForm::NFC => text.nfc().collect(),
            NormalizationForm::NFD => text.nfd().collect(),
            NormalizationForm::NFKC => text.nfkc().collect(),
            NormalizationForm::NFKD => text.nfkd().collect(),
            NormalizationForm::None => text.to_string(),
        };

        if self.lowercase {
            Cow::Owned(normalized.to_lowercase())
        } else {
            Cow::Owned(normalized)
        }
    }

    /// Check if the normalizer changes text at all.
    pub fn is_enabled(&self) -> bool {
        self.form != NormalizationForm::None || self.lowercase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfc_normalization() {
        let normalizer = Normalizer::nfc();
        // e + combining acute accent
        let result = normalizer.normalize("e\u{0301}");
        assert_eq!(result, "\u{00e9}");
    }

    #[test]
    fn test_nfd_normalization() {
        let normalizer = Normalizer::new(NormalizationForm::NFD, false);
        let result = normalizer.normalize("\u{00e9}");
        assert_eq!(result, "e\u{0301}");
    }

    #[test]
    fn test_nfkc_folds_compatibility_forms() {
        let normalizer = Normalizer::new(NormalizationForm::NFKC, false);
        assert_eq!(normalizer.normalize("\u{FB01}le"), "file");
    }

    #[test]
    fn test_lowercase() {
        let normalizer = Normalizer::new(NormalizationForm::None, true);
        assert_eq!(normalizer.normalize("Hello WORLD"), "hello world");
    }

    #[test]
    fn test_default_is_identity() {
        let normalizer = Normalizer::default();
        assert!(!normalizer.is_enabled());
        assert!(matches!(normalizer.normalize("Héllo"), Cow::Borrowed("Héllo")));
    }

    #[test]
    fn test_form_names() {
        let json = serde_json::to_string(&NormalizationForm::NFKC).unwrap();
        assert_eq!(json, "\"nfkc\"");
    }
}
