use serde::{Deserialize, Serialize};

use crate::faker_rs::locales::LocaleKey;

/// Default upper bound for `string` lengths when `max_length` is absent.
pub const DEFAULT_STRING_MAX_LENGTH: usize = 9_999_999;
/// Default nesting limit for schema traversal.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for the generation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Locale used by the content provider.
    pub locale: LocaleKey,
    /// Maximum group nesting accepted before the schema is rejected.
    pub max_depth: usize,
    /// Upper bound applied to `string` leaves without `max_length`.
    pub string_max_length: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            locale: LocaleKey::EnUs,
            max_depth: DEFAULT_MAX_DEPTH,
            string_max_length: DEFAULT_STRING_MAX_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_defaults() {
        let settings: GenerationSettings =
            serde_json::from_str(r#"{"locale": "pt_BR"}"#).expect("parse settings");
        assert_eq!(settings.locale, LocaleKey::PtBr);
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(settings.string_max_length, DEFAULT_STRING_MAX_LENGTH);
    }
}
