use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Locales the frontend ships copy for.
pub const SUPPORTED_LOCALES: [&str; 3] = ["en", "fr", "ar"];

pub const FALLBACK_LOCALE: &str = "en";

/// Localized text keyed by locale code, stored as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translations(BTreeMap<String, String>);

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locale: impl Into<String>, text: impl Into<String>) {
        self.0.insert(locale.into(), text.into());
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// True when at least one locale carries non-blank text.
    pub fn has_content(&self) -> bool {
        self.0.values().any(|text| !text.trim().is_empty())
    }

    pub fn unsupported_locales(&self) -> Vec<&str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|locale| !SUPPORTED_LOCALES.contains(locale))
            .collect()
    }

    /// Text for `locale`, falling back to English and then to any filled entry.
    pub fn resolve(&self, locale: &Locale) -> Option<&str> {
        let filled = |key: &str| self.get(key).filter(|text| !text.trim().is_empty());

        filled(locale.as_str())
            .or_else(|| filled(FALLBACK_LOCALE))
            .or_else(|| {
                self.0
                    .values()
                    .map(String::as_str)
                    .find(|text| !text.trim().is_empty())
            })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Translations
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(locale, text)| (locale.into(), text.into()))
                .collect(),
        )
    }
}

/// Locale negotiated for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(String);

impl Locale {
    /// Accepts a language tag such as `fr-CA`; unsupported languages yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        SUPPORTED_LOCALES
            .contains(&primary.as_str())
            .then_some(Self(primary))
    }

    /// First supported language of an `Accept-Language` header value.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|entry| entry.split(';').next())
            .find_map(Self::parse)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self(FALLBACK_LOCALE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_requested_then_english() {
        let text: Translations = [("en", "Gala"), ("fr", "Gala du soir"), ("ar", " ")]
            .into_iter()
            .collect();

        let fr = Locale::parse("fr").unwrap();
        let ar = Locale::parse("ar").unwrap();
        assert_eq!(text.resolve(&fr), Some("Gala du soir"));
        assert_eq!(text.resolve(&ar), Some("Gala"));
    }

    #[test]
    fn resolve_falls_back_to_any_filled_entry() {
        let text: Translations = [("ar", "حفل")].into_iter().collect();
        assert_eq!(text.resolve(&Locale::default()), Some("حفل"));
        assert_eq!(Translations::new().resolve(&Locale::default()), None);
    }

    #[test]
    fn blank_entries_do_not_count_as_content() {
        let text: Translations = [("en", "  "), ("fr", "")].into_iter().collect();
        assert!(!text.has_content());
    }

    #[test]
    fn reports_unknown_locale_keys() {
        let text: Translations = [("en", "Hi"), ("de", "Hallo")].into_iter().collect();
        assert_eq!(text.unsupported_locales(), vec!["de"]);
    }

    #[test]
    fn accept_language_picks_first_supported() {
        let locale = Locale::from_accept_language("de-DE,fr-CA;q=0.8,en;q=0.5").unwrap();
        assert_eq!(locale.as_str(), "fr");
        assert!(Locale::from_accept_language("de, it").is_none());
    }

    #[test]
    fn serializes_as_plain_object() {
        let text: Translations = [("en", "Talk")].into_iter().collect();
        assert_eq!(serde_json::to_string(&text).unwrap(), r#"{"en":"Talk"}"#);
    }
}
