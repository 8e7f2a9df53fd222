use std::collections::HashMap;

use crate::error::{Result, TranslateError};

/// Canonical target codes accepted by DeepL.
const TARGET_LANGUAGES: &[&str] = &[
    "ar", "bg", "cs", "da", "de", "el", "en-GB", "en-US", "es", "es-419", "et", "fi", "fr", "hu",
    "id", "it", "ja", "ko", "lt", "lv", "nb", "nl", "pl", "pt-BR", "pt-PT", "ro", "ru", "sk",
    "sl", "sv", "tr", "uk", "zh", "zh-HANS", "zh-HANT",
];

const SOURCE_LANGUAGES: &[&str] = &[
    "ar", "bg", "cs", "da", "de", "el", "en", "es", "et", "fi", "fr", "hu", "id", "it", "ja", "ko",
    "lt", "lv", "nb", "nl", "pl", "pt", "ro", "ru", "sk", "sl", "sv", "tr", "uk", "zh",
];

const DEFAULT_ALIASES: &[(&str, &str)] = &[("en", "en-US"), ("pt", "pt-PT")];

#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    aliases: HashMap<String, String>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}

impl LanguageRegistry {
    /// Builds the registry with the built-in aliases, then `extra` on top.
    pub fn new(extra: &HashMap<String, String>) -> Self {
        let mut aliases = HashMap::new();
        for (from, to) in DEFAULT_ALIASES {
            aliases.insert(canonical_case(from), canonical_case(to));
        }
        for (from, to) in extra {
            if from.trim().is_empty() || to.trim().is_empty() {
                continue;
            }
            aliases.insert(canonical_case(from), canonical_case(to));
        }
        Self { aliases }
    }

    pub fn normalize(&self, code: &str) -> String {
        let code = canonical_case(code);
        match self.aliases.get(&code) {
            Some(alias) => alias.clone(),
            None => code,
        }
    }

    pub fn is_supported(&self, code: &str) -> bool {
        let code = self.normalize(code);
        TARGET_LANGUAGES.contains(&code.as_str())
    }

    /// Normalizes every requested target, failing the whole batch if any code
    /// is unsupported. Duplicates after normalization are dropped.
    pub fn resolve_targets(&self, codes: &[String]) -> Result<Vec<String>> {
        if codes.is_empty() {
            return Err(TranslateError::validation("no target language given"));
        }
        let mut resolved: Vec<String> = Vec::with_capacity(codes.len());
        for raw in codes {
            if !self.is_supported(raw) {
                return Err(TranslateError::validation(format!(
                    "unsupported target language '{}'",
                    raw
                )));
            }
            let code = self.normalize(raw);
            if !resolved.contains(&code) {
                resolved.push(code);
            }
        }
        Ok(resolved)
    }

    /// Source codes carry no region: `en-US` is accepted as `en`.
    pub fn normalize_source(&self, code: &str) -> Result<String> {
        let canonical = canonical_case(code);
        let base = canonical
            .split('-')
            .next()
            .unwrap_or_default()
            .to_string();
        if SOURCE_LANGUAGES.contains(&base.as_str()) {
            Ok(base)
        } else {
            Err(TranslateError::validation(format!(
                "unsupported source language '{}'",
                code
            )))
        }
    }
}

/// `EN_us` → `en-US`: lowercase language subtag, uppercase the rest.
fn canonical_case(code: &str) -> String {
    let code = code.trim().replace('_', "-");
    match code.split_once('-') {
        Some((lang, rest)) if !rest.is_empty() => {
            format!("{}-{}", lang.to_lowercase(), rest.to_uppercase())
        }
        Some((lang, _)) => lang.to_lowercase(),
        None => code.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_default_aliases() {
        let registry = LanguageRegistry::default();
        assert_eq!(registry.normalize("en"), "en-US");
        assert_eq!(registry.normalize("pt"), "pt-PT");
        assert_eq!(registry.normalize("de"), "de");
        assert_eq!(registry.normalize("en-GB"), "en-GB");
    }

    #[test]
    fn normalizes_case_before_lookup() {
        let registry = LanguageRegistry::default();
        assert_eq!(registry.normalize("EN"), "en-US");
        assert_eq!(registry.normalize(" pt_br "), "pt-BR");
        assert_eq!(registry.normalize("zh-hans"), "zh-HANS");
        assert!(registry.is_supported("DE"));
        assert!(!registry.is_supported("xx"));
    }

    #[test]
    fn extra_aliases_override_defaults() {
        let mut extra = HashMap::new();
        extra.insert("pt".to_string(), "pt-BR".to_string());
        extra.insert("zh".to_string(), "zh-hans".to_string());
        let registry = LanguageRegistry::new(&extra);
        assert_eq!(registry.normalize("pt"), "pt-BR");
        assert_eq!(registry.normalize("zh"), "zh-HANS");
        assert_eq!(registry.normalize("en"), "en-US");
    }

    #[test]
    fn resolve_targets_fails_whole_batch() {
        let registry = LanguageRegistry::default();
        let codes = vec!["de".to_string(), "xx".to_string(), "fr".to_string()];
        let err = registry.resolve_targets(&codes).unwrap_err();
        assert!(matches!(err, TranslateError::Validation(_)));
        assert!(err.to_string().contains("'xx'"));
    }

    #[test]
    fn resolve_targets_dedups_after_normalization() {
        let registry = LanguageRegistry::default();
        let codes = vec![
            "de".to_string(),
            "en".to_string(),
            "DE".to_string(),
            "en-us".to_string(),
        ];
        let resolved = registry.resolve_targets(&codes).unwrap();
        assert_eq!(resolved, vec!["de", "en-US"]);
    }

    #[test]
    fn resolve_targets_follows_configured_aliases() {
        let mut extra = HashMap::new();
        extra.insert("de-ch".to_string(), "de".to_string());
        extra.insert("pt".to_string(), "pt-XX".to_string());
        let registry = LanguageRegistry::new(&extra);
        let resolved = registry.resolve_targets(&["de-CH".to_string()]).unwrap();
        assert_eq!(resolved, vec!["de"]);
        assert!(registry.resolve_targets(&["pt".to_string()]).is_err());
    }

    #[test]
    fn resolve_targets_rejects_empty_list() {
        let registry = LanguageRegistry::default();
        assert!(registry.resolve_targets(&[]).is_err());
    }

    #[test]
    fn source_codes_drop_region() {
        let registry = LanguageRegistry::default();
        assert_eq!(registry.normalize_source("en-US").unwrap(), "en");
        assert_eq!(registry.normalize_source("JA").unwrap(), "ja");
        assert!(registry.normalize_source("xx").is_err());
    }
}
