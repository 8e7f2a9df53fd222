use futures_util::future::try_join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

pub mod blocks;
pub mod error;
pub mod filters;
pub mod languages;
pub mod logging;
pub mod placeholders;
pub mod providers;
pub mod script;
pub mod server;
pub mod settings;
mod translator;

#[cfg(test)]
mod test_util;

pub use error::TranslateError;
pub use languages::LanguageRegistry;
pub use providers::{DeepL, Provider, ProviderUsage, TagHandling, TranslationUnit};
pub use translator::Translator;

/// A document plus the languages it should be translated between.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub contents: Map<String, Value>,
    pub source_lang: String,
    pub target_langs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageContents {
    pub lang: String,
    pub contents: Map<String, Value>,
}

/// Translates `request.contents` into every target language.
///
/// All target codes are validated before any provider call. Each language is
/// walked independently and concurrently; the first failure fails the whole
/// request. Results follow the (deduplicated) order of the request.
pub async fn translate_languages<P: Provider>(
    provider: &P,
    registry: &LanguageRegistry,
    request: &TranslationRequest,
) -> error::Result<Vec<LanguageContents>> {
    let targets = registry.resolve_targets(&request.target_langs)?;
    let source = registry.normalize_source(&request.source_lang)?;
    info!("translating {} -> {}", source, targets.join(", "));

    let units = targets.into_iter().map(|target| {
        let translator = Translator::new(provider.clone(), source.clone(), target);
        let contents = request.contents.clone();
        async move {
            let lang = translator.target_lang().to_string();
            debug!("{}: started", lang);
            let contents = translator.translate(contents).await?;
            debug!("{}: done", lang);
            Ok::<_, TranslateError>(LanguageContents { lang, contents })
        }
    });
    try_join_all(units).await
}

/// Rejects the request up front when the provider reports an exhausted
/// character quota.
pub async fn ensure_quota<P: Provider>(provider: &P) -> error::Result<ProviderUsage> {
    let usage = provider.usage().await.map_err(TranslateError::Provider)?;
    if usage.is_exhausted() {
        return Err(TranslateError::QuotaExceeded {
            used: usage.character_count,
            limit: usage.character_limit,
        });
    }
    debug!(
        "provider usage: {}/{} characters",
        usage.character_count, usage.character_limit
    );
    Ok(usage)
}
