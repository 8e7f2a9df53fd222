use anyhow::{Result, anyhow};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;

mod deepl;

pub use deepl::DeepL;

/// How the provider should treat inline markup in the texts it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagHandling {
    Plain,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    pub texts: Vec<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub tag_handling: TagHandling,
}

impl TranslationUnit {
    pub fn new(
        texts: Vec<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        tag_handling: TagHandling,
    ) -> Self {
        Self {
            texts,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            tag_handling,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderUsage {
    pub character_count: u64,
    pub character_limit: u64,
}

impl ProviderUsage {
    /// A zero limit means the provider reported no limit.
    pub fn is_exhausted(&self) -> bool {
        self.character_limit > 0 && self.character_count >= self.character_limit
    }
}

pub type ProviderFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

pub trait Provider: Clone + Send + Sync {
    /// Translates every text of `unit`, returning results in input order.
    fn translate(&self, unit: TranslationUnit) -> ProviderFuture<Vec<String>>;

    fn usage(&self) -> ProviderFuture<ProviderUsage>;

    fn translate_one(
        &self,
        text: String,
        source_lang: &str,
        target_lang: &str,
        tag_handling: TagHandling,
    ) -> ProviderFuture<String> {
        let pending = self.translate(TranslationUnit::new(
            vec![text],
            source_lang,
            target_lang,
            tag_handling,
        ));
        Box::pin(async move {
            let mut translated = pending.await?;
            if translated.len() != 1 {
                return Err(anyhow!(
                    "expected 1 translation, provider returned {}",
                    translated.len()
                ));
            }
            Ok(translated.remove(0))
        })
    }
}

/// The per-request key wins over the configured one.
pub fn resolve_key(override_key: Option<&str>, configured: Option<&str>) -> Result<String> {
    [override_key, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("DeepL API key not found (set DEEPL_API_KEY or deepl.api_key)"))
}
