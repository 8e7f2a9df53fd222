use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{Provider, ProviderFuture, ProviderUsage, TagHandling, TranslationUnit};

const FREE_BASE_URL: &str = "https://api-free.deepl.com";
const PRO_BASE_URL: &str = "https://api.deepl.com";
/// DeepL rejects requests with more texts than this.
const MAX_TEXTS_PER_REQUEST: usize = 50;
/// Non-standard status DeepL uses for an exhausted character quota.
const QUOTA_EXCEEDED_STATUS: u16 = 456;

#[derive(Debug, Clone)]
pub struct DeepL {
    key: String,
    base_url: String,
    client: reqwest::Client,
}

impl DeepL {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let base_url = default_base_url(&key).to_string();
        Self {
            key,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        if !base_url.trim().is_empty() {
            self.base_url = base_url.trim().trim_end_matches('/').to_string();
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .with_context(|| "failed to build DeepL HTTP client")?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.key)
    }

    async fn translate_chunk(&self, texts: &[String], unit: &TranslationUnit) -> Result<Vec<String>> {
        let body = TranslateBody {
            text: texts,
            source_lang: unit.source_lang.to_uppercase(),
            target_lang: unit.target_lang.to_uppercase(),
            tag_handling: match unit.tag_handling {
                TagHandling::Html => Some("html"),
                TagHandling::Plain => None,
            },
        };
        let url = format!("{}/v2/translate", self.base_url);
        debug!(
            "DeepL translate: {} texts {} -> {}",
            texts.len(),
            body.source_lang,
            body.target_lang
        );
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .with_context(|| "DeepL translate request failed")?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        parse_translations(&text, texts.len())
    }

    async fn fetch_usage(&self) -> Result<ProviderUsage> {
        let url = format!("{}/v2/usage", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .with_context(|| "DeepL usage request failed")?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        parse_usage(&text)
    }
}

impl Provider for DeepL {
    fn translate(&self, unit: TranslationUnit) -> ProviderFuture<Vec<String>> {
        let provider = self.clone();
        Box::pin(async move {
            let mut out = Vec::with_capacity(unit.texts.len());
            for chunk in unit.texts.chunks(MAX_TEXTS_PER_REQUEST) {
                out.extend(provider.translate_chunk(chunk, &unit).await?);
            }
            Ok(out)
        })
    }

    fn usage(&self) -> ProviderFuture<ProviderUsage> {
        let provider = self.clone();
        Box::pin(async move { provider.fetch_usage().await })
    }
}

/// Keys of the free plan end in `:fx` and only work against the free host.
fn default_base_url(key: &str) -> &'static str {
    if key.trim().ends_with(":fx") {
        FREE_BASE_URL
    } else {
        PRO_BASE_URL
    }
}

fn api_error(status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    let message = extract_deepl_error(body).unwrap_or_else(|| body.trim().to_string());
    if status.as_u16() == QUOTA_EXCEEDED_STATUS {
        return anyhow!("DeepL quota exceeded ({}): {}", status.as_u16(), message);
    }
    anyhow!("DeepL API error ({}): {}", status, message)
}

fn parse_translations(text: &str, expected: usize) -> Result<Vec<String>> {
    let payload: TranslateResponse = serde_json::from_str(text)
        .map_err(|err| anyhow!("failed to parse DeepL response JSON: {}", err))?;
    if payload.translations.len() != expected {
        return Err(anyhow!(
            "DeepL returned {} translations for {} texts",
            payload.translations.len(),
            expected
        ));
    }
    Ok(payload
        .translations
        .into_iter()
        .map(|translation| translation.text)
        .collect())
}

fn parse_usage(text: &str) -> Result<ProviderUsage> {
    let payload: UsageResponse = serde_json::from_str(text)
        .map_err(|err| anyhow!("failed to parse DeepL usage JSON: {}", err))?;
    Ok(ProviderUsage {
        character_count: payload.character_count.unwrap_or(0),
        character_limit: payload.character_limit.unwrap_or(0),
    })
}

fn extract_deepl_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        detail: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let mut parts = Vec::new();
    if let Some(message) = parsed.message
        && !message.trim().is_empty()
    {
        parts.push(message);
    }
    if let Some(detail) = parsed.detail
        && !detail.trim().is_empty()
    {
        parts.push(format!("detail: {}", detail));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

#[derive(Debug, Serialize)]
struct TranslateBody<'a> {
    text: &'a [String],
    source_lang: String,
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag_handling: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    character_count: Option<u64>,
    character_limit: Option<u64>,
}
