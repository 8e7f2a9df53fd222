use axum::http::StatusCode;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{error, info};

use crate::error::TranslateError;
use crate::providers::{self, DeepL, Provider};
use crate::settings::Settings;
use crate::{LanguageContents, TranslationRequest, ensure_quota, translate_languages};

use super::models::ServerRequest;
use super::state::ServerState;

pub(crate) const FAILURE_MESSAGE: &str = "translation failed";

#[derive(Debug)]
pub(crate) struct ServerError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl ServerError {
    /// Every fault looks the same to the caller; the detail only goes to the
    /// log.
    fn failed(err: &TranslateError) -> Self {
        error!("translation request failed ({}): {}", err.kind(), err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<TranslateError> for ServerError {
    fn from(err: TranslateError) -> Self {
        ServerError::failed(&err)
    }
}

pub(crate) async fn translate_request(
    state: &ServerState,
    request: ServerRequest,
) -> Result<Vec<LanguageContents>, ServerError> {
    info!("translation request received at {}", timestamp());
    check_access_key(&state.settings, request.access_key.as_deref())?;

    let key = providers::resolve_key(
        request.deepl_api_key.as_deref(),
        state.settings.deepl_api_key.as_deref(),
    )
    .map_err(|err| TranslateError::validation(err.to_string()))?;
    let provider = build_provider(&state.settings, key)?;
    let check_quota = has_caller_key(request.deepl_api_key.as_deref());

    translate_with(state, &provider, request, check_quota).await
}

pub(crate) async fn translate_with<P: Provider>(
    state: &ServerState,
    provider: &P,
    request: ServerRequest,
    check_quota: bool,
) -> Result<Vec<LanguageContents>, ServerError> {
    let translation = TranslationRequest {
        contents: request.contents,
        source_lang: request.source_lang,
        target_langs: request.target_lang.into_vec(),
    };
    // fail on bad codes before the quota call reaches the provider
    state.registry.resolve_targets(&translation.target_langs)?;
    state.registry.normalize_source(&translation.source_lang)?;

    if check_quota {
        ensure_quota(provider).await?;
    }

    let output = translate_languages(provider, &state.registry, &translation).await?;
    info!("translation request done ({} languages)", output.len());
    Ok(output)
}

fn check_access_key(settings: &Settings, supplied: Option<&str>) -> Result<(), TranslateError> {
    let Some(expected) = settings.access_key.as_deref() else {
        return Ok(());
    };
    match supplied {
        Some(key) if key == expected => Ok(()),
        Some(_) => Err(TranslateError::validation("access key mismatch")),
        None => Err(TranslateError::validation("access key missing")),
    }
}

/// Only a non-blank `deeplApiKey` replaces the configured key, so only then
/// is the caller's quota checked.
fn has_caller_key(supplied: Option<&str>) -> bool {
    supplied.is_some_and(|key| !key.trim().is_empty())
}

fn build_provider(settings: &Settings, key: String) -> Result<DeepL, TranslateError> {
    let mut provider = DeepL::new(key);
    if let Some(url) = settings.deepl_base_url.as_deref() {
        provider = provider.with_base_url(url);
    }
    if let Some(timeout) = settings.deepl_timeout {
        provider = provider
            .with_timeout(timeout)
            .map_err(TranslateError::Provider)?;
    }
    Ok(provider)
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown time".to_string())
}
