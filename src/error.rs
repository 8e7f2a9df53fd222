use thiserror::Error;

/// Failures of a translation request.
///
/// Every variant aborts the whole request; callers never see partial
/// multi-language output.
#[derive(Error, Debug)]
pub enum TranslateError {
    /// Bad credentials or unsupported language codes, detected before any
    /// provider call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Embedded block attributes or placeholder output that cannot be trusted.
    #[error("data integrity fault: {0}")]
    DataIntegrity(String),

    /// Network or provider-side failure. Not retried.
    #[error("translation provider failed: {0:#}")]
    Provider(#[source] anyhow::Error),

    /// Provider usage limit reached.
    #[error("translation quota exceeded ({used}/{limit} characters)")]
    QuotaExceeded { used: u64, limit: u64 },
}

impl TranslateError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrity(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TranslateError::Validation(_) => "validation",
            TranslateError::DataIntegrity(_) => "data_integrity",
            TranslateError::Provider(_) => "provider",
            TranslateError::QuotaExceeded { .. } => "quota",
        }
    }
}

pub type Result<T, E = TranslateError> = std::result::Result<T, E>;
