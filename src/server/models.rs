use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServerRequest {
    pub(crate) contents: Map<String, Value>,
    pub(crate) source_lang: String,
    pub(crate) target_lang: TargetLang,
    #[serde(default)]
    pub(crate) access_key: Option<String>,
    #[serde(default)]
    pub(crate) deepl_api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TargetLang {
    One(String),
    Many(Vec<String>),
}

impl TargetLang {
    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            TargetLang::One(lang) => vec![lang],
            TargetLang::Many(langs) => langs,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}
