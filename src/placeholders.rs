use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, TranslateError};
use crate::providers::{Provider, TagHandling, TranslationUnit};

/// Text parked during the walk, translated in one batch at the end.
#[derive(Debug, Default)]
pub struct PlaceholderMap {
    entries: Vec<Placeholder>,
}

#[derive(Debug)]
struct Placeholder {
    token: String,
    original: String,
    /// Number of JSON string encodings wrapping the token in the final text.
    nesting: usize,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers `text` and returns the token that stands in for it.
    ///
    /// `nesting` is how many JSON string literals will enclose the token once
    /// the document is serialized; the translation is escaped that many times
    /// on resolution.
    pub fn reserve(&mut self, text: impl Into<String>, nesting: usize) -> String {
        let token = loop {
            let candidate = Uuid::new_v4().to_string();
            if !self.entries.iter().any(|entry| entry.token == candidate) {
                break candidate;
            }
        };
        self.entries.push(Placeholder {
            token: token.clone(),
            original: text.into(),
            nesting,
        });
        token
    }

    /// Translates every parked text in a single provider call and writes the
    /// results over their tokens in `document`.
    pub async fn resolve_all<P: Provider>(
        self,
        provider: &P,
        source_lang: &str,
        target_lang: &str,
        document: &str,
    ) -> Result<String> {
        if self.entries.is_empty() {
            return Ok(document.to_string());
        }
        debug!(
            "resolving {} placeholders into {}",
            self.entries.len(),
            target_lang
        );
        let originals = self
            .entries
            .iter()
            .map(|entry| entry.original.clone())
            .collect::<Vec<_>>();
        let translated = provider
            .translate(TranslationUnit::new(
                originals,
                source_lang,
                target_lang,
                TagHandling::Plain,
            ))
            .await
            .map_err(TranslateError::Provider)?;
        if translated.len() != self.entries.len() {
            return Err(TranslateError::Provider(anyhow::anyhow!(
                "expected {} translations, provider returned {}",
                self.entries.len(),
                translated.len()
            )));
        }
        substitute_tokens(document, &self.entries, &translated)
    }
}

/// Replaces every token in one left-to-right pass, so text written in place
/// of a token is never scanned again.
fn substitute_tokens(document: &str, entries: &[Placeholder], translated: &[String]) -> Result<String> {
    let mut hits = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let offsets = document
            .match_indices(entry.token.as_str())
            .map(|(offset, _)| offset)
            .collect::<Vec<_>>();
        if offsets.len() != 1 {
            return Err(TranslateError::data_integrity(format!(
                "placeholder {} found {} times in document",
                entry.token,
                offsets.len()
            )));
        }
        hits.push((offsets[0], idx));
    }
    hits.sort_unstable();

    let mut out = String::with_capacity(document.len());
    let mut last = 0;
    for (offset, idx) in hits {
        out.push_str(&document[last..offset]);
        out.push_str(&escape_json(&translated[idx], entries[idx].nesting));
        last = offset + entries[idx].token.len();
    }
    out.push_str(&document[last..]);
    Ok(out)
}

/// Escapes `text` for placement inside `levels` nested JSON string literals.
fn escape_json(text: &str, levels: usize) -> String {
    let mut out = text.to_string();
    for _ in 0..levels {
        let quoted = Value::String(out).to_string();
        out = quoted[1..quoted.len() - 1].to_string();
    }
    out
}
