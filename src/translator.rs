use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::debug;

use crate::blocks;
use crate::error::{Result, TranslateError};
use crate::filters;
use crate::placeholders::PlaceholderMap;
use crate::providers::{Provider, TagHandling};
use crate::script::contains_japanese;

/// Location of a node during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    depth: usize,
    /// JSON string literals that will enclose the node once the document is
    /// serialized. Block attributes live inside a string leaf, so they sit
    /// one level deeper than the leaf itself.
    nesting: usize,
}

impl Position {
    fn root() -> Self {
        Self {
            depth: 0,
            nesting: 1,
        }
    }

    fn child(self) -> Self {
        Self {
            depth: self.depth + 1,
            nesting: self.nesting,
        }
    }

    fn embedded(self) -> Self {
        Self {
            depth: self.depth + 1,
            nesting: self.nesting + 1,
        }
    }
}

/// Translates one document into one target language.
///
/// Top-level strings go to the provider straight away in HTML mode. Block
/// attributes found in the translated markup, and any other nested string,
/// are only translated when they contain Japanese script; those are parked
/// behind placeholders and sent in a single batch once the walk is done.
pub struct Translator<P: Provider> {
    provider: P,
    source_lang: String,
    target_lang: String,
    placeholders: PlaceholderMap,
}

impl<P: Provider> Translator<P> {
    pub fn new(provider: P, source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            provider,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            placeholders: PlaceholderMap::new(),
        }
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    pub async fn translate(mut self, contents: Map<String, Value>) -> Result<Map<String, Value>> {
        let mut walked = Map::with_capacity(contents.len());
        for (key, value) in contents {
            let value = self.walk(value, Position::root()).await?;
            walked.insert(key, value);
        }

        if self.placeholders.is_empty() {
            return Ok(walked);
        }

        let document = Value::Object(walked).to_string();
        let placeholders = std::mem::take(&mut self.placeholders);
        let resolved = placeholders
            .resolve_all(
                &self.provider,
                &self.source_lang,
                &self.target_lang,
                &document,
            )
            .await?;
        serde_json::from_str(&resolved).map_err(|err| {
            TranslateError::data_integrity(format!("resolved document is not valid JSON: {}", err))
        })
    }

    fn walk<'a>(&'a mut self, node: Value, position: Position) -> BoxFuture<'a, Result<Value>> {
        async move {
            match node {
                Value::String(text) => Ok(Value::String(self.translate_text(text, position).await?)),
                Value::Object(map) => {
                    let mut out = Map::with_capacity(map.len());
                    for (key, value) in map {
                        out.insert(key, self.walk(value, position.child()).await?);
                    }
                    Ok(Value::Object(out))
                }
                Value::Array(values) => {
                    let mut out = Vec::with_capacity(values.len());
                    for value in values {
                        out.push(self.walk(value, position.child()).await?);
                    }
                    Ok(Value::Array(out))
                }
                other => Ok(other),
            }
        }
        .boxed()
    }

    async fn translate_text(&mut self, text: String, position: Position) -> Result<String> {
        if position.depth > 0 {
            if contains_japanese(&text) {
                return Ok(self.placeholders.reserve(text, position.nesting));
            }
            return Ok(text);
        }

        if text.trim().is_empty() {
            return Ok(text);
        }
        let translated = self
            .provider
            .translate_one(text, &self.source_lang, &self.target_lang, TagHandling::Html)
            .await
            .map_err(TranslateError::Provider)?;
        let with_blocks = self.translate_blocks(&translated, position).await?;
        Ok(filters::apply(&with_blocks))
    }

    async fn translate_blocks(&mut self, text: &str, position: Position) -> Result<String> {
        let found = blocks::extract_blocks(text)?;
        if found.is_empty() {
            return Ok(text.to_string());
        }
        debug!("{} blocks found in translated text", found.len());
        let mut replacements = Vec::with_capacity(found.len());
        for block in &found {
            let attributes = block.parse_attributes()?;
            let walked = self
                .walk(Value::Object(attributes), position.embedded())
                .await?;
            replacements.push(walked.to_string());
        }
        blocks::substitute(text, &found, &replacements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::StubProvider;
    use serde_json::json;

    fn contents(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn translates_top_level_strings_and_keeps_shape() {
        let provider = StubProvider::new(&[("Hello", "Hallo"), ("World", "Welt")]);
        let translator = Translator::new(provider.clone(), "en", "de");
        let input = contents(json!({
            "title": "Hello",
            "count": 3,
            "flag": true,
            "none": null,
            "meta": {"label": "World", "size": 1.5},
            "tags": ["World", 7]
        }));

        let output = translator.translate(input).await.unwrap();

        assert_eq!(
            Value::Object(output),
            json!({
                "title": "Hallo",
                "count": 3,
                "flag": true,
                "none": null,
                "meta": {"label": "World", "size": 1.5},
                "tags": ["World", 7]
            })
        );
        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tag_handling, TagHandling::Html);
    }

    #[tokio::test]
    async fn preserves_key_order() {
        let provider = StubProvider::new(&[]);
        let translator = Translator::new(provider, "en", "de");
        let input = contents(json!({"z": "1", "a": "2", "m": {"y": 1, "b": 2}}));
        let output = translator.translate(input).await.unwrap();
        let keys = output.keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys, vec!["z", "a", "m"]);
        let nested = output["m"].as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        assert_eq!(nested, vec!["y", "b"]);
    }

    #[tokio::test]
    async fn nested_strings_are_gated_by_script() {
        let provider = StubProvider::new(&[("こんにちは", "Hallo")]);
        let translator = Translator::new(provider.clone(), "ja", "de");
        let input = contents(json!({
            "nested": {"greeting": "こんにちは", "plain": "hello"}
        }));

        let output = translator.translate(input).await.unwrap();

        assert_eq!(output["nested"]["greeting"], "Hallo");
        assert_eq!(output["nested"]["plain"], "hello");
        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].texts, vec!["こんにちは"]);
        assert_eq!(calls[0].tag_handling, TagHandling::Plain);
    }

    #[tokio::test]
    async fn block_attributes_are_translated_through_placeholders() {
        let source = "<!-- wp:image {\"id\":12,\"alt\":\"猫\",\"caption\":\"cat\"} /-->\n<p>猫です</p>";
        let translated = "<!-- wp:image {\"id\":12,\"alt\":\"猫\",\"caption\":\"cat\"} /-->\n<p>It is a cat</p>";
        let provider = StubProvider::new(&[(source, translated), ("猫", "A \"cat\"")]);
        let translator = Translator::new(provider.clone(), "ja", "en-US");

        let output = translator
            .translate(contents(json!({"content": source})))
            .await
            .unwrap();

        let content = output["content"].as_str().unwrap();
        let blocks = blocks::extract_blocks(content).unwrap();
        assert_eq!(blocks.len(), 1);
        let attrs = blocks[0].parse_attributes().unwrap();
        assert_eq!(Value::Object(attrs), json!({"id": 12, "alt": "A \"cat\"", "caption": "cat"}));
        assert!(content.ends_with("/-->\n<p>It is a cat</p>"));
        // one immediate call for the leaf, one batch for the placeholders
        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].tag_handling, TagHandling::Html);
        assert_eq!(calls[1].tag_handling, TagHandling::Plain);
    }

    #[tokio::test]
    async fn text_without_blocks_is_returned_as_translated() {
        let provider = StubProvider::new(&[("<p>{not a block}</p>", "<p>{kein Block}</p>")]);
        let translator = Translator::new(provider, "en", "de");
        let output = translator
            .translate(contents(json!({"body": "<p>{not a block}</p>"})))
            .await
            .unwrap();
        assert_eq!(output["body"], "<p>{kein Block}</p>");
    }

    #[tokio::test]
    async fn embed_filter_runs_after_translation() {
        let html = "<div class=\"wp-block-embed__wrapper\">https://youtu.be/x</div>";
        let provider = StubProvider::new(&[]);
        let translator = Translator::new(provider, "en", "de");
        let output = translator
            .translate(contents(json!({"body": html})))
            .await
            .unwrap();
        assert_eq!(
            output["body"],
            "<div class=\"wp-block-embed__wrapper\">\nhttps://youtu.be/x\n</div>"
        );
    }

    #[tokio::test]
    async fn empty_top_level_string_skips_provider() {
        let provider = StubProvider::new(&[]);
        let translator = Translator::new(provider.clone(), "en", "de");
        let output = translator
            .translate(contents(json!({"title": "", "spaces": "  "})))
            .await
            .unwrap();
        assert_eq!(output["title"], "");
        assert_eq!(output["spaces"], "  ");
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_block_json_aborts() {
        let provider = StubProvider::new(&[]);
        let translator = Translator::new(provider, "en", "de");
        let err = translator
            .translate(contents(json!({"body": "<!-- wp:foo {bad json} -->"})))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::DataIntegrity(_)));
    }

    #[tokio::test]
    async fn provider_failure_aborts() {
        let provider = StubProvider::failing();
        let translator = Translator::new(provider, "en", "de");
        let err = translator
            .translate(contents(json!({"title": "Hello"})))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::Provider(_)));
    }
}
