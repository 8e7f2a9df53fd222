use regex::Regex;
use std::sync::LazyLock;

static EMBED_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<div class="wp-block-embed__wrapper">\s*)(https?://.*?)(</div>)"#)
        .expect("embed url pattern")
});

/// Fixups applied to provider output before it is stored back in the
/// document.
pub fn apply(text: &str) -> String {
    space_embed_urls(text)
}

/// WordPress only turns an embed URL into an embed when it sits on its own
/// line; the provider tends to collapse those line breaks.
pub fn space_embed_urls(text: &str) -> String {
    EMBED_URL.replace_all(text, "${1}\n${2}\n${3}").into_owned()
}
