use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_addr: String,
    pub access_key: Option<String>,
    pub deepl_api_key: Option<String>,
    pub deepl_base_url: Option<String>,
    pub deepl_timeout: Option<Duration>,
    pub language_aliases: HashMap<String, String>,
    pub log_file: Option<String>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:4009".to_string(),
            access_key: None,
            deepl_api_key: None,
            deepl_base_url: None,
            deepl_timeout: None,
            language_aliases: HashMap::new(),
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    server: Option<ServerSettings>,
    deepl: Option<DeepLSettings>,
    languages: Option<LanguageSettings>,
    logging: Option<LoggingSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSettings {
    addr: Option<String>,
    access_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DeepLSettings {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LanguageSettings {
    aliases: Option<HashMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingSettings {
    file: Option<String>,
    level: Option<String>,
}

/// Loads the embedded defaults, then `settings.toml` / `settings.local.toml`
/// from the working directory and the home config directory, then
/// `extra_path`, then environment variables.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    let mut settings = load_settings_from(&ordered_paths)?;
    settings.merge_env(get_env);
    Ok(settings)
}

fn load_settings_from(paths: &[PathBuf]) -> Result<Settings> {
    let mut settings = Settings::default();
    let defaults: SettingsFile = toml::from_str(DEFAULT_SETTINGS_TOML)
        .with_context(|| "failed to parse embedded default settings")?;
    settings.merge(defaults);

    for path in paths {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }
    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(server) = incoming.server {
            if let Some(addr) = non_empty(server.addr) {
                self.server_addr = addr;
            }
            if let Some(key) = non_empty(server.access_key) {
                self.access_key = Some(key);
            }
        }
        if let Some(deepl) = incoming.deepl {
            if let Some(key) = non_empty(deepl.api_key) {
                self.deepl_api_key = Some(key);
            }
            if let Some(url) = non_empty(deepl.base_url) {
                self.deepl_base_url = Some(url);
            }
            if let Some(secs) = deepl.timeout_secs {
                self.deepl_timeout = (secs > 0).then(|| Duration::from_secs(secs));
            }
        }
        if let Some(languages) = incoming.languages {
            if let Some(aliases) = languages.aliases {
                self.language_aliases.extend(aliases);
            }
        }
        if let Some(logging) = incoming.logging {
            if let Some(file) = non_empty(logging.file) {
                self.log_file = Some(file);
            }
            if let Some(level) = non_empty(logging.level) {
                self.log_level = level;
            }
        }
    }

    fn merge_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("DEEPL_API_KEY") {
            self.deepl_api_key = Some(key);
        }
        if let Some(url) = lookup("DEEPL_BASE_URL") {
            self.deepl_base_url = Some(url);
        }
        if let Some(key) = lookup("ACCESS_KEY") {
            self.access_key = Some(key);
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".wp-translator-rust"))
        }
    })
}
