use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "vocab.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    pub cache_database_url: String,
    pub cache_key: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:5000".into(),
            cache_database_url: "sqlite://./data/vocab.db".into(),
            cache_key: client_core::DEFAULT_CACHE_KEY.into(),
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base: Option<String>,
    cache_database_url: Option<String>,
    cache_key: Option<String>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(SETTINGS_FILE));
    apply_env(&mut settings, |name| std::env::var(name).ok());
    settings
}

pub(crate) fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };

    let file_cfg = match toml::from_str::<FileSettings>(&raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.api_base {
        settings.api_base = v;
    }
    if let Some(v) = file_cfg.cache_database_url {
        settings.cache_database_url = normalize_cache_url(&v);
    }
    if let Some(v) = file_cfg.cache_key {
        settings.cache_key = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = Some(v);
    }
}

/// Reads `VOCAB_*` variables, with `APP__*` aliases taking precedence.
pub(crate) fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    let lookup = |name: &str| var(&format!("APP__{name}")).or_else(|| var(&format!("VOCAB_{name}")));

    if let Some(v) = lookup("API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = lookup("CACHE_DATABASE_URL") {
        settings.cache_database_url = normalize_cache_url(&v);
    }
    if let Some(v) = lookup("CACHE_KEY") {
        settings.cache_key = v;
    }
    if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = Some(parsed),
            Err(_) => warn!(value = %v, "ignoring non-numeric request timeout"),
        }
    }
}

/// Turns a plain file path into a `sqlite://` url; urls pass through.
pub fn normalize_cache_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().cache_database_url;
    }

    if raw_database_url.starts_with("sqlite:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
