use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::chat;

const DEFAULT_ENV_PREFIX: &str = "KABAR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub ui: UIConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatConfig {
    /// The generative-language API key. Empty means the chat surface is
    /// disabled; the key is never embedded in source.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
            timeout: default_timeout(),
        }
    }
}

fn default_model() -> String {
    chat::DEFAULT_MODEL.to_string()
}

fn default_endpoint() -> String {
    chat::DEFAULT_ENDPOINT.to_string()
}

fn default_user_agent() -> String {
    format!("kabar-tui/{}", crate::VERSION)
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}

fn default_theme() -> String {
    "default".into()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        if path.exists() {
            let from_file = read_config_file(path)?;
            cfg = merge_config(cfg, from_file);
        }
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    cfg = merge_config(cfg, load_env(prefix)?);

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if !other.chat.api_key.is_empty() {
        base.chat.api_key = other.chat.api_key;
    }
    if !other.chat.model.is_empty() {
        base.chat.model = other.chat.model;
    }
    if !other.chat.endpoint.is_empty() {
        base.chat.endpoint = other.chat.endpoint;
    }
    if !other.chat.user_agent.is_empty() {
        base.chat.user_agent = other.chat.user_agent;
    }
    if !other.chat.timeout.is_zero() {
        base.chat.timeout = other.chat.timeout;
    }

    if !other.ui.theme.is_empty() {
        base.ui.theme = other.ui.theme;
    }

    base
}

fn load_env(prefix: &str) -> Result<Config> {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    let mut cfg = empty_layer();
    for (key, value) in map {
        apply_env_value(&mut cfg, &key, value);
    }

    Ok(cfg)
}

// An all-empty layer so merge_config only adopts values the environment
// actually sets.
fn empty_layer() -> Config {
    Config {
        chat: ChatConfig {
            api_key: String::new(),
            model: String::new(),
            endpoint: String::new(),
            user_agent: String::new(),
            timeout: Duration::ZERO,
        },
        ui: UIConfig {
            theme: String::new(),
        },
    }
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "chat.api_key" => cfg.chat.api_key = value,
        "chat.model" => cfg.chat.model = value,
        "chat.endpoint" => cfg.chat.endpoint = value,
        "chat.user_agent" => cfg.chat.user_agent = value,
        "chat.timeout" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.chat.timeout = duration;
            }
        }
        "ui.theme" => cfg.ui.theme = value,
        _ => {}
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kabar-tui").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_defaults_without_files() {
        let cfg = load(LoadOptions {
            config_file: Some(PathBuf::from("/nonexistent/kabar.yaml")),
            env_prefix: Some("KABAR_TEST_NONE".into()),
        })
        .unwrap();
        assert_eq!(cfg.ui.theme, "default");
        assert_eq!(cfg.chat.model, chat::DEFAULT_MODEL);
        assert_eq!(cfg.chat.timeout, Duration::from_secs(30));
        assert!(cfg.chat.api_key.is_empty());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "chat:\n  api_key: rahasia\n  timeout: 10s\nui:\n  theme: dracula"
        )
        .unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(file.path().to_path_buf()),
            env_prefix: Some("KABAR_TEST_FILE".into()),
        })
        .unwrap();
        assert_eq!(cfg.chat.api_key, "rahasia");
        assert_eq!(cfg.chat.timeout, Duration::from_secs(10));
        assert_eq!(cfg.ui.theme, "dracula");
        // Unset fields keep their defaults.
        assert_eq!(cfg.chat.model, chat::DEFAULT_MODEL);
    }

    #[test]
    fn env_overrides() {
        env::set_var("KABAR_TEST_ENV_CHAT__API_KEY", "dari-env");
        let cfg = load(LoadOptions {
            config_file: Some(PathBuf::from("/nonexistent/kabar.yaml")),
            env_prefix: Some("KABAR_TEST_ENV".into()),
        })
        .unwrap();
        assert_eq!(cfg.chat.api_key, "dari-env");
        env::remove_var("KABAR_TEST_ENV_CHAT__API_KEY");
    }
}
