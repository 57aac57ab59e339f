//! CLI flags, env fallbacks and the optional TOML file, resolved into one service config.
//!
//! Precedence is CLI flag > environment variable > config file > built-in default.
//! The config file lives at `$CALLTERM_CONFIG_DIR/config.toml` or
//! `~/.config/callterm/config.toml` unless `--config` points elsewhere.

use anyhow::{bail, Context, Result};
use clap::Parser;
use reqwest::Url;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.vapi.ai";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const CALL_ID_PLACEHOLDER: &str = "{call_id}";
const CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "CALLTERM_CONFIG_DIR";

/// Command-line surface. Most values may also come from env vars or the config file.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "callterm",
    about = "Collect contact details and run an outbound voice-assistant call",
    author,
    version
)]
pub struct AppConfig {
    /// Base URL of the voice-assistant service API
    #[arg(long = "api-url", env = "CALLTERM_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for the service API
    #[arg(long = "api-key", env = "CALLTERM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Assistant that places the call
    #[arg(long = "assistant-id", env = "CALLTERM_ASSISTANT_ID")]
    pub assistant_id: Option<String>,

    /// Caller-ID phone number registered with the service
    #[arg(long = "phone-number-id", env = "CALLTERM_PHONE_NUMBER_ID")]
    pub phone_number_id: Option<String>,

    /// Live event WebSocket URL; `{call_id}` is replaced with the started call id
    #[arg(long = "events-url", env = "CALLTERM_EVENTS_URL")]
    pub events_url: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[arg(long = "request-timeout-secs")]
    pub request_timeout_secs: Option<u64>,

    /// Read settings from this TOML file instead of the default location
    #[arg(long = "config", env = "CALLTERM_CONFIG")]
    pub config_path: Option<PathBuf>,

    /// Print the resolved configuration and exit
    #[arg(long = "check-config", default_value_t = false)]
    pub check_config: bool,

    /// Write debug and trace logs to the temp dir
    #[arg(long = "logs", default_value_t = false)]
    pub logs: bool,

    /// Force logging off even when --logs is set
    #[arg(long = "no-logs", default_value_t = false)]
    pub no_logs: bool,

    /// Allow caller details (names, numbers, emails) in the debug log
    #[arg(long = "log-content", default_value_t = false)]
    pub log_content: bool,
}

/// Settings persisted in `config.toml`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub assistant_id: Option<String>,
    pub phone_number_id: Option<String>,
    pub events_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Validated settings needed to talk to the voice-assistant service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_url: Url,
    pub api_key: String,
    pub assistant_id: String,
    pub phone_number_id: Option<String>,
    pub events_url: EventsUrlTemplate,
    pub request_timeout: Duration,
}

/// WebSocket URL pattern for a call's live event feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsUrlTemplate(String);

impl EventsUrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Default feed location next to the REST API: `ws(s)://host/call/{call_id}/events`.
    pub fn derived_from(api_url: &Url) -> Self {
        let scheme = if api_url.scheme() == "https" {
            "wss"
        } else {
            "ws"
        };
        let rest = &api_url.as_str()[api_url.scheme().len()..];
        Self(format!(
            "{scheme}{}/call/{CALL_ID_PLACEHOLDER}/events",
            rest.trim_end_matches('/')
        ))
    }

    pub fn for_call(&self, call_id: &str) -> String {
        self.0.replace(CALL_ID_PLACEHOLDER, call_id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AppConfig {
    pub fn logging_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }

    /// Merge CLI, env and file settings and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error when an explicit config file is unreadable or invalid,
    /// a required value is missing, or a URL/timeout is malformed.
    pub fn resolve(&self) -> Result<ServiceConfig> {
        let file = self.load_file_config()?;
        self.resolve_with(&file)
    }

    fn load_file_config(&self) -> Result<FileConfig> {
        if let Some(path) = &self.config_path {
            return read_file_config(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => read_file_config(&path),
            _ => Ok(FileConfig::default()),
        }
    }

    pub(crate) fn resolve_with(&self, file: &FileConfig) -> Result<ServiceConfig> {
        let api_url_raw =
            pick(&self.api_url, &file.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&api_url_raw)
            .with_context(|| format!("invalid api url: {api_url_raw}"))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            bail!("api url must use http or https: {api_url_raw}");
        }

        let Some(api_key) = pick(&self.api_key, &file.api_key) else {
            bail!("missing api key (set --api-key, CALLTERM_API_KEY or api_key in config.toml)");
        };
        let Some(assistant_id) = pick(&self.assistant_id, &file.assistant_id) else {
            bail!(
                "missing assistant id (set --assistant-id, CALLTERM_ASSISTANT_ID or assistant_id in config.toml)"
            );
        };

        let events_url = match pick(&self.events_url, &file.events_url) {
            Some(template) => {
                let template = EventsUrlTemplate::new(template);
                let probe = template.for_call("probe");
                let parsed = Url::parse(&probe)
                    .with_context(|| format!("invalid events url: {}", template.as_str()))?;
                if !matches!(parsed.scheme(), "ws" | "wss") {
                    bail!("events url must use ws or wss: {}", template.as_str());
                }
                template
            }
            None => EventsUrlTemplate::derived_from(&api_url),
        };

        let timeout_secs = self
            .request_timeout_secs
            .or(file.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            bail!("request timeout must be at least one second");
        }

        Ok(ServiceConfig {
            api_url,
            api_key,
            assistant_id,
            phone_number_id: pick(&self.phone_number_id, &file.phone_number_id),
            events_url,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl ServiceConfig {
    /// Human-readable summary for `--check-config`; the api key is redacted.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("api_url = {}", self.api_url),
            format!("api_key = {}", redact(&self.api_key)),
            format!("assistant_id = {}", self.assistant_id),
            format!(
                "phone_number_id = {}",
                self.phone_number_id.as_deref().unwrap_or("(service default)")
            ),
            format!("events_url = {}", self.events_url.as_str()),
            format!("request_timeout_secs = {}", self.request_timeout.as_secs()),
        ]
    }
}

fn pick(cli: &Option<String>, file: &Option<String>) -> Option<String> {
    let clean = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    clean(cli).or_else(|| clean(file))
}

fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::config_dir().map(|dir| dir.join("callterm"))
}

/// Default config file location, if a config directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_file_config(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn parse_file_config(contents: &str) -> Result<FileConfig> {
    Ok(toml::from_str(contents)?)
}
