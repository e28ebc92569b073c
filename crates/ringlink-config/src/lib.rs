//! Shared configuration for ringlink tools.
//!
//! TOML profiles, access-token resolution (env + keyring + plaintext),
//! and translation to `ringlink_core::HubConfig`. The CLI layers its
//! global flags on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ringlink_core::{DEFAULT_CONNECTIONS_URL, HubConfig, WaitPolicy};

/// Keyring service name; entries are keyed `"{profile}/access-token"`.
pub const KEYRING_SERVICE: &str = "ringlink";

/// Environment prefix for config overrides, e.g. `RINGLINK_DEFAULT_PROFILE`.
/// Nested keys use `__`: `RINGLINK_PROFILES__HOME__ZID`.
pub const ENV_PREFIX: &str = "RINGLINK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    ProfileNotFound { name: String },

    #[error("no access token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named location profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// HTTP timeout for the connection endpoint, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_query_window_ms")]
    pub query_window_ms: u64,

    #[serde(default = "default_command_window_ms")]
    pub command_window_ms: u64,

    /// `"first-match"` or `"full-window"`.
    #[serde(default = "default_wait")]
    pub wait: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            query_window_ms: default_query_window_ms(),
            command_window_ms: default_command_window_ms(),
            wait: default_wait(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_query_window_ms() -> u64 {
    3000
}
fn default_command_window_ms() -> u64 {
    1000
}
fn default_wait() -> String {
    "first-match".into()
}

/// A named Ring location profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Ring location id (sent as `accountId`).
    pub location_id: String,

    /// Security panel zid. Discovered from a snapshot when unset.
    pub zid: Option<String>,

    /// Override the connection-issuing endpoint.
    pub connections_url: Option<String>,

    /// Access token (plaintext -- prefer keyring or env var).
    pub access_token: Option<String>,

    /// Environment variable name containing the access token.
    pub access_token_env: Option<String>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    pub query_window_ms: Option<u64>,

    pub command_window_ms: Option<u64>,

    /// Override wait policy.
    pub wait: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "ringlink", "ringlink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ringlink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Layered sources: defaults, then the TOML file at `path`.
fn file_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
}

/// Layered sources: defaults, then the TOML file at `path`, then env.
pub fn figment_for(path: &Path) -> Figment {
    file_figment(path).merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full Config from the canonical file + environment.
///
/// A missing file yields the defaults; a malformed one is an error.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    Ok(config)
}

/// Load the canonical file for editing.
///
/// Env overrides are not applied, so saving the result never writes
/// `RINGLINK_*` values (tokens included) into the file.
pub fn load_file_config() -> Result<Config, ConfigError> {
    load_file_config_from(&config_path())
}

pub fn load_file_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = file_figment(path).extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution (without CLI flags) ────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/access-token"))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

/// Resolve the access token from the credential chain (no CLI flag step).
pub fn resolve_access_token(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's access_token_env → env var lookup
    if let Some(ref env_name) = profile.access_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.access_token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store an access token in the system keyring for `profile_name`.
pub fn store_access_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?
        .set_password(token)
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Translation to HubConfig ────────────────────────────────────────

/// Parse a wait policy name.
pub fn parse_wait_policy(raw: &str) -> Result<WaitPolicy, ConfigError> {
    match raw {
        "first-match" => Ok(WaitPolicy::FirstMatch),
        "full-window" => Ok(WaitPolicy::FullWindow),
        other => Err(ConfigError::Validation {
            field: "wait".into(),
            reason: format!("expected 'first-match' or 'full-window', got '{other}'"),
        }),
    }
}

/// Build a `HubConfig` from a profile -- no CLI flag overrides.
///
/// Profile values win over `defaults`.
pub fn profile_to_hub_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<HubConfig, ConfigError> {
    let token = resolve_access_token(profile, profile_name)?;
    build_hub_config(profile, profile_name, defaults, token)
}

/// Build a `HubConfig` from a profile with an already-resolved token.
pub fn build_hub_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    token: SecretString,
) -> Result<HubConfig, ConfigError> {
    if profile.location_id.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "location_id".into(),
            reason: format!("profile '{profile_name}' has no location id"),
        });
    }

    let raw_url = profile
        .connections_url
        .as_deref()
        .unwrap_or(DEFAULT_CONNECTIONS_URL);
    let connections_url: url::Url = raw_url.parse().map_err(|_| ConfigError::Validation {
        field: "connections_url".into(),
        reason: format!("invalid URL: {raw_url}"),
    })?;

    let mut config = HubConfig::new(connections_url, profile.location_id.trim(), token);
    config.panel_zid = profile.zid.clone().filter(|z| !z.is_empty());
    config.http_timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.query_window =
        Duration::from_millis(profile.query_window_ms.unwrap_or(defaults.query_window_ms));
    config.command_window = Duration::from_millis(
        profile
            .command_window_ms
            .unwrap_or(defaults.command_window_ms),
    );
    config.wait_policy = parse_wait_policy(profile.wait.as_deref().unwrap_or(&defaults.wait))?;

    Ok(config)
}

// ── Tests ───────────────────────────────────────────────────────────
