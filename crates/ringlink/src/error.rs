//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use ringlink_config::ConfigError;
use ringlink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the hub at {url}")]
    #[diagnostic(
        code(ringlink::connection_failed),
        help("The hub socket refused the connection: {reason}\nTry again; connection codes are single-use.")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Failed to send to the hub: {reason}")]
    #[diagnostic(code(ringlink::send_failed))]
    SendFailed { reason: String },

    #[error("Connection endpoint error: {message}")]
    #[diagnostic(
        code(ringlink::endpoint),
        help("The Ring connection endpoint rejected the request. Check --location.")
    )]
    Endpoint { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(ringlink::auth_failed),
        help(
            "The access token was rejected or has expired.\n\
             Store a fresh one with: ringlink config set-token --profile {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("No access token configured for profile '{profile}'")]
    #[diagnostic(
        code(ringlink::no_credentials),
        help(
            "Configure one with: ringlink config init\n\
             Or set the RINGLINK_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Hub ──────────────────────────────────────────────────────────
    #[error("Hub did not answer within {window_ms}ms (waiting for {marker})")]
    #[diagnostic(
        code(ringlink::timeout),
        help("Increase the window with --query-window or --command-window.")
    )]
    Timeout { marker: String, window_ms: u64 },

    #[error("Unexpected frame from hub: {message}")]
    #[diagnostic(code(ringlink::protocol))]
    Protocol { message: String },

    #[error("No security panel found on this location")]
    #[diagnostic(
        code(ringlink::panel_not_found),
        help("Pass the panel zid with --zid or set `zid` in your profile.")
    )]
    PanelNotFound,

    #[error("Interrupted")]
    #[diagnostic(code(ringlink::interrupted))]
    Interrupted,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ringlink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ringlink::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ringlink config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No location configured")]
    #[diagnostic(
        code(ringlink::no_config),
        help(
            "Create a profile with: ringlink config init\n\
             Or pass --location and --token.\n\
             Config file: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(ringlink::config))]
    Config { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(ringlink::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(ringlink::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::SendFailed { .. } | Self::Endpoint { .. } => {
                exit_code::CONNECTION
            }
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::PanelNotFound | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            Self::Interrupted => exit_code::INTERRUPTED,
            _ => exit_code::GENERAL,
        }
    }

    /// Fill in the profile name on errors that mention it.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                message,
                profile: name.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::SendFailed { reason } => Self::SendFailed { reason },
            CoreError::Protocol { message } => Self::Protocol { message },
            CoreError::Timeout { marker, window_ms } => Self::Timeout { marker, window_ms },
            CoreError::Cancelled => Self::Interrupted,
            CoreError::AuthenticationFailed { message } => Self::AuthFailed {
                message,
                profile: "default".into(),
            },
            CoreError::Resolver { message, status } => Self::Endpoint {
                message: match status {
                    Some(status) => format!("HTTP {status}: {message}"),
                    None => message,
                },
            },
            CoreError::PanelNotFound => Self::PanelNotFound,
            CoreError::Config { message } => Self::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => Self::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
