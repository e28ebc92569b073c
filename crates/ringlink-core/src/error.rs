// ── Core error types ──
//
// User-facing errors from ringlink-core. Each exchange failure class keeps
// its own variant so callers can tell a refused dial from a timeout from a
// garbled frame. The `From<ringlink_api::Error>` impl does the mapping.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Exchange errors ──────────────────────────────────────────────
    #[error("Cannot connect to hub socket at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Failed to send frame to hub: {reason}")]
    SendFailed { reason: String },

    #[error("Unexpected frame from hub: {message}")]
    Protocol { message: String },

    #[error("Hub did not answer: no {marker} frame within {window_ms}ms")]
    Timeout { marker: String, window_ms: u64 },

    #[error("Operation cancelled")]
    Cancelled,

    // ── Connection endpoint errors ───────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Connection endpoint error: {message}")]
    Resolver {
        message: String,
        /// HTTP status code (if the endpoint answered).
        status: Option<u16>,
    },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("No security panel found on this location")]
    PanelNotFound,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether running the same operation again could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::SendFailed { .. } | Self::Timeout { .. }
        ) || matches!(self, Self::Resolver { status: Some(s), .. } if *s >= 500)
    }
}

// ── Conversion from api-layer errors ─────────────────────────────────

impl From<ringlink_api::Error> for CoreError {
    fn from(err: ringlink_api::Error) -> Self {
        use ringlink_api::Error as Api;

        match err {
            Api::Connection { url, reason } => CoreError::ConnectionFailed { url, reason },
            Api::Write(reason) => CoreError::SendFailed { reason },
            Api::Protocol { message, .. } => CoreError::Protocol { message },
            Api::EmptyFrame => CoreError::Protocol {
                message: "empty frame".into(),
            },
            Api::Serialization { message, .. } => CoreError::Protocol {
                message: format!("malformed device list: {message}"),
            },
            Api::Timeout { marker, window_ms } => CoreError::Timeout { marker, window_ms },
            Api::Cancelled => CoreError::Cancelled,
            Api::Authentication { message } => CoreError::AuthenticationFailed { message },
            Api::Resolver { status, message } => CoreError::Resolver {
                message,
                status: Some(status),
            },
            Api::Transport(ref e) => CoreError::Resolver {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            Api::Deserialization { message, .. } => CoreError::Resolver {
                message: format!("unexpected response body: {message}"),
                status: None,
            },
            Api::Tls(message) => CoreError::Config { message },
        }
    }
}
