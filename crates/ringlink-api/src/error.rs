use thiserror::Error;

/// Top-level error type for the `ringlink-api` crate.
///
/// Covers every failure mode of a socket exchange (connect, send, decode,
/// wait) plus the HTTP connection resolver. `ringlink-core` maps these into
/// user-facing diagnostics without collapsing the kinds.
#[derive(Debug, Error)]
pub enum Error {
    // ── Socket exchange ─────────────────────────────────────────────
    /// The socket URL could not be built or the dial failed.
    #[error("Connection to {url} failed: {reason}")]
    Connection { url: String, reason: String },

    /// Writing the outgoing frame failed.
    #[error("Failed to send frame: {0}")]
    Write(String),

    /// An inbound frame could not be unwrapped into a structured document.
    #[error("Protocol error: {message}")]
    Protocol { message: String, frame: String },

    /// An inbound frame had zero length.
    #[error("Received an empty frame")]
    EmptyFrame,

    /// The frame parsed, but the payload is missing fields the snapshot needs.
    #[error("Malformed snapshot payload: {message}")]
    Serialization { message: String, payload: String },

    /// No frame containing the marker arrived inside the wait window.
    #[error("No {marker} response within {window_ms}ms")]
    Timeout { marker: String, window_ms: u64 },

    /// The exchange was cancelled by the caller.
    #[error("Exchange cancelled")]
    Cancelled,

    // ── Connection resolver (HTTP) ──────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The connection-issuing endpoint rejected the access token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The connection-issuing endpoint returned a non-success status.
    #[error("Connection resolver error (HTTP {status}): {message}")]
    Resolver { status: u16, message: String },

    /// JSON deserialization of an HTTP body failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),
}

/// Field-less mirror of [`Error`] for boundary layers that branch on the
/// failure class without caring about the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Write,
    Protocol,
    Serialization,
    Timeout,
    Cancelled,
    Resolver,
    Authentication,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Write(_) => ErrorKind::Write,
            Self::Protocol { .. } | Self::EmptyFrame => ErrorKind::Protocol,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Transport(_)
            | Self::Resolver { .. }
            | Self::Deserialization { .. }
            | Self::Tls(_) => ErrorKind::Resolver,
        }
    }

    /// Returns `true` if issuing a fresh exchange (new descriptor, new
    /// socket) might succeed. Nothing in this crate retries on its own.
    pub fn can_reissue(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Connection { .. } | Self::Write(_) | Self::Timeout { .. } => true,
            Self::Resolver { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
