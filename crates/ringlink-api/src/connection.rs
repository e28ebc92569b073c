//! Single-use hub socket connections.
//!
//! A [`SocketConnection`] lives for exactly one exchange: it is opened from
//! a [`ConnectionDescriptor`], gets at most one listener attached to its
//! inbound half, carries one outgoing frame, and is consumed by
//! [`close`](SocketConnection::close). Nothing here is pooled or reused.
//!
//! [`Connector`] is the seam between the exchange logic and the actual
//! socket. [`WsConnector`] dials with `tokio-tungstenite`; tests plug in
//! in-memory sinks and streams through [`SocketConnection::from_parts`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::listener::{ResponseListener, ResultSlot};

/// Outgoing half of a connection.
pub type FrameSink = Pin<Box<dyn Sink<Message, Error = Error> + Send>>;

/// Incoming half of a connection.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Message, Error>> + Send>>;

// ── ConnectionDescriptor ─────────────────────────────────────────────

/// Where to dial, as issued by the connection endpoint.
///
/// The auth code is one-time: a descriptor is consumed by the exchange that
/// uses it and must not be cached.
#[derive(Debug, Deserialize)]
pub struct ConnectionDescriptor {
    /// Socket host, e.g. `"ws-1234.prd.rings.solutions"`.
    pub server: String,

    #[serde(rename = "authCode")]
    pub auth_code: SecretString,
}

impl ConnectionDescriptor {
    pub fn new(server: impl Into<String>, auth_code: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            auth_code: SecretString::from(auth_code.into()),
        }
    }
}

// ── URL construction ─────────────────────────────────────────────────

/// URL scheme used to reach the hub socket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SocketScheme {
    /// `wss://` -- what the hub service issues.
    #[default]
    Secure,
    /// `ws://` -- local test servers only.
    Plain,
}

impl SocketScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Secure => "wss",
            Self::Plain => "ws",
        }
    }
}

/// Build the socket.io connection URL for a descriptor.
///
/// `wss://<server>/socket.io/?authcode=<authCode>&ack=false&EIO=3&transport=websocket`
pub fn connection_url(
    descriptor: &ConnectionDescriptor,
    scheme: SocketScheme,
) -> Result<Url, Error> {
    let server = descriptor.server.trim();
    if server.is_empty() {
        return Err(Error::Connection {
            url: String::new(),
            reason: "connection descriptor has no server".into(),
        });
    }

    let raw = format!(
        "{}://{server}/socket.io/?authcode={}&ack=false&EIO=3&transport=websocket",
        scheme.as_str(),
        descriptor.auth_code.expose_secret(),
    );

    Url::parse(&raw).map_err(|e| Error::Connection {
        url: format!("{}://{server}/socket.io/", scheme.as_str()),
        reason: format!("invalid socket URL: {e}"),
    })
}

/// Render a socket URL for logs with the auth code masked.
pub fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "authcode" {
                "****".to_owned()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();
    if !pairs.is_empty() {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    redacted.to_string()
}

// ── Connector ────────────────────────────────────────────────────────

/// Opens transport-level sockets for the exchange coordinator.
pub trait Connector: Send + Sync {
    /// Dial `url`. Failures are terminal for the exchange.
    fn open(&self, url: &Url) -> impl Future<Output = Result<SocketConnection, Error>> + Send;
}

/// [`Connector`] backed by `tokio-tungstenite`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    connect_timeout: Duration,
}

impl Default for WsConnector {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl WsConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Connector for WsConnector {
    async fn open(&self, url: &Url) -> Result<SocketConnection, Error> {
        let redacted = redact_url(url);
        tracing::info!(url = %redacted, "Connecting to hub socket");

        let dial = tokio_tungstenite::connect_async(url.as_str());
        let (ws_stream, _response) = tokio::time::timeout(self.connect_timeout, dial)
            .await
            .map_err(|_| Error::Connection {
                url: redacted.clone(),
                reason: format!(
                    "dial timed out after {}ms",
                    self.connect_timeout.as_millis()
                ),
            })?
            .map_err(|e| Error::Connection {
                url: redacted.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!("Hub socket connected");

        let (write, read) = ws_stream.split();
        let sink = write.sink_map_err(|e: tungstenite::Error| Error::Write(e.to_string()));
        let read_url = redacted.clone();
        let stream = read.map(move |frame| {
            frame.map_err(|e| Error::Connection {
                url: read_url.clone(),
                reason: e.to_string(),
            })
        });

        Ok(SocketConnection::from_parts(redacted, sink, stream))
    }
}

// ── SocketConnection ─────────────────────────────────────────────────

/// One open socket, owned by a single exchange.
pub struct SocketConnection {
    /// Redacted URL, for logs and errors.
    url: String,
    sink: FrameSink,
    /// Taken by the one listener this connection may have.
    stream: Option<FrameStream>,
}

impl std::fmt::Debug for SocketConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketConnection")
            .field("url", &self.url)
            .field("listening", &self.stream.is_none())
            .finish_non_exhaustive()
    }
}

impl SocketConnection {
    /// Assemble a connection from an already-open sink/stream pair.
    pub fn from_parts<S, R>(url: impl Into<String>, sink: S, stream: R) -> Self
    where
        S: Sink<Message, Error = Error> + Send + 'static,
        R: Stream<Item = Result<Message, Error>> + Send + 'static,
    {
        Self {
            url: url.into(),
            sink: Box::pin(sink),
            stream: Some(Box::pin(stream)),
        }
    }

    /// The redacted URL this connection was opened against.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Attach the response listener to this connection's inbound half.
    ///
    /// A connection carries exactly one listener; a second call fails.
    pub fn listen(
        &mut self,
        marker: impl Into<String>,
        cancel: &CancellationToken,
    ) -> Result<(ResponseListener, ResultSlot), Error> {
        let stream = self.stream.take().ok_or_else(|| Error::Connection {
            url: self.url.clone(),
            reason: "a listener is already attached to this connection".into(),
        })?;
        Ok(ResponseListener::start(stream, marker, cancel))
    }

    /// Write one text frame.
    pub async fn send(&mut self, text: &str) -> Result<(), Error> {
        tracing::trace!(frame = text, "Sending frame");
        self.sink.send(Message::text(text.to_owned())).await
    }

    /// Send a normal-closure close frame and release the socket.
    ///
    /// Best-effort: failures are logged, never returned.
    pub async fn close(mut self) {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "".into(),
        };
        match self.sink.send(Message::Close(Some(frame))).await {
            Ok(()) => tracing::info!(url = %self.url, "Hub socket closed"),
            Err(e) => tracing::warn!(url = %self.url, error = %e, "Close frame not delivered"),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
