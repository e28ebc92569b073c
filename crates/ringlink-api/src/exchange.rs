//! One request/response cycle over a single-use hub socket.
//!
//! ```text
//! Idle → Connecting → Listening → Sent → Waiting → Closing → Done
//!             │            │        │        │
//!             ▼            └────────┴────────┴──→ Closing → Failed
//!          Failed
//! ```
//!
//! The coordinator opens a connection, attaches the listener, writes the
//! encoded frame, waits for the listener to capture a marked response,
//! then closes the connection on every path that opened it. Nothing is
//! retried: each failure is terminal for the exchange, and callers issue a
//! fresh exchange (with a fresh descriptor) if they want another attempt.
//!
//! The two exchange kinds deliberately differ in what they verify. A query
//! fails with [`Error::Timeout`] when no device list arrives. A command is
//! fire-and-forget: it succeeds once the frame is written, and the
//! [`CommandReceipt`] only reports whether an update frame happened to be
//! seen.
//!
//! # Example
//!
//! ```rust,ignore
//! use ringlink_api::{ConnectionDescriptor, ExchangeCoordinator};
//!
//! let coordinator = ExchangeCoordinator::default();
//! let descriptor = ConnectionDescriptor::new("ws-1.example.com", auth_code);
//! let snapshot = coordinator.query_devices(descriptor).await?;
//! for device in &snapshot.body {
//!     println!("{:?} {:?}", device.name(), device.mode());
//! }
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::codec::{self, DATA_UPDATE_MARKER, DEVICE_LIST_MSG, RawFrame};
use crate::connection::{
    ConnectionDescriptor, Connector, SocketScheme, WsConnector, connection_url,
};
use crate::error::Error;
use crate::listener::{WaitOutcome, WaitPolicy};
use crate::models::DeviceSnapshot;

// ── Settings ─────────────────────────────────────────────────────────

/// Marker and wait window for one kind of exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSettings {
    /// Substring identifying the frames that answer this exchange.
    pub marker: String,
    /// Upper bound on how long to wait for them.
    pub window: Duration,
}

impl ExchangeSettings {
    pub fn new(marker: impl Into<String>, window: Duration) -> Self {
        Self {
            marker: marker.into(),
            window,
        }
    }

    /// Device list query: wait up to 3s for the `DeviceInfoDocGetList` reply.
    pub fn query() -> Self {
        Self::new(DEVICE_LIST_MSG, Duration::from_secs(3))
    }

    /// Mode command: watch for a `DataUpdate` push for up to 1s.
    pub fn command() -> Self {
        Self::new(DATA_UPDATE_MARKER, Duration::from_secs(1))
    }

    fn window_ms(&self) -> u64 {
        u64::try_from(self.window.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Coordinator-wide configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub query: ExchangeSettings,
    pub command: ExchangeSettings,
    pub wait_policy: WaitPolicy,
    pub scheme: SocketScheme,
}

impl CoordinatorConfig {
    pub fn new() -> Self {
        Self {
            query: ExchangeSettings::query(),
            command: ExchangeSettings::command(),
            wait_policy: WaitPolicy::default(),
            scheme: SocketScheme::default(),
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ── Requests and outcomes ────────────────────────────────────────────

/// What an exchange sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// Ask the hub for every attached device.
    QueryDevices,
    /// Switch the security panel `zid` to `mode` (`none`, `some`, `all`).
    SetMode { zid: String, mode: String },
}

/// What an exchange produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    Snapshot(DeviceSnapshot),
    Command(CommandReceipt),
}

/// Result of a fire-and-forget mode command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReceipt {
    pub zid: String,
    pub mode: String,
    /// Whether a frame containing the command marker arrived inside the
    /// window. Informational only: it is not proof the panel complied, and
    /// its absence is not an error.
    pub update_observed: bool,
}

/// Exchange lifecycle, logged at `debug` on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    Connecting,
    Listening,
    Sent,
    Waiting,
    Closing,
    Done,
    Failed,
}

struct StateTrace {
    state: ExchangeState,
}

impl StateTrace {
    fn new() -> Self {
        Self {
            state: ExchangeState::Idle,
        }
    }

    fn enter(&mut self, next: ExchangeState) {
        tracing::debug!(from = ?self.state, to = ?next, "Exchange state");
        self.state = next;
    }
}

// ── ExchangeCoordinator ──────────────────────────────────────────────

/// Runs exchanges against the hub, one socket per exchange.
#[derive(Debug, Clone)]
pub struct ExchangeCoordinator<C = WsConnector> {
    connector: C,
    config: CoordinatorConfig,
    cancel: CancellationToken,
}

impl Default for ExchangeCoordinator {
    fn default() -> Self {
        Self::new(WsConnector::default(), CoordinatorConfig::new())
    }
}

impl<C: Connector> ExchangeCoordinator<C> {
    pub fn new(connector: C, config: CoordinatorConfig) -> Self {
        Self {
            connector,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Tie in-flight exchanges to `token`: cancelling it fails the current
    /// wait with [`Error::Cancelled`] (the connection is still closed).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Request a live snapshot of every device on the hub.
    pub async fn query_devices(
        &self,
        descriptor: ConnectionDescriptor,
    ) -> Result<DeviceSnapshot, Error> {
        let settings = &self.config.query;
        let frame = codec::encode_query()?;

        let captured = self.run(descriptor, frame.as_str(), settings).await?;
        let Some(raw) = captured else {
            tracing::warn!(marker = %settings.marker, "No device list within window");
            return Err(Error::Timeout {
                marker: settings.marker.clone(),
                window_ms: settings.window_ms(),
            });
        };

        let snapshot = codec::decode_frame(&raw)?;
        tracing::info!(devices = snapshot.body.len(), "Device snapshot received");
        Ok(snapshot)
    }

    /// Switch the security panel `zid` to `mode`.
    ///
    /// Succeeds as soon as the command frame is written; see
    /// [`CommandReceipt::update_observed`].
    pub async fn set_mode(
        &self,
        descriptor: ConnectionDescriptor,
        zid: &str,
        mode: &str,
    ) -> Result<CommandReceipt, Error> {
        let frame = codec::encode_command(zid, mode)?;
        let captured = self
            .run(descriptor, frame.as_str(), &self.config.command)
            .await?;

        tracing::info!(zid, mode, update_observed = captured.is_some(), "Mode command sent");
        Ok(CommandReceipt {
            zid: zid.to_owned(),
            mode: mode.to_owned(),
            update_observed: captured.is_some(),
        })
    }

    /// Run either kind of exchange.
    pub async fn exchange(
        &self,
        descriptor: ConnectionDescriptor,
        request: Exchange,
    ) -> Result<ExchangeOutcome, Error> {
        match request {
            Exchange::QueryDevices => self
                .query_devices(descriptor)
                .await
                .map(ExchangeOutcome::Snapshot),
            Exchange::SetMode { zid, mode } => self
                .set_mode(descriptor, &zid, &mode)
                .await
                .map(ExchangeOutcome::Command),
        }
    }

    /// Drive one exchange through its states and return whatever the
    /// listener retained.
    async fn run(
        &self,
        descriptor: ConnectionDescriptor,
        frame: &str,
        settings: &ExchangeSettings,
    ) -> Result<Option<RawFrame>, Error> {
        let mut trace = StateTrace::new();

        // Connecting: nothing to close if this fails.
        trace.enter(ExchangeState::Connecting);
        let opened = match connection_url(&descriptor, self.config.scheme) {
            Ok(url) => {
                drop(descriptor);
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => Err(Error::Cancelled),
                    result = self.connector.open(&url) => result,
                }
            }
            Err(e) => Err(e),
        };
        let mut connection = match opened {
            Ok(connection) => connection,
            Err(e) => {
                trace.enter(ExchangeState::Failed);
                return Err(e);
            }
        };

        // Listening
        trace.enter(ExchangeState::Listening);
        let (listener, mut slot) = match connection.listen(settings.marker.as_str(), &self.cancel)
        {
            Ok(pair) => pair,
            Err(e) => {
                trace.enter(ExchangeState::Closing);
                connection.close().await;
                trace.enter(ExchangeState::Failed);
                return Err(e);
            }
        };

        // Sent
        trace.enter(ExchangeState::Sent);
        if let Err(e) = connection.send(frame).await {
            tracing::warn!(error = %e, "Frame write failed");
            trace.enter(ExchangeState::Closing);
            connection.close().await;
            listener.stop().await;
            trace.enter(ExchangeState::Failed);
            return Err(e);
        }

        // Waiting
        trace.enter(ExchangeState::Waiting);
        let outcome = slot
            .wait(settings.window, self.config.wait_policy, &self.cancel)
            .await;
        tracing::debug!(?outcome, marker = %settings.marker, "Wait finished");

        // Closing: unconditional once open succeeded.
        trace.enter(ExchangeState::Closing);
        connection.close().await;
        listener.stop().await;

        if outcome == WaitOutcome::Cancelled {
            trace.enter(ExchangeState::Failed);
            return Err(Error::Cancelled);
        }

        trace.enter(ExchangeState::Done);
        Ok(slot.latest())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
