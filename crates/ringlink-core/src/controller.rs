// ── Hub controller ──
//
// Entry point for consumers. Each operation resolves a fresh connection
// descriptor (auth codes are single-use) and runs one exchange through the
// coordinator. Nothing is cached between calls.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use ringlink_api::{
    ConnectionResolver, Connector, DeviceSnapshot, ExchangeCoordinator, HttpConnectionResolver,
    TransportConfig, WsConnector,
};

use crate::config::HubConfig;
use crate::convert;
use crate::error::CoreError;
use crate::model::{DeviceStatus, ModeChange, PanelMode, PanelStatus};

/// Queries and commands one location's hub.
pub struct HubController<R = HttpConnectionResolver, C = WsConnector> {
    resolver: R,
    coordinator: ExchangeCoordinator<C>,
    panel_zid: Option<String>,
}

impl HubController {
    /// Build a controller that resolves descriptors over HTTP and dials
    /// with tokio-tungstenite.
    pub fn new(config: HubConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.http_timeout);
        let resolver = HttpConnectionResolver::new(
            config.connections_url.clone(),
            config.location_id.clone(),
            config.access_token.clone(),
            &transport,
        )?;
        let coordinator =
            ExchangeCoordinator::new(WsConnector::default(), config.coordinator_config());

        Ok(Self::from_parts(resolver, coordinator, config.panel_zid))
    }
}

impl<R: ConnectionResolver, C: Connector> HubController<R, C> {
    pub fn from_parts(
        resolver: R,
        coordinator: ExchangeCoordinator<C>,
        panel_zid: Option<String>,
    ) -> Self {
        Self {
            resolver,
            coordinator,
            panel_zid,
        }
    }

    /// Cancel in-flight exchanges when `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.coordinator = self.coordinator.with_cancellation(token);
        self
    }

    /// Fetch a live snapshot of every device on the hub.
    pub async fn snapshot(&self) -> Result<DeviceSnapshot, CoreError> {
        let descriptor = self.resolver.resolve().await?;
        Ok(self.coordinator.query_devices(descriptor).await?)
    }

    /// Current state of every device.
    pub async fn device_statuses(&self) -> Result<Vec<DeviceStatus>, CoreError> {
        let snapshot = self.snapshot().await?;
        Ok(convert::device_statuses(&snapshot))
    }

    /// The zid mode commands go to: the configured one, or discovered
    /// from `snapshot`.
    pub fn panel_zid(&self, snapshot: &DeviceSnapshot) -> Result<String, CoreError> {
        convert::panel_zid(snapshot, self.panel_zid.as_deref())
    }

    /// Current security panel state.
    pub async fn panel(&self) -> Result<PanelStatus, CoreError> {
        let snapshot = self.snapshot().await?;
        let zid = self.panel_zid(&snapshot)?;
        Ok(convert::panel_status(&snapshot, zid))
    }

    /// Switch the security panel to `mode`.
    ///
    /// `zid_override` takes precedence over the configured zid. With
    /// neither, one query exchange discovers the panel first; the command
    /// then runs on its own fresh connection.
    pub async fn set_mode(
        &self,
        mode: PanelMode,
        zid_override: Option<&str>,
    ) -> Result<ModeChange, CoreError> {
        let explicit = zid_override
            .or(self.panel_zid.as_deref())
            .filter(|z| !z.is_empty());

        let zid = if let Some(zid) = explicit {
            zid.to_owned()
        } else {
            debug!("No panel zid configured, discovering from snapshot");
            let snapshot = self.snapshot().await?;
            convert::panel_zid(&snapshot, None)?
        };

        let descriptor = self.resolver.resolve().await?;
        let receipt = self
            .coordinator
            .set_mode(descriptor, &zid, mode.wire_name())
            .await?;

        info!(zid = %zid, mode = %mode, "Panel mode command sent");
        Ok(ModeChange {
            zid,
            mode,
            update_observed: receipt.update_observed,
        })
    }
}
