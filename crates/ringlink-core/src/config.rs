// ── Runtime hub configuration ──
//
// Describes *how* to reach one Ring location: where descriptors are issued,
// which access token to present, and how long each exchange may wait.
// The CLI builds a `HubConfig` from a profile and hands it in; core never
// reads config files.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use ringlink_api::{CoordinatorConfig, ExchangeSettings, WaitPolicy};

/// Configuration for talking to a single location's hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Endpoint that issues socket descriptors.
    pub connections_url: Url,
    /// Ring location id, sent as `accountId`.
    pub location_id: String,
    /// Bearer token for the connection endpoint. Supplied, never refreshed.
    pub access_token: SecretString,
    /// Security panel zid. When unset it is discovered from a snapshot.
    pub panel_zid: Option<String>,
    /// HTTP timeout for the connection endpoint.
    pub http_timeout: Duration,
    pub query_window: Duration,
    pub command_window: Duration,
    pub wait_policy: WaitPolicy,
}

impl HubConfig {
    pub fn new(
        connections_url: Url,
        location_id: impl Into<String>,
        access_token: SecretString,
    ) -> Self {
        Self {
            connections_url,
            location_id: location_id.into(),
            access_token,
            panel_zid: None,
            http_timeout: Duration::from_secs(30),
            query_window: ExchangeSettings::query().window,
            command_window: ExchangeSettings::command().window,
            wait_policy: WaitPolicy::default(),
        }
    }

    /// Exchange settings for the coordinator, markers left at their defaults.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        let mut config = CoordinatorConfig::new();
        config.query.window = self.query_window;
        config.command.window = self.command_window;
        config.wait_policy = self.wait_policy;
        config
    }
}
