// ── Domain model ──
//
// Consumer-facing types built from decoded snapshots. These are what the
// CLI prints and what integrations serialize; raw snapshot sections stay in
// `ringlink_api::models`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ── PanelMode ────────────────────────────────────────────────────────

/// Security panel arming mode.
///
/// User-facing names are `home`, `away` and `off`; the hub calls the same
/// modes `some`, `all` and `none`. Parsing accepts either spelling.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum PanelMode {
    /// Perimeter armed, interior motion ignored.
    #[strum(to_string = "home", serialize = "some")]
    Home,
    /// Everything armed.
    #[strum(to_string = "away", serialize = "all")]
    Away,
    /// Disarmed.
    #[strum(to_string = "off", serialize = "none")]
    Off,
}

impl PanelMode {
    /// The mode string the hub understands.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Home => "some",
            Self::Away => "all",
            Self::Off => "none",
        }
    }

    /// Map a hub mode string back; `None` for anything unrecognized.
    pub fn from_wire(mode: &str) -> Option<Self> {
        match mode {
            "some" => Some(Self::Home),
            "all" => Some(Self::Away),
            "none" => Some(Self::Off),
            _ => None,
        }
    }
}

// ── DeviceKind ───────────────────────────────────────────────────────

/// The `deviceType` values core logic cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
pub enum DeviceKind {
    #[strum(serialize = "security-panel")]
    SecurityPanel,
    #[strum(serialize = "access-code")]
    AccessCode,
    #[strum(serialize = "access-code.vault")]
    AccessCodeVault,
    #[strum(serialize = "hub.redsky")]
    BaseStation,
    #[strum(serialize = "range-extender.zw")]
    RangeExtender,
    #[strum(serialize = "sensor.contact")]
    ContactSensor,
    #[strum(serialize = "sensor.motion")]
    MotionSensor,
    #[strum(serialize = "security-keypad")]
    Keypad,
}

// ── DeviceStatus ─────────────────────────────────────────────────────

/// One device's current state, flattened from a snapshot entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    /// `general.v2.zid`.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub adapter_zid: Option<String>,
    pub faulted: bool,
    /// Raw hub mode (`some`/`all`/`none`); only the security panel has one.
    pub mode: Option<String>,
    pub battery_level: Option<i64>,
    pub comm_status: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
}

impl DeviceStatus {
    /// The panel mode in user-facing terms, if this device reports one.
    pub fn panel_mode(&self) -> Option<PanelMode> {
        self.mode.as_deref().and_then(PanelMode::from_wire)
    }
}

// ── Panel ────────────────────────────────────────────────────────────

/// The security panel as seen in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelStatus {
    /// Zid commands are addressed to.
    pub zid: String,
    pub name: Option<String>,
    pub mode: Option<PanelMode>,
    /// Hub mode string as reported, kept when it does not map to a `PanelMode`.
    pub raw_mode: Option<String>,
    /// Devices currently reporting a fault (open doors, tripped sensors).
    pub faulted: Vec<String>,
}

/// Result of a mode command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeChange {
    pub zid: String,
    pub mode: PanelMode,
    /// A `DataUpdate` frame arrived after the command. Informational only.
    pub update_observed: bool,
}
