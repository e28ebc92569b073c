// Snapshot payloads decoded from hub socket frames.
//
// Field names follow the hub's camelCase wire format. Almost everything is
// optional: the hub omits sections a device type does not have, and wired
// devices report `null` battery data. Anything not modelled lands in the
// `extra` maps so consumers can still reach it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Treat an explicit `null` the same as a missing field.
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decoded `DeviceInfoDocGetList` response: every device attached to a hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    /// Message type, e.g. `"DeviceInfoDocGetList"`.
    pub msg: String,

    #[serde(default)]
    pub datatype: Option<String>,

    /// Sequence number echoed back from the request.
    #[serde(default)]
    pub seq: Option<u64>,

    /// Source identifier (the hub asset that answered).
    #[serde(default)]
    pub src: Option<String>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub body: Vec<DeviceEntry>,

    #[serde(default)]
    pub session_id: Option<i64>,

    #[serde(default)]
    pub status: Option<i64>,

    #[serde(default)]
    pub context: Option<EventContext>,
}

impl DeviceSnapshot {
    /// Find a body entry by its `general.v2.zid`.
    pub fn device(&self, zid: &str) -> Option<&DeviceEntry> {
        self.body.iter().find(|entry| entry.zid() == Some(zid))
    }

    /// All body entries of the given `general.v2.deviceType`.
    pub fn devices_of_type<'a>(
        &'a self,
        device_type: &str,
    ) -> impl Iterator<Item = &'a DeviceEntry> {
        self.body
            .iter()
            .filter(move |entry| entry.device_type() == Some(device_type))
    }
}

/// One device in a snapshot body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceEntry {
    #[serde(default, deserialize_with = "null_to_default")]
    pub general: General,

    #[serde(default, deserialize_with = "null_to_default")]
    pub device: DeviceSection,

    #[serde(default)]
    pub adapter: Option<AdapterSection>,

    #[serde(default)]
    pub impulse: Option<Impulse>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceEntry {
    pub fn zid(&self) -> Option<&str> {
        self.general.v2.zid.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.general.v2.name.as_deref()
    }

    pub fn device_type(&self) -> Option<&str> {
        self.general.v2.device_type.as_deref()
    }

    pub fn adapter_zid(&self) -> Option<&str> {
        self.general.v2.adapter_zid.as_deref()
    }

    pub fn faulted(&self) -> bool {
        self.device.v1.faulted.unwrap_or(false)
    }

    pub fn mode(&self) -> Option<&str> {
        self.device.v1.mode.as_deref()
    }

    /// Impulse types attached to this entry (history-style frames only).
    pub fn impulse_types(&self) -> impl Iterator<Item = &str> {
        self.impulse
            .iter()
            .flat_map(|impulse| impulse.v1.iter())
            .filter_map(|i| i.impulse_type.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct General {
    #[serde(default, deserialize_with = "null_to_default")]
    pub v2: GeneralV2,
}

/// Adapter/device metadata common to every device type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralV2 {
    #[serde(default)]
    pub zid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// e.g. `"security-panel"`, `"sensor.contact"`, `"access-code"`.
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub adapter_zid: Option<String>,
    /// e.g. `"zwave"`, `"ringnet"`.
    #[serde(default)]
    pub adapter_type: Option<String>,
    #[serde(default)]
    pub battery_level: Option<i64>,
    #[serde(default)]
    pub battery_status: Option<String>,
    #[serde(default)]
    pub catalog_id: Option<String>,
    #[serde(default)]
    pub comm_status: Option<String>,
    #[serde(default)]
    pub tamper_status: Option<String>,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<i64>,
    #[serde(default)]
    pub device_found_time: Option<i64>,
    #[serde(default)]
    pub last_comm_time: Option<i64>,
    #[serde(default)]
    pub last_update: Option<i64>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub tags: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSection {
    #[serde(default, deserialize_with = "null_to_default")]
    pub v1: DeviceV1,
}

/// Live device state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceV1 {
    #[serde(default)]
    pub faulted: Option<bool>,
    /// Panel mode (`"none"`, `"some"`, `"all"`) on the security panel.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub channel: Option<i64>,
    #[serde(default)]
    pub pan_id: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdapterSection {
    #[serde(default, deserialize_with = "null_to_default")]
    pub v1: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Impulse {
    #[serde(default, deserialize_with = "null_to_default")]
    pub v1: Vec<ImpulseV1>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpulseV1 {
    #[serde(default)]
    pub impulse_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Who/what triggered the frame. Present on pushed updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub event_occurred_ts_ms: Option<i64>,
    #[serde(default)]
    pub affected_entity_type: Option<String>,
    #[serde(default)]
    pub affected_entity_id: Option<String>,
    #[serde(default)]
    pub affected_entity_name: Option<String>,
    #[serde(default)]
    pub initiating_entity_type: Option<String>,
    #[serde(default)]
    pub initiating_entity_id: Option<String>,
    #[serde(default)]
    pub initiating_entity_name: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub asset_kind: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Tests ────────────────────────────────────────────────────────────
