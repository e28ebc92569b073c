// ── Snapshot-to-domain conversions ──
//
// Bridges decoded `ringlink_api` snapshot entries into `DeviceStatus`
// records and finds the security panel. Missing names and types become
// empty strings; nothing here fails.

use chrono::{DateTime, Utc};

use ringlink_api::{DeviceEntry, DeviceSnapshot};

use crate::error::CoreError;
use crate::model::{DeviceKind, DeviceStatus, PanelMode, PanelStatus};

/// Convert an optional epoch-milliseconds timestamp to `DateTime<Utc>`.
fn epoch_ms_to_datetime(epoch_ms: Option<i64>) -> Option<DateTime<Utc>> {
    epoch_ms.and_then(DateTime::from_timestamp_millis)
}

impl From<&DeviceEntry> for DeviceStatus {
    fn from(entry: &DeviceEntry) -> Self {
        let general = &entry.general.v2;
        Self {
            id: general.zid.clone().unwrap_or_default(),
            name: general.name.clone().unwrap_or_default(),
            device_type: general.device_type.clone().unwrap_or_default(),
            adapter_zid: general.adapter_zid.clone(),
            faulted: entry.faulted(),
            mode: entry.mode().map(str::to_owned),
            battery_level: general.battery_level,
            comm_status: general.comm_status.clone(),
            last_update: epoch_ms_to_datetime(general.last_update),
        }
    }
}

/// Every device in a snapshot, in hub order.
pub fn device_statuses(snapshot: &DeviceSnapshot) -> Vec<DeviceStatus> {
    snapshot.body.iter().map(DeviceStatus::from).collect()
}

/// Resolve the zid mode commands are addressed to.
///
/// Order: an explicit zid wins; otherwise the `adapterZid` of the first
/// `access-code` device; otherwise the zid of the first `security-panel`
/// device.
pub fn panel_zid(snapshot: &DeviceSnapshot, explicit: Option<&str>) -> Result<String, CoreError> {
    if let Some(zid) = explicit.filter(|z| !z.is_empty()) {
        return Ok(zid.to_owned());
    }

    let from_access_code = snapshot
        .devices_of_type(DeviceKind::AccessCode.as_ref())
        .find_map(|entry| entry.adapter_zid().filter(|z| !z.is_empty()));
    if let Some(zid) = from_access_code {
        tracing::debug!(zid, "Panel zid from access-code adapter");
        return Ok(zid.to_owned());
    }

    let from_panel = snapshot
        .devices_of_type(DeviceKind::SecurityPanel.as_ref())
        .find_map(|entry| entry.zid().filter(|z| !z.is_empty()));
    if let Some(zid) = from_panel {
        tracing::debug!(zid, "Panel zid from security-panel device");
        return Ok(zid.to_owned());
    }

    Err(CoreError::PanelNotFound)
}

/// Summarize the security panel addressed by `zid`.
pub fn panel_status(snapshot: &DeviceSnapshot, zid: String) -> PanelStatus {
    let panel = snapshot
        .device(&zid)
        .filter(|entry| entry.device_type() == Some(DeviceKind::SecurityPanel.as_ref()))
        .or_else(|| {
            snapshot
                .devices_of_type(DeviceKind::SecurityPanel.as_ref())
                .next()
        });

    let raw_mode = panel.and_then(DeviceEntry::mode).map(str::to_owned);
    let faulted = snapshot
        .body
        .iter()
        .filter(|entry| entry.faulted())
        .map(|entry| entry.name().or(entry.zid()).unwrap_or_default().to_owned())
        .collect();

    PanelStatus {
        zid,
        name: panel.and_then(DeviceEntry::name).map(str::to_owned),
        mode: raw_mode.as_deref().and_then(PanelMode::from_wire),
        raw_mode,
        faulted,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn snapshot(body: serde_json::Value) -> DeviceSnapshot {
        serde_json::from_value(json!({ "msg": "DeviceInfoDocGetList", "body": body })).unwrap()
    }

    fn entry(zid: &str, device_type: &str, adapter_zid: Option<&str>) -> serde_json::Value {
        json!({
            "general": { "v2": {
                "zid": zid,
                "name": zid.to_uppercase(),
                "deviceType": device_type,
                "adapterZid": adapter_zid,
            }},
            "device": { "v1": {} }
        })
    }

    #[test]
    fn explicit_zid_wins() {
        let snap = snapshot(json!([entry("p", "security-panel", None)]));
        assert_eq!(panel_zid(&snap, Some("override")).unwrap(), "override");
    }

    #[test]
    fn empty_explicit_zid_is_ignored() {
        let snap = snapshot(json!([entry("p", "security-panel", None)]));
        assert_eq!(panel_zid(&snap, Some("")).unwrap(), "p");
    }

    #[test]
    fn first_access_code_adapter_beats_security_panel() {
        let snap = snapshot(json!([
            entry("p", "security-panel", None),
            entry("code-1", "access-code", Some("adapter-a")),
            entry("code-2", "access-code", Some("adapter-b")),
        ]));
        assert_eq!(panel_zid(&snap, None).unwrap(), "adapter-a");
    }

    #[test]
    fn access_code_without_adapter_is_skipped() {
        let snap = snapshot(json!([
            entry("code-1", "access-code", None),
            entry("p", "security-panel", None),
        ]));
        assert_eq!(panel_zid(&snap, None).unwrap(), "p");
    }

    #[test]
    fn no_panel_is_an_error() {
        let snap = snapshot(json!([entry("door", "sensor.contact", None)]));
        assert!(matches!(panel_zid(&snap, None), Err(CoreError::PanelNotFound)));
    }

    #[test]
    fn status_mapping() {
        let snap = snapshot(json!([{
            "general": { "v2": {
                "zid": "door-1",
                "name": "Front Door",
                "deviceType": "sensor.contact",
                "adapterZid": "hub-1",
                "batteryLevel": 97,
                "commStatus": "ok",
                "lastUpdate": 1_700_000_000_000_i64,
            }},
            "device": { "v1": { "faulted": true } }
        }]));

        let statuses = device_statuses(&snap);
        assert_eq!(statuses.len(), 1);
        let door = &statuses[0];
        assert_eq!(door.id, "door-1");
        assert_eq!(door.device_type, "sensor.contact");
        assert_eq!(door.adapter_zid.as_deref(), Some("hub-1"));
        assert!(door.faulted);
        assert_eq!(door.mode, None);
        assert_eq!(door.battery_level, Some(97));
        assert_eq!(
            door.last_update.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn status_serializes_with_wire_names() {
        let snap = snapshot(json!([entry("p", "security-panel", None)]));
        let value = serde_json::to_value(device_statuses(&snap)).unwrap();
        assert_eq!(value[0]["type"], "security-panel");
        assert_eq!(value[0]["adapterZid"], serde_json::Value::Null);
    }

    #[test]
    fn panel_status_reports_mode_and_faults() {
        let snap = snapshot(json!([
            {
                "general": { "v2": { "zid": "p", "name": "Alarm", "deviceType": "security-panel" }},
                "device": { "v1": { "mode": "all" } }
            },
            {
                "general": { "v2": { "zid": "w", "name": "Window", "deviceType": "sensor.contact" }},
                "device": { "v1": { "faulted": true } }
            }
        ]));

        let status = panel_status(&snap, "adapter-zid".into());
        assert_eq!(status.zid, "adapter-zid");
        assert_eq!(status.name.as_deref(), Some("Alarm"));
        assert_eq!(status.mode, Some(PanelMode::Away));
        assert_eq!(status.faulted, vec!["Window".to_owned()]);
    }
}
