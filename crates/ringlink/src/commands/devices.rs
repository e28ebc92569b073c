//! Device list handler.

use tabled::Tabled;

use ringlink_core::{DeviceStatus, HubController};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ZID")]
    zid: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Battery")]
    battery: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl DeviceRow {
    fn new(d: &DeviceStatus, color: bool) -> Self {
        Self {
            zid: d.id.clone(),
            name: d.name.clone(),
            device_type: d.device_type.clone(),
            state: output::paint_fault(d.faulted, color),
            mode: if d.mode.is_some() {
                output::paint_mode(d.panel_mode(), d.mode.as_deref(), color)
            } else {
                String::new()
            },
            battery: d.battery_level.map(|b| format!("{b}%")).unwrap_or_default(),
            updated: d
                .last_update
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

fn matches(d: &DeviceStatus, args: &DevicesArgs) -> bool {
    (!args.faulted || d.faulted)
        && args
            .device_type
            .as_deref()
            .is_none_or(|t| d.device_type.eq_ignore_ascii_case(t))
}

pub async fn handle(
    controller: &HubController,
    args: &DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let devices: Vec<DeviceStatus> = controller
        .device_statuses()
        .await?
        .into_iter()
        .filter(|d| matches(d, args))
        .collect();

    let color = output::should_color(global.color);
    let out = output::render_list(
        global.output,
        &devices,
        |d| DeviceRow::new(d, color),
        |d| d.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(device_type: &str, faulted: bool) -> DeviceStatus {
        DeviceStatus {
            id: "z".into(),
            name: "n".into(),
            device_type: device_type.into(),
            adapter_zid: None,
            faulted,
            mode: None,
            battery_level: Some(80),
            comm_status: None,
            last_update: None,
        }
    }

    #[test]
    fn filters_combine() {
        let args = DevicesArgs {
            faulted: true,
            device_type: Some("sensor.contact".into()),
        };
        assert!(matches(&status("sensor.contact", true), &args));
        assert!(!matches(&status("sensor.contact", false), &args));
        assert!(!matches(&status("sensor.motion", true), &args));

        let all = DevicesArgs {
            faulted: false,
            device_type: None,
        };
        assert!(matches(&status("security-panel", false), &all));
    }

    #[test]
    fn row_leaves_mode_blank_for_plain_devices() {
        let row = DeviceRow::new(&status("sensor.contact", false), false);
        assert_eq!(row.mode, "");
        assert_eq!(row.battery, "80%");
        assert_eq!(row.state, "ok");
    }
}
