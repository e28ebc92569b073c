//! Security panel status handler.

use ringlink_core::{HubController, PanelStatus};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(p: &PanelStatus, color: bool) -> String {
    let mut lines = vec![
        format!("Panel:   {}", p.name.as_deref().unwrap_or("-")),
        format!("ZID:     {}", p.zid),
        format!(
            "Mode:    {}",
            output::paint_mode(p.mode, p.raw_mode.as_deref(), color)
        ),
    ];
    if p.faulted.is_empty() {
        lines.push(format!("Faults:  {}", output::paint_fault(false, color)));
    } else {
        lines.push(format!("Faults:  {}", p.faulted.len()));
        lines.extend(p.faulted.iter().map(|name| format!("  - {name}")));
    }
    lines.join("\n")
}

pub async fn handle(controller: &HubController, global: &GlobalOpts) -> Result<(), CliError> {
    let panel = controller.panel().await?;

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &panel,
        |p| detail(p, color),
        |p| p.mode.map_or_else(|| p.raw_mode.clone().unwrap_or_default(), |m| m.to_string()),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
