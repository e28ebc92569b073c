//! Panel mode handler.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use ringlink_core::{HubController, ModeChange, PanelMode};

use crate::cli::{GlobalOpts, ModeArg, ModeArgs};
use crate::error::CliError;
use crate::output;

impl From<ModeArg> for PanelMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Home => Self::Home,
            ModeArg::Away => Self::Away,
            ModeArg::Off => Self::Off,
        }
    }
}

/// Spinner on stderr while the exchange runs; hidden when not a terminal.
fn spinner(mode: PanelMode, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Setting panel mode to {mode}..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn detail(change: &ModeChange, color: bool) -> String {
    let mut line = format!(
        "Panel {} set to {}",
        change.zid,
        output::paint_mode(Some(change.mode), None, color)
    );
    if change.update_observed {
        line.push_str(" (hub update seen)");
    }
    line
}

pub async fn handle(
    controller: &HubController,
    args: &ModeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mode = PanelMode::from(args.mode);

    let pb = spinner(mode, global.quiet);
    let result = controller.set_mode(mode, None).await;
    pb.finish_and_clear();
    let change = result?;

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &change,
        |c| detail(c, color),
        |c| c.mode.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
