//! Raw snapshot handler. Prints the decoded hub message as-is.

use ringlink_core::HubController;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub async fn handle(controller: &HubController, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = controller.snapshot().await?;

    // No table view for the raw document; fall back to pretty JSON.
    let format = match global.output {
        OutputFormat::Table => OutputFormat::Json,
        other => other,
    };
    let out = output::render_single(
        format,
        &snapshot,
        |_| String::new(),
        |s| {
            s.body
                .iter()
                .filter_map(|d| d.zid())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
