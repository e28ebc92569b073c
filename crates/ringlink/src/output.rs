//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one value per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use ringlink_core::PanelMode;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Panel mode label: red when armed away, yellow at home, green when off.
pub fn paint_mode(mode: Option<PanelMode>, raw: Option<&str>, color: bool) -> String {
    let Some(mode) = mode else {
        return raw.unwrap_or("-").to_owned();
    };
    let label = mode.to_string();
    if !color {
        return label;
    }
    match mode {
        PanelMode::Away => label.red().bold().to_string(),
        PanelMode::Home => label.yellow().bold().to_string(),
        PanelMode::Off => label.green().to_string(),
    }
}

pub fn paint_fault(faulted: bool, color: bool) -> String {
    match (faulted, color) {
        (true, true) => "faulted".red().to_string(),
        (true, false) => "faulted".into(),
        (false, true) => "ok".dimmed().to_string(),
        (false, false) => "ok".into(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(data)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views don't use the
/// `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(data)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize, Tabled)]
    struct Item {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Faulted")]
        faulted: bool,
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                id: "door-1".into(),
                faulted: true,
            },
            Item {
                id: "motion-1".into(),
                faulted: false,
            },
        ]
    }

    fn render(format: OutputFormat) -> String {
        render_list(
            format,
            &items(),
            |i| Item {
                id: i.id.clone(),
                faulted: i.faulted,
            },
            |i| i.id.clone(),
        )
        .unwrap_or_default()
    }

    #[test]
    fn list_formats() {
        insta::assert_snapshot!(render(OutputFormat::Plain), @r"
        door-1
        motion-1
        ");
        insta::assert_snapshot!(render(OutputFormat::JsonCompact), @r#"[{"id":"door-1","faulted":true},{"id":"motion-1","faulted":false}]"#);
        insta::assert_snapshot!(render(OutputFormat::Table), @r"
        ╭──────────┬─────────╮
        │ ID       │ Faulted │
        ├──────────┼─────────┤
        │ door-1   │ true    │
        │ motion-1 │ false   │
        ╰──────────┴─────────╯
        ");
    }

    #[test]
    fn uncolored_labels() {
        assert_eq!(paint_mode(Some(PanelMode::Away), Some("all"), false), "away");
        assert_eq!(paint_mode(None, Some("unknown"), false), "unknown");
        assert_eq!(paint_mode(None, None, false), "-");
        assert_eq!(paint_fault(true, false), "faulted");
        assert_eq!(paint_fault(false, false), "ok");
    }
}
