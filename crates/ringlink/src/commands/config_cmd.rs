//! Config subcommand handlers.

use dialoguer::{Input, Password, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "query_window_ms = {}", cfg.defaults.query_window_ms);
    let _ = writeln!(out, "command_window_ms = {}", cfg.defaults.command_window_ms);
    let _ = writeln!(out, "wait = \"{}\"", cfg.defaults.wait);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "location_id = \"{}\"", p.location_id);
        if let Some(ref zid) = p.zid {
            let _ = writeln!(out, "zid = \"{zid}\"");
        }
        if let Some(ref url) = p.connections_url {
            let _ = writeln!(out, "connections_url = \"{url}\"");
        }
        if p.access_token.is_some() {
            let _ = writeln!(out, "access_token = \"****\"");
        }
        if let Some(ref env) = p.access_token_env {
            let _ = writeln!(out, "access_token_env = \"{env}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ms) = p.query_window_ms {
            let _ = writeln!(out, "query_window_ms = {ms}");
        }
        if let Some(ms) = p.command_window_ms {
            let _ = writeln!(out, "command_window_ms = {ms}");
        }
        if let Some(ref wait) = p.wait {
            let _ = writeln!(out, "wait = \"{wait}\"");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_token() -> Result<String, CliError> {
    let token = Password::new()
        .with_prompt("Access token")
        .interact()
        .map_err(prompt_err)?;
    if token.trim().is_empty() {
        return Err(CliError::Validation {
            field: "access_token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(token.trim().to_owned())
}

/// Offer keyring storage for the token, or return it for plaintext config.
///
/// Returns `Some(token)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_token_storage(token: &str, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where should the token be stored?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        ringlink_config::store_access_token(profile_name, token)?;
        eprintln!("   ✓ Access token stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(token.to_owned()))
    }
}

fn profile_listing(cfg: &Config) -> String {
    let default = cfg.default_profile.as_deref().unwrap_or("default");
    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    names
        .into_iter()
        .map(|name| {
            let marker = if name == default { "*" } else { " " };
            format!("{marker} {name}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_file_config()?;

    let name: String = Input::new()
        .with_prompt("Profile name")
        .default(global.profile.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    let location_id: String = Input::new()
        .with_prompt("Location id")
        .interact_text()
        .map_err(prompt_err)?;

    let zid: String = Input::new()
        .with_prompt("Security panel zid (blank to discover)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    let token = prompt_token()?;
    let access_token = prompt_token_storage(&token, &name)?;

    let profile = Profile {
        location_id: location_id.trim().to_owned(),
        zid: Some(zid.trim().to_owned()).filter(|z| !z.is_empty()),
        access_token,
        ..Profile::default()
    };
    if profile.location_id.is_empty() {
        return Err(CliError::Validation {
            field: "location_id".into(),
            reason: "location id cannot be empty".into(),
        });
    }

    cfg.profiles.insert(name.clone(), profile);
    if cfg.profiles.len() == 1 {
        cfg.default_profile = Some(name.clone());
    }
    config::save_config(&cfg)?;

    eprintln!(
        "   ✓ Profile '{name}' saved to {}",
        config::config_path().display()
    );
    Ok(())
}

fn use_profile(name: &str) -> Result<(), CliError> {
    let mut cfg = config::load_file_config()?;
    if !cfg.profiles.contains_key(name) {
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: name.into(),
            available: available.join(", "),
        });
    }
    cfg.default_profile = Some(name.into());
    config::save_config(&cfg)?;
    eprintln!("   ✓ Default profile set to '{name}'");
    Ok(())
}

fn set_token(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config()?;
    let name = config::active_profile_name(global, &cfg);
    let token = prompt_token()?;
    ringlink_config::store_access_token(&name, &token)?;
    eprintln!("   ✓ Access token for '{name}' stored in system keyring");
    Ok(())
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            output::print_output(format_config_redacted(&cfg).trim_end(), global.quiet);
            Ok(())
        }
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            output::print_output(&profile_listing(&cfg), global.quiet);
            Ok(())
        }
        ConfigCommand::Use { name } => use_profile(&name),
        ConfigCommand::SetToken => set_token(global),
    }
}
