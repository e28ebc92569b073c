//! CLI configuration -- thin wrapper around `ringlink_config`.
//!
//! Adds the resolution step that layers `GlobalOpts` flag overrides
//! (--location, --token, --zid, windows) over the selected profile.

use secrecy::SecretString;

use ringlink_core::HubConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use ringlink_config::{
    Config, Profile, config_path, load_config, load_file_config, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Merge flag overrides into `profile`. Flags win.
fn overlay(profile: Option<&Profile>, global: &GlobalOpts) -> Profile {
    let base = profile.cloned().unwrap_or_default();

    Profile {
        location_id: global.location.clone().unwrap_or(base.location_id),
        zid: global.zid.clone().or(base.zid),
        connections_url: global.connections_url.clone().or(base.connections_url),
        timeout: global.timeout.or(base.timeout),
        query_window_ms: global.query_window.or(base.query_window_ms),
        command_window_ms: global.command_window.or(base.command_window_ms),
        wait: global.wait.map(|w| w.as_str().to_owned()).or(base.wait),
        ..base
    }
}

/// Build the `HubConfig` for this invocation.
///
/// Uses the active profile when one exists; otherwise `--location` and
/// `--token` alone are enough.
pub fn build_hub_config(global: &GlobalOpts, cfg: &Config) -> Result<HubConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);
    let stored = cfg.profiles.get(&profile_name);

    if stored.is_none() && global.location.is_none() {
        if global.profile.is_some() {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }

    let merged = overlay(stored, global);

    let token = match (&global.token, stored) {
        (Some(token), _) => SecretString::from(token.clone()),
        (None, Some(_)) => ringlink_config::resolve_access_token(&merged, &profile_name)?,
        (None, None) => {
            return Err(CliError::NoCredentials {
                profile: profile_name,
            });
        }
    };

    tracing::debug!(
        profile = %profile_name,
        from_profile = stored.is_some(),
        "resolved hub configuration"
    );
    Ok(ringlink_config::build_hub_config(
        &merged,
        &profile_name,
        &cfg.defaults,
        token,
    )?)
}
