//! Resolves the run configuration from the config file, environment,
//! global flags and, with `--interactive`, terminal prompts.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};
use secrecy::SecretString;
use tracing::debug;

use edgesync_config::Config;
use edgesync_core::SyncConfig;

use crate::cli::GlobalOpts;
use crate::error::{CliError, prompt_err};

/// Config file in effect: `--config` / `EDGESYNC_CONFIG`, else the
/// platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(edgesync_config::config_path)
}

/// Load the layered config and apply global flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = edgesync_config::load_config(global.config.as_deref())?;
    if global.insecure {
        cfg.fmc.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.fmc.timeout = timeout;
    }
    Ok(cfg)
}

/// Turn a loaded config into the core's validated `SyncConfig`.
pub fn build_sync_config(global: &GlobalOpts, mut cfg: Config) -> Result<SyncConfig, CliError> {
    let prompted_password = if global.interactive {
        prompt_settings(&mut cfg)?
    } else {
        None
    };

    log_effective(&cfg);

    let mut sync = edgesync_config::to_sync_config(&cfg)?;
    // A typed password beats env and keyring.
    if let Some(password) = prompted_password {
        sync.connection.password = password;
    }
    Ok(sync)
}

/// Ask for each connection and source setting, offering the current value
/// as the default. Returns the typed password, if any.
fn prompt_settings(cfg: &mut Config) -> Result<Option<SecretString>, CliError> {
    cfg.fmc.url = Some(prompt_text("FMC base URL", cfg.fmc.url.clone())?);
    cfg.fmc.username = Some(prompt_text("FMC username", cfg.fmc.username.clone())?);

    let password = rpassword::prompt_password("FMC password (empty keeps stored): ")
        .map_err(prompt_err)?;

    cfg.sync.object_name = prompt_text("Dynamic object name", Some(cfg.sync.object_name.clone()))?;
    cfg.sync.ipv4_url = prompt_text("IPv4 list URL", Some(cfg.sync.ipv4_url.clone()))?;
    cfg.sync.include_ipv6 = Confirm::new()
        .with_prompt("Include IPv6 list?")
        .default(cfg.sync.include_ipv6)
        .interact()
        .map_err(prompt_err)?;
    if cfg.sync.include_ipv6 {
        cfg.sync.ipv6_url = prompt_text("IPv6 list URL", Some(cfg.sync.ipv6_url.clone()))?;
    }

    if password.is_empty() {
        return Ok(None);
    }
    // Lets credential resolution succeed when nothing else is stored.
    cfg.fmc.password = Some(password.clone());
    Ok(Some(SecretString::from(password)))
}

fn prompt_text(prompt: &str, current: Option<String>) -> Result<String, CliError> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(value) = current.filter(|v| !v.is_empty()) {
        input = input.default(value);
    }
    input.interact_text().map_err(prompt_err)
}

fn log_effective(cfg: &Config) {
    debug!(
        url = cfg.fmc.url.as_deref().unwrap_or("<unset>"),
        username = cfg.fmc.username.as_deref().unwrap_or("<unset>"),
        insecure = cfg.fmc.insecure || !cfg.fmc.verify_ssl,
        object = %cfg.sync.object_name,
        ipv4_url = %cfg.sync.ipv4_url,
        ipv6_url = %cfg.sync.ipv6_url,
        include_ipv6 = cfg.sync.include_ipv6,
        dry_run = cfg.sync.dry_run,
        batch_size = cfg.sync.batch_size,
        "effective configuration"
    );
}
