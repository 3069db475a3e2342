//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};

use edgesync_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::{CliError, prompt_err};
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` safe to print.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    if cfg.fmc.password.is_some() {
        cfg.fmc.password = Some(REDACTED.into());
    }
    cfg
}

fn render_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("serialization failed: {e}"))
}

/// Offer keyring storage for the password.
///
/// Returns `Some(password)` if the user chose plaintext, `None` if stored in
/// the keyring.
fn prompt_password_storage(username: &str, password: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        edgesync_config::store_password(username, password)?;
        eprintln!("   ✓ password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password.to_owned()))
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);
    eprintln!("edgesync configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    let mut cfg = if path.exists() {
        edgesync_config::load_config(Some(path.as_path()))?
    } else {
        Config::default()
    };

    // 1. FMC connection
    let mut url = Input::<String>::new().with_prompt("FMC base URL");
    if let Some(current) = cfg.fmc.url.clone() {
        url = url.default(current);
    }
    cfg.fmc.url = Some(url.interact_text().map_err(prompt_err)?);

    let mut username = Input::<String>::new().with_prompt("FMC username");
    if let Some(current) = cfg.fmc.username.clone() {
        username = username.default(current);
    }
    let username = username.interact_text().map_err(prompt_err)?;

    let password = rpassword::prompt_password("FMC password: ").map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "fmc.password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    cfg.fmc.password = prompt_password_storage(&username, &password)?;
    cfg.fmc.username = Some(username);

    cfg.fmc.verify_ssl = Confirm::new()
        .with_prompt("Verify the FMC TLS certificate?")
        .default(cfg.fmc.verify_ssl && !cfg.fmc.insecure)
        .interact()
        .map_err(prompt_err)?;
    cfg.fmc.insecure = false;

    // 2. Managed object and sources
    cfg.sync.object_name = Input::new()
        .with_prompt("Dynamic object name")
        .default(cfg.sync.object_name.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.sync.include_ipv6 = Confirm::new()
        .with_prompt("Include IPv6 edge servers?")
        .default(cfg.sync.include_ipv6)
        .interact()
        .map_err(prompt_err)?;

    cfg.sync.batch_size = Input::new()
        .with_prompt("Addresses per request")
        .default(cfg.sync.batch_size)
        .validate_with(|n: &usize| if *n == 0 { Err("must be at least 1") } else { Ok(()) })
        .interact_text()
        .map_err(prompt_err)?;

    edgesync_config::save_config(&cfg, &path)?;
    eprintln!("\n   ✓ Config saved to {}", path.display());
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load(global)?);
            let out = output::render_single(&global.output, &cfg, render_toml, render_toml);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_file(global).display().to_string(), false);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_redacted() {
        let mut cfg = Config::default();
        cfg.fmc.username = Some("api".into());
        cfg.fmc.password = Some("hunter2".into());

        let shown = render_toml(&redacted(&cfg));
        assert!(shown.contains(REDACTED));
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("api"));
    }

    #[test]
    fn absent_password_stays_absent() {
        let shown = render_toml(&redacted(&Config::default()));
        assert!(!shown.contains("password ="));
    }
}
