//! Config subcommand handlers.

use std::io::{self, BufRead};
use std::path::PathBuf;

use rbxfolio_config::{self as config, Config, KEYRING_COOKIE_ENTRY, KEYRING_SERVICE};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

fn active_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config::config_path)
}

/// Render config as TOML with the plaintext cookie masked.
fn format_config_redacted(cfg: &Config) -> Result<String, CliError> {
    let mut shown = cfg.clone();
    if shown.api.session_cookie.is_some() {
        shown.api.session_cookie = Some("****".into());
    }
    toml::to_string_pretty(&shown).map_err(|e| CliError::Config(e.into()))
}

fn keyring_entry() -> Result<keyring::Entry, CliError> {
    Ok(keyring::Entry::new(KEYRING_SERVICE, KEYRING_COOKIE_ENTRY)?)
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = active_path(global);

    match args.command {
        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config(Some(path.as_path()))?;
            print!("{}", format_config_redacted(&cfg)?);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config(&Config::default(), &path)?;
            eprintln!("Wrote {}", path.display());
            Ok(())
        }

        ConfigCommand::SetCookie => {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            let cookie = line.trim();
            if cookie.is_empty() {
                return Err(CliError::Validation {
                    field: "cookie".into(),
                    reason: "expected the .ROBLOSECURITY value on stdin".into(),
                });
            }
            keyring_entry()?.set_password(cookie)?;
            eprintln!("Session cookie stored in the system keyring");
            Ok(())
        }

        ConfigCommand::ClearCookie => {
            keyring_entry()?.delete_credential()?;
            eprintln!("Session cookie removed from the system keyring");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn redacts_plaintext_cookie() {
        let mut cfg = Config::default();
        cfg.api.session_cookie = Some("_|WARNING:-DO-NOT-SHARE-THIS".into());

        let shown = format_config_redacted(&cfg).unwrap();

        assert!(shown.contains("session_cookie = \"****\""));
        assert!(!shown.contains("DO-NOT-SHARE"));
    }
}
