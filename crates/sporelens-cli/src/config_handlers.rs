//! Handler functions for config CLI commands.

use std::io::Write;
use std::path::{Path, PathBuf};

use sporelens_core::config::PROJECT_NAME;
use sporelens_core::{ConfigLocator, SporelensConfig};

use crate::cli::ConfigAction;
use crate::Result;

/// Dispatch a config subcommand.
pub fn handle_config_command<W: Write>(
    config_path: Option<&str>,
    action: ConfigAction,
    out: &mut W,
) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path, out),
        ConfigAction::Show => cmd_config_show(config_path, out),
        ConfigAction::Init { file, force } => {
            let path = match file {
                Some(p) => PathBuf::from(p),
                None => ConfigLocator::new(PROJECT_NAME)
                    .resolve(config_path)
                    .ok_or_else(no_config_dir)?,
            };
            cmd_config_init(&path, force, out)
        }
    }
}

fn no_config_dir() -> sporelens_core::Error {
    sporelens_core::Error::config("Could not determine config directory for this platform")
}

/// Show the resolved config file path.
pub fn cmd_config_path<W: Write>(config_path: Option<&str>, out: &mut W) -> Result<()> {
    let path = ConfigLocator::new(PROJECT_NAME)
        .resolve(config_path)
        .ok_or_else(no_config_dir)?;
    writeln!(out, "{}", path.display())?;
    if !path.exists() {
        eprintln!("(file does not exist, run `{PROJECT_NAME} config init` to create it)");
    }
    Ok(())
}

/// Print the effective configuration.
pub fn cmd_config_show<W: Write>(config_path: Option<&str>, out: &mut W) -> Result<()> {
    let config = SporelensConfig::load(config_path)?;
    write!(out, "{}", config.to_toml_string()?)?;
    Ok(())
}

/// Write the default configuration to `path`.
pub fn cmd_config_init<W: Write>(path: &Path, force: bool, out: &mut W) -> Result<()> {
    if path.exists() && !force {
        return Err(sporelens_core::Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        ))
        .into());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| sporelens_core::Error::io_with_path(e, parent))?;
    }

    let toml_str = SporelensConfig::default().to_toml_string()?;
    std::fs::write(path, toml_str).map_err(|e| sporelens_core::Error::io_with_path(e, path))?;

    writeln!(out, "Config file created at {}", path.display())?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
