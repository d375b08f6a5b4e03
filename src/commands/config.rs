use std::path::Path;

use anyhow::{Result, bail};
use daybook_core::DaybookConfig;

/// Write a default config file to `path`, or to the standard location.
pub fn run(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => DaybookConfig::config_path()?,
    };

    if path.exists() && !force {
        bail!(
            "Config file already exists at {}\nUse --force to overwrite it",
            path.display()
        );
    }

    DaybookConfig::create_default_config(&path)?;
    println!("Wrote config to {}", path.display());
    Ok(())
}
