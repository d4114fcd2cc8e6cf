use anyhow::Result;

use folio_core::AppConfig;

pub fn run(config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path();

    if init {
        if path.exists() {
            println!("Configuration already exists at {}", path.display());
        } else {
            AppConfig::default().save()?;
            println!("Wrote default configuration to {}", path.display());
        }
        return Ok(());
    }

    println!("# {}", path.display());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
