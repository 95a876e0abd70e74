//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use moments_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "store_key": config.store_key,
                    "export_dir": config.export_dir,
                    "jpeg_quality": config.jpeg_quality,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:     {}", config.data_dir.display());
            println!("  store_key:    {}", config.store_key);
            println!(
                "  export_dir:   {}",
                config
                    .export_dir
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| format!(
                        "(not set, using {})",
                        config.resolved_export_dir().display()
                    ))
            );
            println!("  jpeg_quality: {}", config.jpeg_quality);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "store_key" => {
            if value.trim().is_empty() {
                bail!("store_key cannot be empty");
            }
            config.store_key = value.to_string();
        }
        "export_dir" => {
            config.export_dir = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        "jpeg_quality" => {
            let quality: u8 = value
                .parse()
                .context("Invalid value for jpeg_quality. Use a number from 1 to 100.")?;
            if !(1..=100).contains(&quality) {
                bail!("jpeg_quality must be between 1 and 100");
            }
            config.jpeg_quality = quality;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, store_key, export_dir, jpeg_quality",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "data_dir", "/data/moments").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/data/moments"));

        apply(&mut config, "export_dir", "/exports").unwrap();
        assert_eq!(config.export_dir, Some(PathBuf::from("/exports")));
        apply(&mut config, "export_dir", "none").unwrap();
        assert!(config.export_dir.is_none());

        apply(&mut config, "jpeg_quality", "65").unwrap();
        assert_eq!(config.jpeg_quality, 65);

        apply(&mut config, "store_key", "journal").unwrap();
        assert_eq!(config.store_key, "journal");
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();

        assert!(apply(&mut config, "jpeg_quality", "0").is_err());
        assert!(apply(&mut config, "jpeg_quality", "lots").is_err());
        assert!(apply(&mut config, "store_key", " ").is_err());
        assert!(apply(&mut config, "sync_url", "ws://nowhere").is_err());
    }
}
