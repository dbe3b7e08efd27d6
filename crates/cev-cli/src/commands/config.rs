//! `cev config` command implementation
//!
//! Reads and writes the TOML config file. Environment variables still take
//! precedence over what is stored here.

use crate::config::{config_file_path, Config, CONFIG_KEYS};
use crate::error::Result;
use colored::Colorize;
use std::path::Path;

pub fn get(key: &str) -> Result<()> {
    println!("{}", get_from(&config_file_path(), key)?);
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let path = config_file_path();
    set_in(&path, key, value)?;
    println!("{} Set {} in {}", "✓".green(), key.cyan(), path.display());
    Ok(())
}

pub fn show() -> Result<()> {
    let path = config_file_path();
    let config = Config::load()?;

    println!("{}", "CEV Configuration:".cyan().bold());
    println!();
    for key in CONFIG_KEYS {
        println!("{:<15} {}", format!("{}:", key), config.get(key)?);
    }
    println!();
    println!("{} {}", "Config file:".dimmed(), path.display());
    println!("{}", "Environment Variables:".cyan());
    for key in CONFIG_KEYS {
        println!("  {}", env_var_name(key));
    }
    Ok(())
}

fn get_from(path: &Path, key: &str) -> Result<String> {
    let mut config = Config::load_from(path)?;
    config.apply_env()?;
    config.get(key)
}

fn set_in(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_from(path)?;
    config.set(key, value)?;
    config.save_to(path)
}

/// Environment variable overriding a config key
fn env_var_name(key: &str) -> String {
    match key {
        "timeout_secs" => "CEV_API_TIMEOUT_SECS".to_string(),
        other => format!("CEV_{}", other.to_uppercase()),
    }
}
