//! Layered settings: an optional TOML file, then `BOIS_*` environment
//! variables, then command line overrides.

use std::path::PathBuf;

use serde::Deserialize;

use crate::{Cli, error::Result};

const DEFAULT_CONFIG_PATH: &str = "bois.toml";

/// Where the ledger store lives while a report is computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub registry: PathBuf,
    /// Where `--keepdb` writes the ledger text.
    pub ledger_path: PathBuf,
    pub database: Database,
    pub color: bool,
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry: PathBuf::from("registro.json"),
            ledger_path: PathBuf::from("registro.beancount"),
            database: Database::Memory,
            color: false,
            level: "warn".to_string(),
        }
    }
}

pub fn load(cli: &Cli) -> Result<Settings> {
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(config_path).required(false))
        .add_source(config::Environment::with_prefix("BOIS"))
        .build()?
        .try_deserialize()?;

    if let Some(registry) = &cli.registry {
        settings.registry = registry.clone();
    }
    if cli.color {
        settings.color = true;
    }

    Ok(settings)
}
