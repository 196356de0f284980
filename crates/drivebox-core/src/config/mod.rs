//! Application configuration loading and schema.
//!
//! Configuration is layered: defaults from `config/default.toml`, then an
//! environment-specific file (`config/{env}.toml`), then environment
//! variables with the `DRIVEBOX__` prefix (double underscore separates
//! nesting levels, e.g. `DRIVEBOX__DATABASE__URL`).

mod database;
mod logging;
mod scan;
mod storage;
mod tree;

pub use database::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use scan::ScanConfig;
pub use storage::StorageConfig;
pub use tree::{InheritanceMode, TreeConfig};

use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            tree: TreeConfig::default(),
            scan: ScanConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Missing files are not an error; environment variables always win.
    pub fn load(env: &str) -> AppResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DRIVEBOX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        Ok(config)
    }
}
