use std::{fmt::Debug, path::PathBuf};

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "KV_MIGRATE_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigratorConfig {
    pub state_store_path: PathBuf,
    #[serde(default)]
    pub structured_logging: bool,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        MigratorConfig {
            state_store_path: PathBuf::from("kv_migrate_storage/state"),
            structured_logging: false,
        }
    }
}

impl MigratorConfig {
    /// Defaults overridden by `KV_MIGRATE_*` environment variables.
    pub fn from_env() -> Result<MigratorConfig> {
        let config: MigratorConfig = Figment::from(Serialized::defaults(MigratorConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the YAML file, then by the environment.
    pub fn from_path(path: &str) -> Result<MigratorConfig> {
        let config_str = std::fs::read_to_string(path)?;
        let config: MigratorConfig = Figment::from(Serialized::defaults(MigratorConfig::default()))
            .merge(Yaml::string(&config_str))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.state_store_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("state_store_path must not be empty"));
        }
        Ok(())
    }
}
