use std::{collections::BTreeMap, fs::File, path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    collection::LOG,
    error::{ContextExt, LogErr},
    loader::{DEFAULT_BASE, DEFAULT_PATTERN},
    metadata::UnknownFields,
};

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Directory holding the documents, relative to the project root.
    pub base: PathBuf,
    /// Glob pattern relative to `base`.
    pub pattern: String,
    pub unknown_fields: UnknownFields,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            base: PathBuf::from(DEFAULT_BASE),
            pattern: DEFAULT_PATTERN.to_string(),
            unknown_fields: UnknownFields::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub collections: BTreeMap<Arc<str>, CollectionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collections: BTreeMap::from([(Arc::from(LOG), CollectionConfig::default())]),
        }
    }
}

impl TryFrom<PathBuf> for Config {
    type Error = LogErr;
    fn try_from(value: PathBuf) -> Result<Self, LogErr> {
        let config_path = value.join(CONFIG_FILE);
        let f = File::open(&config_path)
            .with_context(|| format!("config file: {}", config_path.display()))?;
        serde_yaml::from_reader(f)
            .with_context(|| format!("config file not valid: {}", config_path.display()))
    }
}

impl Config {
    /// Reads `config.yaml` from the project directory, or the defaults when there is none.
    pub fn load(path: PathBuf) -> Result<Self, LogErr> {
        if path.join(CONFIG_FILE).exists() {
            Self::try_from(path)
        } else {
            debug!("no {CONFIG_FILE} in {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionConfig> {
        self.collections.get(name)
    }
}
