use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::ConfigError;
use crate::state::Millis;

fn default_name() -> String {
    "grove".to_string()
}

fn default_auto_till_interval() -> Millis {
    1_000
}

fn default_production_interval() -> Millis {
    1_000
}

fn default_special_event_interval() -> Millis {
    60_000
}

fn default_special_event_duration() -> Millis {
    30_000
}

fn default_special_event_chance() -> f64 {
    0.1
}

fn default_special_event_multipliers() -> Vec<u32> {
    vec![2, 3, 4]
}

fn default_click_boost_duration() -> Millis {
    300_000
}

fn default_matured_mark() -> Millis {
    2_000
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default = "default_auto_till_interval")]
    pub auto_till_interval_ms: Millis,
    #[serde(default = "default_production_interval")]
    pub production_interval_ms: Millis,
    #[serde(default = "default_special_event_interval")]
    pub special_event_interval_ms: Millis,
    #[serde(default = "default_special_event_duration")]
    pub special_event_duration_ms: Millis,
    #[serde(default = "default_special_event_chance")]
    pub special_event_chance: f64,
    #[serde(default = "default_special_event_multipliers")]
    pub special_event_multipliers: Vec<u32>,
    #[serde(default = "default_click_boost_duration")]
    pub click_boost_duration_ms: Millis,
    /// How long a freshly matured tree stays flagged for presentation.
    #[serde(default = "default_matured_mark")]
    pub matured_mark_ms: Millis,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            auto_till_interval_ms: default_auto_till_interval(),
            production_interval_ms: default_production_interval(),
            special_event_interval_ms: default_special_event_interval(),
            special_event_duration_ms: default_special_event_duration(),
            special_event_chance: default_special_event_chance(),
            special_event_multipliers: default_special_event_multipliers(),
            click_boost_duration_ms: default_click_boost_duration(),
            matured_mark_ms: default_matured_mark(),
        }
    }
}

impl Timings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("auto_till_interval_ms", self.auto_till_interval_ms),
            ("production_interval_ms", self.production_interval_ms),
            ("special_event_interval_ms", self.special_event_interval_ms),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { field });
            }
        }
        if !(0.0..=1.0).contains(&self.special_event_chance) {
            return Err(ConfigError::InvalidChance(self.special_event_chance));
        }
        if self.special_event_multipliers.is_empty()
            || self.special_event_multipliers.contains(&0)
        {
            return Err(ConfigError::InvalidEventMultipliers);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// A complete game definition: identity, clock settings and catalog data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub timings: Timings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(flatten)]
    pub catalog: Catalog,
}

impl GameConfig {
    /// The stock game, identical to `catalogs/grove.yaml`.
    pub fn grove() -> Self {
        Self {
            name: default_name(),
            seed: 7,
            timings: Timings::default(),
            logging: LoggingConfig::default(),
            catalog: Catalog::grove(),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: GameConfig =
            serde_yaml::from_str(text).context("Failed to parse game config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timings.validate()?;
        self.catalog.validate()
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<GameConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read game config {}", path.display()))?;
        let config: GameConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid game config {}", path.display()))?;
        Ok(config)
    }
}
