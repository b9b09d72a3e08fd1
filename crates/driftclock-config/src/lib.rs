//! Persistent user settings for driftclock.
//!
//! Settings live in a TOML file in the platform config directory. A missing
//! file means defaults; a broken one is an error the caller can report.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use driftclock_core::{HueMode, Material, SimSettings, TimeFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shortest and longest tick the app will run at.
pub const TICK_MS_RANGE: (u64, u64) = (10, 1000);

const CONFIG_FILE: &str = "config.toml";

/// Errors that can occur while loading or saving settings
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Filesystem I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML or has the wrong shape
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The `[sim]` table does not describe valid simulation settings
    #[error("invalid [sim] settings: {0}")]
    Sim(#[source] toml::de::Error),

    /// The `[sim]` settings parse but would break the simulation
    #[error("invalid [sim] settings: {0}")]
    Invalid(&'static str),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No home directory to put the config in
    #[error("config directory not found")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Everything the user can tune.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub material: Material,
    pub hue_mode: HueMode,
    pub time_format: TimeFormat,
    /// Tick length in milliseconds; the material decides when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_ms: Option<u64>,
    /// Overrides layered on top of the material preset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sim: Option<toml::Table>,
}

impl Config {
    /// Default location of the config file.
    pub fn path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "driftclock")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to `path`, creating its directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        log::debug!("saved config to {}", path.display());
        Ok(())
    }

    /// Time between simulation ticks.
    pub fn tick(&self) -> Duration {
        let (min, max) = TICK_MS_RANGE;
        let ms = self.tick_ms.unwrap_or_else(|| self.material.tick_ms());
        if !(min..=max).contains(&ms) {
            log::warn!("tick_ms {ms} out of range, clamping to {min}..={max}");
        }
        Duration::from_millis(ms.clamp(min, max))
    }

    /// The material preset with any `[sim]` overrides applied.
    pub fn sim_settings(&self) -> Result<SimSettings> {
        let preset = self.material.settings();
        let Some(overrides) = &self.sim else {
            return Ok(preset);
        };
        let mut table = toml::Table::try_from(preset)?;
        merge(&mut table, overrides.clone());
        let settings: SimSettings = table.try_into().map_err(ConfigError::Sim)?;
        validate(&settings)?;
        Ok(settings)
    }
}

/// Reject settings under which grains never come to rest.
fn validate(settings: &SimSettings) -> Result<()> {
    let physics = &settings.physics;
    let rules = [
        (
            (0.0..1.0).contains(&physics.elasticity),
            "elasticity must be in [0, 1)",
        ),
        (
            (0.0..1.0).contains(&physics.friction),
            "friction must be in [0, 1)",
        ),
        (physics.gravity > 0.0, "gravity must be positive"),
        (
            physics.movement_epsilon > 0.0,
            "movement_epsilon must be positive",
        ),
        (
            settings.pool.compact_factor > 0,
            "compact_factor must be positive",
        ),
    ];
    match rules.into_iter().find(|(ok, _)| !ok) {
        Some((_, problem)) => Err(ConfigError::Invalid(problem)),
        None => Ok(()),
    }
}

/// Layer `overlay` onto `base`, descending into nested tables.
fn merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(nested) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge(existing, nested),
                _ => {
                    base.insert(key, toml::Value::Table(nested));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftclock_core::PhysicsSettings;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = Config {
            material: Material::Snow,
            hue_mode: HueMode::Festive,
            time_format: TimeFormat::TwelveHour,
            tick_ms: Some(50),
            sim: None,
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.tick(), Duration::from_millis(33));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "material = \"lava\"\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str("hue_mode = \"festive\"\n").unwrap();
        assert_eq!(config.hue_mode, HueMode::Festive);
        assert_eq!(config.material, Material::Sand);
    }

    #[test]
    fn test_tick_is_clamped() {
        let mut config = Config {
            tick_ms: Some(1),
            ..Config::default()
        };
        assert_eq!(config.tick(), Duration::from_millis(10));
        config.tick_ms = Some(60_000);
        assert_eq!(config.tick(), Duration::from_millis(1000));
        config.tick_ms = None;
        config.material = Material::Snow;
        assert_eq!(config.tick(), Duration::from_millis(100));
    }

    #[test]
    fn test_sim_overrides_layer_on_preset() {
        let config: Config = toml::from_str(
            r#"
material = "snow"

[sim]
seed = 7

[sim.physics]
gravity = 0.02
"#,
        )
        .unwrap();
        let settings = config.sim_settings().unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(
            settings.physics,
            PhysicsSettings {
                gravity: 0.02,
                ..PhysicsSettings::default()
            }
        );
        // Untouched snow preset values survive.
        assert!(settings.reactions.breeze);
        assert_eq!(settings.reactions.snowfall_per_tick, 2.0);
    }

    #[test]
    fn test_bad_sim_table() {
        let config: Config = toml::from_str("[sim.physics]\ngravity = \"down\"\n").unwrap();
        assert!(matches!(config.sim_settings(), Err(ConfigError::Sim(_))));
    }

    #[test]
    fn test_bouncy_physics_is_rejected() {
        for physics in [
            "elasticity = 1.5",
            "friction = 2.0",
            "gravity = 0.0",
            "movement_epsilon = -0.1",
        ] {
            let text = format!("[sim.physics]\n{physics}\n");
            let config: Config = toml::from_str(&text).unwrap();
            assert!(
                matches!(config.sim_settings(), Err(ConfigError::Invalid(_))),
                "{physics} should be rejected"
            );
        }
        let config: Config = toml::from_str("[sim.pool]\ncompact_factor = 0\n").unwrap();
        assert!(matches!(config.sim_settings(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_no_overrides_is_preset() {
        let config = Config {
            material: Material::Snow,
            ..Config::default()
        };
        assert_eq!(config.sim_settings().unwrap(), Material::Snow.settings());
    }
}
