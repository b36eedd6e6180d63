//! Configuration for the ember countdown.
//!
//! Settings live in `config.toml` under the platform config directory
//! (`~/.config/ember/` on Linux). A missing file means defaults; a malformed
//! one is reported rather than silently ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use directories::ProjectDirs;
use ember_core::{Bounds, FieldConfig, SparkConfig, Viewport};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Layout accepted for the local target date-time.
pub const TARGET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const CONFIG_FILE: &str = "config.toml";

/// Errors raised while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid target `{0}`: expected YYYY-MM-DDTHH:MM:SS or RFC 3339")]
    InvalidTarget(String),

    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}

/// Particle field presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticlePreset {
    /// 40 embers with gentle sway.
    #[default]
    Embers,
    /// 200 embers with full sway.
    Storm,
}

impl ParticlePreset {
    fn base(self, viewport: Viewport) -> FieldConfig {
        match self {
            ParticlePreset::Embers => FieldConfig::embers(viewport),
            ParticlePreset::Storm => FieldConfig::storm(viewport),
        }
    }
}

/// Ember field settings. Unset fields fall back to the preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    pub preset: ParticlePreset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sway_amplitude: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<[f32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<[f32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<[f32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift: Option<[f32; 2]>,
}

/// Cursor spark settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkSettings {
    pub enabled: bool,
    pub capacity: usize,
    pub throttle_ms: u64,
    pub lifetime_ms: u64,
}

impl Default for SparkSettings {
    fn default() -> Self {
        let defaults = SparkConfig::default();
        Self {
            enabled: true,
            capacity: defaults.capacity,
            throttle_ms: defaults.throttle.as_millis() as u64,
            lifetime_ms: defaults.lifetime.as_millis() as u64,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name shown above the countdown.
    pub event_name: String,
    /// Local date-time the countdown runs to.
    pub target: String,
    /// Countdown recomputation period.
    pub tick_period_ms: u64,
    /// Log level for the log file.
    pub log_level: String,
    /// Bleed ember light into neighbouring cells.
    pub glow: bool,
    pub particles: ParticleSettings,
    pub sparks: SparkSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_name: "ZERONE 3.0".to_string(),
            target: "2025-12-24T09:00:00".to_string(),
            tick_period_ms: 1000,
            log_level: "info".to_string(),
            glow: false,
            particles: ParticleSettings::default(),
            sparks: SparkSettings::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "ember")
}

/// Directory log files are written to.
pub fn log_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join("logs"))
}

fn bounds(pair: Option<[f32; 2]>, fallback: Bounds) -> Bounds {
    pair.map_or(fallback, |[min, max]| Bounds::new(min, max))
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load from the default location, or defaults when there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Write to the default location.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The countdown target as a UTC instant.
    ///
    /// RFC 3339 strings carry their own offset; bare date-times are read in
    /// the local time zone.
    pub fn target_instant(&self) -> Result<DateTime<Utc>, ConfigError> {
        parse_target(&self.target)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Field configuration for a viewport: the preset with overrides applied.
    pub fn field_config(&self, viewport: Viewport) -> FieldConfig {
        let p = &self.particles;
        let base = p.preset.base(viewport);
        FieldConfig {
            count: p.count.unwrap_or(base.count),
            sway_amplitude: p.sway_amplitude.unwrap_or(base.sway_amplitude),
            radius: bounds(p.radius, base.radius),
            speed: bounds(p.speed, base.speed),
            opacity: bounds(p.opacity, base.opacity),
            drift: bounds(p.drift, base.drift),
            viewport,
        }
    }

    /// Spark configuration, or `None` when sparks are disabled.
    pub fn spark_config(&self) -> Option<SparkConfig> {
        let s = &self.sparks;
        s.enabled.then(|| SparkConfig {
            capacity: s.capacity,
            throttle: Duration::from_millis(s.throttle_ms),
            lifetime: Duration::from_millis(s.lifetime_ms),
            ..SparkConfig::default()
        })
    }
}

/// Parse a target date-time. See [`Config::target_instant`].
pub fn parse_target(value: &str) -> Result<DateTime<Utc>, ConfigError> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, TARGET_FORMAT)
        .map_err(|_| ConfigError::InvalidTarget(value.to_string()))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| ConfigError::InvalidTarget(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tick_period(), Duration::from_millis(1000));
        assert_eq!(config.particles.preset, ParticlePreset::Embers);
        assert!(config.sparks.enabled);
        assert!(config.target_instant().is_ok());
    }

    #[test]
    fn test_parse_rfc3339_target() {
        let t = parse_target("2025-12-24T09:00:00+05:30").unwrap();
        assert_eq!((t.hour(), t.minute()), (3, 30));
    }

    #[test]
    fn test_parse_local_target() {
        let t = parse_target(" 2025-12-24T09:00:00 ").unwrap();
        assert_eq!(t.with_timezone(&Local).hour(), 9);
    }

    #[test]
    fn test_invalid_target() {
        assert!(matches!(
            parse_target("next tuesday"),
            Err(ConfigError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_field_config_overrides() {
        let mut config = Config::default();
        config.particles.preset = ParticlePreset::Storm;
        config.particles.count = Some(75);
        config.particles.speed = Some([1.0, 2.0]);

        let vp = Viewport::new(100.0, 50.0);
        let field = config.field_config(vp);
        assert_eq!(field.count, 75);
        assert_eq!(field.sway_amplitude, 1.0);
        assert_eq!(field.speed, Bounds::new(1.0, 2.0));
        assert_eq!(field.radius, FieldConfig::storm(vp).radius);
        assert_eq!(field.viewport, vp);
    }

    #[test]
    fn test_upward_speed_rejected_by_field() {
        let config: Config = toml::from_str(
            r#"
            [particles]
            speed = [-2.0, -1.0]
            "#,
        )
        .unwrap();
        let field = ember_core::ParticleField::new(&config.field_config(Viewport::new(80.0, 80.0)));
        assert!(matches!(
            field,
            Err(ember_core::CoreError::InvalidArgument { name: "speed", .. })
        ));
    }

    #[test]
    fn test_spark_config() {
        let mut config = Config::default();
        let sparks = config.spark_config().unwrap();
        assert_eq!(sparks, SparkConfig::default());

        config.sparks.enabled = false;
        assert!(config.spark_config().is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            target = "2026-01-01T00:00:00"

            [particles]
            preset = "storm"
            sway_amplitude = 0.75
            "#,
        )
        .unwrap();
        assert_eq!(config.target, "2026-01-01T00:00:00");
        assert_eq!(config.particles.preset, ParticlePreset::Storm);
        assert_eq!(config.particles.sway_amplitude, Some(0.75));
        assert_eq!(config.tick_period_ms, 1000);
        assert_eq!(config.sparks, SparkSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = Config::default();
        config.event_name = "Hack Night".to_string();
        config.particles.drift = Some([-0.1, 0.1]);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "tick_period_ms = \"soon\"").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
