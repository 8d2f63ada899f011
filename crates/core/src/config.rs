//! User configuration: batch size and purchase cadence.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::BulkBuyError;

/// Directory under the user's config dir that holds `config.toml`.
pub const CONFIG_DIR: &str = "bulkbuy";
/// Prefix for environment overrides (`BULKBUY_BATCH_SIZE`, `BULKBUY_SPEED`).
pub const ENV_PREFIX: &str = "BULKBUY";

const DEFAULT_CONFIG: &str = r#"# Units added to the purchase queue per shift-click.
batch_size = 4

# Ticks between automated purchases:
# "fast" (4), "balanced" (5), "safe" (6) or "very_safe" (8).
speed = "balanced"
"#;

/// Named purchase cadence tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkBuySpeed {
    /// One purchase every 4 ticks.
    Fast,
    /// One purchase every 5 ticks.
    #[default]
    Balanced,
    /// One purchase every 6 ticks.
    Safe,
    /// One purchase every 8 ticks.
    VerySafe,
}

impl BulkBuySpeed {
    /// Every tier, fastest first.
    pub const ALL: [BulkBuySpeed; 4] = [
        BulkBuySpeed::Fast,
        BulkBuySpeed::Balanced,
        BulkBuySpeed::Safe,
        BulkBuySpeed::VerySafe,
    ];

    /// Game ticks between two purchase actions.
    pub fn ticks_delay(self) -> u64 {
        match self {
            BulkBuySpeed::Fast => 4,
            BulkBuySpeed::Balanced => 5,
            BulkBuySpeed::Safe => 6,
            BulkBuySpeed::VerySafe => 8,
        }
    }

    /// Short label for display.
    pub fn label(self) -> &'static str {
        match self {
            BulkBuySpeed::Fast => "Fast",
            BulkBuySpeed::Balanced => "Balanced",
            BulkBuySpeed::Safe => "Safe",
            BulkBuySpeed::VerySafe => "Very safe",
        }
    }

    /// Next tier, wrapping around after the slowest.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|tier| *tier == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

/// Application configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Units added to a session per qualifying shift-click.
    pub batch_size: u32,
    /// Cadence of automated purchases.
    pub speed: BulkBuySpeed,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            batch_size: 4,
            speed: BulkBuySpeed::Balanced,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (optional) layered under `BULKBUY_*`
    /// environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the purchase loop cannot work with.
    pub fn validate(&self) -> Result<(), BulkBuyError> {
        if self.batch_size == 0 {
            return Err(BulkBuyError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Write the default config file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = default_config_path();
    ensure_config_at(&path)?;
    Ok(path)
}

/// Write the default config to `path` unless a file is already there.
pub fn ensure_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "Default config written");
    Ok(())
}

/// Shared, live view of the configuration.
///
/// Readers query it at call time, so an update lands on the next tick or click.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigHandle {
    /// Wrap an initial configuration after validating it.
    pub fn new(config: AppConfig) -> Result<Self, BulkBuyError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(RwLock::new(config)),
        })
    }

    /// Copy of the current values.
    pub fn snapshot(&self) -> AppConfig {
        *self.inner.read()
    }

    /// Current batch size.
    pub fn batch_size(&self) -> u32 {
        self.inner.read().batch_size
    }

    /// Current cadence tier.
    pub fn speed(&self) -> BulkBuySpeed {
        self.inner.read().speed
    }

    /// Replace the configuration after validating it.
    pub fn update(&self, config: AppConfig) -> Result<(), BulkBuyError> {
        config.validate()?;
        *self.inner.write() = config;
        Ok(())
    }

    /// Re-read `path`; on failure the current values stay in place.
    pub fn reload_from(&self, path: &Path) -> Result<()> {
        let config = AppConfig::load_from(path)?;
        *self.inner.write() = config;
        info!(
            batch_size = config.batch_size,
            speed = config.speed.label(),
            "Config reloaded"
        );
        Ok(())
    }

    /// Watch `path` and reload whenever it changes. Dropping the returned
    /// watcher stops the updates.
    pub fn watch(&self, path: impl Into<PathBuf>) -> Result<ConfigWatcher> {
        let target: PathBuf = path.into();
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let handle = self.clone();

        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    let touches_config = event.paths.iter().any(|changed| changed == &target);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        if let Err(err) = handle.reload_from(&target) {
                            warn!("Keeping previous config: {err:#}");
                        }
                    }
                }
                Err(err) => warn!("Config watcher error: {err}"),
            })
            .context("failed to create config watcher")?;

        // Editors often replace the file, so watch its directory.
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", dir.display()))?;

        Ok(ConfigWatcher { _watcher: watcher })
    }
}

/// Keeps a config file watch alive.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn speed_tiers_map_to_delays() {
        let delays: Vec<u64> = BulkBuySpeed::ALL
            .iter()
            .map(|tier| tier.ticks_delay())
            .collect();
        assert_eq!(delays, vec![4, 5, 6, 8]);
        assert_eq!(BulkBuySpeed::default(), BulkBuySpeed::Balanced);
        assert_eq!(BulkBuySpeed::VerySafe.next(), BulkBuySpeed::Fast);
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn default_file_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        ensure_config_at(&path)?;
        assert!(path.exists());
        assert_eq!(AppConfig::load_from(&path)?, AppConfig::default());

        fs::write(&path, "batch_size = 9\n")?;
        ensure_config_at(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "batch_size = 9\n");
        Ok(())
    }

    #[test]
    fn reads_values_from_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "batch_size = 16\nspeed = \"very_safe\"\n")?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.speed, BulkBuySpeed::VerySafe);
        Ok(())
    }

    #[test]
    fn zero_batch_size_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "batch_size = 0\n")?;
        assert!(AppConfig::load_from(&path).is_err());

        let invalid = AppConfig {
            batch_size: 0,
            ..AppConfig::default()
        };
        assert!(matches!(
            ConfigHandle::new(invalid),
            Err(BulkBuyError::InvalidConfig(_))
        ));

        let handle = ConfigHandle::default();
        assert!(matches!(
            handle.update(invalid),
            Err(BulkBuyError::InvalidConfig(_))
        ));
        assert_eq!(handle.batch_size(), 4);
        Ok(())
    }

    #[test]
    fn reload_keeps_previous_values_on_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "speed = \"fast\"\n")?;

        let handle = ConfigHandle::default();
        handle.reload_from(&path)?;
        assert_eq!(handle.speed(), BulkBuySpeed::Fast);

        fs::write(&path, "speed = \"warp\"\n")?;
        assert!(handle.reload_from(&path).is_err());
        assert_eq!(handle.speed(), BulkBuySpeed::Fast);
        Ok(())
    }
}
