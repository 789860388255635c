//! Simulation configuration.

use crate::error::FlockError;
use crate::world::WRAP_EPSILON;
use quadtree::Containment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "flock.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub border: BorderConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub boids: BoidConfig,
    #[serde(default)]
    pub drift: DriftConfig,
}

impl Config {
    /// Load configuration from `flock.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from `path`, writing the defaults there if the
    /// file does not exist yet.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(Self::from_toml_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, FlockError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), FlockError> {
        let invalid = |msg: &str| Err(FlockError::InvalidConfig(msg.to_string()));

        if self.simulation.tick_interval_ms == 0 {
            return invalid("simulation.tick_interval_ms must be at least 1");
        }
        if self.simulation.stats_interval == 0 {
            return invalid("simulation.stats_interval must be at least 1");
        }
        let (w, h) = (self.border.width, self.border.height);
        if !(w.is_finite() && h.is_finite() && w > 2.0 * WRAP_EPSILON && h > 2.0 * WRAP_EPSILON) {
            return invalid("border.width and border.height must exceed twice the wrap margin");
        }
        if self.index.max_elements == 0 {
            return invalid("index.max_elements must be at least 1");
        }
        let r = self.boids.perception_radius;
        if !(r.is_finite() && r > 0.0) {
            return invalid("boids.perception_radius must be positive");
        }
        if !(self.drift.velocity.is_finite() && self.drift.velocity.abs() < w.min(h)) {
            return invalid("drift.velocity must be finite and smaller than the border");
        }
        Ok(())
    }
}

/// Which simulation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    /// Boids steering by alignment and separation.
    #[default]
    Flocking,
    /// Bare points sliding diagonally at constant velocity.
    Drift,
}

/// Tick loop settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub scenario: ScenarioKind,
    /// Tick interval in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Stop after this many ticks (0 = run until interrupted).
    #[serde(default)]
    pub max_ticks: u64,
    /// Log tick statistics every this many ticks.
    #[serde(default = "default_stats_interval")]
    pub stats_interval: u64,
    /// RNG seed for spawning; random when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scenario: ScenarioKind::default(),
            tick_interval_ms: default_tick_interval(),
            max_ticks: 0,
            stats_interval: default_stats_interval(),
            seed: None,
        }
    }
}

fn default_tick_interval() -> u64 {
    16
}
fn default_stats_interval() -> u64 {
    120
}

/// World border configuration. The border is centered on the origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BorderConfig {
    #[serde(default = "default_border_size")]
    pub width: f32,
    #[serde(default = "default_border_size")]
    pub height: f32,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            width: default_border_size(),
            height: default_border_size(),
        }
    }
}

fn default_border_size() -> f32 {
    20.0
}

/// Spatial index configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Elements a leaf holds before it splits.
    #[serde(default = "default_max_elements")]
    pub max_elements: usize,
    #[serde(default)]
    pub containment: ContainmentMode,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_elements: default_max_elements(),
            containment: ContainmentMode::default(),
        }
    }
}

fn default_max_elements() -> usize {
    16
}

/// Serializable mirror of [`quadtree::Containment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainmentMode {
    /// Strict containment; points on split lines are dropped.
    Open,
    /// Top/left edges inclusive; every interior point is indexed.
    #[default]
    HalfOpen,
}

impl From<ContainmentMode> for Containment {
    fn from(mode: ContainmentMode) -> Self {
        match mode {
            ContainmentMode::Open => Containment::Open,
            ContainmentMode::HalfOpen => Containment::HalfOpen,
        }
    }
}

/// Flocking scenario configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoidConfig {
    #[serde(default = "default_boid_count")]
    pub count: usize,
    #[serde(default = "default_perception_radius")]
    pub perception_radius: f32,
}

impl Default for BoidConfig {
    fn default() -> Self {
        Self {
            count: default_boid_count(),
            perception_radius: default_perception_radius(),
        }
    }
}

fn default_boid_count() -> usize {
    512
}
fn default_perception_radius() -> f32 {
    crate::boid::DEFAULT_PERCEPTION_RADIUS
}

/// Drift scenario configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriftConfig {
    #[serde(default = "default_drift_count")]
    pub count: usize,
    /// Added to both coordinates of every point each tick.
    #[serde(default = "default_drift_velocity")]
    pub velocity: f32,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            count: default_drift_count(),
            velocity: default_drift_velocity(),
        }
    }
}

fn default_drift_count() -> usize {
    4096
}
fn default_drift_velocity() -> f32 {
    0.01
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.scenario, ScenarioKind::Flocking);
        assert_eq!(config.index.max_elements, 16);
        assert_eq!(config.border.width, 20.0);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.boids.count, 512);
        assert_eq!(config.drift.count, 4096);
        assert_eq!(config.index.containment, ContainmentMode::HalfOpen);
        assert!(config.simulation.seed.is_none());
    }

    #[test]
    fn test_partial_document() {
        let config = Config::from_toml_str(
            r#"
            [simulation]
            scenario = "drift"
            max_ticks = 10
            seed = 3

            [index]
            max_elements = 4
            containment = "open"
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.scenario, ScenarioKind::Drift);
        assert_eq!(config.simulation.max_ticks, 10);
        assert_eq!(config.simulation.seed, Some(3));
        assert_eq!(config.simulation.tick_interval_ms, 16);
        assert_eq!(Containment::from(config.index.containment), Containment::Open);
        assert_eq!(config.index.max_elements, 4);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            "[simulation]\ntick_interval_ms = 0",
            "[border]\nwidth = -1.0",
            "[border]\nwidth = 0.001\nheight = 0.001",
            "[border]\nwidth = 20.0\nheight = 0.002",
            "[index]\nmax_elements = 0",
            "[boids]\nperception_radius = 0.0",
        ];
        for doc in bad {
            let err = Config::from_toml_str(doc).unwrap_err();
            assert!(matches!(err, FlockError::InvalidConfig(_)), "{doc} -> {err}");
        }

        // Leaves only grow as elements arrive, so a huge capacity is fine.
        let roomy = Config::from_toml_str("[index]\nmax_elements = 1000000000000").unwrap();
        assert!(crate::world::World::new(&roomy).is_ok());

        let err = Config::from_toml_str("[simulation]\nscenario = \"orbit\"").unwrap_err();
        assert!(matches!(err, FlockError::Parse(_)));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back = Config::from_toml_str(&text).unwrap();
        assert_eq!(back.boids.count, config.boids.count);
        assert_eq!(back.index.containment, config.index.containment);
    }

    #[test]
    fn test_load_from_writes_defaults() {
        let path = std::env::temp_dir().join(format!("flock-config-{}.toml", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(created.boids.count, loaded.boids.count);

        std::fs::remove_file(&path).unwrap();
    }
}
