//! Builder configuration
//!
//! Defaults reproduce the reference iris tree: thresholds stepped by 0.1
//! over `[0.0, 10.0)` for every feature. Values can be loaded from a TOML
//! file and overridden from `ENTROPY_TREE_*` environment variables.
//!
//! ```toml
//! step = 0.1
//! low = 0.0
//! high = 10.0
//! max_depth = 1000
//!
//! [bounds.petal_length]
//! low = 1.0
//! high = 7.0
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::info;

use crate::bounds::Bound;
use crate::errors::{Result, TrainerError};

pub const DEFAULT_STEP: f64 = 0.1;
pub const DEFAULT_LOW: f64 = 0.0;
pub const DEFAULT_HIGH: f64 = 10.0;
/// Deepest node the builder will create below the root
pub const DEFAULT_MAX_DEPTH: usize = 1000;

pub const ENV_STEP: &str = "ENTROPY_TREE_STEP";
pub const ENV_LOW: &str = "ENTROPY_TREE_LOW";
pub const ENV_HIGH: &str = "ENTROPY_TREE_HIGH";
pub const ENV_MAX_DEPTH: &str = "ENTROPY_TREE_MAX_DEPTH";

/// Tree builder configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderConfig {
    /// Threshold granularity
    pub step: f64,
    /// Initial interval for features without an override
    pub default_bound: Bound,
    /// Initial interval per feature column
    pub bounds: BTreeMap<String, Bound>,
    pub max_depth: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            default_bound: Bound::new(DEFAULT_LOW, DEFAULT_HIGH),
            bounds: BTreeMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// On-disk form; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    step: Option<f64>,
    low: Option<f64>,
    high: Option<f64>,
    max_depth: Option<usize>,
    #[serde(default)]
    bounds: BTreeMap<String, Bound>,
}

impl BuilderConfig {
    /// Parse TOML, filling missing keys with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| TrainerError::Config(format!("Failed to parse config: {e}")))?;

        let defaults = Self::default();
        Ok(Self {
            step: file.step.unwrap_or(defaults.step),
            default_bound: Bound::new(
                file.low.unwrap_or(defaults.default_bound.low),
                file.high.unwrap_or(defaults.default_bound.high),
            ),
            bounds: file.bounds,
            max_depth: file.max_depth.unwrap_or(defaults.max_depth),
        })
    }

    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            TrainerError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        Self::from_toml_str(&content)
    }

    /// Apply `ENTROPY_TREE_*` overrides from the process environment
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `ENTROPY_TREE_*` overrides read through `lookup`
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(step) = parse_env(&lookup, ENV_STEP)? {
            self.step = step;
        }
        if let Some(low) = parse_env(&lookup, ENV_LOW)? {
            self.default_bound.low = low;
        }
        if let Some(high) = parse_env(&lookup, ENV_HIGH)? {
            self.default_bound.high = high;
        }
        if let Some(max_depth) = parse_env(&lookup, ENV_MAX_DEPTH)? {
            self.max_depth = max_depth;
        }

        Ok(self)
    }

    /// Initial interval for a feature column
    pub fn bound_for(&self, column: &str) -> Bound {
        self.bounds
            .get(column)
            .copied()
            .unwrap_or(self.default_bound)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(TrainerError::Config(format!(
                "step must be a positive number, got {}",
                self.step
            )));
        }

        if self.max_depth == 0 {
            return Err(TrainerError::Config(
                "max_depth must be at least 1".to_string(),
            ));
        }

        let named = self.bounds.iter().map(|(name, b)| (name.as_str(), b));
        for (name, bound) in std::iter::once(("default", &self.default_bound)).chain(named) {
            if !bound.low.is_finite() || !bound.high.is_finite() {
                return Err(TrainerError::Config(format!(
                    "bound `{name}` must be finite"
                )));
            }
            if bound.low > bound.high {
                return Err(TrainerError::Config(format!(
                    "bound `{name}` has low {} above high {}",
                    bound.low, bound.high
                )));
            }
        }

        Ok(())
    }
}

fn parse_env<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| TrainerError::Config(format!("{key}={raw}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = BuilderConfig::default();
        assert_eq!(config.step, 0.1);
        assert_eq!(config.bound_for("anything"), Bound::new(0.0, 10.0));
        assert_eq!(config.max_depth, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = BuilderConfig::from_toml_str(
            r#"
            step = 0.5
            max_depth = 12

            [bounds.petal_length]
            low = 1.0
            high = 7.0
            "#,
        )
        .unwrap();

        assert_eq!(config.step, 0.5);
        assert_eq!(config.max_depth, 12);
        assert_eq!(config.default_bound, Bound::new(0.0, 10.0));
        assert_eq!(config.bound_for("petal_length"), Bound::new(1.0, 7.0));
        assert_eq!(config.bound_for("petal_width"), Bound::new(0.0, 10.0));
    }

    #[test]
    fn test_toml_rejects_unknown_keys() {
        assert!(matches!(
            BuilderConfig::from_toml_str("granularity = 0.1"),
            Err(TrainerError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [(ENV_STEP, "0.25"), (ENV_HIGH, "8"), (ENV_MAX_DEPTH, "40")]
            .into_iter()
            .collect();
        let config = BuilderConfig::default()
            .apply_env_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.step, 0.25);
        assert_eq!(config.default_bound, Bound::new(0.0, 8.0));
        assert_eq!(config.max_depth, 40);

        let bad = BuilderConfig::default()
            .apply_env_from(|key| (key == ENV_MAX_DEPTH).then(|| "deep".to_string()));
        assert!(matches!(bad, Err(TrainerError::Config(_))));
    }

    #[test]
    fn test_validation() {
        let mut config = BuilderConfig {
            step: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.step = f64::NAN;
        assert!(config.validate().is_err());

        config.step = 0.1;
        config.max_depth = 0;
        assert!(config.validate().is_err());

        config.max_depth = 10;
        config.bounds.insert("x".to_string(), Bound::new(5.0, 1.0));
        assert!(config.validate().is_err());

        config.bounds.insert("x".to_string(), Bound::new(1.0, f64::INFINITY));
        assert!(config.validate().is_err());

        // An empty interval is allowed; it just offers no thresholds
        config.bounds.insert("x".to_string(), Bound::new(1.0, 1.0));
        assert!(config.validate().is_ok());
    }
}
