use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accuracy the provider is asked to deliver, mirroring the usual platform tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accuracy {
    BestForNavigation,
    #[default]
    Best,
    TenMeters,
    HundredMeters,
    Kilometer,
    ThreeKilometers,
}

impl Accuracy {
    const NAMES: [(&'static str, Accuracy); 6] = [
        ("best-for-navigation", Accuracy::BestForNavigation),
        ("best", Accuracy::Best),
        ("ten-meters", Accuracy::TenMeters),
        ("hundred-meters", Accuracy::HundredMeters),
        ("kilometer", Accuracy::Kilometer),
        ("three-kilometers", Accuracy::ThreeKilometers),
    ];

    pub fn as_str(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, accuracy)| accuracy == self)
            .map(|(name, _)| *name)
            .unwrap_or("best")
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown accuracy: {0}")]
pub struct ParseAccuracyError(String);

impl FromStr for Accuracy {
    type Err = ParseAccuracyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, accuracy)| *accuracy)
            .ok_or_else(|| ParseAccuracyError(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected `key = value`, got {content:?}")]
    MalformedLine { line: usize, content: String },
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
    #[error("invalid desired_accuracy: {0}")]
    Accuracy(#[from] ParseAccuracyError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub desired_accuracy: Accuracy,
    /// Minimum movement in metres before the provider reports a new fix. 0 disables the filter.
    pub distance_filter_m: f64,
    /// Height and width of the region shown when re-centering on the user.
    pub region_span_m: f64,
    pub heading_updates: bool,
    /// Capacity of the channel carrying presentation updates.
    pub update_buffer: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            desired_accuracy: Accuracy::Best,
            distance_filter_m: 1.,
            region_span_m: 1000.,
            heading_updates: true,
            update_buffer: 256,
        }
    }
}

impl TrackerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses `key = value` lines. Keys that are absent keep their defaults.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::MalformedLine {
                    line: index + 1,
                    content: line.to_string(),
                });
            };
            let key = key.trim();
            let value = value.trim();

            let invalid = || ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            };

            match key {
                "desired_accuracy" => config.desired_accuracy = value.parse()?,
                "distance_filter_m" => config.distance_filter_m = parse_non_negative(value).ok_or_else(invalid)?,
                "region_span_m" => {
                    config.region_span_m = parse_non_negative(value).filter(|span| *span > 0.).ok_or_else(invalid)?
                }
                "heading_updates" => config.heading_updates = value.parse().map_err(|_| invalid())?,
                "update_buffer" => {
                    config.update_buffer = value.parse::<usize>().ok().filter(|capacity| *capacity > 0).ok_or_else(invalid)?
                }
                _ => {
                    tracing::warn!("Unknown config key: {}", key);
                }
            }
        }

        Ok(config)
    }
}

fn parse_non_negative(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.)
}
