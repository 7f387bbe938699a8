//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use stepgraph_recorder::Algorithm;
use thiserror::Error;

use crate::playback::DEFAULT_SPEED_MS;

/// A configuration variable held a value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Configuration for the visualization server.
#[derive(Debug, Clone, PartialEq)]
pub struct VisConfig {
    /// HTTP listen address
    pub addr: SocketAddr,

    /// Graph text file; the built-in sample is used when unset
    pub graph_path: Option<PathBuf>,

    /// Algorithm recorded at startup
    pub algorithm: Algorithm,

    /// Start node; falls back to the smallest node id
    pub start: Option<String>,

    /// Auto-advance delay in milliseconds
    pub speed_ms: u64,

    /// Layout canvas size
    pub layout_width: f64,
    pub layout_height: f64,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            graph_path: None,
            algorithm: Algorithm::default(),
            start: None,
            speed_ms: DEFAULT_SPEED_MS,
            layout_width: 800.0,
            layout_height: 500.0,
        }
    }
}

impl VisConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            addr: parse_var(&lookup, "STEPGRAPH_ADDR")?.unwrap_or(defaults.addr),
            graph_path: lookup("STEPGRAPH_GRAPH").filter(|s| !s.is_empty()).map(PathBuf::from),
            algorithm: parse_var(&lookup, "STEPGRAPH_ALGORITHM")?.unwrap_or(defaults.algorithm),
            start: lookup("STEPGRAPH_START").filter(|s| !s.is_empty()),
            speed_ms: parse_var(&lookup, "STEPGRAPH_SPEED_MS")?.unwrap_or(defaults.speed_ms),
            layout_width: parse_extent(&lookup, "STEPGRAPH_LAYOUT_WIDTH")?.unwrap_or(defaults.layout_width),
            layout_height: parse_extent(&lookup, "STEPGRAPH_LAYOUT_HEIGHT")?.unwrap_or(defaults.layout_height),
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

/// Layout extents must be positive and finite.
pub(crate) fn valid_extent(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn parse_extent<F>(lookup: &F, var: &'static str) -> Result<Option<f64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let extent: Option<f64> = parse_var(lookup, var)?;
    match extent {
        Some(v) if !valid_extent(v) => Err(ConfigError::Invalid {
            var,
            value: v.to_string(),
        }),
        other => Ok(other),
    }
}
