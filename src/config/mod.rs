use anyhow::{Context, Result, bail};
use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::engine::{
    DEFAULT_THRESHOLD_KM, DirectionStrategy, EngineSettings, MatchAssigner, SectorWidth,
};
use crate::error::EngineError;
use crate::geometry::{FORWARD_OFFSET_M, LATERAL_OFFSET_M, TargetProjector};

/// Direction classification mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DirectionMode {
    /// north/south/east/west partitions per street
    Cardinal,
    /// Bearing sectors of `sector_width` degrees
    Sector,
}

fn default_mode() -> DirectionMode {
    DirectionMode::Cardinal
}
fn default_sector_width() -> u16 {
    20
}
fn default_threshold_km() -> f64 {
    DEFAULT_THRESHOLD_KM
}
fn default_lateral_offset_m() -> f64 {
    LATERAL_OFFSET_M
}
fn default_forward_offset_m() -> f64 {
    FORWARD_OFFSET_M
}
fn default_catalog() -> PathBuf {
    PathBuf::from("parking_catalog.json")
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_mode")]
    pub mode: DirectionMode,
    #[serde(default = "default_sector_width")]
    pub sector_width: u16,
    /// Sectors of slack between movement heading and spot heading (sector mode)
    #[serde(default)]
    pub heading_tolerance: Option<u16>,
    #[serde(default = "default_threshold_km")]
    pub threshold_km: f64,
    #[serde(default = "default_lateral_offset_m")]
    pub lateral_offset_m: f64,
    #[serde(default = "default_forward_offset_m")]
    pub forward_offset_m: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            sector_width: default_sector_width(),
            heading_tolerance: None,
            threshold_km: default_threshold_km(),
            lateral_offset_m: default_lateral_offset_m(),
            forward_offset_m: default_forward_offset_m(),
        }
    }
}

impl EngineConfig {
    /// Validate and turn into engine settings
    pub fn settings(&self) -> Result<EngineSettings, EngineError> {
        let strategy = match self.mode {
            DirectionMode::Cardinal => DirectionStrategy::Cardinal,
            DirectionMode::Sector => {
                DirectionStrategy::Sector(SectorWidth::new(self.sector_width)?)
            }
        };

        if !self.threshold_km.is_finite() || self.threshold_km <= 0.0 {
            return Err(EngineError::Config(format!(
                "threshold_km must be positive, got {}",
                self.threshold_km
            )));
        }
        if !self.lateral_offset_m.is_finite() || !self.forward_offset_m.is_finite() {
            return Err(EngineError::Config(
                "projection offsets must be finite".to_string(),
            ));
        }

        let projector = TargetProjector::new(self.lateral_offset_m, self.forward_offset_m);

        Ok(EngineSettings {
            strategy,
            heading_tolerance: self.heading_tolerance,
            assigner: MatchAssigner::new(projector, self.threshold_km),
        })
    }
}

fn default_snap_profile() -> String {
    "driving".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// OSRM-compatible road snapping service
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SnappingConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_snap_profile")]
    pub profile: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SnappingConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            profile: default_snap_profile(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,
    #[serde(default)]
    pub snapping: Option<SnappingConfig>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            catalog: default_catalog(),
            snapping: None,
        }
    }
}

impl FileConfig {
    /// First parseable config file from the search paths
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        warn!("Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly named config file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {:?}", path);
        }
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).context("Failed to parse config file")
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("spotmatch.toml"));
    paths.push(PathBuf::from(".spotmatch.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("spotmatch").join("config.toml"));
        paths.push(config_dir.join("spotmatch.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".spotmatch.toml"));
        paths.push(home.join(".config").join("spotmatch").join("config.toml"));
    }

    paths
}
