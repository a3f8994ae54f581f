use crate::error::RoadError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    pub road: RoadSettings,
    pub terrain: TerrainSettings,
    pub boundary: BoundarySettings,
    pub highlight: HighlightSettings,
    pub render: RenderSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadSettings {
    pub num_lanes: usize,
    pub lane_width: f32,
    /// Number of segments kept alive around the player
    pub window_size: usize,
    pub eviction: EvictionPolicy,
}

/// How many segments a single `update` may recycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Keep recycling until the player is back inside the window
    CatchUp,
    /// Recycle at most one segment per update
    SingleStep,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Lateral cell count of each patch
    pub width: usize,
    /// Longitudinal cell count of each patch
    pub length: usize,
    /// Lateral cell offset of the corridor center
    pub offset_x: i32,
    /// Length in world units of one biome color band
    pub biome_scale: f32,
    pub height_scale: f32,
    pub noise_frequency: f32,
    pub noise_z: f32,
    pub noise_octaves: usize,
    /// Share of the road width flattened on each side of the corridor center
    pub corridor_ratio: f32,
    /// Fixed seed for deterministic terrain; random when absent
    pub seed: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundarySettings {
    pub layout: BoundaryLayout,
    pub thickness: f32,
    pub density: f32,
    pub friction: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryLayout {
    /// A rail on every lane divider, outer edges included
    AllDividers,
    /// Only the two outer rails
    Edges,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    pub period_secs: f64,
    /// Seed for lane selection; random when absent
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub technique: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            road: RoadSettings::default(),
            terrain: TerrainSettings::default(),
            boundary: BoundarySettings::default(),
            highlight: HighlightSettings::default(),
            render: RenderSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for RoadSettings {
    fn default() -> Self {
        Self {
            num_lanes: 4,
            lane_width: 2.45,
            window_size: 10,
            eviction: EvictionPolicy::CatchUp,
        }
    }
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            width: 10,
            length: 4,
            offset_x: 0,
            biome_scale: 100.0,
            height_scale: 1.5,
            noise_frequency: 0.5,
            noise_z: 0.5,
            noise_octaves: 6,
            corridor_ratio: 0.6,
            seed: None,
        }
    }
}

impl Default for BoundarySettings {
    fn default() -> Self {
        Self {
            layout: BoundaryLayout::AllDividers,
            thickness: 0.5,
            density: 1.0,
            friction: 0.0,
        }
    }
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            period_secs: 10.0,
            seed: None,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            technique: "ShadowedTerrain".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl RoadConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RoadError> {
        let contents = fs::read_to_string(path)?;
        let config: RoadConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}, using defaults", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), RoadError> {
        let invalid = |msg: &str| Err(RoadError::InvalidConfig(msg.to_string()));

        if self.road.num_lanes == 0 {
            return invalid("road.num_lanes must be at least 1");
        }
        if !(self.road.lane_width > 0.0) {
            return invalid("road.lane_width must be positive");
        }
        // The player has to fit between the second and second-to-last segment
        if self.road.window_size < 4 {
            return invalid("road.window_size must be at least 4");
        }
        if self.terrain.length == 0 {
            return invalid("terrain.length must be at least 1");
        }
        if !(self.terrain.biome_scale > 0.0) {
            return invalid("terrain.biome_scale must be positive");
        }
        if !(self.highlight.period_secs > 0.0) {
            return invalid("highlight.period_secs must be positive");
        }
        if self.boundary.friction < 0.0 {
            return invalid("boundary.friction must not be negative");
        }
        Ok(())
    }
}
