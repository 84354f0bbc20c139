//! Generator configuration
//!
//! Bundles every tunable of map generation and chunk streaming. Values come
//! from `Default`, an optional JSON file, and finally command-line overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::CellSize;
use crate::heightmap::NoiseParams;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Master seed for the heightmap noise
    pub seed: u64,
    /// Map height in cells
    pub map_rows: usize,
    /// Map width in cells
    pub map_cols: usize,
    /// Chunk height in cells
    pub chunk_rows: usize,
    /// Chunk width in cells
    pub chunk_cols: usize,
    /// Hop radius explored around the center chunk
    pub view_distance: usize,
    /// Viewport width in pixels
    pub viewport_width: i32,
    /// Viewport height in pixels
    pub viewport_height: i32,
    /// Font used to measure and paint map glyphs
    pub map_font: String,
    pub noise: NoiseParams,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            map_rows: 128,
            map_cols: 128,
            chunk_rows: 16,
            chunk_cols: 16,
            view_distance: 2,
            viewport_width: 1280,
            viewport_height: 720,
            map_font: "mono".to_string(),
            noise: NoiseParams::default(),
        }
    }
}

impl WorldGenConfig {
    /// Load a config from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: WorldGenConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("map_rows", self.map_rows),
            ("map_cols", self.map_cols),
            ("chunk_rows", self.chunk_rows),
            ("chunk_cols", self.chunk_cols),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid { field, reason: "must be at least 1".to_string() });
            }
        }
        if self.viewport_width <= 0 || self.viewport_height <= 0 {
            return Err(ConfigError::Invalid {
                field: "viewport",
                reason: format!("{}x{} is not a positive size", self.viewport_width, self.viewport_height),
            });
        }
        if self.noise.octaves == 0 {
            return Err(ConfigError::Invalid { field: "noise.octaves", reason: "must be at least 1".to_string() });
        }
        if !(self.noise.frequency > 0.0) {
            return Err(ConfigError::Invalid {
                field: "noise.frequency",
                reason: format!("{} is not positive", self.noise.frequency),
            });
        }
        Ok(())
    }

    pub fn viewport_size(&self) -> CellSize {
        CellSize::new(self.viewport_width, self.viewport_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        WorldGenConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = WorldGenConfig::from_json_str(r#"{ "seed": 42, "map_rows": 10, "noise": { "octaves": 5 } }"#).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.map_rows, 10);
        assert_eq!(config.map_cols, 128);
        assert_eq!(config.noise.octaves, 5);
        assert_eq!(config.noise.lacunarity, 2.0);
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let err = WorldGenConfig::from_json_str(r#"{ "chunk_cols": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "chunk_cols", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = WorldGenConfig::from_json_str("{ seed: }").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
