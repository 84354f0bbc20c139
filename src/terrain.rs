//! Terrain categories and the height threshold ladder.

use serde::{Deserialize, Serialize};

/// Heights below this are water.
pub const WATER_LEVEL: f32 = 20.0;
/// Heights below this (and at least `WATER_LEVEL`) are sand.
pub const SAND_LEVEL: f32 = 25.0;
/// Heights below this are grass.
pub const GRASS_LEVEL: f32 = 40.0;
/// Heights below this are hills; everything above is mountain.
pub const HILL_LEVEL: f32 = 60.0;

/// Terrain category of a single map cell, stored as one byte per cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Terrain {
    #[default]
    Water = 0,
    Sand = 1,
    Grass = 2,
    Dirt = 3,
    Hill = 4,
    Mountain = 5,
}

/// How a terrain is drawn: glyph, colour and pixel nudge inside the cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainInfo {
    pub symbol: &'static str,
    pub color: [u8; 3],
    pub x_mod: i32,
    pub y_mod: i32,
}

impl Terrain {
    /// Map a height in `[0, 100]` onto the terrain ladder.
    pub fn classify(height: f32) -> Terrain {
        if height < WATER_LEVEL {
            Terrain::Water
        } else if height < SAND_LEVEL {
            Terrain::Sand
        } else if height < GRASS_LEVEL {
            Terrain::Grass
        } else if height < HILL_LEVEL {
            Terrain::Hill
        } else {
            Terrain::Mountain
        }
    }

    pub fn from_byte(byte: u8) -> Option<Terrain> {
        match byte {
            0 => Some(Terrain::Water),
            1 => Some(Terrain::Sand),
            2 => Some(Terrain::Grass),
            3 => Some(Terrain::Dirt),
            4 => Some(Terrain::Hill),
            5 => Some(Terrain::Mountain),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn is_water(self) -> bool {
        self == Terrain::Water
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Terrain::Water => "Water",
            Terrain::Sand => "Sand",
            Terrain::Grass => "Grass",
            Terrain::Dirt => "Dirt",
            Terrain::Hill => "Hill",
            Terrain::Mountain => "Mountain",
        }
    }

    pub fn info(&self) -> TerrainInfo {
        match self {
            Terrain::Water => TerrainInfo { symbol: "~", color: [0, 0, 255], x_mod: 1, y_mod: 4 },
            Terrain::Sand => TerrainInfo { symbol: "~", color: [194, 178, 128], x_mod: 1, y_mod: 4 },
            Terrain::Grass => TerrainInfo { symbol: ",", color: [0, 255, 0], x_mod: 0, y_mod: -3 },
            Terrain::Dirt => TerrainInfo { symbol: ".", color: [150, 75, 0], x_mod: 0, y_mod: -3 },
            Terrain::Hill => TerrainInfo { symbol: "∩", color: [0, 100, 0], x_mod: 0, y_mod: 0 },
            Terrain::Mountain => TerrainInfo { symbol: "▲", color: [128, 128, 128], x_mod: 0, y_mod: 0 },
        }
    }

    pub fn all() -> &'static [Terrain] {
        &[
            Terrain::Water,
            Terrain::Sand,
            Terrain::Grass,
            Terrain::Dirt,
            Terrain::Hill,
            Terrain::Mountain,
        ]
    }
}
