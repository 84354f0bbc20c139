//! Island world generator library
//!
//! Seed-driven map generation (heightmap, terrain, groups, rivers) and
//! chunk streaming around a moving view.

pub mod ascii;
pub mod chunk;
pub mod config;
pub mod error;
pub mod explorer;
pub mod export;
pub mod grid;
pub mod groups;
pub mod heightmap;
pub mod map;
pub mod render;
pub mod rivers;
pub mod terrain;
pub mod tilemap;
pub mod world;
