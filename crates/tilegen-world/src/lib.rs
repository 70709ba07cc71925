//! World description, noise sampling, and the tile generation pass.
#![forbid(unsafe_code)]

pub mod autotile;
pub mod catalog;
pub mod classify;
pub mod error;
pub mod grid;
pub mod hash;
pub mod height;
pub mod noise;
pub mod pass;
pub mod scatter;
pub mod spacing;
pub mod tile;
pub mod worldgen;

pub use catalog::{HeightSpec, ObjectKind, ObjectSpec, RegionSpec, WorldCatalog};
pub use error::ConfigError;
pub use pass::{PassOutput, PassStats, generate_pass};
pub use tile::{RegionId, SlopeDir, TileCode, TilePlacement};
pub use worldgen::{WorldGenConfig, load_config_from_path};
