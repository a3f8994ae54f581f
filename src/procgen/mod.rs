/// Procedural terrain generation for the streamed road
///
/// This module provides the noise field, biome palette, heightmap grid and
/// the flat-shaded terrain patches flanking each road segment.

pub mod biome;
pub mod heightmap;
pub mod noise;
pub mod terrain;

pub use heightmap::Heightmap;
pub use noise::{NoiseSource, TerrainNoise};
pub use terrain::TerrainPatch;
