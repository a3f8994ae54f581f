/// Coherent noise for terrain heightmaps
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// A coherent 3D noise field sampled by terrain generation
///
/// Implementations must return values in `[-1, 1]` and be deterministic
/// for a given instance.
pub trait NoiseSource {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32;
}

/// Fractal Perlin noise seeded once per game session
pub struct TerrainNoise {
    seed: u32,
    fbm: Fbm<Perlin>,
}

impl TerrainNoise {
    /// Create a new terrain noise generator with the given seed
    pub fn new(seed: u32) -> Self {
        Self::with_octaves(seed, 6)
    }

    pub fn with_octaves(seed: u32, octaves: usize) -> Self {
        Self {
            seed,
            fbm: Fbm::<Perlin>::new(seed).set_octaves(octaves.max(1)),
        }
    }

    /// Seed from OS entropy when no fixed seed is configured
    pub fn from_entropy(octaves: usize) -> Self {
        Self::with_octaves(rand::random(), octaves)
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl NoiseSource for TerrainNoise {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        // Octave sums can overshoot slightly
        (self.fbm.get([x as f64, y as f64, z as f64]) as f32).clamp(-1.0, 1.0)
    }
}
