/// Biome color bands cycling along the road
use glam::Vec3;

/// Number of candidate palettes a band can take
pub const BIOME_COUNT: usize = 3;

/// Share of each band drawn in its pure primary color
const PLATEAU: f32 = 0.8;

/// Linearly rescale `v` from `[a, b]` to `[c, d]`
pub fn map_range(v: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    c + (v - a) * (d - c) / (b - a)
}

/// Candidate colors for a terrain height in `[-1, 1]`, one per biome
pub fn palette(height: f32) -> [Vec3; BIOME_COUNT] {
    [
        // grass
        Vec3::new(0.2, (height + 1.0) / 4.0 + 0.3, 0.3),
        // scrub
        Vec3::new(map_range(height, -1.0, 1.0, 0.4, 0.9), 0.4, 0.3),
        // rock
        Vec3::new(
            map_range(height, -1.0, 1.0, 0.7, 0.9),
            map_range(height, -1.0, 1.0, 0.6, 0.8),
            map_range(height, -1.0, 1.0, 0.2, 0.5),
        ),
    ]
}

/// Which biome band a longitudinal coordinate falls in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeBlend {
    pub primary: usize,
    pub secondary: usize,
    /// Weight of the primary color, in `[0, 1]`
    pub amount: f32,
}

impl BiomeBlend {
    /// Bands are `biome_scale` long; the last 20% of each fades into the next
    pub fn at(y: f32, biome_scale: f32) -> Self {
        let val = (y.abs() / biome_scale) % BIOME_COUNT as f32;
        let primary = (val.floor() as usize).min(BIOME_COUNT - 1);
        let secondary = (primary + 1) % BIOME_COUNT;
        let frac = val - primary as f32;

        let amount = if frac < PLATEAU {
            1.0
        } else {
            1.0 - (frac * 2.0 - 1.0).powi(2)
        };

        Self {
            primary,
            secondary,
            amount,
        }
    }

    pub fn color(&self, height: f32) -> Vec3 {
        let colors = palette(height);
        colors[self.primary] * self.amount + colors[self.secondary] * (1.0 - self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_range() {
        assert_eq!(map_range(-1.0, -1.0, 1.0, 0.4, 0.9), 0.4);
        assert_eq!(map_range(1.0, -1.0, 1.0, 0.4, 0.9), 0.9);
        assert!((map_range(0.0, -1.0, 1.0, 0.2, 0.5) - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_plateau_is_pure_primary() {
        let blend = BiomeBlend::at(50.0, 100.0);
        assert_eq!(blend.primary, 0);
        assert_eq!(blend.secondary, 1);
        assert_eq!(blend.amount, 1.0);
        assert_eq!(blend.color(0.3), palette(0.3)[0]);
    }

    #[test]
    fn test_band_tail_blends_into_next() {
        let blend = BiomeBlend::at(190.0, 100.0);
        assert_eq!(blend.primary, 1);
        assert_eq!(blend.secondary, 2);
        // frac = 0.9 → 1 - 0.8^2
        assert!((blend.amount - 0.36).abs() < 1e-4);
    }

    #[test]
    fn test_bands_wrap_around() {
        let blend = BiomeBlend::at(290.0, 100.0);
        assert_eq!(blend.primary, 2);
        assert_eq!(blend.secondary, 0);

        let wrapped = BiomeBlend::at(310.0, 100.0);
        assert_eq!(wrapped.primary, 0);
    }

    #[test]
    fn test_negative_positions_mirror() {
        assert_eq!(BiomeBlend::at(-150.0, 100.0), BiomeBlend::at(150.0, 100.0));
    }
}
