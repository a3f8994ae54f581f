/// Terrain patch generation: heightmap, biome colors and flat-shaded mesh
use super::biome::BiomeBlend;
use super::heightmap::Heightmap;
use super::noise::NoiseSource;
use crate::config::TerrainSettings;
use crate::render::{Lighting, RenderBackend, ShaderParams, TerrainVertex};
use glam::{Mat4, Vec3};
use std::fmt::Write;

/// Quad corner offsets, two counter-clockwise triangles per cell
const QUAD_OFFSETS: [(usize, usize); 6] = [(0, 0), (1, 1), (1, 0), (0, 0), (0, 1), (1, 1)];

/// One longitudinal slice of terrain flanking the road
///
/// The mesh is non-indexed: every triangle owns its three vertices so that
/// each face carries its own normal and color. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct TerrainPatch {
    position_y: f32,
    offset_x: i32,
    width: usize,
    length: usize,
    /// World units per cell, on both axes
    scale: f32,
    heightmap: Heightmap,
    vertices: Vec<TerrainVertex>,
}

impl TerrainPatch {
    /// Generate the patch starting at `position_y`
    ///
    /// `road_width` is the drivable width; the corridor of
    /// `corridor_ratio * road_width` either side of its center is flat.
    pub fn generate(
        position_y: f32,
        settings: &TerrainSettings,
        road_width: f32,
        noise: &dyn NoiseSource,
    ) -> Self {
        let width = settings.width;
        let length = settings.length.max(1);
        let scale = road_width / length as f32;

        let heightmap = build_heightmap(position_y, settings, width, length, scale, road_width, noise);
        let mut vertices = build_vertices(position_y, settings, &heightmap, width, length, scale);
        flat_shade(&mut vertices);

        Self {
            position_y,
            offset_x: settings.offset_x,
            width,
            length,
            scale,
            heightmap,
            vertices,
        }
    }

    pub fn position_y(&self) -> f32 {
        self.position_y
    }

    pub fn offset_x(&self) -> i32 {
        self.offset_x
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> impl Iterator<Item = &[TerrainVertex]> {
        self.vertices.chunks_exact(3)
    }

    /// Lateral world distance of a heightmap column from the corridor center
    pub fn column_distance_from_center(&self, x: usize) -> f32 {
        column_offset(x, self.width, self.offset_x).abs() as f32 * self.scale
    }

    /// Places the patch-local mesh so the corridor center sits on `x = 0`
    pub fn world_transform(&self) -> Mat4 {
        let shift_x = self.width as f32 * self.scale / 2.0 + self.offset_x as f32 * self.scale;
        Mat4::from_translation(Vec3::new(-shift_x, self.position_y, 0.0))
    }

    pub fn world_vertices(&self) -> impl Iterator<Item = TerrainVertex> + '_ {
        let world = self.world_transform();
        self.vertices.iter().map(move |v| TerrainVertex {
            position: world.transform_point3(v.position()).to_array(),
            ..*v
        })
    }

    pub fn render(&self, backend: &mut dyn RenderBackend, technique: &str, lighting: &Lighting) {
        if self.vertices.is_empty() {
            return;
        }
        let params = ShaderParams::new(self.world_transform(), lighting);
        backend.draw_triangle_list(technique, &params, &self.vertices);
    }

    /// Wavefront OBJ dump of the patch in world space, with vertex colors
    pub fn export_obj(&self) -> String {
        let mut obj = String::new();
        self.write_obj(&mut obj, 0);
        obj
    }

    /// Append this patch to `obj`, numbering vertices after `first_index`
    pub(crate) fn write_obj(&self, obj: &mut String, first_index: usize) {
        let _ = writeln!(obj, "o terrain_{}", self.position_y);
        for v in self.world_vertices() {
            let _ = writeln!(
                obj,
                "v {} {} {} {} {} {}",
                v.position[0], v.position[1], v.position[2], v.color[0], v.color[1], v.color[2]
            );
        }
        for v in &self.vertices {
            let _ = writeln!(obj, "vn {} {} {}", v.normal[0], v.normal[1], v.normal[2]);
        }
        for t in 0..self.vertices.len() / 3 {
            let i = first_index + t * 3 + 1;
            let _ = writeln!(obj, "f {0}//{0} {1}//{1} {2}//{2}", i, i + 1, i + 2);
        }
    }
}

fn column_offset(x: usize, width: usize, offset_x: i32) -> i64 {
    x as i64 - (width / 2) as i64 - offset_x as i64
}

fn build_heightmap(
    position_y: f32,
    settings: &TerrainSettings,
    width: usize,
    length: usize,
    scale: f32,
    road_width: f32,
    noise: &dyn NoiseSource,
) -> Heightmap {
    let mut heightmap = Heightmap::new(width + 1, length + 1);
    let k = settings.noise_frequency;
    let corridor = road_width * settings.corridor_ratio;

    for x in 0..=width {
        for y in 0..=length {
            let in_corridor = column_offset(x, width, settings.offset_x).abs() as f32 * scale < corridor;
            let value = if in_corridor {
                0.0
            } else {
                let ny = (y as f32 + position_y / scale) * k;
                noise.sample(x as f32 * k, ny, settings.noise_z).clamp(-1.0, 1.0)
            };
            heightmap.set(x, y, value);
        }
    }

    heightmap
}

fn build_vertices(
    position_y: f32,
    settings: &TerrainSettings,
    heightmap: &Heightmap,
    width: usize,
    length: usize,
    scale: f32,
) -> Vec<TerrainVertex> {
    let mut vertices = vec![TerrainVertex::default(); width * length * 6];

    for y in 0..length {
        // Every vertex in a row shares one biome band
        let blend = BiomeBlend::at(y as f32 + position_y, settings.biome_scale);

        for x in 0..width {
            let base = (width * y + x) * 6;
            for (j, &(dx, dy)) in QUAD_OFFSETS.iter().enumerate() {
                let (ox, oy) = (x + dx, y + dy);
                let height = heightmap.get(ox, oy);
                let position = Vec3::new(ox as f32 * scale, oy as f32 * scale, height * settings.height_scale);
                vertices[base + j] = TerrainVertex::new(position, Vec3::Z, blend.color(height));
            }
        }
    }

    vertices
}

/// Give each triangle one face normal and the brightest of its vertex colors
fn flat_shade(vertices: &mut [TerrainVertex]) {
    for tri in vertices.chunks_exact_mut(3) {
        let (p0, p1, p2) = (tri[0].position(), tri[1].position(), tri[2].position());
        let normal = (p0 - p2).cross(p0 - p1).normalize_or_zero();
        let normal = if normal == Vec3::ZERO { Vec3::Z } else { normal };

        let color = tri[0].color().max(tri[1].color()).max(tri[2].color());

        for vertex in tri.iter_mut() {
            vertex.normal = normal.to_array();
            vertex.color = color.to_array();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::noise::TerrainNoise;
    use crate::procgen::biome::BiomeBlend;
    use crate::render::DrawRecorder;
    use std::cell::RefCell;

    const ROAD_WIDTH: f32 = 9.8;

    struct ConstantNoise(f32);

    impl NoiseSource for ConstantNoise {
        fn sample(&self, _x: f32, _y: f32, _z: f32) -> f32 {
            self.0
        }
    }

    /// Records every coordinate the generator asks for
    #[derive(Default)]
    struct RecordingNoise {
        samples: RefCell<Vec<Vec3>>,
    }

    impl NoiseSource for RecordingNoise {
        fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
            self.samples.borrow_mut().push(Vec3::new(x, y, z));
            0.3
        }
    }

    fn settings() -> TerrainSettings {
        TerrainSettings::default()
    }

    #[test]
    fn test_mesh_dimensions() {
        let patch = TerrainPatch::generate(0.0, &settings(), ROAD_WIDTH, &TerrainNoise::new(1));

        assert_eq!(patch.vertices().len(), 10 * 4 * 6);
        assert_eq!(patch.heightmap().columns, 11);
        assert_eq!(patch.heightmap().rows, 5);
        assert!((patch.scale() - 2.45).abs() < 1e-6);
    }

    #[test]
    fn test_zero_width_is_empty() {
        let mut s = settings();
        s.width = 0;
        let patch = TerrainPatch::generate(9.8, &s, ROAD_WIDTH, &TerrainNoise::new(1));

        assert!(patch.vertices().is_empty());
        assert_eq!(patch.triangles().count(), 0);

        let mut recorder = DrawRecorder::new();
        patch.render(&mut recorder, "ShadowedTerrain", &Lighting::default());
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn test_corridor_is_flat() {
        let patch = TerrainPatch::generate(19.6, &settings(), ROAD_WIDTH, &ConstantNoise(0.8));

        for (x, _, h) in patch.heightmap().iter() {
            if patch.column_distance_from_center(x) < 0.6 * ROAD_WIDTH {
                assert_eq!(h, 0.0, "column {} should be flattened", x);
            } else {
                assert_eq!(h, 0.8, "column {} should keep its noise", x);
            }
        }
        // Columns 3..=7 lie within 5.88 of the center column 5
        assert_eq!(patch.heightmap().get(3, 0), 0.0);
        assert_eq!(patch.heightmap().get(2, 0), 0.8);
    }

    #[test]
    fn test_lateral_offset_shifts_corridor() {
        let mut s = settings();
        s.offset_x = 3;
        let patch = TerrainPatch::generate(0.0, &s, ROAD_WIDTH, &ConstantNoise(-0.5));

        assert_eq!(patch.heightmap().get(8, 2), 0.0);
        assert_eq!(patch.heightmap().get(4, 2), -0.5);
    }

    #[test]
    fn test_triangles_are_flat_shaded() {
        let patch = TerrainPatch::generate(-9.8, &settings(), ROAD_WIDTH, &TerrainNoise::new(99));

        for tri in patch.triangles() {
            assert_eq!(tri[0].normal, tri[1].normal);
            assert_eq!(tri[0].normal, tri[2].normal);
            assert_eq!(tri[0].color, tri[1].color);
            assert_eq!(tri[0].color, tri[2].color);
            assert!((tri[0].normal().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_flat_ground_faces_up() {
        let patch = TerrainPatch::generate(0.0, &settings(), ROAD_WIDTH, &ConstantNoise(0.0));

        for v in patch.vertices() {
            assert!((v.normal() - Vec3::Z).length() < 1e-6);
            assert_eq!(v.position[2], 0.0);
        }
    }

    #[test]
    fn test_face_color_is_brightest_vertex() {
        let mut vertices = vec![
            TerrainVertex::new(Vec3::ZERO, Vec3::Z, Vec3::new(0.1, 0.9, 0.3)),
            TerrainVertex::new(Vec3::new(1.0, 1.0, 0.0), Vec3::Z, Vec3::new(0.5, 0.2, 0.3)),
            TerrainVertex::new(Vec3::new(1.0, 0.0, 0.0), Vec3::Z, Vec3::new(0.2, 0.2, 0.7)),
        ];
        flat_shade(&mut vertices);

        for v in &vertices {
            assert_eq!(v.color, [0.5, 0.9, 0.7]);
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_degenerate_triangle_normal_falls_back_to_up() {
        let mut vertices = vec![TerrainVertex::new(Vec3::ONE, Vec3::X, Vec3::ZERO); 3];
        flat_shade(&mut vertices);
        assert_eq!(vertices[0].normal(), Vec3::Z);
    }

    #[test]
    fn test_deterministic_terrain() {
        let a = TerrainPatch::generate(49.0, &settings(), ROAD_WIDTH, &TerrainNoise::new(12345));
        let b = TerrainPatch::generate(49.0, &settings(), ROAD_WIDTH, &TerrainNoise::new(12345));

        assert_eq!(a.heightmap(), b.heightmap());
        assert_eq!(a.vertices(), b.vertices());
    }

    #[test]
    fn test_adjacent_patches_share_seam_heights() {
        let noise = TerrainNoise::new(7);
        let a = TerrainPatch::generate(0.0, &settings(), ROAD_WIDTH, &noise);
        let b = TerrainPatch::generate(ROAD_WIDTH, &settings(), ROAD_WIDTH, &noise);

        for x in 0..=10 {
            let far_edge = a.heightmap().get(x, 4);
            let near_edge = b.heightmap().get(x, 0);
            assert!((far_edge - near_edge).abs() < 1e-5, "seam mismatch at column {}", x);
        }
    }

    #[test]
    fn test_world_transform_centers_corridor() {
        let patch = TerrainPatch::generate(29.4, &settings(), ROAD_WIDTH, &ConstantNoise(0.0));
        let world = patch.world_transform();

        let center = world.transform_point3(Vec3::new(5.0 * 2.45, 0.0, 0.0));
        assert!(center.x.abs() < 1e-4);
        assert!((center.y - 29.4).abs() < 1e-4);

        let first = patch.world_vertices().next().unwrap();
        assert!((first.position[0] + 12.25).abs() < 1e-4);
    }

    #[test]
    fn test_render_issues_single_draw() {
        let patch = TerrainPatch::generate(0.0, &settings(), ROAD_WIDTH, &TerrainNoise::new(3));
        let mut recorder = DrawRecorder::new();
        patch.render(&mut recorder, "ShadowedTerrain", &Lighting::default());
        patch.render(&mut recorder, "ShadowedTerrain", &Lighting::default());

        assert_eq!(recorder.calls.len(), 2);
        assert_eq!(recorder.calls[0].vertex_count, 240);
        assert_eq!(recorder.calls[0].params, recorder.calls[1].params);
        assert_eq!(recorder.calls[0].params.world, patch.world_transform());
    }

    #[test]
    fn test_export_obj() {
        let mut s = settings();
        s.width = 2;
        s.length = 1;
        let patch = TerrainPatch::generate(0.0, &s, ROAD_WIDTH, &TerrainNoise::new(5));
        let obj = patch.export_obj();

        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 12);
        assert_eq!(obj.lines().filter(|l| l.starts_with("vn ")).count(), 12);
        assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 4);
        assert!(obj.contains("f 10//10 11//11 12//12"));
    }

    #[test]
    fn test_noise_sampled_on_continuous_road_lattice() {
        let noise = RecordingNoise::default();
        // 19.6 / 2.45 puts the first row eight cells down the road
        TerrainPatch::generate(19.6, &settings(), ROAD_WIDTH, &noise);

        let mut expected = Vec::new();
        for x in [0, 1, 2, 8, 9, 10] {
            for y in 0..=4 {
                expected.push(Vec3::new(x as f32 * 0.5, (y as f32 + 8.0) * 0.5, 0.5));
            }
        }

        let samples = noise.samples.borrow();
        assert_eq!(samples.len(), expected.len());
        for (got, want) in samples.iter().zip(&expected) {
            assert!((*got - *want).length() < 1e-4, "sampled {} expected {}", got, want);
        }
    }

    #[test]
    fn test_vertex_colors_follow_row_biome() {
        let mut s = settings();
        s.biome_scale = 100.0;
        let position_y = 185.0;
        let scale = ROAD_WIDTH / 4.0;
        let noise = ConstantNoise(0.8);

        let heightmap = build_heightmap(position_y, &s, 10, 4, scale, ROAD_WIDTH, &noise);
        let vertices = build_vertices(position_y, &s, &heightmap, 10, 4, scale);

        for (i, v) in vertices.iter().enumerate() {
            let cell = i / 6;
            let (x, y) = (cell % 10, cell / 10);
            let (dx, dy) = QUAD_OFFSETS[i % 6];
            let height = heightmap.get(x + dx, y + dy);
            let want = BiomeBlend::at(y as f32 + position_y, 100.0).color(height);
            assert!((v.color() - want).length() < 1e-6, "vertex {} in row {}", i, y);
        }

        // Rows sit in the fade between bands, so neighbouring rows differ
        let first = BiomeBlend::at(position_y, 100.0).color(0.8);
        let last = BiomeBlend::at(position_y + 3.0, 100.0).color(0.8);
        assert!((first - last).length() > 1e-3);

        // Cells fully outside the corridor keep their row color after shading
        let patch = TerrainPatch::generate(position_y, &s, ROAD_WIDTH, &noise);
        for (t, tri) in patch.triangles().enumerate() {
            let cell = t / 2;
            let (x, y) = (cell % 10, cell / 10);
            if x <= 1 || x >= 8 {
                let want = BiomeBlend::at(y as f32 + position_y, 100.0).color(0.8);
                assert!((tri[0].color() - want).length() < 1e-6, "cell ({}, {})", x, y);
            }
        }
    }
}
