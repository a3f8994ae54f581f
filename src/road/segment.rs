//! A fixed-length slice of road with its terrain patch and rail colliders
use super::boundary::LaneBoundary;
use super::lanes::LaneLayout;
use crate::config::{BoundaryLayout, RoadConfig};
use crate::physics::PhysicsWorld;
use crate::procgen::{NoiseSource, TerrainPatch};
use crate::render::{Lighting, RenderBackend};
use glam::Vec2;
use tracing::warn;

#[derive(Debug)]
pub struct RoadSegment {
    position_y: f32,
    layout: LaneLayout,
    highlighted_lane: Option<usize>,
    terrain: TerrainPatch,
    boundaries: Vec<LaneBoundary>,
}

impl RoadSegment {
    pub fn new(
        physics: &mut impl PhysicsWorld,
        position_y: f32,
        highlighted_lane: Option<usize>,
        config: &RoadConfig,
        noise: &dyn NoiseSource,
    ) -> Self {
        let layout = LaneLayout::from(&config.road);
        let length = layout.road_width();
        let terrain = TerrainPatch::generate(position_y, &config.terrain, length, noise);

        let center_y = position_y + length / 2.0;
        let dividers: Vec<f32> = layout.divider_positions().collect();
        let rail_xs = match config.boundary.layout {
            BoundaryLayout::AllDividers => dividers,
            BoundaryLayout::Edges => vec![dividers[0], dividers[dividers.len() - 1]],
        };
        let boundaries = rail_xs
            .into_iter()
            .map(|x| LaneBoundary::new(physics, Vec2::new(x, center_y), length, &config.boundary))
            .collect();

        let mut segment = Self {
            position_y,
            layout,
            highlighted_lane: None,
            terrain,
            boundaries,
        };
        segment.set_highlight_status(highlighted_lane);
        segment
    }

    /// Leading edge along the road
    pub fn position_y(&self) -> f32 {
        self.position_y
    }

    pub fn length(&self) -> f32 {
        self.layout.road_width()
    }

    pub fn highlighted_lane(&self) -> Option<usize> {
        self.highlighted_lane
    }

    pub fn terrain(&self) -> &TerrainPatch {
        &self.terrain
    }

    pub fn boundaries(&self) -> &[LaneBoundary] {
        &self.boundaries
    }

    pub fn set_highlight_status(&mut self, lane: Option<usize>) {
        self.highlighted_lane = match lane {
            Some(l) if l >= self.layout.num_lanes => {
                warn!("Ignoring highlight for lane {} of {}", l, self.layout.num_lanes);
                None
            }
            other => other,
        };
    }

    /// Lateral span of the highlighted lane, for the indicator overlay
    pub fn highlight_bounds(&self) -> Option<(f32, f32)> {
        self.highlighted_lane.map(|lane| self.layout.lane_bounds(lane))
    }

    pub fn render(&self, backend: &mut dyn RenderBackend, technique: &str, lighting: &Lighting) {
        self.terrain.render(backend, technique, lighting);
    }

    /// Release every collider; the terrain goes with `self`
    pub fn destroy(mut self, physics: &mut impl PhysicsWorld) {
        for boundary in &mut self.boundaries {
            boundary.destroy(physics);
        }
    }
}
