//! Streaming window of road segments around the player
//!
//! The streamer keeps a fixed number of contiguous segments alive. As the
//! player moves forward, segments falling more than two lengths behind are
//! recycled: their colliders are released and a fresh segment is appended
//! past the back of the window. It also rotates the highlighted lane on a
//! fixed period.

use super::lanes::LaneLayout;
use super::segment::RoadSegment;
use crate::config::{EvictionPolicy, RoadConfig};
use crate::error::RoadError;
use crate::physics::PhysicsWorld;
use crate::procgen::{NoiseSource, TerrainNoise};
use crate::render::{Lighting, RenderBackend};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// What a single [`RoadStreamer::update`] changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamUpdate {
    /// Segments recycled from the back of the window
    pub evicted: usize,
    /// The whole window was regenerated further down the road
    pub rebuilt: bool,
    /// Newly highlighted lane, if the highlight rotated
    pub highlight_changed: Option<usize>,
}

pub struct RoadStreamer {
    config: RoadConfig,
    layout: LaneLayout,
    noise: Box<dyn NoiseSource>,
    window: VecDeque<RoadSegment>,
    highlighted_lane: Option<usize>,
    highlight_changed_at: f64,
    clock: f64,
    rng: StdRng,
}

impl RoadStreamer {
    /// Build a streamer with noise and lane selection seeded from config
    pub fn from_config(config: RoadConfig, physics: &mut impl PhysicsWorld) -> Result<Self, RoadError> {
        let noise: Box<dyn NoiseSource> = match config.terrain.seed {
            Some(seed) => Box::new(TerrainNoise::with_octaves(seed, config.terrain.noise_octaves)),
            None => Box::new(TerrainNoise::from_entropy(config.terrain.noise_octaves)),
        };
        Self::new(config, noise, physics)
    }

    pub fn new(
        config: RoadConfig,
        noise: Box<dyn NoiseSource>,
        physics: &mut impl PhysicsWorld,
    ) -> Result<Self, RoadError> {
        config.validate()?;

        let rng = match config.highlight.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut streamer = Self {
            layout: LaneLayout::from(&config.road),
            window: VecDeque::with_capacity(config.road.window_size),
            highlighted_lane: None,
            // Rotate on the first update that moves the clock
            highlight_changed_at: -config.highlight.period_secs,
            clock: 0.0,
            rng,
            noise,
            config,
        };
        streamer.reset(physics);
        Ok(streamer)
    }

    /// Discard the window and rebuild it starting one segment behind the origin
    pub fn reset(&mut self, physics: &mut impl PhysicsWorld) {
        let start = -self.segment_length();
        self.rebuild_from(start, physics);
        info!(
            "Road reset: {} segments from y={:.2}",
            self.window.len(),
            start
        );
    }

    /// Advance the window for a player at `player_y`, `dt` seconds after the
    /// previous update
    pub fn update(&mut self, dt: f64, player_y: f32, physics: &mut impl PhysicsWorld) -> StreamUpdate {
        let mut result = StreamUpdate::default();

        let needed = self.evictions_needed(player_y);
        let count = match self.config.road.eviction {
            EvictionPolicy::CatchUp => needed,
            EvictionPolicy::SingleStep => needed.min(1),
        };

        if count >= self.window.len() {
            // Every live segment would be recycled, so skip the throwaway ones
            let start = self.front_position() + count as f32 * self.segment_length();
            self.rebuild_from(start, physics);
            info!("Player at y={:.2} outran the road, rebuilt from y={:.2}", player_y, start);
            result.rebuilt = true;
        } else {
            for _ in 0..count {
                self.recycle_front(physics);
            }
        }
        result.evicted = count;

        self.clock += dt;
        let due = self.clock - self.highlight_changed_at > self.config.highlight.period_secs;
        if due && self.layout.num_lanes > 0 {
            let lane = self.rng.gen_range(0..self.layout.num_lanes);
            self.highlight_changed_at = self.clock;
            self.highlighted_lane = Some(lane);
            self.set_highlight_status(Some(lane));
            info!("Highlighted lane changed to {} at t={:.2}s", lane, self.clock);
            result.highlight_changed = Some(lane);
        }

        result
    }

    pub fn set_highlight_status(&mut self, lane: Option<usize>) {
        for segment in &mut self.window {
            segment.set_highlight_status(lane);
        }
    }

    /// Highlight of the segment the player is on; the first one is mostly behind
    pub fn highlight_at_player(&self) -> Option<usize> {
        self.window.get(1).and_then(|s| s.highlighted_lane())
    }

    pub fn highlighted_lane(&self) -> Option<usize> {
        self.highlighted_lane
    }

    pub fn render(&self, backend: &mut dyn RenderBackend, lighting: &Lighting) {
        for segment in &self.window {
            segment.render(backend, &self.config.render.technique, lighting);
        }
    }

    /// Wavefront OBJ dump of every terrain patch in the window
    pub fn export_obj(&self) -> String {
        let mut obj = String::from("# roadstream terrain window\n");
        let mut first_index = 0;
        for segment in &self.window {
            let terrain = segment.terrain();
            terrain.write_obj(&mut obj, first_index);
            first_index += terrain.vertices().len();
        }
        obj
    }

    /// Release every collider at the end of a session
    pub fn shutdown(mut self, physics: &mut impl PhysicsWorld) {
        for segment in self.window.drain(..) {
            segment.destroy(physics);
        }
        debug!("Road shut down");
    }

    pub fn segments(&self) -> impl ExactSizeIterator<Item = &RoadSegment> {
        self.window.iter()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn front_position(&self) -> f32 {
        self.window.front().map(|s| s.position_y()).unwrap_or(0.0)
    }

    pub fn back_position(&self) -> f32 {
        self.window.back().map(|s| s.position_y()).unwrap_or(0.0)
    }

    pub fn segment_length(&self) -> f32 {
        self.layout.road_width()
    }

    pub fn layout(&self) -> &LaneLayout {
        &self.layout
    }

    pub fn config(&self) -> &RoadConfig {
        &self.config
    }

    /// Seconds of game time seen so far
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Colliders currently owned by the window
    pub fn body_count(&self) -> usize {
        self.window
            .iter()
            .flat_map(|s| s.boundaries())
            .filter(|b| b.is_live())
            .count()
    }

    /// Smallest number of front segments to drop so the player is at most two
    /// lengths past the new front
    fn evictions_needed(&self, player_y: f32) -> usize {
        if !player_y.is_finite() {
            warn!("Ignoring non-finite player position {}", player_y);
            return 0;
        }
        let length = self.segment_length();
        let limit = length * 2.0;

        // Fronts inside the window are checked at their real positions
        for (count, segment) in self.window.iter().enumerate() {
            if player_y - segment.position_y() <= limit {
                return count;
            }
        }

        // Past the window, fronts are projected on the grid a rebuild uses
        let front = self.front_position();
        let front_after = |count: usize| front + count as f32 * length;
        let mut count = self.window.len();
        let skip = ((player_y - front_after(count) - limit) / length).floor();
        if skip > 1.0 {
            count += skip as usize - 1;
        }
        while player_y - front_after(count) > limit {
            count += 1;
        }
        count
    }

    fn recycle_front(&mut self, physics: &mut impl PhysicsWorld) {
        let Some(front) = self.window.pop_front() else {
            return;
        };
        let evicted_y = front.position_y();
        front.destroy(physics);

        let next_y = self.back_position() + self.segment_length();
        let segment = self.build_segment(next_y, physics);
        self.window.push_back(segment);
        debug!("Recycled segment y={:.2}, appended y={:.2}", evicted_y, next_y);
    }

    fn rebuild_from(&mut self, start: f32, physics: &mut impl PhysicsWorld) {
        for segment in self.window.drain(..) {
            segment.destroy(physics);
        }

        let length = self.segment_length();
        for i in 0..self.config.road.window_size {
            let segment = self.build_segment(start + length * i as f32, physics);
            self.window.push_back(segment);
        }
    }

    fn build_segment(&self, position_y: f32, physics: &mut impl PhysicsWorld) -> RoadSegment {
        RoadSegment::new(
            physics,
            position_y,
            self.highlighted_lane,
            &self.config,
            self.noise.as_ref(),
        )
    }
}
