/// Lane geometry across the road
use crate::config::RoadSettings;
use crate::procgen::biome::map_range;

/// Default distance from a lane center still counted as inside that lane
pub const DEFAULT_LANE_TOLERANCE: f32 = 0.1;

/// Equal-width lanes centered on `x = 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneLayout {
    pub num_lanes: usize,
    pub lane_width: f32,
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self {
            num_lanes: 4,
            lane_width: 2.45,
        }
    }
}

impl From<&RoadSettings> for LaneLayout {
    fn from(settings: &RoadSettings) -> Self {
        Self {
            num_lanes: settings.num_lanes,
            lane_width: settings.lane_width,
        }
    }
}

impl LaneLayout {
    /// Total road width, which is also the segment length
    pub fn road_width(&self) -> f32 {
        self.num_lanes as f32 * self.lane_width
    }

    /// Lateral coordinate of a lane's center
    pub fn center_of_lane(&self, lane: usize) -> f32 {
        let half = self.num_lanes as f32 / 2.0;
        self.lane_width * (lane as f32 - half) + self.lane_width / 2.0
    }

    /// Lane containing `x`, or `None` when `x` is further than `tolerance`
    /// from that lane's center (off the road, or mid lane change)
    pub fn lane_at(&self, x: f32, tolerance: f32) -> Option<usize> {
        let half_width = self.road_width() / 2.0;
        let f = map_range(x, -half_width, half_width, 0.0, self.num_lanes as f32);
        // Truncate toward zero so slightly-left-of-road still lands on lane 0
        let lane = f.trunc();
        if lane < 0.0 || lane >= self.num_lanes as f32 {
            return None;
        }
        let lane = lane as usize;

        if (x - self.center_of_lane(lane)).abs() > tolerance {
            return None;
        }
        Some(lane)
    }

    /// Lateral coordinates of every lane divider, outer edges included
    pub fn divider_positions(&self) -> impl Iterator<Item = f32> + '_ {
        let left = -self.road_width() / 2.0;
        (0..=self.num_lanes).map(move |i| left + i as f32 * self.lane_width)
    }

    /// Lateral span `(left, right)` of a lane
    pub fn lane_bounds(&self, lane: usize) -> (f32, f32) {
        let center = self.center_of_lane(lane);
        (center - self.lane_width / 2.0, center + self.lane_width / 2.0)
    }
}
