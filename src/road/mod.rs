/// The streamed road: lane geometry, rail colliders, segments and the window

pub mod boundary;
pub mod lanes;
pub mod segment;
pub mod streamer;

pub use boundary::LaneBoundary;
pub use lanes::{LaneLayout, DEFAULT_LANE_TOLERANCE};
pub use segment::RoadSegment;
pub use streamer::{RoadStreamer, StreamUpdate};
