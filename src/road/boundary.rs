/// Lane-boundary rail colliders
use crate::config::BoundarySettings;
use crate::physics::{BodyHandle, PhysicsWorld};
use glam::Vec2;
use tracing::warn;

/// A static rail collider along a lane divider
///
/// Owns its physics body until [`LaneBoundary::destroy`] releases it.
#[derive(Debug)]
pub struct LaneBoundary {
    position: Vec2,
    size: Vec2,
    body: Option<BodyHandle>,
}

impl LaneBoundary {
    /// Create the collider centered on `position`, `length` long along the road
    pub fn new(physics: &mut impl PhysicsWorld, position: Vec2, length: f32, settings: &BoundarySettings) -> Self {
        let size = Vec2::new(settings.thickness, length);
        let body = physics.create_rectangle_body(size.x, size.y, settings.density, position);
        physics.set_friction(body, settings.friction);

        Self {
            position,
            size,
            body: Some(body),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn is_live(&self) -> bool {
        self.body.is_some()
    }

    /// Remove the collider from the world; later calls do nothing
    pub fn destroy(&mut self, physics: &mut impl PhysicsWorld) {
        if let Some(body) = self.body.take() {
            physics.remove_body(body);
        }
    }
}

impl Drop for LaneBoundary {
    fn drop(&mut self) {
        if let Some(body) = self.body {
            warn!("Lane boundary at {:?} dropped while still owning body {:?}", self.position, body);
        }
    }
}
