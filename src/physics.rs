//! Physics seam for lane-boundary colliders
//!
//! The road only creates and removes static rectangle bodies; it never steps
//! or queries the simulation. [`BodyRegistry`] is a bookkeeping world that
//! tracks live bodies, used by the headless runner and the tests.

use glam::Vec2;
use std::collections::HashMap;
use tracing::warn;

/// Opaque identifier of a body inside a physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

pub trait PhysicsWorld {
    /// Create a rectangle body centered on `position`
    fn create_rectangle_body(&mut self, width: f32, height: f32, density: f32, position: Vec2) -> BodyHandle;
    fn remove_body(&mut self, handle: BodyHandle);
    fn set_friction(&mut self, handle: BodyHandle, friction: f32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleBody {
    pub width: f32,
    pub height: f32,
    pub density: f32,
    pub position: Vec2,
    pub friction: f32,
}

#[derive(Debug, Default)]
pub struct BodyRegistry {
    next_handle: u64,
    bodies: HashMap<BodyHandle, RectangleBody>,
    removed: Vec<BodyHandle>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&RectangleBody> {
        self.bodies.get(&handle)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(&handle)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (&BodyHandle, &RectangleBody)> {
        self.bodies.iter()
    }

    /// Every removal request in order, including ones for unknown handles
    pub fn removal_log(&self) -> &[BodyHandle] {
        &self.removed
    }

    pub fn total_created(&self) -> u64 {
        self.next_handle
    }
}

impl PhysicsWorld for BodyRegistry {
    fn create_rectangle_body(&mut self, width: f32, height: f32, density: f32, position: Vec2) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(
            handle,
            RectangleBody {
                width,
                height,
                density,
                position,
                friction: 0.2,
            },
        );
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.removed.push(handle);
        if self.bodies.remove(&handle).is_none() {
            warn!("Removing unknown body {:?}", handle);
        }
    }

    fn set_friction(&mut self, handle: BodyHandle, friction: f32) {
        match self.bodies.get_mut(&handle) {
            Some(body) => body.friction = friction,
            None => warn!("Setting friction on unknown body {:?}", handle),
        }
    }
}
