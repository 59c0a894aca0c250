//! Game-specific components

use ecs_core::prelude::*;
use nalgebra::{Matrix4, Vector2, Vector3};

/// Side of the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Negative x
    Left,
    /// Positive x
    Right,
}

impl Side {
    /// The other side
    pub const fn opponent(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Sign of x on this side
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Spatial placement in the arena plane
///
/// Writers go through the methods so the model matrix is recomputed only
/// when something changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vector2<f32>,
    rotation: f32,
    scale: Vector2<f32>,
    dirty: DirtyFlag,
}

impl ComponentData for Transform {
    const TYPE: &'static str = "Transform";
}

impl Transform {
    /// Transform at a position, unrotated, scaled to `size`
    pub fn new(position: Vector2<f32>, size: Vector2<f32>) -> Self {
        Self {
            position,
            rotation: 0.0,
            scale: size,
            dirty: DirtyFlag::default(),
        }
    }

    /// Current position
    pub const fn position(&self) -> Vector2<f32> {
        self.position
    }

    /// Current scale
    pub const fn scale(&self) -> Vector2<f32> {
        self.scale
    }

    /// Move to an absolute position
    pub fn set_position(&mut self, position: Vector2<f32>) {
        self.position = position;
        self.dirty.mark();
    }

    /// Move by an offset
    pub fn translate(&mut self, offset: Vector2<f32>) {
        self.set_position(self.position + offset);
    }

    /// Rotate about the arena normal, in radians
    #[allow(dead_code)] // No gameplay system rotates transforms yet
    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.dirty.mark();
    }

    /// Whether the model matrix is stale
    #[cfg(test)]
    pub const fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    /// Clear the stale flag, reporting whether it was set
    pub fn take_dirty(&mut self) -> bool {
        self.dirty.take()
    }

    /// Model matrix: scale, then rotate, then translate
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(self.position.x, self.position.y, 0.0))
            * Matrix4::from_axis_angle(&Vector3::z_axis(), self.rotation)
            * Matrix4::new_nonuniform_scaling(&Vector3::new(self.scale.x, self.scale.y, 1.0))
    }
}

/// Linear velocity, units per second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity(pub Vector2<f32>);

impl ComponentData for Velocity {
    const TYPE: &'static str = "Velocity";
}

/// Player paddle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paddle {
    /// Wall the paddle defends
    pub side: Side,
    /// Maximum vertical speed
    pub speed: f32,
}

impl ComponentData for Paddle {
    const TYPE: &'static str = "Paddle";
}

/// The ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    /// Collision radius
    pub radius: f32,
}

impl ComponentData for Ball {
    const TYPE: &'static str = "Ball";
}

/// Orthographic camera looking at the arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Visible height in world units
    pub view_height: f32,
}

impl ComponentData for Camera {
    const TYPE: &'static str = "Camera";
}

/// Payload of the `ball-scored` event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallScored {
    /// Side that won the point
    pub scorer: Side,
    /// The ball that left the arena
    pub ball: EntityId,
}

/// Payload of the `active-camera-changed` event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveCameraChanged {
    /// The new active camera, if any
    #[allow(dead_code)] // Read by render front ends; the headless build has none
    pub camera: Option<Entity>,
}

/// Topic published when the ball leaves the arena
pub const BALL_SCORED: EventType = EventType::from_static("ball-scored");

/// Topic published when a different camera becomes active
pub const ACTIVE_CAMERA_CHANGED: EventType = EventType::from_static("active-camera-changed");
