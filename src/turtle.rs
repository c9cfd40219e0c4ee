//! Turtle state and the drawing state machine.

use crate::command::{CommandSurface, PointStyle, ResourceCounts};
use crate::error::TurtleError;
use crate::geometry::{Color, GeometryBuffer, GeometrySink, LineSegment, PointMarker};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Canonical starting pose, pen and stack bound of a [`Turtle`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurtleConfig {
    pub initial_position: Vec3,
    pub initial_rotation: Quat,
    pub default_color: Color,
    /// Maximum number of nested `saveState` calls.
    pub max_stack_depth: usize,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            initial_position: Vec3::ZERO,
            initial_rotation: Quat::IDENTITY,
            default_color: Color::WHITE,
            max_stack_depth: 1024,
        }
    }
}

/// Pose and pen of the turtle, the unit saved by `saveState`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current world-space position of the cursor.
    pub position: Vec3,

    /// Current world-space orientation.
    pub rotation: Quat,

    /// Pen color for subsequently emitted geometry.
    pub color: Color,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            color: Color::WHITE,
        }
    }
}

impl TurtleState {
    /// Returns the heading (local X axis) in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Returns the turtle's local up direction (Y axis) in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Rotates around the local X axis by `angle` radians (Roll).
    pub fn rotate_local_x(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_axis_angle(Vec3::X, angle)).normalize();
    }

    /// Rotates around the local Y axis by `angle` radians (Yaw).
    pub fn rotate_local_y(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_axis_angle(Vec3::Y, angle)).normalize();
    }

    /// Rotates around the local Z axis by `angle` radians (Pitch).
    pub fn rotate_local_z(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_axis_angle(Vec3::Z, angle)).normalize();
    }
}

/// The turtle state machine.
///
/// Owns its pose, pen and save stack, and writes every emitted primitive into
/// the sink it was constructed with. Call [`reset`](Self::reset) before each
/// render pass; [`TurtleInterpreter`](crate::TurtleInterpreter) does so for you.
#[derive(Debug)]
pub struct Turtle<S: GeometrySink = GeometryBuffer> {
    state: TurtleState,
    stack: Vec<TurtleState>,
    sink: S,
    config: TurtleConfig,
}

impl Turtle<GeometryBuffer> {
    /// A turtle drawing into a fresh [`GeometryBuffer`].
    pub fn buffered(config: TurtleConfig) -> Self {
        Self::new(GeometryBuffer::new(), config)
    }
}

impl<S: GeometrySink> Turtle<S> {
    /// A turtle in its canonical pose, writing into `sink`.
    pub fn new(sink: S, config: TurtleConfig) -> Self {
        Self {
            state: Self::canonical(&config),
            stack: Vec::new(),
            sink,
            config,
        }
    }

    fn canonical(config: &TurtleConfig) -> TurtleState {
        TurtleState {
            position: config.initial_position,
            rotation: config.initial_rotation,
            color: config.default_color,
        }
    }

    /// Clears the sink, empties the save stack and returns to the canonical pose.
    pub fn reset(&mut self) {
        self.sink.clear();
        self.stack.clear();
        self.state = Self::canonical(&self.config);
    }

    /// Forwards a pre-sizing hint to the sink.
    pub fn reserve(&mut self, hints: ResourceCounts) {
        self.sink.reserve(hints);
    }

    pub fn state(&self) -> &TurtleState {
        &self.state
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    pub fn rotation(&self) -> Quat {
        self.state.rotation
    }

    pub fn color(&self) -> Color {
        self.state.color
    }

    /// Number of currently saved states.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the turtle, handing back its render target.
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn line_to(&mut self, end: Vec3) {
        let start = self.state.position;
        self.state.position = end;
        self.sink.line(LineSegment {
            start,
            end,
            color: self.state.color,
        });
    }
}

impl<S: GeometrySink> CommandSurface for Turtle<S> {
    type Error = TurtleError;

    fn move_forward(&mut self, distance: f32) {
        let end = self.state.position + self.state.forward() * distance;
        self.line_to(end);
    }

    fn jump(&mut self, distance: f32) {
        self.state.position += self.state.forward() * distance;
    }

    fn move_to(&mut self, position: Vec3) {
        self.line_to(position);
    }

    fn jump_to(&mut self, position: Vec3) {
        self.state.position = position;
    }

    fn turn_right(&mut self, degrees: f32) {
        self.state.rotate_local_y(-degrees.to_radians());
    }

    fn turn_left(&mut self, degrees: f32) {
        self.state.rotate_local_y(degrees.to_radians());
    }

    fn turn_up(&mut self, degrees: f32) {
        self.state.rotate_local_z(degrees.to_radians());
    }

    fn turn_down(&mut self, degrees: f32) {
        self.state.rotate_local_z(-degrees.to_radians());
    }

    fn rotate(&mut self, degrees: f32) {
        self.state.rotate_local_x(degrees.to_radians());
    }

    fn point(&mut self, style: PointStyle) {
        self.sink.point(PointMarker {
            position: self.state.position,
            color: self.state.color,
            radius: style.radius,
            width_segments: style.width_segments,
            height_segments: style.height_segments,
        });
    }

    fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    fn save_state(&mut self) -> Result<(), TurtleError> {
        if self.stack.len() >= self.config.max_stack_depth {
            warn!(max_depth = self.config.max_stack_depth, "save stack overflow");
            return Err(TurtleError::StackOverflow {
                max_depth: self.config.max_stack_depth,
            });
        }
        self.stack.push(self.state);
        Ok(())
    }

    fn restore_state(&mut self) -> Result<(), TurtleError> {
        match self.stack.pop() {
            Some(saved) => {
                self.state = saved;
                Ok(())
            }
            None => {
                warn!("restoreState on an empty save stack");
                Err(TurtleError::EmptyStack)
            }
        }
    }
}
