//! Compiler for the per-symbol draw-command mini-language.
//!
//! A command string is a `;`-separated list of segments, each a primitive
//! name followed by space-separated arguments:
//!
//! ```text
//! saveState; color #228b22; turnLeft 25; move 1
//! ```
//!
//! [`compile`] turns such a string into a [`DrawCommand`], a flat list of
//! [`Primitive`]s that is replayed against any [`CommandSurface`]. Every
//! structural problem (unknown name, wrong arity, bad number or color) is
//! reported here, so a compiled command can always be executed.

use crate::error::CommandError;
use crate::geometry::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use tracing::trace;

/// Default radius of a `point` marker when no argument is given.
pub const DEFAULT_POINT_RADIUS: f32 = 1.0;
pub const DEFAULT_WIDTH_SEGMENTS: u32 = 6;
pub const DEFAULT_HEIGHT_SEGMENTS: u32 = 4;
pub const MIN_WIDTH_SEGMENTS: u32 = 3;
pub const MIN_HEIGHT_SEGMENTS: u32 = 2;

/// Shape parameters of a `point` marker.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    /// Marker radius, always positive.
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            radius: DEFAULT_POINT_RADIUS,
            width_segments: DEFAULT_WIDTH_SEGMENTS,
            height_segments: DEFAULT_HEIGHT_SEGMENTS,
        }
    }
}

/// One instruction of the fixed turtle primitive set.
///
/// Angles are in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    /// `move d`: advance along the heading, drawing a line.
    Move(f32),
    /// `jump d`: advance along the heading without drawing.
    Jump(f32),
    /// `moveTo x y z`: go to an absolute position, drawing a line.
    MoveTo(Vec3),
    /// `jumpTo x y z`: go to an absolute position without drawing.
    JumpTo(Vec3),
    /// `turnRight a`: yaw clockwise about the local up axis.
    TurnRight(f32),
    /// `turnLeft a`: yaw counter-clockwise about the local up axis.
    TurnLeft(f32),
    /// `turnUp a`: pitch the heading toward the local up axis.
    TurnUp(f32),
    /// `turnDown a`: pitch the heading away from the local up axis.
    TurnDown(f32),
    /// `rotate a`: roll about the heading.
    Rotate(f32),
    /// `point [radius [wseg [hseg]]]`, also spelled `sphere`.
    Point(PointStyle),
    /// `color c`: set the pen color for subsequent geometry.
    Color(Color),
    /// `saveState`: push position, rotation and pen color.
    SaveState,
    /// `restoreState`: pop the most recently saved state.
    RestoreState,
}

impl Primitive {
    /// The mini-language name of this primitive.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Move(_) => "move",
            Self::Jump(_) => "jump",
            Self::MoveTo(_) => "moveTo",
            Self::JumpTo(_) => "jumpTo",
            Self::TurnRight(_) => "turnRight",
            Self::TurnLeft(_) => "turnLeft",
            Self::TurnUp(_) => "turnUp",
            Self::TurnDown(_) => "turnDown",
            Self::Rotate(_) => "rotate",
            Self::Point(_) => "point",
            Self::Color(_) => "color",
            Self::SaveState => "saveState",
            Self::RestoreState => "restoreState",
        }
    }

    /// Geometry this primitive contributes to a render pass.
    pub fn resource_counts(&self) -> ResourceCounts {
        match self {
            Self::Move(_) | Self::MoveTo(_) => ResourceCounts { lines: 1, points: 0 },
            Self::Point(_) => ResourceCounts { lines: 0, points: 1 },
            _ => ResourceCounts::ZERO,
        }
    }

    /// Invokes this primitive on `surface`.
    pub fn apply<C: CommandSurface + ?Sized>(&self, surface: &mut C) -> Result<(), C::Error> {
        match *self {
            Self::Move(d) => surface.move_forward(d),
            Self::Jump(d) => surface.jump(d),
            Self::MoveTo(p) => surface.move_to(p),
            Self::JumpTo(p) => surface.jump_to(p),
            Self::TurnRight(a) => surface.turn_right(a),
            Self::TurnLeft(a) => surface.turn_left(a),
            Self::TurnUp(a) => surface.turn_up(a),
            Self::TurnDown(a) => surface.turn_down(a),
            Self::Rotate(a) => surface.rotate(a),
            Self::Point(style) => surface.point(style),
            Self::Color(c) => surface.set_color(c),
            Self::SaveState => return surface.save_state(),
            Self::RestoreState => return surface.restore_state(),
        }
        Ok(())
    }

    fn parse(segment: &str) -> Result<Self, CommandError> {
        let mut tokens = segment.split_whitespace();
        let name = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();

        let primitive = match name {
            "move" => Self::Move(scalar("move", &args)?),
            "jump" => Self::Jump(scalar("jump", &args)?),
            "moveTo" => Self::MoveTo(vector("moveTo", &args)?),
            "jumpTo" => Self::JumpTo(vector("jumpTo", &args)?),
            "turnRight" => Self::TurnRight(scalar("turnRight", &args)?),
            "turnLeft" => Self::TurnLeft(scalar("turnLeft", &args)?),
            "turnUp" => Self::TurnUp(scalar("turnUp", &args)?),
            "turnDown" => Self::TurnDown(scalar("turnDown", &args)?),
            "rotate" => Self::Rotate(scalar("rotate", &args)?),
            "point" => Self::Point(point_style("point", &args)?),
            "sphere" => Self::Point(point_style("sphere", &args)?),
            "color" => {
                let [token] = exact::<1>("color", &args)?;
                let color = token.parse().map_err(|_| CommandError::InvalidColor {
                    name: "color",
                    token: token.to_string(),
                })?;
                Self::Color(color)
            }
            "saveState" => {
                exact::<0>("saveState", &args)?;
                Self::SaveState
            }
            "restoreState" => {
                exact::<0>("restoreState", &args)?;
                Self::RestoreState
            }
            other => {
                return Err(CommandError::UnknownPrimitive {
                    name: other.to_string(),
                });
            }
        };
        Ok(primitive)
    }
}

fn exact<'a, const N: usize>(
    name: &'static str,
    args: &[&'a str],
) -> Result<[&'a str; N], CommandError> {
    <[&'a str; N]>::try_from(args).map_err(|_| CommandError::Arity {
        name,
        min: N,
        max: N,
        found: args.len(),
    })
}

fn number(name: &'static str, token: &str) -> Result<f32, CommandError> {
    token
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::InvalidNumber {
            name,
            token: token.to_string(),
        })
}

fn scalar(name: &'static str, args: &[&str]) -> Result<f32, CommandError> {
    let [token] = exact::<1>(name, args)?;
    number(name, token)
}

fn vector(name: &'static str, args: &[&str]) -> Result<Vec3, CommandError> {
    let [x, y, z] = exact::<3>(name, args)?;
    Ok(Vec3::new(number(name, x)?, number(name, y)?, number(name, z)?))
}

fn point_style(name: &'static str, args: &[&str]) -> Result<PointStyle, CommandError> {
    if args.len() > 3 {
        return Err(CommandError::Arity {
            name,
            min: 0,
            max: 3,
            found: args.len(),
        });
    }
    let segments = |token: &str, min: u32| -> Result<u32, CommandError> {
        let n = token.parse::<u32>().map_err(|_| CommandError::InvalidNumber {
            name,
            token: token.to_string(),
        })?;
        Ok(n.max(min))
    };

    let mut style = PointStyle::default();
    if let Some(token) = args.first() {
        style.radius = number(name, token)
            .ok()
            .filter(|r| *r > 0.0)
            .ok_or_else(|| CommandError::InvalidNumber {
                name,
                token: token.to_string(),
            })?;
    }
    if let Some(token) = args.get(1) {
        style.width_segments = segments(token, MIN_WIDTH_SEGMENTS)?;
    }
    if let Some(token) = args.get(2) {
        style.height_segments = segments(token, MIN_HEIGHT_SEGMENTS)?;
    }
    Ok(style)
}

/// Static count of geometry primitives, per category.
///
/// Used as a buffer pre-sizing hint: the counts of a symbol's command are
/// summed over a symbol sequence to predict the geometry of one render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceCounts {
    pub lines: usize,
    pub points: usize,
}

impl ResourceCounts {
    pub const ZERO: Self = Self { lines: 0, points: 0 };

    pub fn total(&self) -> usize {
        self.lines + self.points
    }
}

impl Add for ResourceCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            lines: self.lines + rhs.lines,
            points: self.points + rhs.points,
        }
    }
}

impl AddAssign for ResourceCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for ResourceCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// A compiled draw command: the primitives of one symbol in textual order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawCommand {
    primitives: Vec<Primitive>,
    counts: ResourceCounts,
}

impl DrawCommand {
    /// Wraps an already-validated primitive list, computing its counts.
    pub fn new(primitives: Vec<Primitive>) -> Self {
        let counts = primitives.iter().map(Primitive::resource_counts).sum();
        Self { primitives, counts }
    }

    /// The primitives in execution order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Geometry emitted by one execution of this command.
    pub fn resource_counts(&self) -> ResourceCounts {
        self.counts
    }

    /// Runs every primitive in order, stopping at the first failure.
    pub fn execute<C: CommandSurface + ?Sized>(&self, surface: &mut C) -> Result<(), C::Error> {
        self.primitives.iter().try_for_each(|p| p.apply(surface))
    }
}

/// Compiles a command string. Empty segments are skipped.
pub fn compile(source: &str) -> Result<DrawCommand, CommandError> {
    let primitives = source
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(Primitive::parse)
        .collect::<Result<Vec<_>, _>>()?;

    trace!(source, count = primitives.len(), "compiled draw command");
    Ok(DrawCommand::new(primitives))
}

/// The command-execution surface: the primitive set a [`DrawCommand`] drives.
///
/// [`Turtle`](crate::Turtle) is the canonical implementation. Only the stack
/// operations can fail.
pub trait CommandSurface {
    type Error;

    /// Advances along the heading, drawing a line.
    fn move_forward(&mut self, distance: f32);
    /// Advances along the heading without drawing.
    fn jump(&mut self, distance: f32);
    /// Goes to an absolute position, drawing a line.
    fn move_to(&mut self, position: Vec3);
    /// Goes to an absolute position without drawing.
    fn jump_to(&mut self, position: Vec3);
    /// Yaws clockwise about the local up axis.
    fn turn_right(&mut self, degrees: f32);
    /// Yaws counter-clockwise about the local up axis.
    fn turn_left(&mut self, degrees: f32);
    /// Pitches the heading up about the lateral axis.
    fn turn_up(&mut self, degrees: f32);
    /// Pitches the heading down about the lateral axis.
    fn turn_down(&mut self, degrees: f32);
    /// Rolls about the heading; position is unchanged.
    fn rotate(&mut self, degrees: f32);
    /// Emits a marker at the current position.
    fn point(&mut self, style: PointStyle);
    /// Sets the pen color for geometry emitted afterwards.
    fn set_color(&mut self, color: Color);
    /// Pushes the current pose and pen.
    fn save_state(&mut self) -> Result<(), Self::Error>;
    /// Pops the last saved pose and pen; fails when nothing was saved.
    fn restore_state(&mut self) -> Result<(), Self::Error>;
}
