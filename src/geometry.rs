//! Geometric output of a render pass.
//!
//! The turtle emits [`DrawEvent`]s (line segments and point markers, each
//! carrying the pen color current at emission) into a [`GeometrySink`].
//! [`GeometryBuffer`] is the in-memory sink; engines implement the trait to
//! stream geometry straight into their own buffers.

use crate::command::ResourceCounts;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An RGB pen color with linear components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    /// Builds a color from linear components in `[0, 1]`.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    /// Packs the color back into `0xRRGGBB`.
    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    fn named(name: &str) -> Option<u32> {
        let hex = match name {
            "white" => 0xffffff,
            "black" => 0x000000,
            "red" => 0xff0000,
            "green" => 0x008000,
            "lime" => 0x00ff00,
            "blue" => 0x0000ff,
            "yellow" => 0xffff00,
            "cyan" | "aqua" => 0x00ffff,
            "magenta" | "fuchsia" => 0xff00ff,
            "orange" => 0xffa500,
            "brown" => 0xa52a2a,
            "purple" => 0x800080,
            "pink" => 0xffc0cb,
            "gray" | "grey" => 0x808080,
            "olive" => 0x808000,
            "navy" => 0x000080,
            "teal" => 0x008080,
            "maroon" => 0x800000,
            "forestgreen" => 0x228b22,
            "saddlebrown" => 0x8b4513,
            _ => return None,
        };
        Some(hex)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Error returned when a color token cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseColorError;

impl FromStr for Color {
    type Err = ParseColorError;

    /// Accepts `#rgb`, `#rrggbb`, `0xrrggbb` and a small set of CSS color names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let digits = if let Some(rest) = lower.strip_prefix('#') {
            rest
        } else if let Some(rest) = lower.strip_prefix("0x") {
            rest
        } else {
            return Self::named(&lower).map(Self::from_hex).ok_or(ParseColorError);
        };

        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError);
        }
        let hex = match digits.len() {
            3 => {
                // #rgb expands each nibble: #f80 == #ff8800
                let short = u32::from_str_radix(digits, 16).map_err(|_| ParseColorError)?;
                let r = (short >> 8) & 0xf;
                let g = (short >> 4) & 0xf;
                let b = short & 0xf;
                (r * 0x11) << 16 | (g * 0x11) << 8 | (b * 0x11)
            }
            6 => u32::from_str_radix(digits, 16).map_err(|_| ParseColorError)?,
            _ => return Err(ParseColorError),
        };
        Ok(Self::from_hex(hex))
    }
}

/// A straight line emitted by `move` / `moveTo`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
}

impl LineSegment {
    /// Euclidean distance between the endpoints.
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// A sphere marker emitted by `point` / `sphere`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointMarker {
    pub position: Vec3,
    pub color: Color,
    pub radius: f32,
    /// Horizontal tessellation hint for mesh-based renderers (at least 3).
    pub width_segments: u32,
    /// Vertical tessellation hint for mesh-based renderers (at least 2).
    pub height_segments: u32,
}

/// One drawing event, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawEvent {
    Line(LineSegment),
    Point(PointMarker),
}

/// The render target a [`Turtle`](crate::Turtle) writes into.
///
/// Implementations receive events strictly in the order the symbols appear
/// in the grammar state. The turtle never touches any target other than the
/// one it was constructed with.
pub trait GeometrySink {
    /// Discards all geometry accumulated by the previous pass.
    fn clear(&mut self);

    /// Pre-sizing hint issued before a render pass.
    fn reserve(&mut self, _hints: ResourceCounts) {}

    /// Receives one `move` / `moveTo` segment.
    fn line(&mut self, segment: LineSegment);

    /// Receives one `point` / `sphere` marker.
    fn point(&mut self, marker: PointMarker);
}

impl<S: GeometrySink + ?Sized> GeometrySink for &mut S {
    fn clear(&mut self) {
        (**self).clear();
    }

    fn reserve(&mut self, hints: ResourceCounts) {
        (**self).reserve(hints);
    }

    fn line(&mut self, segment: LineSegment) {
        (**self).line(segment);
    }

    fn point(&mut self, marker: PointMarker) {
        (**self).point(marker);
    }
}

/// In-memory [`GeometrySink`] that records every event of the current pass.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GeometryBuffer {
    pub events: Vec<DrawEvent>,
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events recorded in the current pass.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Line segments in emission order.
    pub fn lines(&self) -> impl Iterator<Item = &LineSegment> {
        self.events.iter().filter_map(|event| match event {
            DrawEvent::Line(segment) => Some(segment),
            DrawEvent::Point(_) => None,
        })
    }

    /// Point markers in emission order.
    pub fn points(&self) -> impl Iterator<Item = &PointMarker> {
        self.events.iter().filter_map(|event| match event {
            DrawEvent::Point(marker) => Some(marker),
            DrawEvent::Line(_) => None,
        })
    }
}

impl GeometrySink for GeometryBuffer {
    fn clear(&mut self) {
        self.events.clear();
    }

    fn reserve(&mut self, hints: ResourceCounts) {
        self.events.reserve(hints.total());
    }

    fn line(&mut self, segment: LineSegment) {
        self.events.push(DrawEvent::Line(segment));
    }

    fn point(&mut self, marker: PointMarker) {
        self.events.push(DrawEvent::Point(marker));
    }
}
