//! Strokes - the building blocks of a drawing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrokeId(Uuid);

impl StrokeId {
    /// Create a new unique stroke ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StrokeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StrokeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Straight (non-premultiplied) RGBA color of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrokeColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl StrokeColor {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::BLACK
    }
}

/// The pencils of the palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pencil {
    /// Black.
    #[default]
    Black,
    /// Blue.
    Blue,
    /// Brown.
    Brown,
    /// Dark green.
    DarkGreen,
    /// Dark orange.
    DarkOrange,
    /// Grey.
    Grey,
    /// Light blue.
    LightBlue,
    /// Light green.
    LightGreen,
    /// Red.
    Red,
    /// Yellow.
    Yellow,
}

impl Pencil {
    /// Every pencil, in palette order.
    pub const ALL: [Self; 10] = [
        Self::Black,
        Self::Blue,
        Self::Brown,
        Self::DarkGreen,
        Self::DarkOrange,
        Self::Grey,
        Self::LightBlue,
        Self::LightGreen,
        Self::Red,
        Self::Yellow,
    ];

    /// The ink color this pencil draws with.
    #[must_use]
    pub const fn color(self) -> StrokeColor {
        match self {
            Self::Black => StrokeColor::BLACK,
            Self::Blue => StrokeColor::rgb(0, 0, 255),
            Self::Brown => StrokeColor::rgb(153, 102, 51),
            Self::DarkGreen => StrokeColor::rgb(51, 102, 0),
            Self::DarkOrange => StrokeColor::rgb(255, 102, 0),
            Self::Grey => StrokeColor::rgb(128, 128, 128),
            Self::LightBlue => StrokeColor::rgb(51, 204, 255),
            Self::LightGreen => StrokeColor::rgb(0, 255, 0),
            Self::Red => StrokeColor::rgb(255, 0, 0),
            Self::Yellow => StrokeColor::rgb(255, 255, 0),
        }
    }

    /// Snake-case name of the pencil.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Blue => "blue",
            Self::Brown => "brown",
            Self::DarkGreen => "dark_green",
            Self::DarkOrange => "dark_orange",
            Self::Grey => "grey",
            Self::LightBlue => "light_blue",
            Self::LightGreen => "light_green",
            Self::Red => "red",
            Self::Yellow => "yellow",
        }
    }

    /// Look a pencil up by name (case-insensitive, `-` and `_` interchangeable).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|p| p.name() == normalized)
    }
}

/// One continuous freehand drag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Unique identifier.
    pub id: StrokeId,
    /// Points in the order they were captured.
    points: Vec<Point>,
    /// Ink color, fixed at creation.
    color: StrokeColor,
}

impl Stroke {
    /// Create an empty stroke with the given color.
    #[must_use]
    pub fn new(color: StrokeColor) -> Self {
        Self {
            id: StrokeId::new(),
            points: Vec::new(),
            color,
        }
    }

    /// Create a stroke from already captured points.
    #[must_use]
    pub fn with_points(color: StrokeColor, points: Vec<Point>) -> Self {
        Self {
            id: StrokeId::new(),
            points,
            color,
        }
    }

    /// Append a point. Only the recorder mutates strokes.
    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Captured points in temporal order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Ink color.
    #[must_use]
    pub fn color(&self) -> StrokeColor {
        self.color
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the stroke has no points yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Last captured point.
    #[must_use]
    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Whether all points coincide (a tap, or a drag that never moved).
    #[must_use]
    pub fn is_dot(&self) -> bool {
        match self.points.split_first() {
            Some((first, rest)) => rest.iter().all(|p| p == first),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pencil_lookup() {
        assert_eq!(Pencil::from_name("Dark-Green"), Some(Pencil::DarkGreen));
        assert_eq!(Pencil::from_name("light_blue"), Some(Pencil::LightBlue));
        assert_eq!(Pencil::from_name("purple"), None);
        for pencil in Pencil::ALL {
            assert_eq!(Pencil::from_name(pencil.name()), Some(pencil));
        }
    }

    #[test]
    fn test_dot_detection() {
        let tap = Stroke::with_points(StrokeColor::BLACK, vec![Point::new(3.0, 4.0)]);
        assert!(tap.is_dot());

        let still = Stroke::with_points(
            StrokeColor::BLACK,
            vec![Point::new(3.0, 4.0), Point::new(3.0, 4.0)],
        );
        assert!(still.is_dot());

        let line = Stroke::with_points(
            StrokeColor::BLACK,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        );
        assert!(!line.is_dot());

        assert!(!Stroke::new(StrokeColor::BLACK).is_dot());
    }
}
