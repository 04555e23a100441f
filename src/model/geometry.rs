use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Name the display server uses for an output, e.g. `HDMI-1`.
pub type ScreenName = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }

    /// Chebyshev distance, which is what touch slop is measured in.
    pub fn distance_to(&self, other: Point) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Integer, axis-aligned rectangle. The right and bottom edges are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn max_x(&self) -> i32 { self.x + self.width }

    #[inline]
    pub fn max_y(&self) -> i32 { self.y + self.height }

    #[inline]
    pub fn origin(&self) -> Point { Point::new(self.x, self.y) }

    /// A rectangle with no area. These must never leave the crate.
    #[inline]
    pub fn is_empty(&self) -> bool { self.width <= 0 || self.height <= 0 }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.max_x() && point.y >= self.y && point.y < self.max_y()
    }

    /// Logical rectangle of a screen whose raw origin is kept and whose
    /// lengths are divided by `scale`.
    pub fn to_logical(&self, scale: f64) -> Rect {
        let scale = sanitize_scale(scale);
        Rect {
            x: self.x,
            y: self.y,
            width: ((self.width as f64) / scale).round().max(1.0) as i32,
            height: ((self.height as f64) / scale).round().max(1.0) as i32,
        }
    }

    /// Linear interpolation, rounded to whole pixels.
    pub fn lerp(&self, to: &Rect, progress: f64) -> Rect {
        let mix = |a: i32, b: i32| (a as f64 + (b - a) as f64 * progress).round() as i32;
        Rect {
            x: mix(self.x, to.x),
            y: mix(self.y, to.y),
            width: mix(self.width, to.width).max(1),
            height: mix(self.height, to.height).max(1),
        }
    }
}

pub(crate) fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 { scale } else { 1.0 }
}

/// The screen edge the dock is attached to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Position {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl Position {
    pub fn is_horizontal(&self) -> bool { matches!(self, Position::Top | Position::Bottom) }

    /// One quarter turn of the edge table.
    fn quarter_turn(self) -> Position {
        match self {
            Position::Bottom => Position::Right,
            Position::Right => Position::Top,
            Position::Top => Position::Left,
            Position::Left => Position::Bottom,
        }
    }

    /// Remaps a configured edge through a monitor's rotation.
    pub fn rotated(self, rotation: Rotation) -> Position {
        (0..rotation.quarter_turns()).fold(self, |pos, _| pos.quarter_turn())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HideMode {
    #[default]
    KeepShowing,
    KeepHidden,
    SmartHide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HideState {
    #[default]
    Shown,
    Hidden,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DisplayMode {
    #[default]
    Efficient,
    Fashion,
}

/// Output rotation as reported by the display server. The discriminants are
/// the RandR rotation bits.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    EnumIter
)]
#[repr(u16)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    Normal = 1,
    Rotate90 = 2,
    Rotate180 = 4,
    Rotate270 = 8,
}

impl Default for Rotation {
    fn default() -> Self { Rotation::Normal }
}

impl Rotation {
    pub fn quarter_turns(&self) -> u8 {
        match self {
            Rotation::Normal => 0,
            Rotation::Rotate90 => 1,
            Rotation::Rotate180 => 2,
            Rotation::Rotate270 => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn four_quarter_turns_return_the_original_edge() {
        for pos in Position::iter() {
            let mut turned = pos;
            for _ in 0..4 {
                turned = turned.rotated(Rotation::Rotate90);
            }
            assert_eq!(turned, pos);
            assert_eq!(pos.rotated(Rotation::Normal), pos);
        }
    }

    #[test]
    fn bottom_dock_moves_right_after_one_quarter_turn() {
        assert_eq!(Position::Bottom.rotated(Rotation::Rotate90), Position::Right);
        assert_eq!(Position::Bottom.rotated(Rotation::Rotate180), Position::Top);
        assert_eq!(Position::Bottom.rotated(Rotation::Rotate270), Position::Left);
    }

    #[test]
    fn rotation_parses_randr_bits() {
        assert_eq!(Rotation::try_from(4u16).unwrap(), Rotation::Rotate180);
        assert!(Rotation::try_from(3u16).is_err());
        assert_eq!(u16::from(Rotation::Rotate270), 8);
    }

    #[test]
    fn positions_parse_case_insensitively() {
        assert_eq!("Left".parse::<Position>().unwrap(), Position::Left);
        assert_eq!("smart_hide".parse::<HideMode>().unwrap(), HideMode::SmartHide);
        assert!("middle".parse::<Position>().is_err());
    }

    #[test]
    fn lerp_hits_both_ends_exactly() {
        let a = Rect::new(0, 1040, 1920, 40);
        let b = Rect::new(0, 1079, 1920, 1);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        let mid = a.lerp(&b, 0.5);
        assert!(mid.y > a.y && mid.y < b.y);
    }

    #[test]
    fn contains_excludes_far_edges() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(Point::new(10, 10)));
        assert!(r.contains(Point::new(14, 14)));
        assert!(!r.contains(Point::new(15, 10)));
        assert!(!r.contains(Point::new(10, 15)));
    }
}
