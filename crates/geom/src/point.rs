use std::ops::Add;

use super::Vec2;

/// A signed 2D point in integer pixel coordinates.
///
/// Points are used both as absolute positions and as displacements - most
/// notably as the virtual offset of a canvas frame.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
}

impl Point {
    /// Construct a new point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return the origin point.
    pub fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// True when both coordinates are zero.
    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from(v: (i32, i32)) -> Self {
        Self { x: v.0, y: v.1 }
    }
}

/// Truncating conversion from a float vector, matching the rounding the
/// scroller applies when it folds float deltas back into pixel offsets.
impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self {
            x: v.x as i32,
            y: v.y as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add() {
        assert_eq!(Point::zero() + Point::new(1, 1), Point::new(1, 1));
        assert_eq!(Point::new(-2, 3) + Point::new(1, -1), Point::new(-1, 2));
    }

    #[test]
    fn from_vec2_truncates() {
        assert_eq!(Point::from(Vec2::new(1.9, -1.9)), Point::new(1, -1));
        assert_eq!(Point::from(Vec2::new(33.0, 4.0)), Point::new(33, 4));
    }
}
