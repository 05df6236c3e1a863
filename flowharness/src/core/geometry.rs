//! Points and coordinate spaces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn delta(&self, other: &Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Translates the point by an offset.
    #[must_use]
    pub fn translate(&self, offset: &Self) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The coordinate space a point was captured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordSpace {
    /// Model coordinates, independent of zoom and scroll.
    #[default]
    Model,
    /// Device (screen) coordinates of the canvas.
    Device,
}

impl fmt::Display for CoordSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Device => write!(f, "device"),
        }
    }
}

impl FromStr for CoordSpace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model" => Ok(Self::Model),
            "device" => Ok(Self::Device),
            other => Err(format!("unknown coordinate space '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_delta_and_translate() {
        let from = Point::new(10.0, 10.0);
        let to = Point::new(15.0, 7.0);
        let delta = to.delta(&from);
        assert_eq!(delta, Point::new(5.0, -3.0));
        assert_eq!(from.translate(&delta), to);
    }

    #[test]
    fn test_coord_space_parse() {
        assert_eq!("device".parse::<CoordSpace>(), Ok(CoordSpace::Device));
        assert_eq!("model".parse::<CoordSpace>(), Ok(CoordSpace::Model));
        assert!("screen".parse::<CoordSpace>().is_err());
    }
}
