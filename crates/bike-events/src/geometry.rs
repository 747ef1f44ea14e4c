//! Geometry Queries
//!
//! The only map primitives the decision core consumes: distance and
//! orientation between two points.

use crate::world::Coordinates;

/// Distance/orientation queries supplied by the environment.
pub trait Geometry: Send + Sync {
    /// Distance between two points
    fn distance(&self, from: Coordinates, to: Coordinates) -> f64;

    /// Heading from `from` towards `to`, in radians
    fn orientation(&self, from: Coordinates, to: Coordinates) -> f64;
}

/// Straight-line geometry on a flat grid
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Geometry for Euclidean {
    fn distance(&self, from: Coordinates, to: Coordinates) -> f64 {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        dx.hypot(dy)
    }

    fn orientation(&self, from: Coordinates, to: Coordinates) -> f64 {
        (to.y - from.y).atan2(to.x - from.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_distance() {
        let d = Euclidean.distance(Coordinates::new(0.0, 0.0), Coordinates::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_euclidean_orientation() {
        let up = Euclidean.orientation(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 2.0));
        assert!((up - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }
}
