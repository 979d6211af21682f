//! Regions of interest drawn by selection tools

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

/// A user-drawn geometric selection over plotted data.
///
/// The snapping pipeline only consumes the shape's extent along the x axis,
/// so every variant reduces to a 1-D interval. No constraint is placed on
/// how the shape was drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Roi {
    /// A plain range along the x axis.
    Range { lo: f64, hi: f64 },

    /// An axis-aligned rectangle.
    Rectangle {
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },

    /// A free-form polygon, as (x, y) vertices.
    Polygon { vertices: Vec<(f64, f64)> },
}

impl Roi {
    /// Reduce the shape to its x interval `(lo, hi)` with `lo <= hi`.
    ///
    /// Fails when the shape has no extent to reduce (an empty polygon) or
    /// carries non-finite coordinates.
    pub fn to_interval(&self) -> Result<(f64, f64), SelectionError> {
        let (lo, hi) = match self {
            Roi::Range { lo, hi } => (lo.min(*hi), lo.max(*hi)),
            Roi::Rectangle { x_min, x_max, .. } => (x_min.min(*x_max), x_min.max(*x_max)),
            Roi::Polygon { vertices } => {
                if vertices.is_empty() {
                    return Err(SelectionError::InvalidSelection);
                }
                let mut lo = f64::INFINITY;
                let mut hi = f64::NEG_INFINITY;
                for &(x, _) in vertices {
                    lo = lo.min(x);
                    hi = hi.max(x);
                }
                (lo, hi)
            }
        };

        if !lo.is_finite() || !hi.is_finite() {
            return Err(SelectionError::InvalidSelection);
        }
        Ok((lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_normalizes_order() {
        let roi = Roi::Range { lo: 3.0, hi: 1.0 };
        assert_eq!(roi.to_interval().unwrap(), (1.0, 3.0));
    }

    #[test]
    fn test_rectangle_reduces_to_x_extent() {
        let roi = Roi::Rectangle {
            x_min: 0.5,
            x_max: 2.5,
            y_min: -10.0,
            y_max: 10.0,
        };
        assert_eq!(roi.to_interval().unwrap(), (0.5, 2.5));
    }

    #[test]
    fn test_polygon_reduces_to_x_extent() {
        let roi = Roi::Polygon {
            vertices: vec![(1.0, 0.0), (4.0, 2.0), (2.0, 3.0)],
        };
        assert_eq!(roi.to_interval().unwrap(), (1.0, 4.0));
    }

    #[test]
    fn test_empty_polygon_is_invalid() {
        let roi = Roi::Polygon { vertices: vec![] };
        assert_eq!(
            roi.to_interval().unwrap_err(),
            SelectionError::InvalidSelection
        );
    }

    #[test]
    fn test_non_finite_coordinates_are_invalid() {
        let roi = Roi::Range {
            lo: f64::NAN,
            hi: 1.0,
        };
        assert_eq!(
            roi.to_interval().unwrap_err(),
            SelectionError::InvalidSelection
        );
    }
}
