//! McCormick envelope of a bilinear product `w = x·y` over a box.
//!
//! Each plane is written as `w {≥,≤} a·x + b·y + c`. The two under-estimators
//! and two over-estimators are exact at the four corners of the box; inside it
//! they leave a gap that grows with the box area.

use crate::domain::ConstraintType;

/// Closed interval `[lo, hi]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn is_endpoint(&self, value: f64, tolerance: f64) -> bool {
        (value - self.lo).abs() <= tolerance || (value - self.hi).abs() <= tolerance
    }
}

/// One envelope plane: `w <sense> x_coef·x + y_coef·y + constant`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopePlane {
    pub sense: ConstraintType,
    pub x_coef: f64,
    pub y_coef: f64,
    pub constant: f64,
}

impl EnvelopePlane {
    pub fn value_at(&self, x: f64, y: f64) -> f64 {
        self.x_coef * x + self.y_coef * y + self.constant
    }

    pub fn is_under_estimator(&self) -> bool {
        self.sense == ConstraintType::GreaterThanOrEqual
    }
}

/// Relaxation of `x·y` for `x ∈ x_box`, `y ∈ y_box`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McCormickEnvelope {
    pub x_box: Interval,
    pub y_box: Interval,
}

impl McCormickEnvelope {
    pub fn new(x_box: Interval, y_box: Interval) -> Self {
        Self { x_box, y_box }
    }

    /// The four planes, under-estimators first
    ///
    /// With `x.lo = 0` the first and last collapse to `w ≥ y.lo·x` and
    /// `w ≤ y.hi·x`; they are still emitted so every period gets four rows.
    pub fn planes(&self) -> [EnvelopePlane; 4] {
        let (x, y) = (self.x_box, self.y_box);
        [
            EnvelopePlane {
                sense: ConstraintType::GreaterThanOrEqual,
                x_coef: y.lo,
                y_coef: x.lo,
                constant: -x.lo * y.lo,
            },
            EnvelopePlane {
                sense: ConstraintType::GreaterThanOrEqual,
                x_coef: y.hi,
                y_coef: x.hi,
                constant: -x.hi * y.hi,
            },
            EnvelopePlane {
                sense: ConstraintType::LessThanOrEqual,
                x_coef: y.lo,
                y_coef: x.hi,
                constant: -x.hi * y.lo,
            },
            EnvelopePlane {
                sense: ConstraintType::LessThanOrEqual,
                x_coef: y.hi,
                y_coef: x.lo,
                constant: -x.lo * y.hi,
            },
        ]
    }

    /// Range of `w` the envelope admits at `(x, y)`
    pub fn bounds_at(&self, x: f64, y: f64) -> Interval {
        let mut lo = f64::NEG_INFINITY;
        let mut hi = f64::INFINITY;
        for plane in self.planes() {
            let v = plane.value_at(x, y);
            if plane.is_under_estimator() {
                lo = lo.max(v);
            } else {
                hi = hi.min(v);
            }
        }
        Interval::new(lo, hi)
    }

    /// Whether `w` satisfies all four planes at `(x, y)`
    pub fn admits(&self, x: f64, y: f64, w: f64, tolerance: f64) -> bool {
        self.planes()
            .iter()
            .all(|plane| plane.sense.holds(w, plane.value_at(x, y), tolerance))
    }

    /// Whether `(x, y)` lies on an edge of the box, where the envelope is exact
    pub fn is_on_edge(&self, x: f64, y: f64, tolerance: f64) -> bool {
        self.x_box.is_endpoint(x, tolerance) || self.y_box.is_endpoint(y, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn well_box(q_min: f64) -> McCormickEnvelope {
        McCormickEnvelope::new(Interval::new(q_min, 6.0), Interval::new(15.0, 80.0))
    }

    fn grid(interval: Interval, steps: usize) -> impl Iterator<Item = f64> {
        (0..=steps).map(move |i| interval.lo + (interval.hi - interval.lo) * i as f64 / steps as f64)
    }

    #[test]
    fn contains_true_product_everywhere() {
        for q_min in [0.0, 0.003, 1.0] {
            let env = well_box(q_min);
            for x in grid(env.x_box, 20) {
                for y in grid(env.y_box, 20) {
                    assert!(env.admits(x, y, x * y, 1e-9), "x={x} y={y} q_min={q_min}");
                }
            }
        }
    }

    #[test]
    fn admitted_range_stays_within_depth_scaled_flow() {
        for q_min in [0.0, 0.5] {
            let env = well_box(q_min);
            for x in grid(env.x_box, 12) {
                for y in grid(env.y_box, 12) {
                    let range = env.bounds_at(x, y);
                    assert!(range.lo >= env.y_box.lo * x - 1e-9);
                    assert!(range.hi <= env.y_box.hi * x + 1e-9);
                    assert!(range.lo <= range.hi + 1e-9);
                }
            }
        }
    }

    #[test]
    fn exact_at_corners() {
        let env = well_box(0.0);
        for x in [env.x_box.lo, env.x_box.hi] {
            for y in [env.y_box.lo, env.y_box.hi] {
                let range = env.bounds_at(x, y);
                assert_relative_eq!(range.lo, x * y, epsilon = 1e-9);
                assert_relative_eq!(range.hi, x * y, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn exact_along_edges() {
        let env = well_box(0.5);
        for y in grid(env.y_box, 10) {
            let range = env.bounds_at(env.x_box.hi, y);
            assert_relative_eq!(range.lo, range.hi, epsilon = 1e-9);
        }
        for x in grid(env.x_box, 10) {
            let range = env.bounds_at(x, env.y_box.lo);
            assert_relative_eq!(range.lo, x * env.y_box.lo, epsilon = 1e-9);
            assert_relative_eq!(range.hi, x * env.y_box.lo, epsilon = 1e-9);
        }
    }

    #[test]
    fn gap_is_positive_in_the_interior() {
        let env = well_box(0.0);
        let range = env.bounds_at(3.0, 47.5);
        assert!(range.hi - range.lo > 1.0);
    }

    #[test]
    fn zero_lower_flow_reduces_outer_planes() {
        let planes = well_box(0.0).planes();
        assert_eq!(planes[0].y_coef, 0.0);
        assert_eq!(planes[0].constant, 0.0);
        assert_eq!(planes[0].x_coef, 15.0);
        assert_eq!(planes[3].x_coef, 80.0);
        assert_eq!(planes[3].constant, 0.0);
    }
}
