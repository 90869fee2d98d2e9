// Defines the fixed simulation time grid
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// Absorbs rounding in (TF - T0) / dt so that an exact multiple keeps its last point
const GRID_EPSILON: f64 = 1e-9;

/// Largest number of steps a grid may hold; beyond this the recorded series cannot be stored.
pub const MAX_STEPS: usize = isize::MAX as usize / core::mem::size_of::<f64>() - 1;

/// A uniform time grid from `t0` up to and including `tf` in steps of `dt`.
///
/// Points are computed as `t0 + i * dt` rather than by accumulation, so the last point never
/// drifts. When `tf - t0` is not a multiple of `dt` the grid stops at the last point not
/// exceeding `tf`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    /// Start time
    pub t0: f64,
    /// End time
    pub tf: f64,
    /// Step size
    pub dt: f64,
}

impl TimeGrid {
    /// Validated constructor.
    pub fn new(t0: f64, tf: f64, dt: f64) -> Result<Self, ConfigError> {
        let grid = Self { t0, tf, dt };
        grid.validate()?;
        Ok(grid)
    }

    /// Checks that the step is positive and the horizon holds at least one full step and no more
    /// than [`MAX_STEPS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::InvalidTimeStep);
        }
        if !(self.t0.is_finite() && self.tf.is_finite() && self.tf > self.t0) {
            return Err(ConfigError::InvalidTimeGrid);
        }
        let raw = self.raw_steps();
        if !(raw.is_finite() && raw >= 1.0 && raw < MAX_STEPS as f64) {
            return Err(ConfigError::InvalidTimeGrid);
        }
        Ok(())
    }

    fn raw_steps(&self) -> f64 {
        ((self.tf - self.t0) / self.dt + GRID_EPSILON).floor()
    }

    /// Number of integration steps, one fewer than the number of points.
    pub fn steps(&self) -> usize {
        self.raw_steps() as usize
    }

    /// Number of grid points; at least two for a valid grid.
    pub fn points(&self) -> usize {
        self.steps().saturating_add(1)
    }

    /// Time of the `i`-th grid point.
    pub fn time(&self, i: usize) -> f64 {
        self.t0 + i as f64 * self.dt
    }

    /// All grid points in order.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.points()).map(move |i| self.time(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_includes_both_endpoints() {
        let grid = TimeGrid::new(0.0, 100.0, 0.05).unwrap();
        assert_eq!(grid.points(), 2001);
        assert_eq!(grid.time(0), 0.0);
        assert_eq!(grid.time(2000), 100.0);
        assert_eq!(grid.times().count(), 2001);
    }

    #[test]
    fn grid_stops_before_overshooting_final_time() {
        let grid = TimeGrid::new(1.0, 2.0, 0.3).unwrap();
        assert_eq!(grid.steps(), 3);
        assert!(grid.time(grid.steps()) <= 2.0);
    }

    #[test]
    fn rejects_degenerate_grids() {
        assert_eq!(TimeGrid::new(0.0, 1.0, 0.0), Err(ConfigError::InvalidTimeStep));
        assert_eq!(TimeGrid::new(0.0, 1.0, -0.1), Err(ConfigError::InvalidTimeStep));
        assert_eq!(
            TimeGrid::new(0.0, 1.0, f64::NAN),
            Err(ConfigError::InvalidTimeStep)
        );
        assert_eq!(TimeGrid::new(1.0, 1.0, 0.1), Err(ConfigError::InvalidTimeGrid));
        assert_eq!(TimeGrid::new(2.0, 1.0, 0.1), Err(ConfigError::InvalidTimeGrid));
        // Horizon shorter than a single step
        assert_eq!(TimeGrid::new(0.0, 0.05, 0.1), Err(ConfigError::InvalidTimeGrid));
    }

    #[test]
    fn rejects_grids_too_long_to_record() {
        assert_eq!(TimeGrid::new(0.0, 1e30, 1e-3), Err(ConfigError::InvalidTimeGrid));
        assert_eq!(
            TimeGrid::new(0.0, f64::MAX, f64::MIN_POSITIVE),
            Err(ConfigError::InvalidTimeGrid)
        );
        // Finite bounds whose span overflows
        assert_eq!(
            TimeGrid::new(-f64::MAX, f64::MAX, 1.0),
            Err(ConfigError::InvalidTimeGrid)
        );

        let grid = TimeGrid {
            t0: 0.0,
            tf: 1e30,
            dt: 1e-3,
        };
        assert_eq!(grid.points(), usize::MAX);
    }
}
