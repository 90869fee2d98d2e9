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

//! Level-response metrics computed from a finished [`Trajectory`].

use serde::{Deserialize, Serialize};

use crate::sim::Trajectory;

/// Summary of how the level responded over a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelMetrics {
    /// Highest level reached
    pub peak_level: f64,
    /// Time at which the peak was first reached
    pub peak_time: f64,
    /// Level at the last grid point
    pub final_level: f64,
    /// Peak above the reference, zero if the level never exceeded it
    pub overshoot: f64,
    /// Start of the final stretch during which the level stays within the tolerance band of the
    /// reference, `None` if the last sample is outside the band
    pub settling_time: Option<f64>,
    /// Mean of `reference - level` over the trailing window
    pub steady_state_error: f64,
    /// Number of samples at which the safety override fired
    pub override_count: usize,
}

impl LevelMetrics {
    /// Computes the metrics against `reference`.
    ///
    /// `tolerance` is relative to `|reference|`. The steady-state error averages over the last
    /// `window` samples (at least one), which smooths out actuator chatter around the setpoint.
    /// Returns `None` for an empty trajectory.
    pub fn compute(
        trajectory: &Trajectory,
        reference: f64,
        tolerance: f64,
        window: usize,
    ) -> Option<Self> {
        let level = trajectory.level();
        let time = trajectory.time();
        let final_level = *level.last()?;

        let (peak_index, peak_level) = level
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, h)| {
                if h > best.1 {
                    (i, h)
                } else {
                    best
                }
            });

        Some(Self {
            peak_level,
            peak_time: time[peak_index],
            final_level,
            overshoot: (peak_level - reference).max(0.0),
            settling_time: settling_time(trajectory, reference, tolerance),
            steady_state_error: steady_state_error(trajectory, reference, window),
            override_count: trajectory.overrides().iter().filter(|&&o| o).count(),
        })
    }
}

/// Time after which `|level - reference| <= tolerance * |reference|` holds for every remaining
/// sample.
pub fn settling_time(trajectory: &Trajectory, reference: f64, tolerance: f64) -> Option<f64> {
    let band = tolerance * reference.abs();
    let level = trajectory.level();
    let time = trajectory.time();

    match level.iter().rposition(|h| (h - reference).abs() > band) {
        None => time.first().copied(),
        Some(last_outside) => time.get(last_outside + 1).copied(),
    }
}

/// Mean of `reference - level` over the last `window` samples.
pub fn steady_state_error(trajectory: &Trajectory, reference: f64, window: usize) -> f64 {
    let level = trajectory.level();
    let window = window.clamp(1, level.len().max(1));
    let tail = &level[level.len().saturating_sub(window)..];
    if tail.is_empty() {
        return 0.0;
    }
    tail.iter().map(|h| reference - h).sum::<f64>() / tail.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{ConstantInflow, LinearOutlet};
    use crate::sim::{OpenLoop, Simulation};
    use crate::tank::{Tank, TankParams};
    use crate::time::TimeGrid;

    fn filling_tank() -> Trajectory {
        let tank = Tank::new(TankParams::new(0.5, 10.0).unwrap(), LinearOutlet::new(2.0)).unwrap();
        let grid = TimeGrid::new(0.0, 10.0, 0.05).unwrap();
        let mut sim = Simulation::new(tank, grid, OpenLoop::new(ConstantInflow(6.0))).unwrap();
        sim.run().clone()
    }

    #[test]
    fn monotone_fill_has_no_overshoot() {
        let trajectory = filling_tank();
        let metrics = LevelMetrics::compute(&trajectory, 3.0, 0.01, 20).unwrap();
        assert!(metrics.peak_level <= 3.0 + 1e-9);
        assert!(metrics.overshoot < 1e-9);
        assert_eq!(metrics.override_count, 0);
        assert!(metrics.steady_state_error.abs() < 1e-3);
    }

    #[test]
    fn settling_time_matches_exponential_time_constant() {
        // Time constant A / k = 0.25 s; a 1% band is reached after ln(100) time constants
        let trajectory = filling_tank();
        let settled = settling_time(&trajectory, 3.0, 0.01).unwrap();
        let expected = 0.25 * 100f64.ln();
        assert!((settled - expected).abs() <= 0.05 + 1e-9);
    }

    #[test]
    fn unsettled_run_has_no_settling_time() {
        let trajectory = filling_tank();
        assert!(settling_time(&trajectory, 50.0, 0.01).is_none());
    }
}
