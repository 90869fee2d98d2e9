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

//! Fixed-step classical Runge-Kutta integration.

use core::ops::{Add, Mul};

use crate::flow::Outflow;
use crate::tank::Tank;

/// Advances `state` from `t` to `t + dt` with one classical RK4 step.
///
/// `derivative(t, x)` is evaluated four times: at the start, twice at the midpoint and once at
/// the end of the interval. Any control input the derivative depends on should be captured by
/// value so it stays constant across the four evaluations.
pub fn rk4_step<S, D>(derivative: D, t: f64, state: S, dt: f64) -> S
where
    S: Copy + Add<Output = S> + Mul<f64, Output = S>,
    D: Fn(f64, S) -> S,
{
    let half_dt = 0.5 * dt;

    let k1 = derivative(t, state);
    let k2 = derivative(t + half_dt, state + k1 * half_dt);
    let k3 = derivative(t + half_dt, state + k2 * half_dt);
    let k4 = derivative(t + dt, state + k3 * dt);

    state + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}

/// Advances the tank level by one step with `inflow` held constant, then clamps the result to be
/// non-negative.
pub fn step_level<O: Outflow>(tank: &Tank<O>, t: f64, level: f64, inflow: f64, dt: f64) -> f64 {
    let next = rk4_step(|t, h| tank.derivative(t, h, inflow), t, level, dt);
    next.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::flow::LinearOutlet;
    use crate::tank::TankParams;

    #[test]
    fn integrates_polynomials_up_to_fourth_order_exactly() {
        // x' = 4 t^3 has x(t) = t^4, which RK4 reproduces to rounding over a single step
        let x = rk4_step(|t, _x: f64| 4.0 * t.powi(3), 0.0, 0.0, 1.0);
        assert_relative_eq!(x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn single_tank_step_matches_hand_computation() {
        let tank = Tank::new(TankParams::new(5.0, 10.0).unwrap(), LinearOutlet::new(1.0)).unwrap();
        let dt = 0.05;
        let f = |h: f64| (20.0 - h) / 5.0;
        let k1 = f(0.0);
        let k2 = f(dt * k1 / 2.0);
        let k3 = f(dt * k2 / 2.0);
        let k4 = f(dt * k3);
        let expected = dt / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);

        assert_relative_eq!(step_level(&tank, 0.0, 0.0, 20.0, dt), expected, epsilon = 1e-15);
    }

    #[test]
    fn draining_step_is_clamped_at_zero() {
        let tank = Tank::new(TankParams::new(0.1, 10.0).unwrap(), LinearOutlet::new(0.0)).unwrap();
        // Negative inflow with no outlet would drive the level well below zero
        assert_eq!(step_level(&tank, 0.0, 0.01, -5.0, 1.0), 0.0);
    }
}
