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

/// An inlet flow profile, Qin(t).
pub trait Inflow {
    /// Returns the inflow at time `t`
    fn inflow(&self, t: f64) -> f64;
}

/// An outlet characteristic, Qout(t, h).
///
/// Implementations must accept any level, including transiently negative estimates produced
/// by intermediate Runge-Kutta stages.
pub trait Outflow {
    /// Returns the outflow at time `t` when the tank holds `level`
    fn outflow(&self, t: f64, level: f64) -> f64;

    /// Checks the outlet's parameters. Closures and other opaque outlets are accepted as given.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

fn non_negative(x: f64) -> bool {
    x.is_finite() && x >= 0.0
}

impl<T: Fn(f64) -> f64> Inflow for T {
    fn inflow(&self, t: f64) -> f64 {
        self(t)
    }
}

impl<T: Fn(f64, f64) -> f64> Outflow for T {
    fn outflow(&self, t: f64, level: f64) -> f64 {
        self(t, level)
    }
}

/// A time-invariant inflow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantInflow(pub f64);

impl Inflow for ConstantInflow {
    fn inflow(&self, _t: f64) -> f64 {
        self.0
    }
}

/// Gravity-driven drain linear in level: Qout = k_out * h.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearOutlet {
    /// Outlet coefficient
    pub k_out: f64,
}

impl LinearOutlet {
    /// Creates an outlet with coefficient `k_out`.
    pub fn new(k_out: f64) -> Self {
        Self { k_out }
    }
}

impl Outflow for LinearOutlet {
    fn outflow(&self, _t: f64, level: f64) -> f64 {
        self.k_out * level
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if non_negative(self.k_out) {
            Ok(())
        } else {
            Err(ConfigError::InvalidFlowModel)
        }
    }
}

/// A linear drain behind a valve that stays shut until `open_time`, then opens linearly to
/// fully open over `ramp_duration`.
///
/// Qout = k_out * opening(t) * h, with opening(t) in [0, 1]. A zero `ramp_duration` opens
/// the valve in a single jump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValveRampOutlet {
    /// Outlet coefficient
    pub k_out: f64,
    /// Time at which the valve starts opening
    pub open_time: f64,
    /// Time taken to go from closed to fully open
    pub ramp_duration: f64,
}

impl ValveRampOutlet {
    /// Fraction of the valve that is open at time `t`.
    pub fn opening(&self, t: f64) -> f64 {
        if t < self.open_time {
            0.0
        } else if self.ramp_duration <= 0.0 {
            1.0
        } else {
            ((t - self.open_time) / self.ramp_duration).min(1.0)
        }
    }
}

impl Outflow for ValveRampOutlet {
    fn outflow(&self, t: f64, level: f64) -> f64 {
        self.k_out * self.opening(t) * level
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if non_negative(self.k_out)
            && self.open_time.is_finite()
            && non_negative(self.ramp_duration)
        {
            Ok(())
        } else {
            Err(ConfigError::InvalidFlowModel)
        }
    }
}

/// Serializable choice of outlet characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutletModel {
    /// Always-open linear outlet
    Linear(LinearOutlet),
    /// Linear outlet behind a valve that ramps open
    ValveRamp(ValveRampOutlet),
}

impl Outflow for OutletModel {
    fn outflow(&self, t: f64, level: f64) -> f64 {
        match self {
            OutletModel::Linear(o) => o.outflow(t, level),
            OutletModel::ValveRamp(o) => o.outflow(t, level),
        }
    }

    /// Rejects negative or non-finite coefficients and times.
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            OutletModel::Linear(o) => o.validate(),
            OutletModel::ValveRamp(o) => o.validate(),
        }
    }
}

/// Closed-form level of a tank with constant inflow and a linear drain:
///
/// h(t) = Qin/k + (h0 - Qin/k) * exp(-k t / A)
///
/// With `k_out == 0` the tank fills linearly, h(t) = h0 + Qin t / A. The solution ignores the
/// non-negativity clamp, so it only matches a simulation whose level never hits zero.
pub fn linear_tank_response(area: f64, inflow: f64, k_out: f64, initial_level: f64, t: f64) -> f64 {
    if k_out == 0.0 {
        return initial_level + inflow * t / area;
    }
    let steady = inflow / k_out;
    steady + (initial_level - steady) * (-k_out * t / area).exp()
}
