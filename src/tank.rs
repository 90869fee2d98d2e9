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
use crate::flow::Outflow;

/// Geometry of the tank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankParams {
    /// Cross-sectional area A
    pub area: f64,
    /// Level at which the safety override engages, H_MAX
    pub max_level: f64,
}

impl TankParams {
    /// Validated constructor.
    pub fn new(area: f64, max_level: f64) -> Result<Self, ConfigError> {
        let params = Self { area, max_level };
        params.validate()?;
        Ok(params)
    }

    /// Checks that the area is positive and the ceiling is positive and finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.area.is_finite() && self.area > 0.0) {
            return Err(ConfigError::InvalidArea);
        }
        if !(self.max_level.is_finite() && self.max_level > 0.0) {
            return Err(ConfigError::InvalidMaxLevel);
        }
        Ok(())
    }
}

/// A single tank draining through `outlet`, governed by
///
/// dh/dt = (Qin - Qout(t, h)) / A
#[derive(Debug, Clone)]
pub struct Tank<O> {
    params: TankParams,
    outlet: O,
}

impl<O: Outflow> Tank<O> {
    /// Creates a tank after validating its geometry and outlet.
    pub fn new(params: TankParams, outlet: O) -> Result<Self, ConfigError> {
        params.validate()?;
        outlet.validate()?;
        Ok(Self { params, outlet })
    }

    /// Tank geometry.
    pub fn params(&self) -> &TankParams {
        &self.params
    }

    /// Outlet flow model.
    pub fn outlet(&self) -> &O {
        &self.outlet
    }

    /// Outflow at time `t` for the given level.
    pub fn outflow(&self, t: f64, level: f64) -> f64 {
        self.outlet.outflow(t, level)
    }

    /// Rate of change of the level. `inflow` is supplied by the caller and held fixed across
    /// the stages of an integration step; only the outflow follows the stage level.
    pub fn derivative(&self, t: f64, level: f64, inflow: f64) -> f64 {
        (inflow - self.outflow(t, level)) / self.params.area
    }

    /// Whether `level` has reached the safety ceiling.
    pub fn at_capacity(&self, level: f64) -> bool {
        level >= self.params.max_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{LinearOutlet, ValveRampOutlet};

    #[test]
    fn rejects_invalid_geometry() {
        assert_eq!(TankParams::new(0.0, 1.0), Err(ConfigError::InvalidArea));
        assert_eq!(TankParams::new(-2.0, 1.0), Err(ConfigError::InvalidArea));
        assert_eq!(TankParams::new(f64::NAN, 1.0), Err(ConfigError::InvalidArea));
        assert_eq!(TankParams::new(1.0, 0.0), Err(ConfigError::InvalidMaxLevel));
        assert_eq!(
            TankParams::new(1.0, f64::INFINITY),
            Err(ConfigError::InvalidMaxLevel)
        );
    }

    #[test]
    fn rejects_invalid_outlets() {
        let params = TankParams::new(1.0, 10.0).unwrap();
        assert_eq!(
            Tank::new(params, LinearOutlet::new(-2.0)).map(|_| ()),
            Err(ConfigError::InvalidFlowModel)
        );
        let valve = ValveRampOutlet {
            k_out: 2.0,
            open_time: 1.0,
            ramp_duration: -1.0,
        };
        assert_eq!(
            Tank::new(params, valve).map(|_| ()),
            Err(ConfigError::InvalidFlowModel)
        );
        assert!(Tank::new(params, |_t: f64, h: f64| -h).is_ok());
    }

    #[test]
    fn tanks_can_be_cloned_and_inspected() {
        let tank = Tank::new(TankParams::new(2.0, 4.0).unwrap(), LinearOutlet::new(1.5)).unwrap();
        let copy = tank.clone();
        assert_eq!(copy.params(), tank.params());
        assert_eq!(copy.outlet(), tank.outlet());
        assert!(format!("{tank:?}").contains("k_out: 1.5"));
    }

    #[test]
    fn derivative_balances_inflow_and_outflow() {
        let tank = Tank::new(TankParams::new(5.0, 10.0).unwrap(), LinearOutlet::new(1.0)).unwrap();
        assert_eq!(tank.derivative(0.0, 0.0, 10.0), 2.0);
        assert_eq!(tank.derivative(0.0, 5.0, 5.0), 0.0);
        assert_eq!(tank.derivative(0.0, 10.0, 0.0), -2.0);
        // Negative stage levels are evaluated as-is
        assert_eq!(tank.derivative(0.0, -5.0, 0.0), 1.0);
    }

    #[test]
    fn capacity_is_inclusive() {
        let tank = Tank::new(TankParams::new(1.0, 10.0).unwrap(), LinearOutlet::new(1.0)).unwrap();
        assert!(!tank.at_capacity(9.999));
        assert!(tank.at_capacity(10.0));
        assert!(tank.at_capacity(10.5));
    }
}
