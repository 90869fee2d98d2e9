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

//! Serializable scenario descriptions.
//!
//! These are plain data: deserialize them from any serde format, call `validate` or go straight
//! to `build`, which validates and assembles a ready-to-run [`Simulation`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::flow::{ConstantInflow, LinearOutlet, OutletModel};
use crate::pid::{PidConfig, PidConfigBuilder};
use crate::sim::{ClosedLoop, OpenLoop, Simulation, DEFAULT_INTEGRAL_DECAY};
use crate::tank::{Tank, TankParams};
use crate::time::TimeGrid;

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
}

/// Saturation bounds of the controller command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputLimits {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

/// PID level control of a tank draining through a linear outlet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosedLoopConfig {
    /// Tank geometry
    pub tank: TankParams,
    /// Target level
    pub setpoint: f64,
    /// Controller gains
    pub gains: PidGains,
    /// Controller saturation bounds
    pub output_limits: OutputLimits,
    /// Coefficient of the linear outlet, Qout = k_out * h
    pub outlet_coefficient: f64,
    /// Simulation time grid
    pub grid: TimeGrid,
    /// Level at the start of the run
    pub initial_level: f64,
    /// Integral scaling applied on each step the safety override fires
    pub integral_decay: f64,
}

impl Default for ClosedLoopConfig {
    fn default() -> Self {
        Self {
            tank: TankParams {
                area: 5.0,
                max_level: 10.0,
            },
            setpoint: 5.0,
            gains: PidGains {
                kp: 183.0,
                ki: 317.0,
                kd: 10.0,
            },
            output_limits: OutputLimits {
                min: 0.0,
                max: 20.0,
            },
            outlet_coefficient: 1.0,
            grid: TimeGrid {
                t0: 0.0,
                tf: 100.0,
                dt: 0.05,
            },
            initial_level: 0.0,
            integral_decay: DEFAULT_INTEGRAL_DECAY,
        }
    }
}

impl ClosedLoopConfig {
    /// Builds the controller configuration from the gains and limits.
    pub fn pid_config(&self) -> Result<PidConfig<f64>, ConfigError> {
        let config = PidConfigBuilder::default()
            .kp(self.gains.kp)
            .ki(self.gains.ki)
            .kd(self.gains.kd)
            .output_limits(self.output_limits.min, self.output_limits.max)
            .build()?;
        Ok(config)
    }

    /// Checks every parameter without running anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build().map(|_| ())
    }

    /// Assembles a ready-to-run simulation.
    pub fn build(&self) -> Result<Simulation<LinearOutlet, ClosedLoop>, ConfigError> {
        let tank = Tank::new(self.tank, LinearOutlet::new(self.outlet_coefficient))?;
        let drive = ClosedLoop::new(self.pid_config()?, self.setpoint)?
            .with_integral_decay(self.integral_decay)?;
        Simulation::new(tank, self.grid, drive)?.with_initial_level(self.initial_level)
    }
}

/// A tank with constant inflow and no controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenLoopConfig {
    /// Tank geometry
    pub tank: TankParams,
    /// Prescribed inflow rate
    pub inflow: ConstantInflow,
    /// Outlet flow model
    pub outlet: OutletModel,
    /// Simulation time grid
    pub grid: TimeGrid,
    /// Level at the start of the run
    pub initial_level: f64,
}

impl Default for OpenLoopConfig {
    fn default() -> Self {
        Self {
            tank: TankParams {
                area: 0.5,
                max_level: 10.0,
            },
            inflow: ConstantInflow(6.0),
            outlet: OutletModel::Linear(LinearOutlet::new(2.0)),
            grid: TimeGrid {
                t0: 0.0,
                tf: 200.0,
                dt: 0.05,
            },
            initial_level: 0.0,
        }
    }
}

impl OpenLoopConfig {
    /// Checks every parameter without running anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build().map(|_| ())
    }

    /// Assembles a ready-to-run simulation.
    pub fn build(&self) -> Result<Simulation<OutletModel, OpenLoop<ConstantInflow>>, ConfigError> {
        if !self.inflow.0.is_finite() {
            return Err(ConfigError::InvalidFlowModel);
        }
        let tank = Tank::new(self.tank, self.outlet)?;
        Simulation::new(tank, self.grid, OpenLoop::new(self.inflow))?
            .with_initial_level(self.initial_level)
    }
}
