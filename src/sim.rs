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

//! Fixed-step simulation driver.
//!
//! A [`Simulation`] walks a [`TimeGrid`], asking its [`Drive`] for the inflow at each grid point,
//! then integrates the tank level over the following interval with RK4 and clamps it to be
//! non-negative. The last grid point has no interval after it, so its inflow and monitored signal
//! repeat those of the point before it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::error::ConfigError;
use crate::flow::{Inflow, Outflow};
use crate::integrator::step_level;
use crate::pid::{PidConfig, PidController};
use crate::tank::Tank;
use crate::time::TimeGrid;

/// Integral decay applied while the tank sits at or above its ceiling.
pub const DEFAULT_INTEGRAL_DECAY: f64 = 0.9;

// Longer runs grow their series as they step
const PREALLOCATED_POINTS: usize = 1 << 16;

/// How the inflow is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// Inflow follows a prescribed profile; the outflow is monitored
    OpenLoop,
    /// Inflow is commanded by a PID controller; the tracking error is monitored
    ClosedLoop,
}

/// The secondary signal recorded next to level and inflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Monitored {
    /// Closed loop: setpoint minus level
    Error(f64),
    /// Open loop: outlet flow rate
    Outflow(f64),
}

impl Monitored {
    fn new(mode: LoopMode, value: f64) -> Self {
        match mode {
            LoopMode::OpenLoop => Monitored::Outflow(value),
            LoopMode::ClosedLoop => Monitored::Error(value),
        }
    }

    /// The raw value regardless of variant.
    pub fn value(&self) -> f64 {
        match *self {
            Monitored::Error(v) | Monitored::Outflow(v) => v,
        }
    }
}

/// One sample of the output series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// Grid time
    pub time: f64,
    /// Level at `time`, before the step is integrated
    pub level: f64,
    /// Inflow held over the interval starting at `time`
    pub inflow: f64,
    /// Tracking error or outflow at `time`
    pub monitored: Monitored,
    /// Whether the safety override replaced the controller's command
    pub override_engaged: bool,
}

/// Decision made by a [`Drive`] for one interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actuation {
    /// Inflow held over the coming interval
    pub inflow: f64,
    /// Tracking error or outflow, depending on the loop mode
    pub monitored: f64,
    /// Whether the safety override replaced the command
    pub override_engaged: bool,
}

/// Source of the inflow at each grid point.
pub trait Drive {
    /// Which secondary signal the drive reports.
    const MODE: LoopMode;

    /// Returns the drive to its initial state at the start of a run.
    fn prepare(&mut self);

    /// Decides the inflow to hold over the interval `[t, t + dt]`.
    fn actuate<O: Outflow>(&mut self, tank: &Tank<O>, t: f64, level: f64, dt: f64) -> Actuation;
}

/// Prescribed inflow, no feedback.
pub struct OpenLoop<I> {
    inflow: I,
}

impl<I: Inflow> OpenLoop<I> {
    /// Wraps an inflow profile.
    pub fn new(inflow: I) -> Self {
        Self { inflow }
    }
}

impl<I: Inflow> Drive for OpenLoop<I> {
    const MODE: LoopMode = LoopMode::OpenLoop;

    fn prepare(&mut self) {}

    fn actuate<O: Outflow>(&mut self, tank: &Tank<O>, t: f64, level: f64, _dt: f64) -> Actuation {
        Actuation {
            inflow: self.inflow.inflow(t),
            monitored: tank.outflow(t, level),
            override_engaged: false,
        }
    }
}

/// PID level tracking with a safety override at the tank's ceiling.
///
/// At each grid point the controller is updated with `setpoint - level`. If the level is at or
/// above the tank's maximum, the command is then replaced by zero and the controller's integral
/// is scaled by `integral_decay`. The override has no hysteresis: it fires on every grid point
/// at or above the ceiling.
#[derive(Debug, Clone)]
pub struct ClosedLoop {
    controller: PidController<f64>,
    setpoint: f64,
    integral_decay: f64,
}

impl ClosedLoop {
    /// Creates a tracking loop with the default integral decay. The setpoint must be finite.
    pub fn new(config: PidConfig<f64>, setpoint: f64) -> Result<Self, ConfigError> {
        if !setpoint.is_finite() {
            return Err(ConfigError::InvalidSetpoint);
        }
        Ok(Self {
            controller: PidController::new(config),
            setpoint,
            integral_decay: DEFAULT_INTEGRAL_DECAY,
        })
    }

    /// Replaces the override's integral decay factor, which must lie in [0, 1].
    pub fn with_integral_decay(mut self, decay: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&decay) {
            return Err(ConfigError::InvalidDecayFactor);
        }
        self.integral_decay = decay;
        Ok(self)
    }

    /// The wrapped controller and its current state.
    pub fn controller(&self) -> &PidController<f64> {
        &self.controller
    }

    /// Target level.
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Integral scaling applied by the safety override.
    pub fn integral_decay(&self) -> f64 {
        self.integral_decay
    }
}

impl Drive for ClosedLoop {
    const MODE: LoopMode = LoopMode::ClosedLoop;

    fn prepare(&mut self) {
        self.controller.reset();
    }

    fn actuate<O: Outflow>(&mut self, tank: &Tank<O>, _t: f64, level: f64, dt: f64) -> Actuation {
        let error = self.setpoint - level;
        let mut command = self.controller.update(error, dt);

        let override_engaged = tank.at_capacity(level);
        if override_engaged {
            command = self.controller.apply_override(self.integral_decay);
        }

        Actuation {
            inflow: command,
            monitored: error,
            override_engaged,
        }
    }
}

/// Lifecycle of a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started
    Idle,
    /// Started; more intervals remain
    Stepping,
    /// Grid exhausted; the series is complete
    Finished,
}

/// Equal-length output series indexed by the time grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    mode: LoopMode,
    time: Vec<f64>,
    level: Vec<f64>,
    inflow: Vec<f64>,
    monitored: Vec<f64>,
    overrides: Vec<bool>,
}

impl Trajectory {
    fn with_capacity(mode: LoopMode, capacity: usize) -> Self {
        Self {
            mode,
            time: Vec::with_capacity(capacity),
            level: Vec::with_capacity(capacity),
            inflow: Vec::with_capacity(capacity),
            monitored: Vec::with_capacity(capacity),
            overrides: Vec::with_capacity(capacity),
        }
    }

    fn clear(&mut self) {
        self.time.clear();
        self.level.clear();
        self.inflow.clear();
        self.monitored.clear();
        self.overrides.clear();
    }

    /// Loop mode the series was recorded in.
    pub fn mode(&self) -> LoopMode {
        self.mode
    }

    /// Number of grid points recorded.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Grid times.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Level at each grid time.
    pub fn level(&self) -> &[f64] {
        &self.level
    }

    /// Commanded (closed-loop) or prescribed (open-loop) inflow.
    pub fn inflow(&self) -> &[f64] {
        &self.inflow
    }

    /// Tracking error, for closed-loop runs only.
    pub fn error(&self) -> Option<&[f64]> {
        (self.mode == LoopMode::ClosedLoop).then_some(self.monitored.as_slice())
    }

    /// Outflow, for open-loop runs only.
    pub fn outflow(&self) -> Option<&[f64]> {
        (self.mode == LoopMode::OpenLoop).then_some(self.monitored.as_slice())
    }

    /// Per-sample flags marking where the safety override fired. Always false for the final
    /// sample, where no command is computed.
    pub fn overrides(&self) -> &[bool] {
        &self.overrides
    }

    /// Iterates the series row by row.
    pub fn samples(&self) -> impl Iterator<Item = StepResult> + '_ {
        (0..self.len()).map(move |i| StepResult {
            time: self.time[i],
            level: self.level[i],
            inflow: self.inflow[i],
            monitored: Monitored::new(self.mode, self.monitored[i]),
            override_engaged: self.overrides[i],
        })
    }
}

/// A single-tank run over a fixed time grid.
///
/// The run starts at `(t0, initial_level)`; the initial level defaults to an empty tank.
/// [`step`](Self::step) advances one interval at a time and [`run`](Self::run) goes to the end of
/// the grid. Starting again discards the previous series and resets the drive.
pub struct Simulation<O, D> {
    tank: Tank<O>,
    grid: TimeGrid,
    drive: D,
    initial_level: f64,
    state: RunState,
    index: usize,
    level: f64,
    engaged: bool,
    record: Trajectory,
}

impl<O: Outflow, D: Drive> Simulation<O, D> {
    /// Creates an idle simulation after validating the tank and the grid.
    pub fn new(tank: Tank<O>, grid: TimeGrid, drive: D) -> Result<Self, ConfigError> {
        tank.params().validate()?;
        grid.validate()?;
        let record = Trajectory::with_capacity(D::MODE, grid.points().min(PREALLOCATED_POINTS));
        Ok(Self {
            tank,
            grid,
            drive,
            initial_level: 0.0,
            state: RunState::Idle,
            index: 0,
            level: 0.0,
            engaged: false,
            record,
        })
    }

    /// Sets the level at `t0`, which must be finite and non-negative.
    pub fn with_initial_level(mut self, level: f64) -> Result<Self, ConfigError> {
        if !(level.is_finite() && level >= 0.0) {
            return Err(ConfigError::InvalidInitialLevel);
        }
        self.initial_level = level;
        Ok(self)
    }

    /// The simulated tank.
    pub fn tank(&self) -> &Tank<O> {
        &self.tank
    }

    /// The time grid.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// The inflow source, e.g. to inspect the controller after a run.
    pub fn drive(&self) -> &D {
        &self.drive
    }

    /// Lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Current time and level.
    pub fn current(&self) -> (f64, f64) {
        (self.grid.time(self.index), self.level)
    }

    /// Resets the level, the drive and the recorded series, and enters [`RunState::Stepping`].
    pub fn start(&mut self) {
        self.drive.prepare();
        self.record.clear();
        self.index = 0;
        self.level = self.initial_level;
        self.engaged = false;

        self.record.time.push(self.grid.time(0));
        self.record.level.push(self.level);
        self.state = RunState::Stepping;

        info!(
            mode = ?D::MODE,
            points = self.grid.points(),
            dt = self.grid.dt,
            initial_level = self.level,
            "starting tank simulation"
        );
    }

    /// Advances one grid interval, starting the run first if it is idle.
    ///
    /// Returns the sample at the start of the interval, or `None` once the run has finished.
    pub fn step(&mut self) -> Option<StepResult> {
        match self.state {
            RunState::Finished => return None,
            RunState::Idle => self.start(),
            RunState::Stepping => {}
        }

        let dt = self.grid.dt;
        let t = self.grid.time(self.index);
        let level = self.level;

        let actuation = self.drive.actuate(&self.tank, t, level, dt);
        if actuation.override_engaged != self.engaged {
            debug!(t, level, engaged = actuation.override_engaged, "safety override toggled");
            self.engaged = actuation.override_engaged;
        }

        self.level = step_level(&self.tank, t, level, actuation.inflow, dt);
        self.index += 1;
        trace!(t, level, inflow = actuation.inflow, next_level = self.level, "step");

        self.record.inflow.push(actuation.inflow);
        self.record.monitored.push(actuation.monitored);
        self.record.overrides.push(actuation.override_engaged);
        self.record.time.push(self.grid.time(self.index));
        self.record.level.push(self.level);

        if self.index == self.grid.steps() {
            self.finish();
        }

        Some(StepResult {
            time: t,
            level,
            inflow: actuation.inflow,
            monitored: Monitored::new(D::MODE, actuation.monitored),
            override_engaged: actuation.override_engaged,
        })
    }

    /// Runs the whole grid from the initial state and returns the series.
    pub fn run(&mut self) -> &Trajectory {
        self.start();
        while self.step().is_some() {}
        &self.record
    }

    /// The complete series, available once the run has finished.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        (self.state == RunState::Finished).then_some(&self.record)
    }

    /// Consumes the simulation, returning the series if the run has finished.
    pub fn into_trajectory(self) -> Option<Trajectory> {
        (self.state == RunState::Finished).then_some(self.record)
    }

    fn finish(&mut self) {
        let record = &mut self.record;
        // The loop only fills inflow and the monitored signal up to the second-to-last point
        if let (Some(&inflow), Some(&monitored)) = (record.inflow.last(), record.monitored.last()) {
            record.inflow.push(inflow);
            record.monitored.push(monitored);
            record.overrides.push(false);
        }
        self.state = RunState::Finished;

        info!(
            final_level = self.level,
            overrides = record.overrides.iter().filter(|&&o| o).count(),
            "tank simulation finished"
        );
    }
}
