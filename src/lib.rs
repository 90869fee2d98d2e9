#![warn(missing_docs)]

//! # Tank Level Simulation Library
//!
//! This library simulates the liquid level of a single tank,
//!
//! dh/dt = (Qin - Qout) / A,
//!
//! integrated with the classical fourth-order Runge-Kutta method on a fixed time grid. The
//! inflow either follows a prescribed profile (open loop) or is commanded by a PID controller
//! tracking a level setpoint (closed loop).
//!
//! ## Features
//!
//! - Plain fixed-step RK4, with the inflow held constant over each step (zero-order hold) while
//!   the outflow follows the intermediate stage levels.
//! - Physical constraints enforced every step:
//!   - The level never goes negative.
//!   - The commanded inflow saturates at configurable actuator limits.
//!   - A safety override zeroes the command and decays the controller's integral while the
//!     level sits at or above the tank's maximum.
//! - Functional and stateful PID controllers, generic over the float type.
//! - Configuration validated up front: a run that starts always finishes.
//! - Serializable scenario configurations with reference defaults.
//!
//! ## Usage
//!
//! ### Closed-loop level control
//!
//! ```rust
//! use tank_pid::config::ClosedLoopConfig;
//!
//! let mut sim = ClosedLoopConfig::default()
//!     .build()
//!     .expect("Invalid scenario");
//! let trajectory = sim.run();
//!
//! let error = trajectory.error().expect("Closed-loop runs record the tracking error");
//! assert_eq!(error.len(), trajectory.level().len());
//! assert!(trajectory.level().iter().all(|&h| h >= 0.0));
//! ```
//!
//! ### Open-loop filling with custom flows
//!
//! Any closure of time serves as an inflow profile, and any closure of time and level as an
//! outflow characteristic.
//!
//! ```rust
//! use tank_pid::sim::{OpenLoop, Simulation};
//! use tank_pid::tank::{Tank, TankParams};
//! use tank_pid::time::TimeGrid;
//!
//! let params = TankParams::new(0.5, 10.0).expect("Invalid tank");
//! let tank = Tank::new(params, |_t: f64, h: f64| 2.0 * h).expect("Invalid tank");
//! let grid = TimeGrid::new(0.0, 20.0, 0.05).expect("Invalid grid");
//!
//! let mut sim = Simulation::new(tank, grid, OpenLoop::new(|_t: f64| 6.0))
//!     .expect("Invalid simulation");
//! let final_level = *sim.run().level().last().unwrap();
//! assert!((final_level - 3.0).abs() < 1e-6);
//! ```
//!
//! ### Functional PID Controller
//!
//! The functional PID controller holds no mutable state: the working state is passed in and
//! returned with every call.
//!
//! ```rust
//! use tank_pid::pid::{FuncPidController, PidConfigBuilder, PidContext};
//!
//! let config = PidConfigBuilder::default()
//!     .kp(2.0)
//!     .ki(0.5)
//!     .output_limits(0.0, 10.0)
//!     .build()
//!     .expect("Invalid PID config");
//! let pid = FuncPidController::new(config);
//! let ctx = PidContext::new();
//!
//! let (output, ctx) = pid.compute(ctx, 1.0, 0.1);
//! assert_eq!(output, 2.0 * 1.0 + 0.5 * 0.1);
//! assert_eq!(ctx.integral(), 0.1);
//! ```

/// Crate-level configuration errors.
pub mod error;

/// Inflow and outflow models.
pub mod flow;

/// Tank geometry and level dynamics.
pub mod tank;

/// Fourth-order Runge-Kutta stepping.
pub mod integrator;

/// The PID controller, including the safety override's anti-windup operation.
pub mod pid;

/// The fixed simulation time grid.
pub mod time;

/// Open- and closed-loop simulation driver.
pub mod sim;

/// Serializable scenario descriptions.
pub mod config;

/// Step-response summaries of a finished run.
pub mod metrics;

pub use error::ConfigError;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
