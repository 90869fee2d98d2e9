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

use thiserror::Error;

use crate::pid::PidConfigError;

/// Errors raised while validating a simulation setup.
///
/// Every variant is detected before the first step is taken; a run that starts never fails.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The tank cross-sectional area is not strictly positive and finite
    #[error("Tank area must be positive and finite")]
    InvalidArea,

    /// The safety ceiling is not strictly positive and finite
    #[error("Maximum level must be positive and finite")]
    InvalidMaxLevel,

    /// The integration step is not strictly positive and finite
    #[error("Time step must be positive and finite")]
    InvalidTimeStep,

    /// The time bounds are not finite, out of order, or span less than a single step
    #[error("Time grid must satisfy T0 < TF and hold at least two points")]
    InvalidTimeGrid,

    /// The initial level is negative or not finite
    #[error("Initial level must be non-negative and finite")]
    InvalidInitialLevel,

    /// The level setpoint is not finite
    #[error("Setpoint must be finite")]
    InvalidSetpoint,

    /// The override's integral decay factor lies outside of [0, 1]
    #[error("Integral decay factor must lie in [0, 1]")]
    InvalidDecayFactor,

    /// A flow model parameter is negative or not finite
    #[error("Flow model parameters must be non-negative and finite")]
    InvalidFlowModel,

    /// The controller configuration was rejected
    #[error(transparent)]
    Pid(#[from] PidConfigError),
}
