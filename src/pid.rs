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

use num_traits::Float;
use thiserror::Error;

/// Errors raised when a PID configuration value is rejected
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PidConfigError {
    /// The proportional gain is not finite
    #[error("Proportional gain must be finite")]
    InvalidProportionalGain,

    /// The integral gain is not finite
    #[error("Integral gain must be finite")]
    InvalidIntegralGain,

    /// The derivative gain is not finite
    #[error("Derivative gain must be finite")]
    InvalidDerivativeGain,

    /// The lower output limit exceeds the upper one, or either limit is NaN
    #[error("Output limits must satisfy min <= max and not be NaN")]
    InvalidOutputLimits,
}

/// Gains and actuation limits of the PID controller.
///
/// Values are only accepted through the validated setters or [`PidConfigBuilder`], so a
/// `PidConfig` in hand always holds finite gains and ordered limits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidConfig<F> {
    /// Proportional gain coefficient.
    /// Defaults to 1.0.
    kp: F,

    /// Integral gain coefficient, applied to the time-integral of the error.
    /// Defaults to 0.0.
    ki: F,

    /// Derivative gain coefficient, applied to the backward difference of the error.
    /// Defaults to 0.0.
    kd: F,

    /// Minimum output value of the PID controller.
    /// Defaults to zero; a tank inlet cannot drain.
    output_min: F,

    /// Maximum output value of the PID controller.
    /// Defaults to positive infinity, i.e. no limit.
    output_max: F,
}

impl<F: Float> Default for PidConfig<F> {
    fn default() -> Self {
        PidConfig {
            kp: F::one(),
            ki: F::zero(),
            kd: F::zero(),
            output_min: F::zero(),
            output_max: F::infinity(),
        }
    }
}

impl<F: Float> PidConfig<F> {
    /// Returns the proportional gain.
    pub fn kp(&self) -> F {
        self.kp
    }

    /// Returns the integral gain.
    pub fn ki(&self) -> F {
        self.ki
    }

    /// Returns the derivative gain.
    pub fn kd(&self) -> F {
        self.kd
    }

    /// Convenience method that returns the proportional, integral, and derivative gains together as a tuple.
    pub fn gains(&self) -> (F, F, F) {
        (self.kp, self.ki, self.kd)
    }

    /// Returns the minimum output limit.
    pub fn output_min(&self) -> F {
        self.output_min
    }

    /// Returns the maximum output limit.
    pub fn output_max(&self) -> F {
        self.output_max
    }

    /// Sets the proportional gain. Any finite value, including zero and negative gains, is
    /// accepted.
    pub fn set_kp(&mut self, kp: F) -> Result<(), PidConfigError> {
        if !kp.is_finite() {
            return Err(PidConfigError::InvalidProportionalGain);
        }
        self.kp = kp;
        Ok(())
    }

    /// Sets the integral gain.
    pub fn set_ki(&mut self, ki: F) -> Result<(), PidConfigError> {
        if !ki.is_finite() {
            return Err(PidConfigError::InvalidIntegralGain);
        }
        self.ki = ki;
        Ok(())
    }

    /// Sets the derivative gain.
    pub fn set_kd(&mut self, kd: F) -> Result<(), PidConfigError> {
        if !kd.is_finite() {
            return Err(PidConfigError::InvalidDerivativeGain);
        }
        self.kd = kd;
        Ok(())
    }

    /// Convenience method to set the proportional, integral, and derivative gains together.
    ///
    /// Gains are applied in order and the first failure stops the update.
    pub fn set_gains(&mut self, kp: F, ki: F, kd: F) -> Result<(), PidConfigError> {
        self.set_kp(kp)?;
        self.set_ki(ki)?;
        self.set_kd(kd)
    }

    /// Sets the minimum and maximum output limits for the PID controller.
    ///
    /// The limits may be infinite to disable clamping on either side, and may be equal to pin
    /// the output to a single value.
    ///
    /// # Errors
    /// - [`PidConfigError::InvalidOutputLimits`] if `output_min > output_max` or either limit is NaN.
    pub fn set_output_limits(&mut self, output_min: F, output_max: F) -> Result<(), PidConfigError> {
        if output_min.is_nan() || output_max.is_nan() || output_min > output_max {
            return Err(PidConfigError::InvalidOutputLimits);
        }

        self.output_min = output_min;
        self.output_max = output_max;
        Ok(())
    }
}

/// Builder for [`PidConfig`], validating every field when [`build`](Self::build) is called.
#[derive(Copy, Clone, Debug)]
pub struct PidConfigBuilder<F> {
    kp: F,
    ki: F,
    kd: F,
    output_min: F,
    output_max: F,
}

impl<F: Float> Default for PidConfigBuilder<F> {
    fn default() -> Self {
        let config = PidConfig::default();
        Self {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
            output_min: config.output_min,
            output_max: config.output_max,
        }
    }
}

impl<F: Float> PidConfigBuilder<F> {
    /// Sets the proportional gain.
    pub fn kp(mut self, kp: F) -> Self {
        self.kp = kp;
        self
    }

    /// Sets the integral gain.
    pub fn ki(mut self, ki: F) -> Self {
        self.ki = ki;
        self
    }

    /// Sets the derivative gain.
    pub fn kd(mut self, kd: F) -> Self {
        self.kd = kd;
        self
    }

    /// Sets the saturation bounds.
    pub fn output_limits(mut self, output_min: F, output_max: F) -> Self {
        self.output_min = output_min;
        self.output_max = output_max;
        self
    }

    /// Validates the accumulated values and produces the configuration.
    pub fn build(self) -> Result<PidConfig<F>, PidConfigError> {
        let mut config = PidConfig::default();
        config.set_gains(self.kp, self.ki, self.kd)?;
        config.set_output_limits(self.output_min, self.output_max)?;
        Ok(config)
    }
}

/// Mutable working state of the controller: the error integral and the error seen at the
/// previous update.
///
/// A fresh context and a reset context are indistinguishable.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidContext<F> {
    integral: F,
    last_err: F,
}

impl<F: Float> Default for PidContext<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> PidContext<F> {
    /// Creates a zeroed context.
    ///
    /// The first update against a zeroed context differentiates the error against 0, so the
    /// first command carries a derivative kick of `kd * error / dt`.
    pub fn new() -> Self {
        Self {
            integral: F::zero(),
            last_err: F::zero(),
        }
    }

    /// Returns the accumulated error integral.
    pub fn integral(&self) -> F {
        self.integral
    }

    /// Returns the error passed to the most recent update.
    pub fn last_error(&self) -> F {
        self.last_err
    }

    /// Zeroes the integral and the previous error.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// A functional implementation of a PID (Proportional-Integral-Derivative) controller.
///
/// This implementation is stateless so a context object must be passed in and returned with each
/// call to `compute`.
#[derive(Copy, Clone, Debug)]
pub struct FuncPidController<F> {
    config: PidConfig<F>,
}

impl<F: Float> FuncPidController<F> {
    /// Creates a controller with the given configuration.
    pub fn new(config: PidConfig<F>) -> Self {
        FuncPidController { config }
    }

    /// The current configuration.
    pub fn config(&self) -> &PidConfig<F> {
        &self.config
    }

    /// Mutable access to the configuration, e.g. to retune gains mid-run.
    pub fn config_mut(&mut self) -> &mut PidConfig<F> {
        &mut self.config
    }

    /// Computes the saturated actuation command for a tracking `error` over a step of `dt`.
    ///
    /// The integral is advanced before the output is formed, and the derivative is the
    /// backward difference of the error. `dt` must be strictly positive; this is guaranteed by
    /// a validated time grid rather than checked per call.
    pub fn compute(&self, mut ctx: PidContext<F>, error: F, dt: F) -> (F, PidContext<F>) {
        debug_assert!(dt > F::zero(), "PID update requires a positive time step");

        ctx.integral = ctx.integral + error * dt;
        let derivative = (error - ctx.last_err) / dt;

        let output =
            self.config.kp * error + self.config.ki * ctx.integral + self.config.kd * derivative;
        let clamped_output = num_traits::clamp(output, self.config.output_min, self.config.output_max);

        ctx.last_err = error;
        (clamped_output, ctx)
    }

    /// Overrides the command issued in the current step with zero and scales the integral by
    /// `decay`.
    ///
    /// This is the anti-windup half of the level ceiling: called after [`compute`](Self::compute)
    /// in a step where the tank is at capacity, it bleeds off accumulated integral instead of
    /// discarding it. Repeated engagements compound the decay.
    pub fn apply_override(&self, mut ctx: PidContext<F>, decay: F) -> (F, PidContext<F>) {
        ctx.integral = ctx.integral * decay;
        (F::zero(), ctx)
    }
}

/// A stateful implementation of a PID (Proportional-Integral-Derivative) controller.
///
/// This implementation maintains its own [`PidContext`], so it can be used without passing a
/// context object. Numerically it is identical to [`FuncPidController`].
#[derive(Copy, Clone, Debug)]
pub struct PidController<F> {
    ctx: PidContext<F>,
    controller: FuncPidController<F>,
}

impl<F: Float> PidController<F> {
    /// Creates a controller with the given configuration.
    pub fn new(config: PidConfig<F>) -> Self {
        Self {
            ctx: PidContext::new(),
            controller: FuncPidController::new(config),
        }
    }

    /// The current configuration.
    pub fn config(&self) -> &PidConfig<F> {
        self.controller.config()
    }

    /// Mutable access to the configuration, e.g. to retune gains mid-run.
    pub fn config_mut(&mut self) -> &mut PidConfig<F> {
        self.controller.config_mut()
    }

    /// Read-only view of the working state.
    pub fn context(&self) -> &PidContext<F> {
        &self.ctx
    }

    /// See [`FuncPidController::compute`].
    pub fn update(&mut self, error: F, dt: F) -> F {
        let (output, ctx) = self.controller.compute(self.ctx, error, dt);
        self.ctx = ctx;
        output
    }

    /// See [`FuncPidController::apply_override`].
    pub fn apply_override(&mut self, decay: F) -> F {
        let (output, ctx) = self.controller.apply_override(self.ctx, decay);
        self.ctx = ctx;
        output
    }

    /// Zeroes the working state. Must be called before (re)starting a run.
    pub fn reset(&mut self) {
        self.ctx.reset();
    }
}
