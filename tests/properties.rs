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

use proptest::prelude::*;

use tank_pid::config::{ClosedLoopConfig, OpenLoopConfig, OutputLimits, PidGains};
use tank_pid::flow::{ConstantInflow, OutletModel, ValveRampOutlet};
use tank_pid::time::TimeGrid;

fn closed_loop_config() -> impl Strategy<Value = ClosedLoopConfig> {
    (
        (0.5f64..10.0, 1.0f64..12.0, 0.0f64..12.0),
        (0.0f64..300.0, 0.0f64..400.0, 0.0f64..20.0),
        (0.0f64..5.0, 5.0f64..30.0),
        (0.0f64..3.0, 0.01f64..0.2, 0.0f64..4.0),
    )
        .prop_map(
            |((area, max_level, setpoint), (kp, ki, kd), (umin, umax), (k_out, dt, h0))| {
                ClosedLoopConfig {
                    tank: tank_pid::tank::TankParams { area, max_level },
                    setpoint,
                    gains: PidGains { kp, ki, kd },
                    output_limits: OutputLimits {
                        min: umin,
                        max: umax,
                    },
                    outlet_coefficient: k_out,
                    grid: TimeGrid {
                        t0: 0.0,
                        tf: 20.0,
                        dt,
                    },
                    initial_level: h0,
                    ..ClosedLoopConfig::default()
                }
            },
        )
}

fn open_loop_config() -> impl Strategy<Value = OpenLoopConfig> {
    (
        0.1f64..5.0,
        -5.0f64..10.0,
        (0.0f64..4.0, 0.0f64..10.0, 0.0f64..5.0),
        0.0f64..5.0,
    )
        .prop_map(|(area, inflow, (k_out, open_time, ramp_duration), h0)| OpenLoopConfig {
            tank: tank_pid::tank::TankParams {
                area,
                max_level: 10.0,
            },
            inflow: ConstantInflow(inflow),
            outlet: OutletModel::ValveRamp(ValveRampOutlet {
                k_out,
                open_time,
                ramp_duration,
            }),
            grid: TimeGrid {
                t0: 0.0,
                tf: 20.0,
                dt: 0.05,
            },
            initial_level: h0,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn closed_loop_level_is_never_negative(config in closed_loop_config()) {
        let mut sim = config.build().unwrap();
        let trajectory = sim.run();
        prop_assert!(trajectory.level().iter().all(|&h| h >= 0.0));
    }

    #[test]
    fn closed_loop_command_respects_limits_or_override(config in closed_loop_config()) {
        let mut sim = config.build().unwrap();
        let trajectory = sim.run();
        let limits = config.output_limits;

        for sample in trajectory.samples().take(trajectory.len() - 1) {
            if sample.level >= config.tank.max_level {
                prop_assert!(sample.override_engaged);
                prop_assert_eq!(sample.inflow, 0.0);
            } else {
                prop_assert!(!sample.override_engaged);
                prop_assert!(sample.inflow >= limits.min && sample.inflow <= limits.max);
            }
        }
    }

    #[test]
    fn closed_loop_runs_are_deterministic(config in closed_loop_config()) {
        let first = config.build().unwrap().run().clone();
        let second = config.build().unwrap().run().clone();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn open_loop_level_is_never_negative(config in open_loop_config()) {
        let mut sim = config.build().unwrap();
        let trajectory = sim.run();
        prop_assert!(trajectory.level().iter().all(|&h| h >= 0.0));
        prop_assert!(trajectory.overrides().iter().all(|&o| !o));
    }
}
