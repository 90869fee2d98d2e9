//! Open-loop filling of a tank whose outlet valve opens gradually, compared with the
//! closed-form response of the same tank with the valve always open.
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

use tank_pid::config::OpenLoopConfig;
use tank_pid::flow::{linear_tank_response, OutletModel, ValveRampOutlet};
use tank_pid::time::TimeGrid;

const PRINT_EVERY: usize = 20;

fn main() {
    tracing_subscriber::fmt::init();

    let valve = ValveRampOutlet {
        k_out: 2.0,
        open_time: 0.5,
        ramp_duration: 1.5,
    };
    let config = OpenLoopConfig {
        outlet: OutletModel::ValveRamp(valve),
        grid: TimeGrid {
            t0: 0.0,
            tf: 5.0,
            dt: 0.05,
        },
        ..OpenLoopConfig::default()
    };

    let mut sim = match config.build() {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Invalid scenario: {e}");
            std::process::exit(1);
        }
    };
    let trajectory = sim.run();
    let Some(outflow) = trajectory.outflow() else {
        return;
    };

    println!(
        "{:>6} {:>8} {:>8} {:>8} {:>8} {:>10}",
        "t", "h", "Qin", "Qout", "opening", "h (open)"
    );
    for (i, sample) in trajectory.samples().enumerate().step_by(PRINT_EVERY) {
        let always_open =
            linear_tank_response(config.tank.area, config.inflow.0, valve.k_out, 0.0, sample.time);
        println!(
            "{:>6.2} {:>8.4} {:>8.4} {:>8.4} {:>8.2} {:>10.4}",
            sample.time,
            sample.level,
            sample.inflow,
            outflow[i],
            valve.opening(sample.time),
            always_open
        );
    }
}
