//! PID level control of a tank from empty to the setpoint, printed as a decimated table.
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

use tank_pid::config::ClosedLoopConfig;
use tank_pid::metrics::LevelMetrics;

// Print one row per second of simulated time
const PRINT_EVERY: usize = 20;

fn main() {
    tracing_subscriber::fmt::init();

    // Pass a lower ceiling, e.g. `cargo run --example closed_loop -- 6`, to watch the override
    let mut config = ClosedLoopConfig::default();
    if let Some(max_level) = std::env::args().nth(1).and_then(|s| s.parse().ok()) {
        config.tank.max_level = max_level;
    }

    let mut sim = match config.build() {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Invalid scenario: {e}");
            std::process::exit(1);
        }
    };
    let trajectory = sim.run();

    println!("{:>8} {:>10} {:>10} {:>10}", "t", "h", "Qin", "error");
    for sample in trajectory.samples().step_by(PRINT_EVERY) {
        println!(
            "{:>8.2} {:>10.4} {:>10.4} {:>10.4}{}",
            sample.time,
            sample.level,
            sample.inflow,
            sample.monitored.value(),
            if sample.override_engaged { "  override" } else { "" }
        );
    }

    if let Some(metrics) = LevelMetrics::compute(trajectory, config.setpoint, 0.01, 200) {
        println!();
        println!("peak level    {:.4} at t = {:.2}", metrics.peak_level, metrics.peak_time);
        println!("final level   {:.4}", metrics.final_level);
        match metrics.settling_time {
            Some(t) => println!("settled (1%)  t = {t:.2}"),
            None => println!("settled (1%)  never"),
        }
        println!("overrides     {}", metrics.override_count);
    }
}
