//! Benchmarks for the controller update and full tank runs
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

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tank_pid::config::{ClosedLoopConfig, OpenLoopConfig};
use tank_pid::flow::LinearOutlet;
use tank_pid::integrator::step_level;
use tank_pid::pid;
use tank_pid::tank::{Tank, TankParams};

fn make_config() -> pid::PidConfig<f64> {
    pid::PidConfigBuilder::default()
        .kp(183.0)
        .ki(317.0)
        .kd(10.0)
        .output_limits(0.0, 20.0)
        .build()
        .unwrap()
}

fn bench_func_pid(c: &mut Criterion) {
    let pid = pid::FuncPidController::new(make_config());
    let mut ctx = pid::PidContext::new();
    let mut error = 5.0;

    c.bench_function("functional PID", |b| {
        b.iter(|| {
            let (output, next) = pid.compute(ctx, black_box(error), black_box(0.05));
            ctx = next;
            error -= 0.0001; // prevent constant inputs
            black_box(output);
        });
    });
}

fn bench_stateful_pid(c: &mut Criterion) {
    let mut pid = pid::PidController::new(make_config());
    let mut error = 5.0;

    c.bench_function("stateful PID", |b| {
        b.iter(|| {
            let output = pid.update(black_box(error), black_box(0.05));
            error -= 0.0001;
            black_box(output);
        });
    });
}

fn bench_rk4_step(c: &mut Criterion) {
    let tank = Tank::new(TankParams::new(5.0, 10.0).unwrap(), LinearOutlet::new(1.0)).unwrap();

    c.bench_function("RK4 level step", |b| {
        b.iter(|| step_level(&tank, 0.0, black_box(2.5), black_box(10.0), 0.05));
    });
}

/// A full 2001-point closed-loop run, including series allocation
fn bench_closed_loop_run(c: &mut Criterion) {
    let config = ClosedLoopConfig::default();

    c.bench_function("closed-loop run", |b| {
        b.iter(|| {
            let mut sim = config.build().unwrap();
            black_box(sim.run().len());
        });
    });
}

fn bench_open_loop_run(c: &mut Criterion) {
    let config = OpenLoopConfig::default();

    c.bench_function("open-loop run", |b| {
        b.iter(|| {
            let mut sim = config.build().unwrap();
            black_box(sim.run().len());
        });
    });
}

criterion_group!(
    benches,
    bench_func_pid,
    bench_stateful_pid,
    bench_rk4_step,
    bench_closed_loop_run,
    bench_open_loop_run,
);
criterion_main!(benches);
