//! Randomized invariant check over the metrics and status pipeline.
//!
//! SEED and CASES control the run; exits non-zero on the first violation.

use std::env;
use std::process;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use funnelboard::benchmark::Benchmark;
use funnelboard::funnel::FunnelCounters;
use funnelboard::verify::check_case;

fn counter(rng: &mut StdRng) -> u64 {
    // bias toward zero so the guards get exercised
    match rng.gen_range(0..10) {
        0..=2 => 0,
        3..=7 => rng.gen_range(1..10_000),
        _ => rng.gen_range(1..u64::MAX / 2),
    }
}

fn main() {
    let seed = env::var("SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(42u64);
    let cases = env::var("CASES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10_000u64);
    let mut rng = StdRng::seed_from_u64(seed);

    for i in 0..cases {
        let counters = FunnelCounters::new([
            counter(&mut rng),
            counter(&mut rng),
            counter(&mut rng),
            counter(&mut rng),
            counter(&mut rng),
            counter(&mut rng),
        ]);
        let min = rng.gen_range(-50.0..150.0);
        let benchmark = if rng.gen_bool(0.5) {
            Benchmark::floor(min)
        } else {
            Benchmark::range(min, min + rng.gen_range(0.0..50.0))
        };
        let a = rng.gen_range(-10.0..300.0);
        let b = rng.gen_range(-10.0..300.0);

        if let Err(v) = check_case(&counters, &benchmark, a, b) {
            eprintln!("case {} (seed {}): {}", i, seed, v.msg);
            eprintln!("  counters: {:?}", counters);
            eprintln!("  benchmark: {:?}", benchmark);
            process::exit(1);
        }
    }
    println!("{} cases ok (seed {})", cases, seed);
}
