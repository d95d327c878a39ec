use std::time::{Duration, Instant};

use crate::simulation::boundary::BoundaryPolicy;
use crate::simulation::forces::InverseSquare;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{Atom, Bounds, NVec2, Population};

const DOMAIN: f64 = 1000.0;

/// Helper to build a self-attracting population of size `n`
fn make_population(n: usize) -> Population {
    let atoms = (0..n)
        .map(|i| {
            let i_f = i as f64;
            // deterministic positions, no rand needed
            let x = NVec2::new(
                DOMAIN / 2.0 + (i_f * 0.37).sin() * DOMAIN / 4.0,
                DOMAIN / 2.0 + (i_f * 0.13).cos() * DOMAIN / 4.0,
            );
            Atom::new(x, -0.1, "white")
        })
        .collect();
    Population::new("bench", atoms).influenced_by(0)
}

fn make_scenario(n: usize, bounds: Bounds) -> Option<Scenario> {
    Scenario::new(vec![make_population(n)], bounds, Duration::from_secs_f64(1.0 / 15.0))
        .ok()
        .map(|s| s.with_policy(BoundaryPolicy::WallBounce))
}

/// Time one fixed step (forces + integration) for both force laws over growing N.
/// Output is CSV so it can be pasted straight into a spreadsheet.
pub fn bench_forces() {
    let Ok(bounds) = Bounds::new(DOMAIN, DOMAIN) else {
        return;
    };

    println!("N,inverse_distance_ms,inverse_square_ms");

    for n in [200, 400, 800, 1600, 3200] {
        // Small n: average over a few steps to smooth noise
        let steps = if n <= 800 { 5 } else { 1 };

        let (Some(mut direct), Some(square)) = (make_scenario(n, bounds), make_scenario(n, bounds)) else {
            continue;
        };
        let mut square = square.with_force_law(InverseSquare);

        // Warm up
        direct.step();
        square.step();

        let t0 = Instant::now();
        for _ in 0..steps {
            direct.step();
        }
        let ms_direct = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        let t1 = Instant::now();
        for _ in 0..steps {
            square.step();
        }
        let ms_square = t1.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{},{:.6},{:.6}", n, ms_direct, ms_square);
    }
}
