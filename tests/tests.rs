use std::time::Duration;

use atomlife::simulation::forces::positions;
use atomlife::{apply_forces, integrate, net_force};
use atomlife::{Atom, BoundaryPolicy, Bounds, Command, FixedTimestep, NVec2, Population, Scenario, ScenarioConfig};
use atomlife::{ConfigError, InverseDistance, InverseSquare};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// 500 x 500 domain used by most tests
pub fn domain() -> Bounds {
    Bounds::new(500.0, 500.0).unwrap()
}

pub fn atom_at(x: f64, y: f64, attraction: f64) -> Atom {
    Atom::new(NVec2::new(x, y), attraction, "red")
}

pub fn moving_atom(x: f64, y: f64, vx: f64, vy: f64) -> Atom {
    let mut a = atom_at(x, y, 0.0);
    a.v = NVec2::new(vx, vy);
    a
}

pub fn tick() -> Duration {
    Duration::from_secs_f64(1.0 / 15.0)
}

/// Two self-attracting atoms mirrored about x = 250
pub fn mirrored_pair() -> Scenario {
    let pop = Population::new("pair", vec![atom_at(240.0, 250.0, -0.2), atom_at(260.0, 250.0, -0.2)]).influenced_by(0);
    Scenario::new(vec![pop], domain(), tick()).unwrap()
}

const TWO_POPULATIONS: &str = r#"
domain: { width: 500.0, height: 500.0 }
engine:
  fixed_tick_rate: 15.0
  boundary_policy: wall_bounce
populations:
  - name: b
    count: 10
    attraction: -0.2
    color: red
    influenced_by: [b]
  - name: a
    count: 10
    attraction: -0.1
    color: green
    influenced_by: [b]
"#;

pub fn two_population_config() -> ScenarioConfig {
    ScenarioConfig::from_yaml_str(TWO_POPULATIONS).unwrap()
}

pub fn seeded(cfg: &ScenarioConfig, seed: u64) -> Scenario {
    let mut rng = StdRng::seed_from_u64(seed);
    Scenario::build_scenario_with_rng(cfg, &mut rng).unwrap()
}

fn all_positions(s: &Scenario) -> Vec<(NVec2, NVec2, NVec2)> {
    s.populations
        .iter()
        .flat_map(|p| p.atoms.iter())
        .map(|a| (a.x, a.v, a.x_prev))
        .collect()
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

// ==================================================================================
// Force tests
// ==================================================================================

#[test]
fn force_pulls_toward_influencer_with_constant_magnitude() {
    let mut targets = vec![atom_at(0.0, 0.0, -0.2)];
    apply_forces(&InverseDistance, &mut targets, &[NVec2::new(3.0, 4.0)], 1.0);

    // offset (-3,-4), dist 5, coefficient -0.04 => force (0.12, 0.16), halved into velocity
    assert_close(targets[0].v.x, 0.06);
    assert_close(targets[0].v.y, 0.08);

    // inverse-distance law: |force| = |attraction| at any distance
    let near = net_force(&InverseDistance, NVec2::zeros(), -0.2, &[NVec2::new(1.0, 0.0)]);
    let far = net_force(&InverseDistance, NVec2::zeros(), -0.2, &[NVec2::new(100.0, 0.0)]);
    assert_close(near.norm(), 0.2);
    assert_close(far.norm(), 0.2);
}

#[test]
fn positive_attraction_repels() {
    let f = net_force(&InverseDistance, NVec2::zeros(), 0.5, &[NVec2::new(2.0, 0.0)]);
    assert!(f.x < 0.0, "expected push away from influencer, got {:?}", f);
}

#[test]
fn inverse_square_decays_with_distance() {
    let f = net_force(&InverseSquare, NVec2::zeros(), -0.2, &[NVec2::new(3.0, 4.0)]);
    assert_close(f.x, 0.024);
    assert_close(f.y, 0.032);

    let near = net_force(&InverseSquare, NVec2::zeros(), -1.0, &[NVec2::new(1.0, 0.0)]);
    let far = net_force(&InverseSquare, NVec2::zeros(), -1.0, &[NVec2::new(2.0, 0.0)]);
    assert_close(near.norm() / far.norm(), 2.0);
}

#[test]
fn self_term_is_neutral() {
    let atoms = vec![atom_at(10.0, 20.0, -0.3), atom_at(40.0, 60.0, -0.1)];

    let mut with_self = atoms.clone();
    let all = positions(&atoms);
    apply_forces(&InverseDistance, &mut with_self[..1], &all, 0.1);

    let mut without_self = atoms.clone();
    apply_forces(&InverseDistance, &mut without_self[..1], &all[1..], 0.1);

    assert_eq!(with_self[0].v, without_self[0].v);
}

#[test]
fn coincident_atoms_feel_no_force() {
    let f = net_force(&InverseDistance, NVec2::new(5.0, 5.0), -1.0, &[NVec2::new(5.0, 5.0)]);
    assert_eq!(f, NVec2::zeros());
}

#[test]
fn forces_leave_positions_untouched() {
    let mut targets = vec![atom_at(1.0, 1.0, -0.2), atom_at(9.0, 3.0, -0.2)];
    let before = positions(&targets);
    let snapshot = before.clone();
    apply_forces(&InverseDistance, &mut targets, &snapshot, 1.0);
    assert_eq!(positions(&targets), before);
}

#[test]
fn zero_force_symmetry() {
    let mut s = mirrored_pair();
    for _ in 0..50 {
        s.step();
    }
    let a = &s.populations[0].atoms[0];
    let b = &s.populations[0].atoms[1];

    assert_close(a.x.x - 240.0, -(b.x.x - 260.0));
    assert_close(a.x.x - 250.0, -(b.x.x - 250.0));
    assert_close(a.x.y, b.x.y);
    assert_close(a.v.x, -b.v.x);
}

#[test]
fn cross_influence_is_asymmetric() {
    let target = Population::new("a", vec![atom_at(100.0, 100.0, -0.2)]).influenced_by(1);
    let source = Population::new("b", vec![atom_at(200.0, 100.0, -0.2)]);
    let mut s = Scenario::new(vec![target, source], domain(), tick()).unwrap();
    s.step();

    assert!(s.populations[0].atoms[0].v.x > 0.0, "a should be pulled toward b");
    assert_eq!(s.populations[1].atoms[0].v, NVec2::zeros());
    assert_eq!(s.populations[1].atoms[0].x, NVec2::new(200.0, 100.0));
}

// ==================================================================================
// Boundary tests
// ==================================================================================

#[test]
fn interior_points_are_untouched_by_every_policy() {
    let b = Bounds::new(100.0, 100.0).unwrap();
    let samples = [
        moving_atom(50.0, 50.0, 3.0, -2.0),
        moving_atom(0.0, 100.0, -1.0, 1.0),
        moving_atom(100.0, 0.0, 1.0, -1.0),
        moving_atom(0.5, 99.5, -4.0, 4.0),
    ];
    for policy in BoundaryPolicy::ALL {
        for original in &samples {
            let mut a = original.clone();
            policy.apply(&mut a, &b);
            assert_eq!(a.x, original.x, "{policy} moved an interior atom");
            assert_eq!(a.v, original.v, "{policy} changed an interior atom's velocity");
        }
    }
}

#[test]
fn wrap_around_adds_the_extent() {
    let b = Bounds::new(100.0, 100.0).unwrap();
    let mut low = moving_atom(-5.0, 50.0, -1.0, 0.0);
    let mut high = moving_atom(105.0, 50.0, 1.0, 0.0);
    BoundaryPolicy::WrapAround.apply(&mut low, &b);
    BoundaryPolicy::WrapAround.apply(&mut high, &b);

    assert_eq!(low.x.x, 95.0);
    assert_eq!(high.x.x, 5.0);
    assert_eq!(low.v.x, -1.0);

    let mut corner = moving_atom(-5.0, 110.0, 0.0, 0.0);
    BoundaryPolicy::WrapAround.apply(&mut corner, &b);
    assert_eq!(corner.x, NVec2::new(95.0, 10.0));
}

#[test]
fn clamp_to_boundary_teleports_to_far_edge() {
    let b = Bounds::new(100.0, 100.0).unwrap();
    let mut low = moving_atom(-5.0, 50.0, -1.0, 0.0);
    let mut high = moving_atom(105.0, 50.0, 1.0, 0.0);
    BoundaryPolicy::WraparoundClampToBoundary.apply(&mut low, &b);
    BoundaryPolicy::WraparoundClampToBoundary.apply(&mut high, &b);

    assert_eq!(low.x.x, 100.0);
    assert_eq!(high.x.x, 0.0);
    assert_eq!(high.v.x, 1.0);

    let mut wrapped = moving_atom(-5.0, 50.0, 0.0, 0.0);
    BoundaryPolicy::WrapAround.apply(&mut wrapped, &b);
    assert_ne!(wrapped.x, low.x);
}

#[test]
fn wall_bounce_forces_velocity_sign() {
    let b = Bounds::new(100.0, 100.0).unwrap();

    let mut right = moving_atom(105.0, 50.0, 3.0, 0.0);
    BoundaryPolicy::WallBounce.apply(&mut right, &b);
    assert_eq!(right.v.x, -3.0);
    assert_eq!(right.x.x, 105.0, "position overshoot is not corrected");

    // already heading back in: sign stays negative
    let mut returning = moving_atom(105.0, 50.0, -3.0, 0.0);
    BoundaryPolicy::WallBounce.apply(&mut returning, &b);
    assert_eq!(returning.v.x, -3.0);

    let mut top = moving_atom(50.0, -1.0, 0.0, -2.0);
    BoundaryPolicy::WallBounce.apply(&mut top, &b);
    assert_eq!(top.v.y, 2.0);
}

#[test]
fn negate_velocity_flips_unconditionally() {
    let b = Bounds::new(100.0, 100.0).unwrap();
    let mut a = moving_atom(-1.0, 101.0, 2.0, -4.0);
    BoundaryPolicy::WallBounceNegateVelocity.apply(&mut a, &b);
    assert_eq!(a.v, NVec2::new(-2.0, 4.0));
}

#[test]
fn policy_selection_cycles_and_parses() {
    assert_eq!(BoundaryPolicy::from_index(0), BoundaryPolicy::WallBounce);
    assert_eq!(BoundaryPolicy::from_index(4), BoundaryPolicy::WallBounce);
    assert_eq!(BoundaryPolicy::WraparoundClampToBoundary.next(), BoundaryPolicy::WallBounce);

    for p in BoundaryPolicy::ALL {
        assert_eq!(p.name().parse::<BoundaryPolicy>().unwrap(), p);
    }
    assert!(matches!(
        "bounce".parse::<BoundaryPolicy>(),
        Err(ConfigError::UnknownBoundaryPolicy(_))
    ));
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn integrate_snapshots_then_moves_then_corrects() {
    let b = Bounds::new(100.0, 100.0).unwrap();
    let mut atoms = vec![moving_atom(99.0, 50.0, 3.0, 0.0)];
    integrate(&mut atoms, &b, BoundaryPolicy::WrapAround);

    assert_eq!(atoms[0].x_prev, NVec2::new(99.0, 50.0));
    assert_eq!(atoms[0].x, NVec2::new(2.0, 50.0));
}

#[test]
fn timestep_counts_ticks_regardless_of_chunking() {
    let t = Duration::from_millis(50);
    let mut once = FixedTimestep::new(t, None).unwrap();
    assert_eq!(once.accumulate(t * 3), 3);

    let mut chunked = FixedTimestep::new(t, None).unwrap();
    let steps: usize = (0..6).map(|_| chunked.accumulate(t / 2)).sum();
    assert_eq!(steps, 3);
    assert_eq!(once.overstep(), chunked.overstep());
    assert_eq!(chunked.alpha(), 0.0);
}

#[test]
fn timestep_alpha_is_fraction_of_a_tick() {
    let t = Duration::from_millis(100);
    let mut ts = FixedTimestep::new(t, None).unwrap();
    assert_eq!(ts.accumulate(Duration::from_millis(250)), 2);
    assert_close(ts.alpha(), 0.5);
    assert!(ts.alpha() < 1.0);
}

#[test]
fn catch_up_cap_drops_whole_ticks() {
    let t = Duration::from_millis(100);
    let mut ts = FixedTimestep::new(t, Some(4)).unwrap();
    assert_eq!(ts.accumulate(Duration::from_millis(1030)), 4);
    assert_eq!(ts.overstep(), Duration::from_millis(30));

    let mut unbounded = FixedTimestep::new(t, None).unwrap();
    assert_eq!(unbounded.accumulate(Duration::from_millis(1030)), 10);
}

#[test]
fn degenerate_timesteps_rejected() {
    let t = Duration::from_millis(100);
    assert!(matches!(FixedTimestep::new(Duration::ZERO, None), Err(ConfigError::InvalidTimestep(_))));
    assert!(matches!(FixedTimestep::new(Duration::ZERO, Some(4)), Err(ConfigError::InvalidTimestep(_))));
    assert!(matches!(FixedTimestep::new(t, Some(0)), Err(ConfigError::InvalidTimestep(_))));
    assert!(matches!(mirrored_pair().with_max_catch_up(Some(0)), Err(ConfigError::InvalidTimestep(_))));

    let mut capped = mirrored_pair().with_max_catch_up(Some(1)).unwrap();
    let tick = capped.timestep().timestep();
    assert_eq!(capped.tick(tick * 3), 1);
}

#[test]
fn tick_rate_must_give_a_representable_tick() {
    assert_eq!(FixedTimestep::duration_from_rate(4.0).unwrap(), Duration::from_millis(250));
    for rate in [0.0, -1.0, f64::NAN, f64::INFINITY, 1.0e-20] {
        assert!(matches!(FixedTimestep::duration_from_rate(rate), Err(ConfigError::InvalidTimestep(_))));
    }
}

#[test]
fn fixed_tick_determinism() {
    let cfg = two_population_config();
    let mut once = seeded(&cfg, 9);
    let mut chunked = seeded(&cfg, 9);
    let t = once.timestep().timestep();

    assert_eq!(once.tick(t * 3), 3);
    let steps: usize = (0..3).map(|_| chunked.tick(t)).sum();
    assert_eq!(steps, 3);

    assert_eq!(all_positions(&once), all_positions(&chunked));
}

#[test]
fn interpolation_lies_on_segment() {
    let mut s = mirrored_pair();
    let t = s.timestep().timestep();
    s.tick(t * 4);

    // exact tick boundary: display equals previous
    for r in s.snapshot() {
        assert_eq!(r.position, r.previous);
    }

    s.tick(t * 3 / 4);
    let alpha = s.alpha();
    assert!((0.0..1.0).contains(&alpha));
    assert!(alpha > 0.0);
    for r in s.snapshot() {
        let expected = r.previous + (r.current - r.previous) * alpha;
        assert!((r.position - expected).norm() < 1e-9);
    }
}

#[test]
fn snapshot_is_read_only() {
    let mut s = mirrored_pair();
    let t = s.timestep().timestep();
    s.tick(t + t / 2);
    let before = all_positions(&s);
    let _ = s.snapshot();
    assert_eq!(all_positions(&s), before);
}

// ==================================================================================
// Driver tests
// ==================================================================================

#[test]
fn build_from_config_is_reproducible_and_spawns_in_area() {
    let cfg = two_population_config();
    let a = seeded(&cfg, 42);
    let b = seeded(&cfg, 42);
    assert_eq!(all_positions(&a), all_positions(&b));
    assert_eq!(a.atom_count(), 20);

    for atom in a.populations.iter().flat_map(|p| p.atoms.iter()) {
        assert!((125.0..=375.0).contains(&atom.x.x));
        assert!((125.0..=375.0).contains(&atom.x.y));
        assert_eq!(atom.x_prev, atom.x);
        assert_eq!(atom.v, NVec2::zeros());
    }
    assert_eq!(a.populations[0].atoms[0].attraction, -0.2);
    assert_eq!(a.populations[1].atoms[0].color, "green");
}

#[test]
fn commands_drive_policy_and_stop() {
    let mut s = mirrored_pair();
    assert_eq!(s.boundary_policy(), BoundaryPolicy::WallBounce);

    assert!(s.handle(Command::CycleBoundary));
    assert_eq!(s.boundary_policy(), BoundaryPolicy::WallBounceNegateVelocity);
    for _ in 0..3 {
        s.handle(Command::CycleBoundary);
    }
    assert_eq!(s.boundary_policy(), BoundaryPolicy::WallBounce);

    assert!(s.handle(Command::DumpState));
    assert!(!s.handle(Command::Stop));
    assert!(!s.is_running());
}

#[test]
fn invalid_construction_fails_fast() {
    assert!(matches!(Bounds::new(0.0, 10.0), Err(ConfigError::InvalidBounds(_))));
    assert!(matches!(Bounds::new(10.0, f64::NAN), Err(ConfigError::InvalidBounds(_))));

    let dangling = Population::new("a", vec![atom_at(1.0, 1.0, -0.1)]).influenced_by(3);
    assert!(matches!(
        Scenario::new(vec![dangling], domain(), tick()),
        Err(ConfigError::UnknownInfluencer { .. })
    ));
    assert!(matches!(Scenario::new(vec![], domain(), tick()), Err(ConfigError::Empty)));
    let lone = Population::new("a", vec![atom_at(1.0, 1.0, -0.1)]);
    assert!(matches!(
        Scenario::new(vec![lone], domain(), Duration::ZERO),
        Err(ConfigError::InvalidTimestep(_))
    ));
}

#[test]
fn stats_track_steps() {
    let mut s = mirrored_pair();
    let t = s.timestep().timestep();
    s.tick(t * 2);
    s.tick(t / 2);
    assert_eq!(s.steps(), 2);
    assert_eq!(s.stats().value("Steps"), Some(2));
    assert_eq!(s.stats().value("Ticks"), Some(2));
    assert_eq!(s.stats().value("Frame Rate"), Some(2 * 15));
}

#[test]
fn tiny_tick_rate_fails_to_build() {
    let mut cfg = two_population_config();
    cfg.engine.fixed_tick_rate = 1.0e-20;
    let mut rng = StdRng::seed_from_u64(1);
    assert!(matches!(
        Scenario::build_scenario_with_rng(&cfg, &mut rng),
        Err(ConfigError::InvalidTimestep(_))
    ));
}

#[test]
fn end_to_end_two_populations_stay_in_domain() {
    let cfg = two_population_config();
    let mut s = seeded(&cfg, 42);
    let t = s.timestep().timestep();

    for _ in 0..100 {
        assert_eq!(s.tick(t), 1);
    }

    assert_eq!(s.steps(), 100);
    assert_eq!(s.out_of_bounds(), 0);
    for atom in s.populations.iter().flat_map(|p| p.atoms.iter()) {
        assert!(s.bounds().contains(&atom.x), "escaped: {:?}", atom.x);
    }
    // the chasing population moved
    assert!(s.populations[1].mean_speed() > 0.0);
}
