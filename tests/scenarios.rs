//! End-to-end scenarios: circular and eccentric Kepler drifts, a
//! hyperbolic flyby, BS-vs-Kepler agreement, large-argument Stumpff
//! values, and the ASCII codec.

use approx::assert_relative_eq;
use kepler_bs_core::codec::{c2fl, fl2c};
use kepler_bs_core::constants::SolverConstants;
use kepler_bs_core::force::{AuxFlags, BodySystem, ForceField};
use kepler_bs_core::kepler::drift_one;
use kepler_bs_core::stumpff::stumpff;
use kepler_bs_core::types::{Scalar, Vector};
use kepler_bs_core::BulirschStoerStep;
use std::f64::consts::TAU;

struct PointMass {
    mu: Scalar,
}

impl ForceField for PointMass {
    fn acceleration(
        &self,
        body: usize,
        positions: &[Vector],
        _velocities: &[Vector],
        _masses: &[Scalar],
        _t: Scalar,
        _aux: &AuxFlags,
    ) -> Vector {
        let r = positions[body] - positions[0];
        let r2 = r.length_squared();
        -r * (self.mu / (r2 * r2.sqrt()))
    }

    fn velocity_independent(&self) -> bool {
        true
    }
}

#[test]
fn s1_circular_orbit_returns_after_one_period() {
    let mu = 1.0;
    let mut x = Vector::new(1.0, 0.0, 0.0);
    let mut v = Vector::new(0.0, 1.0, 0.0);
    let constants = SolverConstants::default();

    drift_one(mu, &mut x, &mut v, TAU, &constants).unwrap();

    assert_relative_eq!(x.x, 1.0, epsilon = 1e-10);
    assert_relative_eq!(x.y, 0.0, epsilon = 1e-10);
    assert_relative_eq!(v.x, 0.0, epsilon = 1e-10);
    assert_relative_eq!(v.y, 1.0, epsilon = 1e-10);
}

#[test]
fn s2_eccentric_orbit_returns_after_one_period() {
    let mu = 1.0;
    let x0 = Vector::new(1.0, 0.0, 0.0);
    let v0 = Vector::new(0.0, 0.5, 0.0);
    let constants = SolverConstants::default();

    // Semi-major axis from vis-viva: alpha = 2*mu/r - v^2, a = mu/alpha.
    let r0 = x0.length();
    let alpha = 2.0 * mu / r0 - v0.dot(v0);
    let a = mu / alpha;
    let period = TAU * (a.powi(3) / mu).sqrt();

    let mut x = x0;
    let mut v = v0;
    drift_one(mu, &mut x, &mut v, period, &constants).unwrap();

    assert_relative_eq!(x.x, x0.x, epsilon = 1e-8);
    assert_relative_eq!(x.y, x0.y, epsilon = 1e-8);
    assert_relative_eq!(v.x, v0.x, epsilon = 1e-8);
    assert_relative_eq!(v.y, v0.y, epsilon = 1e-8);
}

#[test]
fn s3_hyperbolic_flyby_conserves_energy() {
    let mu = 1.0;
    let mut x = Vector::new(10.0, 0.0, 0.0);
    let mut v = Vector::new(0.0, 0.5, 0.0);
    let constants = SolverConstants::default();

    let alpha0 = 2.0 * mu / x.length() - v.dot(v);
    assert!(alpha0 < 0.0, "expected a hyperbolic orbit (alpha < 0)");

    let e0 = 0.5 * v.dot(v) - mu / x.length();
    drift_one(mu, &mut x, &mut v, 20.0, &constants).unwrap();
    let e1 = 0.5 * v.dot(v) - mu / x.length();

    assert_relative_eq!(e0, e1, epsilon = 1e-12);
}

#[test]
fn s4_bs_two_body_matches_kepler_drift_over_several_periods() {
    let mu = 1.0;
    let x0 = Vector::new(1.0, 0.0, 0.0);
    let v0 = Vector::new(0.0, 1.0, 0.0);
    let constants = SolverConstants::default();

    let periods = 3.0;
    let total_time = periods * TAU;

    let mut kepler_x = x0;
    let mut kepler_v = v0;
    drift_one(mu, &mut kepler_x, &mut kepler_v, total_time, &constants).unwrap();

    let mut system = BodySystem::new(vec![mu, 0.0], vec![Vector::ZERO, x0], vec![Vector::ZERO, v0]);
    let force = PointMass { mu };
    let aux = AuxFlags::default();
    let mut stepper = BulirschStoerStep::new(constants, 1);

    let mut t = 0.0;
    let mut h = 0.2;
    while t < total_time {
        let h_try = h.min(total_time - t);
        let outcome = stepper
            .step(&mut system, h_try, 1e-12, &force, t, &aux)
            .unwrap();
        t += outcome.hdid;
        h = outcome.h_next;
    }

    let bs_x = system.positions[1];
    let bs_v = system.velocities[1];

    assert_relative_eq!(bs_x.x, kepler_x.x, epsilon = 1e-8);
    assert_relative_eq!(bs_x.y, kepler_x.y, epsilon = 1e-8);
    assert_relative_eq!(bs_v.x, kepler_v.x, epsilon = 1e-8);
    assert_relative_eq!(bs_v.y, kepler_v.y, epsilon = 1e-8);
}

#[test]
fn s5_stumpff_large_argument_matches_textbook_values() {
    let x = 50.0;
    let s = x.sqrt();
    let [c0, c1, _c2, _c3] = stumpff(x);
    assert_relative_eq!(c0, s.cos(), epsilon = 1e-12);
    assert_relative_eq!(c1, s.sin() / s, epsilon = 1e-12);
}

#[test]
fn s6_ascii_codec_round_trips_large_magnitude() {
    let stable = fl2c(1.0);
    assert_relative_eq!(c2fl(&stable), 1.0, epsilon = 1e-9);

    let x = -3.14e15;
    let bytes = fl2c(x);
    let back = c2fl(&bytes);
    assert_relative_eq!(back, x, max_relative = 1e-4);
}
