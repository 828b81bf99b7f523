//! Modified-midpoint substep integrators: the two kernels a
//! `BulirschStoerStep` extrapolates to zero step size.
//!
//! `mdt_bs1` is the general Gragg/modified-midpoint method (Stoer & Bulirsch
//! §II.9), run on the combined state `(x, v)` so it handles velocity-
//! dependent forces. `mdt_bs2` is the cheaper Stoermer-rule variant for
//! forces that depend on position only, which needs half as many force
//! evaluations per substep.

use crate::force::{AuxFlags, BodySystem, ForceField};
use crate::types::{Scalar, Vector};

fn full_state(
    center: (Vector, Vector),
    moving_x: &[Vector],
    moving_v: &[Vector],
) -> (Vec<Vector>, Vec<Vector>) {
    let mut xs = Vec::with_capacity(moving_x.len() + 1);
    xs.push(center.0);
    xs.extend_from_slice(moving_x);
    let mut vs = Vec::with_capacity(moving_v.len() + 1);
    vs.push(center.1);
    vs.extend_from_slice(moving_v);
    (xs, vs)
}

fn accelerations(
    xs: &[Vector],
    vs: &[Vector],
    masses: &[Scalar],
    t: Scalar,
    force: &dyn ForceField,
    aux: &AuxFlags,
) -> Vec<Vector> {
    (1..xs.len())
        .map(|k| force.acceleration(k, xs, vs, masses, t, aux))
        .collect()
}

/// General modified-midpoint substep (BS1): `2n` half-substeps of size
/// `h = h0/(2n)`, two interleaved position/velocity sequences (the
/// reference's "two parallel sequences"), final state the Gragg-smoothed
/// average of both sequences plus a half-step correction using the last
/// computed acceleration.
///
/// `a0` is the acceleration on each moving body (indices `1..system.len()`)
/// at the start of the step, evaluated once by the caller and reused here.
pub fn mdt_bs1(
    system: &BodySystem,
    a0: &[Vector],
    h0: Scalar,
    n: usize,
    force: &dyn ForceField,
    t0: Scalar,
    aux: &AuxFlags,
) -> (Vec<Vector>, Vec<Vector>) {
    let nstep = 2 * n;
    let h = h0 / nstep as Scalar;
    let center = (system.positions[0], system.velocities[0]);
    let x0 = &system.positions[1..];
    let v0 = &system.velocities[1..];
    let n_moving = x0.len();

    let mut xm = x0.to_vec();
    let mut vm = v0.to_vec();
    let mut xn: Vec<Vector> = (0..n_moving).map(|k| x0[k] + h * v0[k]).collect();
    let mut vn: Vec<Vector> = (0..n_moving).map(|k| v0[k] + h * a0[k]).collect();

    let mut t = t0 + h;
    let (xs, vs) = full_state(center, &xn, &vn);
    let mut acc = accelerations(&xs, &vs, &system.masses, t, force, aux);

    let h2 = 2.0 * h;
    for _ in 2..=nstep {
        let xt: Vec<Vector> = (0..n_moving).map(|k| xm[k] + h2 * vn[k]).collect();
        let vt: Vec<Vector> = (0..n_moving).map(|k| vm[k] + h2 * acc[k]).collect();
        xm = xn;
        vm = vn;
        xn = xt;
        vn = vt;
        t += h;
        let (xs, vs) = full_state(center, &xn, &vn);
        acc = accelerations(&xs, &vs, &system.masses, t, force, aux);
    }

    let x_end: Vec<Vector> = (0..n_moving)
        .map(|k| 0.5 * (xm[k] + xn[k] + h * vn[k]))
        .collect();
    let v_end: Vec<Vector> = (0..n_moving)
        .map(|k| 0.5 * (vm[k] + vn[k] + h * acc[k]))
        .collect();
    (x_end, v_end)
}

/// Conservative-force modified-midpoint substep (BS2): `n` full substeps of
/// size `h = h0/n`, accumulating running sums of acceleration (`B`) and
/// their partial sums (`C`), with a final correction term added outside the
/// recursion (Stoermer's rule). Requires `force.velocity_independent()`;
/// always passes the *initial* `v0` to `force`, never an updated velocity.
pub fn mdt_bs2(
    system: &BodySystem,
    a0: &[Vector],
    h0: Scalar,
    n: usize,
    force: &dyn ForceField,
    t0: Scalar,
    aux: &AuxFlags,
) -> (Vec<Vector>, Vec<Vector>) {
    debug_assert!(force.velocity_independent());

    let h = h0 / n as Scalar;
    let center = (system.positions[0], system.velocities[0]);
    let x0 = &system.positions[1..];
    let v0 = &system.velocities[1..];
    let n_moving = x0.len();

    let mut b = vec![Vector::ZERO; n_moving];
    let mut c = vec![Vector::ZERO; n_moving];
    let mut x_j = x0.to_vec();
    let mut a_j = a0.to_vec();

    for j in 1..=n {
        let t = t0 + j as Scalar * h;
        x_j = (0..n_moving)
            .map(|k| x0[k] + j as Scalar * h * v0[k] + h * h * (c[k] + 0.5 * a0[k]))
            .collect();
        let (xs, vs) = full_state(center, &x_j, v0);
        a_j = accelerations(&xs, &vs, &system.masses, t, force, aux);
        for k in 0..n_moving {
            b[k] += a_j[k];
            c[k] += b[k];
        }
    }

    let x_end: Vec<Vector> = (0..n_moving)
        .map(|k| x0[k] + n as Scalar * h * v0[k] + h * h * c[k] + 0.5 * h * h * a0[k])
        .collect();
    let v_end: Vec<Vector> = (0..n_moving)
        .map(|k| v0[k] + h * b[k] + 0.5 * h * a_j[k])
        .collect();
    (x_end, v_end)
}
