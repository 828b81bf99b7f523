//! Small-increment Kepler difference solver (`kepmd`).
//!
//! Solves `x - ea*sin(x) + es*(1 - cos(x)) = dm` for small `dm` and small
//! eccentricity, the fast path used when a step covers only a tiny fraction
//! of a near-circular orbit's period. Does not check its own residual —
//! the caller (`drift_dan`) verifies convergence and falls back to the
//! universal-variable solver if it's not good enough.

use crate::types::Scalar;

// Coefficients of the degree-9 odd polynomial approximation to sin(x) used
// for the initial sin/cos evaluation, per Danby's tabulation.
const A0: Scalar = 39_916_800.0;
const A1: Scalar = 6_652_800.0;
const A2: Scalar = 332_640.0;
const A3: Scalar = 7_920.0;
const A4: Scalar = 110.0;

/// Result of the small-increment solve: the converged angle `x` and its
/// sine/cosine.
#[derive(Clone, Copy, Debug)]
pub struct KepmdSolution {
    pub x: Scalar,
    pub s: Scalar,
    pub c: Scalar,
}

/// Solve `x - ea*sin(x) + es*(1 - cos(x)) = dm` for `x`.
pub fn kepmd(dm: Scalar, ea: Scalar, es: Scalar) -> KepmdSolution {
    let f1 = 1.0 / (1.0 - ea);
    let q = f1 * dm;
    let f2 = es * es * f1 - ea / 3.0;
    let mut x = q * (1.0 - 0.5 * f1 * q * (es - q * f2));

    let y = x * x;
    let mut s = x * (A0 - y * (A1 - y * (A2 - y * (A3 - y * (A4 - y))))) / A0;
    let mut c = (1.0 - s * s).sqrt();

    let f = x - ea * s + es * (1.0 - c) - dm;
    let fp = 1.0 - ea * c + es * s;
    let fpp = ea * s + es * c;
    let fppp = ea * c - es * s;

    let mut dx = -f / fp;
    dx = -f / (fp + dx * fpp / 2.0);
    dx = -f / (fp + dx * fpp / 2.0 + dx * dx * fppp / 6.0);
    x += dx;

    s = x.sin();
    c = x.cos();

    KepmdSolution { x, s, c }
}

/// Residual of the Kepler difference equation at a candidate solution,
/// used by `drift_dan` to accept or reject the fast path.
pub fn residual(solution: &KepmdSolution, dm: Scalar, ea: Scalar, es: Scalar) -> Scalar {
    solution.x - ea * solution.s + es * (1.0 - solution.c) - dm
}
