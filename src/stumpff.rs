//! Stumpff functions `c0..c3`, the building blocks of the universal-variable
//! Kepler equation.
//!
//! Evaluated by Danby's reduce-evaluate-restore pattern (Danby, *Fundamentals
//! of Celestial Mechanics*, sec. 6.9) rather than a direct Maclaurin series,
//! which loses precision once `|x|` grows past a few units.

use crate::types::Scalar;

// Degree-6 Horner coefficients for c2/c3 Maclaurin truncations, valid once
// the argument has been reduced to |x| < 0.1.
const C2_COEFFS: [Scalar; 7] = [
    1.0 / 2.0,
    -1.0 / 24.0,
    1.0 / 720.0,
    -1.0 / 40_320.0,
    1.0 / 3_628_800.0,
    -1.0 / 479_001_600.0,
    1.0 / 87_178_291_200.0,
];

const C3_COEFFS: [Scalar; 7] = [
    1.0 / 6.0,
    -1.0 / 120.0,
    1.0 / 5_040.0,
    -1.0 / 362_880.0,
    1.0 / 39_916_800.0,
    -1.0 / 6_227_020_800.0,
    1.0 / 1_307_674_368_000.0,
];

/// Horner evaluation of `sum_n coeffs[n] * (-x)^n`.
fn horner(coeffs: &[Scalar; 7], x: Scalar) -> Scalar {
    let mut acc = coeffs[6];
    for &c in coeffs[..6].iter().rev() {
        acc = acc * (-x) + c;
    }
    acc
}

/// Stumpff functions `(c0, c1, c2, c3)` at argument `x`.
///
/// Satisfies `c1 = 1 - x*c3` and `c0 = 1 - x*c2` to within `f64` rounding,
/// independent of how many reduction/restoration passes were needed.
pub fn stumpff(mut x: Scalar) -> [Scalar; 4] {
    let mut n = 0u32;
    while x.abs() >= 0.1 {
        x /= 4.0;
        n += 1;
    }

    let mut c2 = horner(&C2_COEFFS, x);
    let mut c3 = horner(&C3_COEFFS, x);
    let mut c1 = 1.0 - x * c3;
    let mut c0 = 1.0 - x * c2;

    for _ in 0..n {
        c3 = (c2 + c0 * c3) / 4.0;
        c2 = c1 * c1 / 2.0;
        c1 = c0 * c1;
        c0 = 2.0 * c0 * c0 - 1.0;
    }

    [c0, c1, c2, c3]
}
