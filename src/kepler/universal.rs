//! Universal-variable Kepler solver: initial guesses, Newton primary
//! iteration, and the Laguerre fallback.

use crate::error::KeplerError;
use crate::stumpff::stumpff;
use crate::types::{Alpha, Scalar};

/// A converged universal anomaly together with `fp = df/ds`, which the
/// caller needs to build the Gauss `f`/`g` functions without recomputing
/// the Stumpff series.
#[derive(Clone, Copy, Debug)]
pub struct UniversalSolution {
    pub s: Scalar,
    pub fp: Scalar,
}

/// The universal Kepler equation and its first three derivatives with
/// respect to `s`, evaluated at `s`.
///
/// Returns `(f, fp, fpp, fppp)` where `f` is the residual
/// `r0*C1 + u*C2 + mu*C3 - dt` and `C_k = s^k * c_k(s^2 * alpha)`.
fn residuals(
    s: Scalar,
    dt: Scalar,
    r0: Scalar,
    mu: Scalar,
    alpha: Alpha,
    u: Scalar,
) -> (Scalar, Scalar, Scalar, Scalar) {
    let (cc0, cc1, cc2, cc3) = scaled_stumpff(s, alpha);

    let f = r0 * cc1 + u * cc2 + mu * cc3 - dt;
    let fp = r0 * cc0 + u * cc1 + mu * cc2;
    let fpp = (mu - r0 * alpha) * cc1 + u * cc0;
    let fppp = (mu - r0 * alpha) * cc0 - u * alpha * cc1;

    (f, fp, fpp, fppp)
}

/// Stumpff terms `c_k(s^2*alpha)` scaled by `s^k`, i.e. `C0, C1, C2, C3`.
///
/// Exposed so `kepler::drift_dan` can build the Gauss `f`/`g` functions from
/// the same terms the solver converged on, without re-deriving the Stumpff
/// series independently.
pub fn scaled_stumpff(s: Scalar, alpha: Alpha) -> (Scalar, Scalar, Scalar, Scalar) {
    let x = s * s * alpha;
    let [c0, c1, c2, c3] = stumpff(x);
    (c0, s * c1, s * s * c2, s * s * s * c3)
}

/// Residual check (`fchk`): `f` evaluated at candidate `s`, used to pick
/// the better starting point when Newton fails to converge.
pub fn fchk(s: Scalar, dt: Scalar, r0: Scalar, mu: Scalar, alpha: Alpha, u: Scalar) -> Scalar {
    residuals(s, dt, r0, mu, alpha, u).0
}

/// Cubic initial guess (`p3solve`) for the hyperbolic/parabolic branch.
///
/// Solves `(mu - alpha*r0)/6 * s^3 + u/2 * s^2 + r0*s - dt = 0` by reducing
/// to a depressed cubic and applying Cardano's formula. Returns `None` when
/// the cubic degenerates (leading coefficient ~0) or the discriminant is
/// negative (three real roots; the reference only handles the
/// single-real-root case and falls back otherwise).
pub fn p3solve(dt: Scalar, r0: Scalar, mu: Scalar, alpha: Alpha, u: Scalar) -> Option<Scalar> {
    let a = (mu - alpha * r0) / 6.0;
    let b = u / 2.0;
    let c = r0;
    let d = -dt;

    if a.abs() < Scalar::EPSILON * mu.abs().max(1.0) {
        return None;
    }

    // Depressed cubic t^3 + p*t + q = 0 via s = t - b/(3a).
    let shift = b / (3.0 * a);
    let p = c / a - b * b / (3.0 * a * a);
    let q = 2.0 * b * b * b / (27.0 * a * a * a) - b * c / (3.0 * a * a) + d / a;

    let discriminant = (q / 2.0).powi(2) + (p / 3.0).powi(3);
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let t = cbrt(-q / 2.0 + sqrt_disc) + cbrt(-q / 2.0 - sqrt_disc);
    Some(t - shift)
}

fn cbrt(v: Scalar) -> Scalar {
    v.cbrt()
}

/// Initial guess (`guess`) for the universal anomaly `s`.
pub fn guess(dt: Scalar, r0: Scalar, mu: Scalar, alpha: Alpha, u: Scalar) -> Scalar {
    if alpha > 0.0 {
        if dt / r0 <= 0.4 {
            return dt / r0 - (dt * dt * u) / (2.0 * r0 * r0 * r0);
        }

        let a = mu / alpha;
        let n = (mu / a.powi(3)).sqrt();
        let e_a = 1.0 - r0 / a;
        let e_s = u / (n * a * a);
        let e = (e_a * e_a + e_s * e_s).sqrt();
        let y = n * dt - e_s;
        let sigma = (e_s * y.cos() + e_a * y.sin()).signum();
        (y + sigma * 0.85 * e) / alpha.sqrt()
    } else {
        p3solve(dt, r0, mu, alpha, u).unwrap_or(dt / r0)
    }
}

/// Up to 6 passes of third-order (Halley-like) Newton iteration.
///
/// Returns the final `s` and whether `(f/dt)^2 < danby_b^2` was reached.
/// Even on failure the returned `s` is meaningful: the caller compares its
/// residual against the original guess before falling back to Laguerre.
pub fn newton(
    mut s: Scalar,
    dt: Scalar,
    r0: Scalar,
    mu: Scalar,
    alpha: Alpha,
    u: Scalar,
    danby_b: Scalar,
) -> (Scalar, bool) {
    for _ in 0..6 {
        let (f, fp, fpp, fppp) = residuals(s, dt, r0, mu, alpha, u);
        if (f / dt).powi(2) < danby_b * danby_b {
            return (s, true);
        }
        let mut ds = -f / fp;
        ds = -f / (fp + ds * fpp / 2.0);
        ds = -f / (fp + ds * fpp / 2.0 + ds * ds * fppp / 6.0);
        s += ds;
    }
    let (f, _, _, _) = residuals(s, dt, r0, mu, alpha, u);
    (s, (f / dt).powi(2) < danby_b * danby_b)
}

/// Laguerre fallback (`lag`), fixed order `L = 5`.
pub fn laguerre(
    mut s: Scalar,
    dt: Scalar,
    r0: Scalar,
    mu: Scalar,
    alpha: Alpha,
    u: Scalar,
    nlag2: usize,
    danby_b: Scalar,
) -> (Scalar, bool) {
    const L: Scalar = 5.0;
    for _ in 0..nlag2 {
        let (f, fp, fpp, _) = residuals(s, dt, r0, mu, alpha, u);
        if (f / dt).powi(2) < danby_b * danby_b {
            return (s, true);
        }
        let inner = ((L - 1.0).powi(2) * fp * fp - L * (L - 1.0) * f * fpp).abs();
        let denom = fp + fp.signum() * inner.sqrt();
        let ds = -L * f / denom;
        s += ds;
    }
    let (f, _, _, _) = residuals(s, dt, r0, mu, alpha, u);
    (s, (f / dt).powi(2) < danby_b * danby_b)
}

/// Solve the universal Kepler equation for `s`, trying Newton first and
/// falling back to Laguerre (started from whichever of the Newton result or
/// the original guess has the smaller residual) if Newton does not
/// converge within its iteration budget.
pub fn solve(
    dt: Scalar,
    r0: Scalar,
    mu: Scalar,
    alpha: Alpha,
    u: Scalar,
    danby_b: Scalar,
    nlag2: usize,
) -> Result<UniversalSolution, KeplerError> {
    let s_init = guess(dt, r0, mu, alpha, u);
    let (s_newton, converged) = newton(s_init, dt, r0, mu, alpha, u, danby_b);

    let s = if converged {
        s_newton
    } else {
        let f_newton = fchk(s_newton, dt, r0, mu, alpha, u).abs();
        let f_init = fchk(s_init, dt, r0, mu, alpha, u).abs();
        let s_start = if f_newton <= f_init { s_newton } else { s_init };

        let (s_lag, converged_lag) = laguerre(s_start, dt, r0, mu, alpha, u, nlag2, danby_b);
        if !converged_lag {
            tracing::warn!(
                nlag2,
                "laguerre fallback exhausted iteration budget without converging"
            );
            return Err(KeplerError::LaguerreFailed);
        }
        s_lag
    };

    let (_, fp, _, _) = residuals(s, dt, r0, mu, alpha, u);
    Ok(UniversalSolution { s, fp })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_orbit_solves_quickly() {
        // mu=1, r0=1, u=0 (velocity purely tangential), alpha = 2*mu/r0 - v^2 = 1 for v=1.
        let result = solve(1.0, 1.0, 1.0, 1.0, 0.0, 1e-14, 50).unwrap();
        assert!(result.s.is_finite());
    }

    #[test]
    fn hyperbolic_case_converges() {
        // alpha < 0 triggers the cubic guess / Laguerre path.
        let result = solve(20.0, 10.0, 1.0, -0.0075, 0.25, 1e-14, 50).unwrap();
        assert!(result.s.is_finite());
        let residual = fchk(result.s, 20.0, 10.0, 1.0, -0.0075, 0.25);
        assert!(residual.abs() < 1e-8);
    }

    #[test]
    fn p3solve_degenerate_returns_none() {
        assert!(p3solve(1.0, 1.0, 0.0, 0.0, 0.0).is_none());
    }
}
