//! Typed failure modes for the Kepler drift and Bulirsch-Stoer kernels.

use thiserror::Error;

/// Failure modes of the Kepler universal-variable solver and its callers.
///
/// Preserves the reference implementation's numeric flag codes as explicit
/// discriminants for callers that need to distinguish them, while giving
/// everyone else a `std::error::Error` to propagate with `?`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeplerError {
    /// `kepmd`'s residual check failed, or the Newton universal solver did
    /// not reach `(f/dt)^2 < DANBYB^2` within 6 iterations. Reference code 1.
    #[error("kepler solver residual exceeded tolerance (code 1)")]
    ResidualTooLarge,

    /// The Laguerre fallback exhausted its iteration cap without
    /// convergence. Reference code 2.
    #[error("laguerre fallback failed to converge (code 2)")]
    LaguerreFailed,

    /// `drift_one`'s 10-substep retry still failed; state was left
    /// unmutated from the point of failure onward.
    #[error("drift_one failed on substep {substep} of 10")]
    SubstepFailed {
        /// 1-based index of the failing substep.
        substep: u8,
        /// The underlying failure from that substep's `drift_dan` call.
        #[source]
        source: Box<KeplerError>,
    },

    /// Position at entry was at (or inside) the central body, which makes
    /// `alpha`/`u` and the fast elliptic path undefined.
    #[error("body position has zero or negative radius from central mass")]
    ZeroRadius,
}

/// Failure modes of the Bulirsch-Stoer step driver.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BsError {
    /// The step halved repeatedly without ever meeting tolerance, down to
    /// a step size indistinguishable from zero at `f64` precision. The
    /// reference algorithm has no such escape hatch and would loop forever;
    /// this is this crate's defensive bound.
    #[error("bulirsch-stoer step size collapsed to machine epsilon without converging")]
    StepSizeCollapsed,
}
