//! Tuning constants for the Kepler and Bulirsch-Stoer solvers.
//!
//! Mirrors this crate's convention for numerical solver configuration: a
//! plain data struct with a `Default` impl, constructed up front and passed
//! by reference into the kernels rather than read from globals.

use crate::types::Scalar;

/// Convergence and step-control constants shared by both kernels.
#[derive(Clone, Debug)]
pub struct SolverConstants {
    /// Relative convergence threshold for Newton/Laguerre/`kepmd` residuals.
    /// Danby's `DANBYB`, default `1e-14`.
    pub danby_b: Scalar,
    /// Maximum Laguerre iterations before giving up. Default `50`.
    pub nlag2: usize,
    /// Step-size shrink factor applied when a Bulirsch-Stoer step exhausts
    /// its maximum substep order without converging. Default `0.55`.
    pub shrink: Scalar,
    /// Step-size growth factor applied after a cheap (low-order) accepted
    /// Bulirsch-Stoer step. Default `1.3`.
    pub grow: Scalar,
    /// Maximum modified-midpoint substep order for BS1 (general, velocity-
    /// dependent force). Default `8`.
    pub bs1_max_order: usize,
    /// Maximum modified-midpoint substep order for BS2 (conservative,
    /// position-only force). Default `12`.
    pub bs2_max_order: usize,
    /// Substep order beyond which an accepted step no longer grows `h0`.
    /// Default `7`, matching the reference's order-7 cutoff shared by BS1
    /// and BS2.
    pub grow_order_cutoff: usize,
}

impl Default for SolverConstants {
    fn default() -> Self {
        Self {
            danby_b: 1e-14,
            nlag2: 50,
            shrink: 0.55,
            grow: 1.3,
            bs1_max_order: 8,
            bs2_max_order: 12,
            grow_order_cutoff: 7,
        }
    }
}
