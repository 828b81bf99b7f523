//! Kepler drift and Bulirsch-Stoer integration kernels for N-body gravity.
//!
//! Two independent numerical cores, composed by an outer time-step
//! orchestrator that this crate does not provide:
//!
//! - [`kepler`]: analytically advances one body on its two-body orbit about
//!   a fixed central mass, via a small-increment fast path or a
//!   universal-variable solver with Newton/Laguerre fallback.
//! - [`bs`]: advances a system of mutually interacting bodies by one
//!   adaptive step, via modified-midpoint substeps extrapolated to zero
//!   step size.

pub mod bs;
pub mod codec;
pub mod constants;
pub mod error;
pub mod force;
pub mod kepler;
pub mod stumpff;
pub mod types;

pub use bs::{BsOutcome, BulirschStoerStep};
pub use constants::SolverConstants;
pub use error::{BsError, KeplerError};
pub use force::{AuxFlags, BodySystem, ForceField};
pub use kepler::{drift_dan, drift_one};
