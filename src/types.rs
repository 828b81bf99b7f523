//! Core numeric types shared by the Kepler drift and Bulirsch-Stoer kernels.

/// Scalar type for physics calculations (`f64` for precision across solar-system scales).
pub type Scalar = f64;

/// 3D vector type for positions, velocities, and accelerations.
pub type Vector = bevy_math::DVec3;

/// Twice the negative specific orbital energy: `alpha = 2*mu/r - v.v`.
///
/// Positive for bound (elliptic) orbits, zero for parabolic, negative for
/// hyperbolic orbits. Exposed as a named type so call sites read as physics
/// rather than a bare `f64`.
pub type Alpha = Scalar;
