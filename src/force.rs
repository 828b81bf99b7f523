//! The acceleration callback and the multi-body state the Bulirsch-Stoer
//! kernel advances.
//!
//! `force` is treated as an opaque collaborator: the reference algorithm
//! only ever calls it and reads back an acceleration. Modeling it as a
//! trait object, rather than threading a generic closure type through every
//! solver function, keeps the Bulirsch-Stoer API stable across call sites
//! and mirrors this corpus's `dyn Integrator` / `dyn ForceEvaluator` style.

use crate::types::{Scalar, Vector};

/// Auxiliary force-model flags passed alongside a body index.
///
/// Plain fields rather than a bitmask: the reference enumerates
/// `{none, cometary-jet, radiation-pressure, both}` for the jet/radiation
/// pair, plus independent oblateness, spin, and close-encounter-list
/// concerns, all of which read more clearly as named fields than as one
/// opaque integer.
#[derive(Clone, Debug, Default)]
pub struct AuxFlags {
    /// Cometary outgassing jet acceleration is active for this body.
    pub cometary_jet: bool,
    /// Solar radiation pressure is active for this body.
    pub radiation_pressure: bool,
    /// Zonal oblateness coefficients `(J2, J4, J6)` of the central body, if
    /// the force law accounts for oblateness.
    pub oblateness: Option<(Scalar, Scalar, Scalar)>,
    /// Body spin axis and rate, for force laws that depend on it (e.g.
    /// anisotropic outgassing).
    pub spin: Option<Vector>,
    /// Indices of bodies currently in a reduced-cost close-encounter pair
    /// with this one (`ice`/`jce` in the reference).
    pub close_encounter_partners: Vec<usize>,
    /// Per-body removed/active status, shared across the whole system so a
    /// force law can skip bodies marked for removal.
    pub removed: Vec<bool>,
}

/// Structure-of-arrays state for the `N` bodies a `BulirschStoerStep`
/// advances together. Body index `0` is the fixed central body.
#[derive(Clone, Debug, Default)]
pub struct BodySystem {
    pub masses: Vec<Scalar>,
    pub positions: Vec<Vector>,
    pub velocities: Vec<Vector>,
}

impl BodySystem {
    pub fn new(masses: Vec<Scalar>, positions: Vec<Vector>, velocities: Vec<Vector>) -> Self {
        assert_eq!(masses.len(), positions.len());
        assert_eq!(masses.len(), velocities.len());
        assert!(masses.len() >= 2, "BS step requires at least 2 bodies");
        Self {
            masses,
            positions,
            velocities,
        }
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }
}

/// A pure function from system state to per-body acceleration.
///
/// `t` is the time offset within the current Bulirsch-Stoer step (not an
/// absolute simulation time), matching the substep-local clock the
/// modified-midpoint integrator advances.
pub trait ForceField {
    /// Acceleration on body `body` given the full system state at `positions`/`velocities`.
    fn acceleration(
        &self,
        body: usize,
        positions: &[Vector],
        velocities: &[Vector],
        masses: &[Scalar],
        t: Scalar,
        aux: &AuxFlags,
    ) -> Vector;

    /// Whether this force law depends on velocity. `false` unlocks the
    /// cheaper BS2 substep kernel (`force = f(x)` only); `true` forces the
    /// general BS1 kernel.
    fn velocity_independent(&self) -> bool {
        false
    }
}
