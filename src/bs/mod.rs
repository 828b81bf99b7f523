//! Adaptive-order Bulirsch-Stoer step: drives the modified-midpoint
//! substep integrators (§ [`midpoint`]) through an increasing sequence of
//! substep counts, extrapolating each to zero step size (§ [`extrapolation`])
//! until the scaled relative-error norm meets tolerance or the substep
//! order is exhausted, in which case `h0` is halved and the whole step is
//! retried from the cached initial acceleration.

pub mod extrapolation;
pub mod midpoint;

use crate::constants::SolverConstants;
use crate::error::BsError;
use crate::force::{AuxFlags, BodySystem, ForceField};
use crate::types::{Scalar, Vector};
use extrapolation::ExtrapolationTable;

/// Outcome of a single accepted Bulirsch-Stoer step.
#[derive(Clone, Debug)]
pub struct BsOutcome {
    /// Step size actually taken (equal to the `h0` passed in; BS never
    /// partially completes a step, only retries at a smaller `h0`).
    pub hdid: Scalar,
    /// Recommended `h0` for the caller's next step.
    pub h_next: Scalar,
    /// Substep order at which the step was accepted.
    pub order: usize,
}

/// Which modified-midpoint kernel a `BulirschStoerStep` drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kernel {
    /// General Gragg/modified-midpoint (`mdt_bs1`), velocity-dependent forces.
    Bs1,
    /// Stoermer's-rule variant (`mdt_bs2`), position-only forces.
    Bs2,
}

/// Adaptive Bulirsch-Stoer stepper, preallocated for a maximum body count.
///
/// Picks the `mdt_bs2` kernel automatically when `force.velocity_independent()`
/// is true (half the force evaluations per substep for the same order),
/// falling back to the general `mdt_bs1` kernel otherwise.
pub struct BulirschStoerStep {
    constants: SolverConstants,
    table: ExtrapolationTable,
}

impl BulirschStoerStep {
    /// Preallocate the extrapolation table for up to `max_bodies` moving
    /// bodies (central body excluded) at the larger of the two kernels'
    /// maximum substep order.
    pub fn new(constants: SolverConstants, max_bodies: usize) -> Self {
        let max_order = constants.bs1_max_order.max(constants.bs2_max_order);
        Self {
            table: ExtrapolationTable::new(max_order, max_bodies),
            constants,
        }
    }

    /// Advance `system`'s moving bodies (indices `1..len`) by one
    /// Bulirsch-Stoer step, starting from the caller's recommended `h0` and
    /// adapting it internally (halving on repeated substep-order exhaustion)
    /// until a step meeting `tau` is accepted.
    ///
    /// Mutates `system.positions`/`system.velocities` in place on success
    /// and returns the accepted step size plus the recommended next `h0`.
    pub fn step(
        &mut self,
        system: &mut BodySystem,
        h0: Scalar,
        tau: Scalar,
        force: &dyn ForceField,
        t0: Scalar,
        aux: &AuxFlags,
    ) -> Result<BsOutcome, BsError> {
        let kernel = if force.velocity_independent() {
            Kernel::Bs2
        } else {
            Kernel::Bs1
        };
        let max_order = match kernel {
            Kernel::Bs1 => self.constants.bs1_max_order,
            Kernel::Bs2 => self.constants.bs2_max_order,
        };

        let x0 = system.positions[1..].to_vec();
        let v0 = system.velocities[1..].to_vec();
        let n_moving = x0.len();

        let xscal: Vec<Scalar> = x0.iter().map(|x| 1.0 / x.length_squared()).collect();
        let vscal: Vec<Scalar> = v0.iter().map(|v| 1.0 / v.length_squared()).collect();

        let a0 = (1..system.len())
            .map(|k| force.acceleration(k, &system.positions, &system.velocities, &system.masses, t0, aux))
            .collect::<Vec<Vector>>();

        let mut h0 = h0;
        loop {
            if h0.abs() < Scalar::EPSILON * 1e3 {
                tracing::warn!(h0, "bulirsch-stoer step size collapsed without converging");
                return Err(BsError::StepSizeCollapsed);
            }

            self.table.reset();
            let mut accepted: Option<usize> = None;

            for n in 1..=max_order {
                let (raw_x, raw_v) = match kernel {
                    Kernel::Bs1 => midpoint::mdt_bs1(system, &a0, h0, n, force, t0, aux),
                    Kernel::Bs2 => midpoint::mdt_bs2(system, &a0, h0, n, force, t0, aux),
                };

                let h_sq = step_h_sq(kernel, h0);
                self.table.insert(n, &raw_x, &raw_v, h_sq);

                if n >= 4 {
                    let errmax = self.table.error_norm(&xscal, &vscal);
                    if errmax <= tau * tau {
                        accepted = Some(n);
                        break;
                    }
                }
            }

            if let Some(order) = accepted {
                let (xs, vs) = self.table.sum(&x0, &v0);
                for k in 0..n_moving {
                    system.positions[k + 1] = xs[k];
                    system.velocities[k + 1] = vs[k];
                }

                let h_next = if order < self.constants.grow_order_cutoff {
                    h0 * self.constants.grow
                } else if order == max_order {
                    h0 * self.constants.shrink
                } else {
                    h0
                };

                return Ok(BsOutcome {
                    hdid: h0,
                    h_next,
                    order,
                });
            }

            tracing::debug!(h0, max_order, "bulirsch-stoer step exhausted substep order, halving");
            h0 *= 0.5;
        }
    }
}

/// Representative squared step size for substep count `j`, used to weight
/// the extrapolation table fold. BS1 uses half-substeps of size `h0/(2j)`;
/// BS2 uses full substeps of size `h0/j`.
fn step_h_sq(kernel: Kernel, h0: Scalar) -> impl Fn(usize) -> Scalar {
    move |j| match kernel {
        Kernel::Bs1 => 1.0 / (4.0 * (j * j) as Scalar),
        Kernel::Bs2 => (h0 / j as Scalar).powi(2),
    }
}
