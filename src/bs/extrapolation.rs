//! Polynomial/rational extrapolation table and the scaled relative-error
//! norm used to accept or reject a Bulirsch-Stoer step.

use crate::types::{Scalar, Vector};

/// One body's contribution to an extrapolation column: 3 position
/// components followed by 3 velocity components.
pub type StateVec = [Scalar; 6];

fn to_state(x: Vector, v: Vector) -> StateVec {
    [x.x, x.y, x.z, v.x, v.y, v.z]
}

fn from_state(s: StateVec) -> (Vector, Vector) {
    (Vector::new(s[0], s[1], s[2]), Vector::new(s[3], s[4], s[5]))
}

/// The `D[j][k]` table: column index `j` (1-based, substep order already
/// tried), body index `k` (moving bodies only). Persists across the `n`
/// loop within one step attempt; reset at the start of every new attempt
/// (including after a step-size halving).
pub struct ExtrapolationTable {
    columns: Vec<Vec<StateVec>>,
    n_bodies: usize,
}

impl ExtrapolationTable {
    pub fn new(max_order: usize, n_bodies: usize) -> Self {
        Self {
            columns: Vec::with_capacity(max_order),
            n_bodies,
        }
    }

    pub fn reset(&mut self) {
        self.columns.clear();
    }

    /// Insert the raw substep-`n` result and fold it into columns
    /// `n-1 downto 1` using the substep's representative `h^2` values.
    ///
    /// `h_sq(j)` gives the representative squared step size for substep
    /// count `j` (different for BS1 and BS2 — see `bs::mod::step_h_sq`).
    pub fn insert(
        &mut self,
        n: usize,
        raw_positions: &[Vector],
        raw_velocities: &[Vector],
        h_sq: impl Fn(usize) -> Scalar,
    ) {
        debug_assert_eq!(raw_positions.len(), self.n_bodies);
        debug_assert_eq!(self.columns.len(), n - 1);

        let new_column: Vec<StateVec> = (0..self.n_bodies)
            .map(|k| to_state(raw_positions[k], raw_velocities[k]))
            .collect();
        self.columns.push(new_column);

        let h_sq_n = h_sq(n);
        for j in (1..n).rev() {
            let h_sq_j = h_sq(j);
            let h_sq_jp1 = h_sq(j + 1);
            let t0 = 1.0 / (h_sq_j - h_sq_n);
            for k in 0..self.n_bodies {
                let next = self.columns[j][k];
                let prev = self.columns[j - 1][k];
                let mut folded = [0.0; 6];
                for (c, slot) in folded.iter_mut().enumerate() {
                    *slot = t0 * (h_sq_jp1 * next[c] - h_sq_n * prev[c]);
                }
                self.columns[j - 1][k] = folded;
            }
        }
    }

    /// Scaled relative-error norm over the last update column `D[1]`.
    ///
    /// `xscal[k] = 1/|x_k|^2`, `vscal[k] = 1/|v_k|^2`, evaluated once at the
    /// start of the step from the initial state.
    pub fn error_norm(&self, xscal: &[Scalar], vscal: &[Scalar]) -> Scalar {
        let d1 = &self.columns[0];
        let mut errmax: Scalar = 0.0;
        for k in 0..self.n_bodies {
            let pos_term =
                d1[k][0..3].iter().map(|c| c * c).fold(0.0, f64::max) * xscal[k];
            let vel_term =
                d1[k][3..6].iter().map(|c| c * c).fold(0.0, f64::max) * vscal[k];
            errmax = errmax.max(pos_term).max(vel_term);
        }
        errmax
    }

    /// Accepted state: `x0 + sum_j D[j][k]`, `v0 + sum_j D[j][k]` (position
    /// and velocity slices of the same sum), per body.
    pub fn sum(&self, x0: &[Vector], v0: &[Vector]) -> (Vec<Vector>, Vec<Vector>) {
        let mut xs = Vec::with_capacity(self.n_bodies);
        let mut vs = Vec::with_capacity(self.n_bodies);
        for k in 0..self.n_bodies {
            let mut acc = [0.0; 6];
            for column in &self.columns {
                for c in 0..6 {
                    acc[c] += column[k][c];
                }
            }
            let (dx, dv) = from_state(acc);
            xs.push(x0[k] + dx);
            vs.push(v0[k] + dv);
        }
        (xs, vs)
    }

    pub fn order_reached(&self) -> usize {
        self.columns.len()
    }
}
