// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A hand-rolled Biconjugate-Gradient-Stabilized (BiCGSTAB) solver. Takes the
//! system matrix only as a matvec closure, since the implicit smoother's
//! system `(I - lambda * P)` never needs to be materialized densely.
//!
//! The stop criterion is the squared, unnormalized residual `‖A x - b‖² < ε`,
//! not a relative/normalized one: a caller passing the default `ε = 1e-7`
//! gets exactly the convergence depth that constant implies for their
//! right-hand side's scale, with no hidden division by `‖b‖` changing what
//! the tolerance means.

use ndarray::Array1;

/// Default iteration cap and squared-residual tolerance, used when callers
/// don't need to tune convergence.
pub const DEFAULT_MAX_ITERS: usize = 2000;
pub const DEFAULT_TOLERANCE: f64 = 1e-7;

#[derive(Debug, Clone, Copy)]
pub struct SolveReport {
    pub iterations: usize,
    /// `‖A x - b‖²`, unnormalized, for the returned `x`.
    pub residual_squared: f64,
    pub converged: bool,
}

/// Solves `A x = b` for `x`, given `A` only as a matrix-vector product.
/// Starts from `x0` (the identity smoother's natural warm start is the
/// current field itself) and stops once the squared residual drops below
/// `tolerance` or `max_iters` is reached.
pub fn bicgstab(
    matvec: impl Fn(&Array1<f64>) -> Array1<f64>,
    b: &Array1<f64>,
    x0: Array1<f64>,
    max_iters: usize,
    tolerance: f64,
) -> (Array1<f64>, SolveReport) {
    let n = b.len();
    let mut x = x0;
    let mut r = b - &matvec(&x);
    let r0_hat = r.clone();

    let mut residual_squared = r.dot(&r);
    if residual_squared < tolerance {
        return (
            x,
            SolveReport {
                iterations: 0,
                residual_squared,
                converged: true,
            },
        );
    }

    let mut rho = 1.0;
    let mut alpha = 1.0;
    let mut omega = 1.0;
    let mut v = Array1::zeros(n);
    let mut p = Array1::zeros(n);

    let mut iterations = 0;
    let mut converged = false;

    for _ in 0..max_iters {
        iterations += 1;

        let rho_new = r0_hat.dot(&r);
        if rho_new.abs() < 1e-300 || omega.abs() < 1e-300 {
            break;
        }
        let beta = (rho_new / rho) * (alpha / omega);
        p = &r + &((&p - &(omega * &v)) * beta);
        v = matvec(&p);

        let r0_dot_v = r0_hat.dot(&v);
        if r0_dot_v.abs() < 1e-300 {
            break;
        }
        alpha = rho_new / r0_dot_v;

        // `s == b - A*h` for `h = x + alpha*p`, since `r == b - A*x` and
        // `v == A*p`, so testing `s` is exactly testing `h`'s residual
        // without a second matvec.
        let s = &r - &(alpha * &v);
        let s_squared = s.dot(&s);
        if s_squared < tolerance {
            x = &x + &(alpha * &p);
            residual_squared = s_squared;
            converged = true;
            break;
        }

        let t = matvec(&s);
        let t_dot_t = t.dot(&t);
        omega = if t_dot_t.abs() < 1e-300 {
            0.0
        } else {
            t.dot(&s) / t_dot_t
        };

        x = &x + &(alpha * &p) + &(omega * &s);
        r = &s - &(omega * &t);
        residual_squared = r.dot(&r);
        rho = rho_new;

        if residual_squared < tolerance {
            converged = true;
            break;
        }
        if omega.abs() < 1e-300 {
            break;
        }
    }

    (
        x,
        SolveReport {
            iterations,
            residual_squared,
            converged,
        },
    )
}

#[cfg(test)]
mod test {
    use super::*;

    /// `A = I + eps` on the diagonal; `b = [2, 2]` should solve to `x ~= [1, 1]`.
    #[test]
    fn solves_diagonal_system() {
        let matvec = |x: &Array1<f64>| x * 2.0;
        let b = Array1::from_vec(vec![2.0, 2.0]);
        let x0 = Array1::zeros(2);
        let (x, report) = bicgstab(matvec, &b, x0, DEFAULT_MAX_ITERS, DEFAULT_TOLERANCE);
        assert!(report.converged);
        for &value in x.iter() {
            assert!((value - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn residual_does_not_increase_after_convergence_reported() {
        let matvec = |x: &Array1<f64>| x * 3.0;
        let b = Array1::from_vec(vec![9.0, 3.0, 6.0]);
        let x0 = Array1::zeros(3);
        let (_, report) = bicgstab(matvec, &b, x0, DEFAULT_MAX_ITERS, DEFAULT_TOLERANCE);
        assert!(report.converged);
        assert!(report.residual_squared < DEFAULT_TOLERANCE);
    }
}
