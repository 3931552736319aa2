//! Parameter uncertainty from a solved least-squares problem.
//!
//! The covariance of the fitted parameters is `s² (JᵀJ)⁻¹`, with `J` the
//! residual Jacobian at the solution and `s²` the residual variance. We pack
//! it into a flat vector:
//!
//! - `nv` relative standard errors `σ_i / p_i`
//! - then the correlations `C_ij / (σ_i σ_j)` for `i < j`, outer index first
//!
//! A parameter fitted to (numerically) zero has no meaningful relative error.
//! Its slot is reported as `+inf` (or `NaN` if its standard error is zero too)
//! and a warning is logged; the value is never clamped.

use nalgebra::{DMatrix, DVector};

use crate::domain::covariance_len;

/// `(JᵀJ)⁻¹` via SVD, or `None` when `J` is rank deficient.
pub fn covariance_matrix(jac: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let (m, n) = jac.shape();
    if n == 0 || m < n {
        return None;
    }

    let svd = jac.clone().svd(false, true);
    let v_t = svd.v_t?;
    let s = &svd.singular_values;

    let s_max = s.max();
    let cutoff = s_max * m.max(n) as f64 * f64::EPSILON;
    if !(s_max.is_finite() && s_max > 0.0) || s.iter().any(|&v| v <= cutoff) {
        return None;
    }

    let inv_sq = DMatrix::from_diagonal(&s.map(|v| 1.0 / (v * v)));
    Some(v_t.transpose() * inv_sq * v_t)
}

/// Pack `scale * cov` into relative standard errors and correlations.
pub fn pack_covariance(cov: &DMatrix<f64>, params: &DVector<f64>, scale: f64) -> DVector<f64> {
    let nv = params.len();
    debug_assert_eq!(cov.shape(), (nv, nv));

    let full = cov * scale;
    let sd: Vec<f64> = (0..nv).map(|i| full[(i, i)].sqrt()).collect();

    let mut out = DVector::zeros(covariance_len(nv));
    let mut index = nv;
    for i in 0..nv {
        for j in (i + 1)..nv {
            out[index] = full[(i, j)] / (sd[i] * sd[j]);
            index += 1;
        }
    }

    for i in 0..nv {
        let p = params[i];
        out[i] = if p.abs() < f64::EPSILON {
            log::warn!(
                "parameter {i} fitted to {p:e}; relative standard error is undefined"
            );
            if sd[i] == 0.0 { f64::NAN } else { f64::INFINITY }
        } else {
            sd[i] / p
        };
    }

    out
}

/// Covariance vector for a solved problem, `NaN`-filled when the Jacobian is
/// rank deficient.
pub fn parameter_covariance(jac: &DMatrix<f64>, params: &DVector<f64>, scale: f64) -> DVector<f64> {
    match covariance_matrix(jac) {
        Some(cov) => pack_covariance(&cov, params, scale),
        None => {
            log::debug!("jacobian is rank deficient; covariance unavailable");
            DVector::from_element(covariance_len(params.len()), f64::NAN)
        }
    }
}
