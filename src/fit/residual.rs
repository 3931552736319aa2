//! Adapter from a [`Model`] to a least-squares residual.

use nalgebra::{DMatrix, DVector, RealField, convert};
use num_dual::{DualDVec64, jacobian};

use crate::fit::solver::NllsProblem;
use crate::models::Model;

/// `observed - signal(trial, fixed)` for one voxel.
///
/// Holds its fixed parameters and data by value so the solver can evaluate it
/// as often as it likes, with plain or dual scalars.
#[derive(Debug, Clone)]
pub struct ResidualFunctor<'m, M: Model> {
    model: &'m M,
    fixed: DVector<f64>,
    data: DVector<f64>,
}

impl<'m, M: Model> ResidualFunctor<'m, M> {
    pub fn new(model: &'m M, fixed: DVector<f64>, data: DVector<f64>) -> Self {
        Self { model, fixed, data }
    }

    pub fn data(&self) -> &DVector<f64> {
        &self.data
    }

    pub fn fixed(&self) -> &DVector<f64> {
        &self.fixed
    }

    pub fn evaluate<T: RealField>(&self, trial: &DVector<T>) -> DVector<T> {
        let signal = self.model.signal(trial, &self.fixed);
        debug_assert_eq!(signal.len(), self.data.len());
        DVector::from_fn(self.data.len(), |i, _| {
            convert::<f64, T>(self.data[i]) - signal[i].clone()
        })
    }

    /// Residuals and Jacobian at `x` from a single dual-number pass.
    pub fn linearize(&self, x: &DVector<f64>) -> (DVector<f64>, DMatrix<f64>) {
        jacobian(|p: DVector<DualDVec64>| self.evaluate(&p), x.clone())
    }
}

impl<M: Model> NllsProblem for ResidualFunctor<'_, M> {
    fn residuals(&self, x: &DVector<f64>) -> DVector<f64> {
        self.evaluate(x)
    }

    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64> {
        self.linearize(x).1
    }
}
