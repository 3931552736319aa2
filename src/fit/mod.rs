//! Per-voxel model fitting.
//!
//! Responsibilities:
//!
//! - adapt a model to a residual the solver can differentiate (`residual`)
//! - solve bounded nonlinear least squares (`solver`)
//! - wrap the solve in the fit strategies: direct and scaled (`nlls`),
//!   blocked and indexed (`contextual`), all behind `FitFunction`

pub mod contextual;
pub mod function;
pub mod nlls;
pub mod residual;
pub mod solver;

pub use contextual::*;
pub use function::*;
pub use nlls::*;
pub use residual::*;
pub use solver::*;
