//! `voxel-fit` library crate.
//!
//! A generic engine for fitting a parametric signal model to the data of one
//! imaging voxel at a time:
//!
//! - models describe a signal equation once, generic over the scalar type, so
//!   the solver can differentiate it with dual numbers
//! - fit strategies (direct, scaled, blocked, indexed) share one contract and
//!   turn a per-voxel request into a result with RMSE, residuals and packed
//!   covariance
//! - nothing is shared between fits except the read-only model, so a driver
//!   can fit voxels in parallel

pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;

pub use domain::{ChannelResiduals, FitContext, FitOptions, FitRequest, FitResult, VoxelIndex};
pub use error::FitError;
pub use fit::{FitFunction, NllsFit, ScaledNllsFit};
pub use models::Model;
