//! Mathematical utilities: parameter covariance from the fitted Jacobian.

pub mod covariance;

pub use covariance::*;
