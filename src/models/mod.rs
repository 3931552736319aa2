//! Signal models.
//!
//! Concrete signal equations live with whoever drives the engine; this module
//! only defines the contract they implement so fitting code can stay generic.

pub mod model;

#[cfg(test)]
pub(crate) mod testing;

pub use model::*;
