//! Synthetic data generation for simulation and testing.

pub mod noise;

pub use noise::*;
