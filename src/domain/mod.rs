//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - per-voxel fit requests and results (`FitRequest`, `FitResult`, `ChannelResiduals`)
//! - solver settings (`FitOptions`)
//! - the extra context a fit may take (`FitContext`, `VoxelIndex`)

pub mod types;

pub use types::*;
