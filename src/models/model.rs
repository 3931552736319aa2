//! The signal-model contract and its validation.
//!
//! A model is two things:
//! - static parameter metadata (names, bounds, starting point, channel sizes)
//! - a pure signal equation, written once against [`RealField`] so the same
//!   code runs on `f64` and on dual numbers for the Jacobian (dual numbers are
//!   not `Copy`, so signal code clones its scalars)
//!
//! Models are shared by reference across every voxel fit of a run, so the
//! trait requires `Send + Sync` and all methods take `&self`.

use nalgebra::{DVector, RealField};

use crate::domain::FitRequest;
use crate::error::FitError;

pub trait Model: Send + Sync {
    /// Names of the varying (fitted) parameters. Defines NV.
    fn varying_names(&self) -> &[&'static str];

    /// Names of the per-voxel fixed parameters. Defines NF.
    fn fixed_names(&self) -> &[&'static str] {
        &[]
    }

    /// Names of the quantities returned by [`Model::derived`]. Defines ND.
    fn derived_names(&self) -> &[&'static str] {
        &[]
    }

    /// Number of input channels (NI).
    fn input_count(&self) -> usize {
        1
    }

    /// Declared number of samples in input channel `channel`.
    fn input_size(&self, channel: usize) -> usize;

    fn lower_bounds(&self) -> &[f64];
    fn upper_bounds(&self) -> &[f64];
    fn start(&self) -> &[f64];

    /// Predicted data for channel 0 given varying and fixed parameters.
    fn signal<T: RealField>(&self, varying: &DVector<T>, fixed: &DVector<f64>) -> DVector<T>;

    /// Quantities computed from a fitted parameter vector.
    fn derived(&self, _varying: &DVector<f64>, _fixed: &DVector<f64>) -> DVector<f64> {
        DVector::zeros(0)
    }

    fn nv(&self) -> usize {
        self.varying_names().len()
    }

    fn nf(&self) -> usize {
        self.fixed_names().len()
    }

    fn nd(&self) -> usize {
        self.derived_names().len()
    }
}

/// Check model metadata for internal consistency.
///
/// Called once when a fit function is built, never per voxel.
pub fn validate_model<M: Model>(model: &M) -> Result<(), FitError> {
    let nv = model.nv();
    if nv == 0 {
        return Err(FitError::NoVaryingParameters);
    }
    if model.input_count() == 0 {
        return Err(FitError::NoInputChannels);
    }

    let lower = model.lower_bounds();
    let upper = model.upper_bounds();
    let start = model.start();
    for (what, actual) in [
        ("lower bounds", lower.len()),
        ("upper bounds", upper.len()),
        ("start", start.len()),
    ] {
        if actual != nv {
            return Err(FitError::LengthMismatch {
                what: what.to_string(),
                expected: nv,
                actual,
            });
        }
    }

    for (i, name) in model.varying_names().iter().enumerate() {
        let (lo, hi, s) = (lower[i], upper[i], start[i]);
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(FitError::InvalidBounds {
                name: name.to_string(),
                lower: lo,
                upper: hi,
            });
        }
        if !s.is_finite() || s < lo || s > hi {
            return Err(FitError::StartOutOfBounds {
                name: name.to_string(),
                value: s,
                lower: lo,
                upper: hi,
            });
        }
    }

    Ok(())
}

/// Check a per-voxel request against the model it will be fitted with.
pub fn validate_request<M: Model>(model: &M, request: &FitRequest) -> Result<(), FitError> {
    let ni = model.input_count();
    if request.inputs.len() != ni {
        return Err(FitError::ChannelCount {
            expected: ni,
            actual: request.inputs.len(),
        });
    }
    for (channel, data) in request.inputs.iter().enumerate() {
        let expected = model.input_size(channel);
        if data.len() != expected {
            return Err(FitError::ChannelLength {
                channel,
                expected,
                actual: data.len(),
            });
        }
    }
    if request.fixed.len() != model.nf() {
        return Err(FitError::LengthMismatch {
            what: "fixed parameters".to_string(),
            expected: model.nf(),
            actual: request.fixed.len(),
        });
    }
    Ok(())
}
