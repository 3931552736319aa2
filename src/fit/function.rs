//! The contract shared by every fit strategy.
//!
//! A fit function owns a shared reference to its model plus solver options,
//! and turns one [`FitRequest`] into one [`FitResult`]. Strategies differ in
//! the [`FitContext`] they accept and in their pre/post-processing, not in
//! this interface.

use crate::domain::{ContextKind, FitContext, FitOptions, FitRequest, FitResult, covariance_len};
use crate::error::FitError;
use crate::models::{Model, validate_request};

pub trait FitFunction: Sync {
    type Model: Model;

    fn model(&self) -> &Self::Model;

    fn options(&self) -> &FitOptions;

    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// The context variant this strategy accepts.
    fn context_kind(&self) -> ContextKind {
        ContextKind::Voxel
    }

    /// Fit one voxel.
    ///
    /// `Err` is reserved for caller misuse (wrong channel count or length,
    /// wrong context); a fit that simply fails comes back as `Ok` with
    /// `success == false`.
    fn fit(&self, request: &FitRequest, context: FitContext) -> Result<FitResult, FitError>;
}

/// Entry checks every strategy runs before touching the solver.
pub fn check_entry<F: FitFunction + ?Sized>(
    fitter: &F,
    request: &FitRequest,
    context: FitContext,
) -> Result<(), FitError> {
    if context.kind() != fitter.context_kind() {
        return Err(FitError::ContextMismatch {
            fitter: fitter.name(),
            context: context.kind().display_name(),
        });
    }
    validate_request(fitter.model(), request)
}

/// Check the shape invariants of a successful result.
pub fn check_result<M: Model>(
    model: &M,
    request: &FitRequest,
    result: &FitResult,
) -> Result<(), FitError> {
    if !result.success {
        return Ok(());
    }
    let nv = model.nv();
    if result.parameters.len() != nv {
        return Err(FitError::LengthMismatch {
            what: "fitted parameters".to_string(),
            expected: nv,
            actual: result.parameters.len(),
        });
    }
    if let Some(cov) = &result.covariance {
        if cov.len() != covariance_len(nv) {
            return Err(FitError::LengthMismatch {
                what: "covariance".to_string(),
                expected: covariance_len(nv),
                actual: cov.len(),
            });
        }
    }
    if let Some(residuals) = &result.residuals {
        for r in residuals {
            let Some(data) = request.inputs.get(r.channel) else {
                return Err(FitError::ChannelCount {
                    expected: r.channel + 1,
                    actual: request.inputs.len(),
                });
            };
            if r.values.len() != data.len() {
                return Err(FitError::LengthMismatch {
                    what: format!("residuals of channel {}", r.channel),
                    expected: data.len(),
                    actual: r.values.len(),
                });
            }
        }
    }
    Ok(())
}
