//! Bounded nonlinear least-squares fits of a single voxel.
//!
//! Two strategies share one solve path:
//!
//! - [`NllsFit`] fits the data as given.
//! - [`ScaledNllsFit`] divides the data by its maximum first, which keeps the
//!   problem well conditioned for amplitude-dominated signals, then rescales
//!   the amplitude (first varying parameter), RMSE and residuals. The other
//!   parameters are scale-invariant by convention and left untouched.
//!
//! Both fit input channel 0; the remaining channels are validated but unused.

use nalgebra::DVector;

use crate::domain::{ChannelResiduals, ContextKind, FitContext, FitOptions, FitRequest, FitResult};
use crate::error::FitError;
use crate::fit::function::{FitFunction, check_entry};
use crate::fit::residual::ResidualFunctor;
use crate::fit::solver::{BoundedLevenbergMarquardt, NllsProblem, SolverOptions};
use crate::math::parameter_covariance;
use crate::models::{Model, validate_model};

/// Message of a scaled fit whose data never rises above zero.
pub const NON_POSITIVE_DATA: &str = "Maximum data value was not positive";

/// Fit one channel of `request` with the bounded solver.
///
/// This is the shared building block of the direct and scaled strategies, and
/// what a blocked or indexed strategy typically calls once it has picked its
/// channel or adjusted its fixed parameters. Only the channel's length against
/// the signal is checked here; channel layout checks belong to the caller.
/// Residuals, when requested, are tagged with `channel`.
pub fn fit_channel<M: Model>(
    model: &M,
    options: &FitOptions,
    request: &FitRequest,
    channel: usize,
) -> Result<FitResult, FitError> {
    let data = request
        .inputs
        .get(channel)
        .ok_or(FitError::ChannelCount {
            expected: channel + 1,
            actual: request.inputs.len(),
        })?;
    fit_data(model, options, request, channel, data.clone())
}

fn fit_data<M: Model>(
    model: &M,
    options: &FitOptions,
    request: &FitRequest,
    channel: usize,
    data: DVector<f64>,
) -> Result<FitResult, FitError> {
    let nv = model.nv();
    let n = data.len();
    let start = DVector::from_column_slice(model.start());

    let initial = model.signal(&start, &request.fixed);
    if initial.len() != n {
        return Err(FitError::SignalLength {
            expected: n,
            actual: initial.len(),
        });
    }

    let functor = ResidualFunctor::new(model, request.fixed.clone(), data);
    let solver = BoundedLevenbergMarquardt::new(SolverOptions::from(options));
    let report = solver.solve(&functor, &start, model.lower_bounds(), model.upper_bounds());
    if !report.is_usable() {
        log::debug!("fit failed: {}", report.termination.description());
        return Ok(FitResult::failed(nv, report.full_report()));
    }

    let parameters = report.x;
    let residuals = functor.residuals(&parameters);
    let rss = residuals.norm_squared();
    let rmse = (rss / n as f64).sqrt();

    let covariance = request.want_covariance.then(|| {
        let scale = rss / (n as f64 - nv as f64);
        parameter_covariance(&functor.jacobian(&parameters), &parameters, scale)
    });

    Ok(FitResult {
        success: true,
        message: String::new(),
        parameters,
        covariance,
        rmse,
        residuals: request
            .want_residuals
            .then(|| vec![ChannelResiduals { channel, values: residuals }]),
        flag: report.evaluations as i64,
    })
}

/// Direct bounded NLLS fit.
#[derive(Debug, Clone)]
pub struct NllsFit<'m, M: Model> {
    model: &'m M,
    options: FitOptions,
}

impl<'m, M: Model> NllsFit<'m, M> {
    pub fn new(model: &'m M) -> Result<Self, FitError> {
        Self::with_options(model, FitOptions::default())
    }

    pub fn with_options(model: &'m M, options: FitOptions) -> Result<Self, FitError> {
        validate_model(model)?;
        options.validate()?;
        Ok(Self { model, options })
    }
}

impl<M: Model> FitFunction for NllsFit<'_, M> {
    type Model = M;

    fn model(&self) -> &M {
        self.model
    }

    fn options(&self) -> &FitOptions {
        &self.options
    }

    fn name(&self) -> &'static str {
        "nlls"
    }

    fn context_kind(&self) -> ContextKind {
        ContextKind::Voxel
    }

    fn fit(&self, request: &FitRequest, context: FitContext) -> Result<FitResult, FitError> {
        check_entry(self, request, context)?;
        fit_channel(self.model, &self.options, request, 0)
    }
}

/// Amplitude-normalised bounded NLLS fit.
#[derive(Debug, Clone)]
pub struct ScaledNllsFit<'m, M: Model> {
    model: &'m M,
    options: FitOptions,
}

impl<'m, M: Model> ScaledNllsFit<'m, M> {
    pub fn new(model: &'m M) -> Result<Self, FitError> {
        Self::with_options(model, FitOptions::default())
    }

    pub fn with_options(model: &'m M, options: FitOptions) -> Result<Self, FitError> {
        validate_model(model)?;
        options.validate()?;
        Ok(Self { model, options })
    }
}

impl<M: Model> FitFunction for ScaledNllsFit<'_, M> {
    type Model = M;

    fn model(&self) -> &M {
        self.model
    }

    fn options(&self) -> &FitOptions {
        &self.options
    }

    fn name(&self) -> &'static str {
        "scaled nlls"
    }

    fn fit(&self, request: &FitRequest, context: FitContext) -> Result<FitResult, FitError> {
        check_entry(self, request, context)?;

        let data = &request.inputs[0];
        let scale = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if scale <= f64::EPSILON {
            return Ok(FitResult::failed(self.model.nv(), NON_POSITIVE_DATA));
        }

        let mut result = fit_data(self.model, &self.options, request, 0, data / scale)?;
        if !result.success {
            return Ok(result);
        }

        result.rmse *= scale;
        if let Some(residuals) = result.residuals.as_mut() {
            for r in residuals.iter_mut() {
                r.values *= scale;
            }
        }
        result.parameters[0] *= scale;
        Ok(result)
    }
}
