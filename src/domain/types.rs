//! Shared domain types.
//!
//! These are intentionally small, owned records: a request and a result are
//! created per voxel and dropped once the caller has written the outputs.
//! Results and options are serializable so a volume driver can persist them
//! (or load options from its own config file).

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Spatial index of a voxel inside its volume (i, j, k).
pub type VoxelIndex = [i64; 3];

/// Length of the packed covariance vector for `nv` varying parameters.
///
/// `nv` relative standard errors followed by the `nv * (nv - 1) / 2`
/// upper-triangle correlations.
pub fn covariance_len(nv: usize) -> usize {
    nv * (nv + 1) / 2
}

/// Extra per-call context a fit function may need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitContext {
    /// Plain per-voxel fit.
    Voxel,
    /// Multi-component fit of one block of a vector-valued output.
    Block(usize),
    /// Fit whose effective model depends on the voxel position.
    Index(VoxelIndex),
}

impl FitContext {
    pub fn kind(&self) -> ContextKind {
        match self {
            FitContext::Voxel => ContextKind::Voxel,
            FitContext::Block(_) => ContextKind::Block,
            FitContext::Index(_) => ContextKind::Index,
        }
    }
}

/// Which [`FitContext`] variant a fit function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Voxel,
    Block,
    Index,
}

impl ContextKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ContextKind::Voxel => "voxel",
            ContextKind::Block => "block",
            ContextKind::Index => "index",
        }
    }
}

/// Solver settings shared by every fit a fit function performs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Solver patience: at most `max_iterations * (NV + 1)` evaluations.
    pub max_iterations: usize,
    /// Stop when the relative decrease of the cost falls below this.
    pub function_tolerance: f64,
    /// Stop when every Jacobian column is this close to orthogonal to the
    /// residual vector.
    pub gradient_tolerance: f64,
    /// Stop when the trust region is this small relative to the parameters.
    pub parameter_tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            function_tolerance: 1e-6,
            gradient_tolerance: 1e-7,
            parameter_tolerance: 1e-5,
        }
    }
}

impl FitOptions {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<(), FitError> {
        if self.max_iterations == 0 {
            return Err(FitError::InvalidOption(
                "max_iterations must be >= 1".to_string(),
            ));
        }
        let tolerances = [
            ("function_tolerance", self.function_tolerance),
            ("gradient_tolerance", self.gradient_tolerance),
            ("parameter_tolerance", self.parameter_tolerance),
        ];
        for (name, value) in tolerances {
            if !(value.is_finite() && value > 0.0) {
                return Err(FitError::InvalidOption(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Input for one voxel fit.
#[derive(Debug, Clone)]
pub struct FitRequest {
    /// One data vector per input channel, in model channel order.
    pub inputs: Vec<DVector<f64>>,
    /// Per-voxel fixed parameters (length NF).
    pub fixed: DVector<f64>,
    /// Fill [`FitResult::covariance`].
    pub want_covariance: bool,
    /// Fill [`FitResult::residuals`].
    pub want_residuals: bool,
}

impl FitRequest {
    pub fn new(inputs: Vec<DVector<f64>>, fixed: DVector<f64>) -> Self {
        Self {
            inputs,
            fixed,
            want_covariance: false,
            want_residuals: false,
        }
    }

    /// Single-channel request with no fixed parameters.
    pub fn single(data: DVector<f64>) -> Self {
        Self::new(vec![data], DVector::zeros(0))
    }

    pub fn with_covariance(mut self) -> Self {
        self.want_covariance = true;
        self
    }

    pub fn with_residuals(mut self) -> Self {
        self.want_residuals = true;
        self
    }
}

/// Residuals of one fitted input channel, `observed - signal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelResiduals {
    /// Index into [`FitRequest::inputs`].
    pub channel: usize,
    pub values: DVector<f64>,
}

/// Output of one voxel fit.
///
/// When `success` is false only `message` is meaningful; the numeric fields
/// hold whatever the failing strategy left there (zeros for a degenerate
/// scaled fit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub success: bool,
    pub message: String,
    /// Fitted varying parameters (length NV).
    pub parameters: DVector<f64>,
    /// Packed relative standard errors and correlations, see [`covariance_len`].
    pub covariance: Option<DVector<f64>>,
    pub rmse: f64,
    /// Residuals of each fitted input channel, tagged with its index.
    pub residuals: Option<Vec<ChannelResiduals>>,
    /// Solver evaluation count.
    pub flag: i64,
}

impl FitResult {
    /// A failed fit carrying only a diagnostic.
    pub fn failed(nv: usize, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            parameters: DVector::zeros(nv),
            covariance: None,
            rmse: 0.0,
            residuals: None,
            flag: 0,
        }
    }
}
