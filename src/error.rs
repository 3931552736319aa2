use thiserror::Error;

/// Configuration errors: the caller misused the engine.
///
/// Data pathologies (non-convergence, non-positive data in a scaled fit) are
/// not errors; they come back as a [`crate::domain::FitResult`] with
/// `success == false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("model declares no varying parameters")]
    NoVaryingParameters,

    #[error("model declares no input channels")]
    NoInputChannels,

    #[error("{what} has length {actual}, expected {expected}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("bounds for parameter '{name}' are invalid: [{lower}, {upper}]")]
    InvalidBounds { name: String, lower: f64, upper: f64 },

    #[error("start value {value} for parameter '{name}' lies outside [{lower}, {upper}]")]
    StartOutOfBounds {
        name: String,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("expected {expected} input channels, got {actual}")]
    ChannelCount { expected: usize, actual: usize },

    #[error("input channel {channel} has {actual} samples, model expects {expected}")]
    ChannelLength {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    #[error("signal returned {actual} values for {expected} data points")]
    SignalLength { expected: usize, actual: usize },

    #[error("{fitter} fit cannot be called with a {context} context")]
    ContextMismatch {
        fitter: &'static str,
        context: &'static str,
    },

    #[error("invalid fit option: {0}")]
    InvalidOption(String),

    #[error("invalid noise level: {0}")]
    InvalidNoise(f64),
}
