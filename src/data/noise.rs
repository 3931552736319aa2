//! Synthetic data: model signals with Gaussian noise.
//!
//! The fit path never draws random numbers. These helpers exist for
//! simulation and for checking fits against known truth, and take their
//! randomness as an argument so results are reproducible under a seeded
//! `StdRng`.
//!
//! For callers that do not want to manage seeds there is one process-wide
//! seed source: a `StdRng` seeded from OS entropy on first use. Every draw
//! from it happens under a mutex, so concurrent callers each get a distinct
//! value from a single sequence.

use std::sync::{Mutex, OnceLock};

use nalgebra::DVector;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::FitError;
use crate::models::Model;

static SEED_SOURCE: OnceLock<Mutex<StdRng>> = OnceLock::new();

/// Draw a seed from the process-wide source.
pub fn random_seed() -> u64 {
    let source = SEED_SOURCE.get_or_init(|| Mutex::new(StdRng::from_entropy()));
    // Poisoning is ignored: a draw either completed or never touched the state.
    let mut rng = source.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    rng.next_u64()
}

/// A fresh generator seeded from [`random_seed`].
pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(random_seed())
}

/// `signal` plus independent `N(0, sigma²)` noise on every sample.
///
/// `sigma == 0` returns the signal unchanged.
pub fn add_noise<R: Rng + ?Sized>(
    signal: &DVector<f64>,
    sigma: f64,
    rng: &mut R,
) -> Result<DVector<f64>, FitError> {
    if !(sigma.is_finite() && sigma >= 0.0) {
        return Err(FitError::InvalidNoise(sigma));
    }
    if sigma == 0.0 {
        return Ok(signal.clone());
    }
    let normal = Normal::new(0.0, sigma).map_err(|_| FitError::InvalidNoise(sigma))?;
    Ok(signal.map(|s| s + normal.sample(rng)))
}

/// Noisy synthetic data for `model` at the given parameters.
pub fn simulate<M: Model, R: Rng + ?Sized>(
    model: &M,
    varying: &DVector<f64>,
    fixed: &DVector<f64>,
    sigma: f64,
    rng: &mut R,
) -> Result<DVector<f64>, FitError> {
    if varying.len() != model.nv() {
        return Err(FitError::LengthMismatch {
            what: "varying parameters".to_string(),
            expected: model.nv(),
            actual: varying.len(),
        });
    }
    if fixed.len() != model.nf() {
        return Err(FitError::LengthMismatch {
            what: "fixed parameters".to_string(),
            expected: model.nf(),
            actual: fixed.len(),
        });
    }
    add_noise(&model.signal(varying, fixed), sigma, rng)
}
