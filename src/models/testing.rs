//! Reference models used by the unit tests.

use nalgebra::{DVector, RealField, convert};

use super::Model;

/// `S(t) = A * exp(-R * t)` sampled at fixed times.
#[derive(Debug, Clone)]
pub(crate) struct MonoExp {
    pub times: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub start: Vec<f64>,
    /// Number of equally sized input channels.
    pub channels: usize,
}

impl MonoExp {
    /// Five frames at t = 0..4, A in [0, 1000], R in [0, 5], start [1, 1].
    pub fn scenario() -> Self {
        Self::with_times((0..5).map(f64::from).collect())
    }

    pub fn with_times(times: Vec<f64>) -> Self {
        Self {
            times,
            lower: vec![0.0, 0.0],
            upper: vec![1000.0, 5.0],
            start: vec![1.0, 1.0],
            channels: 1,
        }
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn exact(&self, amplitude: f64, rate: f64) -> DVector<f64> {
        self.signal(&DVector::from_vec(vec![amplitude, rate]), &DVector::zeros(0))
    }
}

impl Model for MonoExp {
    fn varying_names(&self) -> &[&'static str] {
        &["A", "R"]
    }

    fn derived_names(&self) -> &[&'static str] {
        &["T"]
    }

    fn input_count(&self) -> usize {
        self.channels
    }

    fn input_size(&self, _channel: usize) -> usize {
        self.times.len()
    }

    fn lower_bounds(&self) -> &[f64] {
        &self.lower
    }

    fn upper_bounds(&self) -> &[f64] {
        &self.upper
    }

    fn start(&self) -> &[f64] {
        &self.start
    }

    fn signal<T: RealField>(&self, varying: &DVector<T>, _fixed: &DVector<f64>) -> DVector<T> {
        let a = &varying[0];
        let r = &varying[1];
        DVector::from_iterator(
            self.times.len(),
            self.times
                .iter()
                .map(|&t| a.clone() * (-(r.clone() * convert::<f64, T>(t))).exp()),
        )
    }

    fn derived(&self, varying: &DVector<f64>, _fixed: &DVector<f64>) -> DVector<f64> {
        DVector::from_element(1, 1.0 / varying[1])
    }
}

/// Two input channels; only channel 0 is modelled: `S(t) = g * (a + b * t)`
/// with the gain `g` supplied as a fixed parameter.
#[derive(Debug, Clone)]
pub(crate) struct TwoChannel {
    lower: Vec<f64>,
    upper: Vec<f64>,
    start: Vec<f64>,
}

impl Default for TwoChannel {
    fn default() -> Self {
        Self {
            lower: vec![-10.0, -10.0],
            upper: vec![10.0, 10.0],
            start: vec![0.0, 0.0],
        }
    }
}

impl Model for TwoChannel {
    fn varying_names(&self) -> &[&'static str] {
        &["a", "b"]
    }

    fn fixed_names(&self) -> &[&'static str] {
        &["gain"]
    }

    fn input_count(&self) -> usize {
        2
    }

    fn input_size(&self, channel: usize) -> usize {
        if channel == 0 { 4 } else { 2 }
    }

    fn lower_bounds(&self) -> &[f64] {
        &self.lower
    }

    fn upper_bounds(&self) -> &[f64] {
        &self.upper
    }

    fn start(&self) -> &[f64] {
        &self.start
    }

    fn signal<T: RealField>(&self, varying: &DVector<T>, fixed: &DVector<f64>) -> DVector<T> {
        let g = convert::<f64, T>(fixed[0]);
        DVector::from_fn(4, |i, _| {
            g.clone() * (varying[0].clone() + varying[1].clone() * convert::<f64, T>(i as f64))
        })
    }
}

/// Channels of 4 and 3 samples; the signal `a + b * i` covers the 3-sample
/// channel, which a blocked fit selects explicitly.
#[derive(Debug, Clone)]
pub(crate) struct Staggered {
    lower: Vec<f64>,
    upper: Vec<f64>,
    start: Vec<f64>,
}

impl Default for Staggered {
    fn default() -> Self {
        Self {
            lower: vec![-10.0, -10.0],
            upper: vec![10.0, 10.0],
            start: vec![0.0, 0.0],
        }
    }
}

impl Model for Staggered {
    fn varying_names(&self) -> &[&'static str] {
        &["a", "b"]
    }

    fn input_count(&self) -> usize {
        2
    }

    fn input_size(&self, channel: usize) -> usize {
        if channel == 0 { 4 } else { 3 }
    }

    fn lower_bounds(&self) -> &[f64] {
        &self.lower
    }

    fn upper_bounds(&self) -> &[f64] {
        &self.upper
    }

    fn start(&self) -> &[f64] {
        &self.start
    }

    fn signal<T: RealField>(&self, varying: &DVector<T>, _fixed: &DVector<f64>) -> DVector<T> {
        DVector::from_fn(3, |i, _| {
            varying[0].clone() + varying[1].clone() * convert::<f64, T>(i as f64)
        })
    }
}

/// A model whose signal is never finite.
#[derive(Debug, Clone)]
pub(crate) struct NotANumber;

impl Model for NotANumber {
    fn varying_names(&self) -> &[&'static str] {
        &["x"]
    }

    fn input_size(&self, _channel: usize) -> usize {
        3
    }

    fn lower_bounds(&self) -> &[f64] {
        &[0.0]
    }

    fn upper_bounds(&self) -> &[f64] {
        &[1.0]
    }

    fn start(&self) -> &[f64] {
        &[0.5]
    }

    fn signal<T: RealField>(&self, varying: &DVector<T>, _fixed: &DVector<f64>) -> DVector<T> {
        let nan = convert::<f64, T>(f64::NAN);
        DVector::from_element(3, varying[0].clone() * nan)
    }
}
