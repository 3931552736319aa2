//! Bounded least squares on top of the `levenberg_marquardt` crate.
//!
//! Minimises `½‖r(x)‖²` subject to `lower ≤ x ≤ upper`. The crate runs the
//! MINPACK trust-region loop; the box is imposed by the adapter, which projects
//! every parameter vector the loop proposes before the residuals or the
//! Jacobian are evaluated. The lowest-cost projected point seen is what the
//! solve returns, so a rejected trial never leaks out.
//!
//! The three tolerances map directly onto the crate's `ftol`, `gtol` and
//! `xtol`, and the iteration cap onto its patience.

use std::cell::RefCell;

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt, TerminationReason};
use nalgebra::{DMatrix, DVector, Dyn, storage::Owned};

use crate::domain::FitOptions;

/// A residual vector and its Jacobian as functions of the parameters.
pub trait NllsProblem {
    fn residuals(&self, x: &DVector<f64>) -> DVector<f64>;

    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64>;

    /// Residuals and Jacobian at `x`; override when both come from one pass.
    fn linearize(&self, x: &DVector<f64>) -> (DVector<f64>, DMatrix<f64>) {
        (self.residuals(x), self.jacobian(x))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Patience: the loop gives up after `max_iterations * (n + 1)` evaluations.
    pub max_iterations: usize,
    pub function_tolerance: f64,
    pub gradient_tolerance: f64,
    pub parameter_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self::from(&FitOptions::default())
    }
}

impl From<&FitOptions> for SolverOptions {
    fn from(opts: &FitOptions) -> Self {
        Self {
            max_iterations: opts.max_iterations,
            function_tolerance: opts.function_tolerance,
            gradient_tolerance: opts.gradient_tolerance,
            parameter_tolerance: opts.parameter_tolerance,
        }
    }
}

/// Why the solver stopped.
#[derive(Debug)]
pub enum Termination {
    Solver(TerminationReason),
    /// Residuals at the projected start were not finite; the loop never ran.
    NonFiniteStart,
}

impl Termination {
    /// Whether the final parameters can be used.
    pub fn is_usable(&self) -> bool {
        match self {
            Termination::Solver(reason) => {
                reason.was_successful()
                    || matches!(
                        reason,
                        TerminationReason::LostPatience
                            | TerminationReason::NoImprovementPossible(_)
                    )
            }
            Termination::NonFiniteStart => false,
        }
    }

    pub fn is_converged(&self) -> bool {
        match self {
            Termination::Solver(reason) => reason.was_successful(),
            Termination::NonFiniteStart => false,
        }
    }

    pub fn description(&self) -> String {
        match self {
            Termination::Solver(reason) => format!("{reason:?}"),
            Termination::NonFiniteStart => {
                "Residual evaluation failed at the initial point.".to_string()
            }
        }
    }
}

#[derive(Debug)]
pub struct SolveReport {
    pub x: DVector<f64>,
    pub evaluations: usize,
    pub initial_cost: f64,
    pub final_cost: f64,
    pub termination: Termination,
}

impl SolveReport {
    pub fn is_usable(&self) -> bool {
        self.termination.is_usable()
    }

    /// Multi-line diagnostic, used as the message of a failed fit.
    pub fn full_report(&self) -> String {
        let status = if self.termination.is_converged() {
            "CONVERGENCE"
        } else if self.termination.is_usable() {
            "NO_CONVERGENCE"
        } else {
            "FAILURE"
        };
        format!(
            "Bounded Levenberg-Marquardt report\n\
             parameters: {}\n\
             initial cost: {:e}\n\
             final cost: {:e}\n\
             evaluations: {}\n\
             termination: {} ({})",
            self.x.len(),
            self.initial_cost,
            self.final_cost,
            self.evaluations,
            status,
            self.termination.description(),
        )
    }
}

/// Projects parameters into the box and remembers the best point evaluated.
struct BoxedProblem<'a, P: NllsProblem> {
    problem: &'a P,
    lower: &'a [f64],
    upper: &'a [f64],
    params: DVector<f64>,
    best: RefCell<Option<(f64, DVector<f64>)>>,
}

impl<P: NllsProblem> BoxedProblem<'_, P> {
    fn record(&self, residuals: &DVector<f64>) {
        let cost = 0.5 * residuals.norm_squared();
        if !cost.is_finite() {
            return;
        }
        let mut best = self.best.borrow_mut();
        if best.as_ref().is_none_or(|(c, _)| cost < *c) {
            *best = Some((cost, self.params.clone()));
        }
    }
}

impl<P: NllsProblem> LeastSquaresProblem<f64, Dyn, Dyn> for BoxedProblem<'_, P> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.params = project(x, self.lower, self.upper);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let r = self.problem.residuals(&self.params);
        self.record(&r);
        Some(r)
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        Some(self.problem.jacobian(&self.params))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoundedLevenbergMarquardt {
    pub options: SolverOptions,
}

impl BoundedLevenbergMarquardt {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    pub fn solve<P: NllsProblem>(
        &self,
        problem: &P,
        x0: &DVector<f64>,
        lower: &[f64],
        upper: &[f64],
    ) -> SolveReport {
        let opts = &self.options;
        debug_assert_eq!(lower.len(), x0.len());
        debug_assert_eq!(upper.len(), x0.len());

        let start = project(x0, lower, upper);
        let initial_cost = 0.5 * problem.residuals(&start).norm_squared();
        if !initial_cost.is_finite() {
            return finish(SolveReport {
                x: start,
                evaluations: 1,
                initial_cost,
                final_cost: initial_cost,
                termination: Termination::NonFiniteStart,
            });
        }

        let lm = LevenbergMarquardt::new()
            .with_ftol(opts.function_tolerance)
            .with_xtol(opts.parameter_tolerance)
            .with_gtol(opts.gradient_tolerance)
            .with_patience(opts.max_iterations.max(1));

        let wrapper = BoxedProblem {
            problem,
            lower,
            upper,
            params: start.clone(),
            best: RefCell::new(None),
        };
        let (wrapper, report) = lm.minimize(wrapper);

        let (final_cost, x) = wrapper
            .best
            .into_inner()
            .unwrap_or((initial_cost, start));

        finish(SolveReport {
            x,
            evaluations: report.number_of_evaluations,
            initial_cost,
            final_cost,
            termination: Termination::Solver(report.termination),
        })
    }
}

fn finish(report: SolveReport) -> SolveReport {
    log::debug!(
        "solver finished after {} evaluations: {} (cost {:e} -> {:e})",
        report.evaluations,
        report.termination.description(),
        report.initial_cost,
        report.final_cost
    );
    report
}

/// Clamp `x` into the box `[lower, upper]`.
pub fn project(x: &DVector<f64>, lower: &[f64], upper: &[f64]) -> DVector<f64> {
    DVector::from_fn(x.len(), |i, _| x[i].max(lower[i]).min(upper[i]))
}
