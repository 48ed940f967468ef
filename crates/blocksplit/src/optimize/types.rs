//! Problem description and the `Minimizer` seam.

use std::fmt;

use nalgebra::{DMatrix, DVector};

/// Linear inequality constraints `lb <= A x <= ub` (row-wise; bounds may be infinite).
#[derive(Clone, Debug)]
pub struct LinearConstraint {
    pub a: DMatrix<f64>,
    pub lb: DVector<f64>,
    pub ub: DVector<f64>,
}

impl LinearConstraint {
    /// Per-row violation `max(0, lb - Ax, Ax - ub)`.
    pub fn violation(&self, x: &DVector<f64>) -> DVector<f64> {
        let ax = &self.a * x;
        DVector::from_fn(ax.len(), |i, _| {
            let below = self.lb[i] - ax[i];
            let above = ax[i] - self.ub[i];
            below.max(above).max(0.0)
        })
    }
}

/// Box-bounded problem with optional linear constraints and initial guess.
#[derive(Clone, Debug)]
pub struct Problem {
    /// `(lo, hi)` per decision variable.
    pub bounds: Vec<(f64, f64)>,
    pub constraints: Option<LinearConstraint>,
    pub x0: Option<DVector<f64>>,
}

impl Problem {
    #[inline]
    pub fn dims(&self) -> usize {
        self.bounds.len()
    }

    /// Reject empty, inverted or non-finite boxes and mis-shaped companions.
    pub fn check(&self) -> Result<(), MinimizeError> {
        let n = self.dims();
        if n == 0 {
            return Err(MinimizeError::EmptyProblem);
        }
        for (dim, &(lo, hi)) in self.bounds.iter().enumerate() {
            if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                return Err(MinimizeError::InvalidBounds { dim, lo, hi });
            }
        }
        if let Some(x0) = &self.x0 {
            if x0.len() != n {
                return Err(MinimizeError::DimensionMismatch {
                    what: "x0",
                    expected: n,
                    got: x0.len(),
                });
            }
        }
        if let Some(c) = &self.constraints {
            if c.a.ncols() != n {
                return Err(MinimizeError::DimensionMismatch {
                    what: "constraint columns",
                    expected: n,
                    got: c.a.ncols(),
                });
            }
            let rows = c.a.nrows();
            if c.lb.len() != rows || c.ub.len() != rows {
                return Err(MinimizeError::DimensionMismatch {
                    what: "constraint bounds",
                    expected: rows,
                    got: c.lb.len().min(c.ub.len()),
                });
            }
        }
        Ok(())
    }
}

/// Outcome of a minimization run.
#[derive(Clone, Debug)]
pub struct Minimum {
    pub x: DVector<f64>,
    pub value: f64,
    /// Whether `x` satisfies every constraint.
    pub feasible: bool,
    pub generations: usize,
    pub evaluations: usize,
    pub converged: bool,
}

/// Errors raised by minimizers before the search starts.
#[derive(Debug, Clone, PartialEq)]
pub enum MinimizeError {
    EmptyProblem,
    InvalidBounds { dim: usize, lo: f64, hi: f64 },
    DimensionMismatch { what: &'static str, expected: usize, got: usize },
}

impl fmt::Display for MinimizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinimizeError::EmptyProblem => write!(f, "problem has no decision variables"),
            MinimizeError::InvalidBounds { dim, lo, hi } => {
                write!(f, "invalid bounds [{lo}, {hi}] for variable {dim}")
            }
            MinimizeError::DimensionMismatch {
                what,
                expected,
                got,
            } => write!(f, "{what}: expected dimension {expected}, got {got}"),
        }
    }
}

impl std::error::Error for MinimizeError {}

/// Pluggable constrained global minimizer.
///
/// Implementations treat `objective` as a pure function of `x`.
pub trait Minimizer {
    fn minimize(
        &mut self,
        objective: &dyn Fn(&DVector<f64>) -> f64,
        problem: &Problem,
    ) -> Result<Minimum, MinimizeError>;
}
