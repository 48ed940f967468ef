//! Constrained global minimization.
//!
//! Purpose
//! - Keep the search strategy behind the `Minimizer` trait so the splitter
//!   only hands over an objective, box bounds, optional linear inequality
//!   constraints and a starting guess.
//! - Ship `DifferentialEvolution` as the default: a population search that
//!   needs no gradients, which matters because the split objective is
//!   piecewise constant in its (truncated) decision variables.

mod de;
mod types;

pub use de::{DeCfg, DifferentialEvolution};
pub use types::{LinearConstraint, MinimizeError, Minimizer, Minimum, Problem};

#[cfg(test)]
mod tests;
