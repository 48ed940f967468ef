//! Translating target weights into a minimization problem over cut positions.

use nalgebra::{DMatrix, DVector};

use crate::optimize::{LinearConstraint, Problem};

/// Proportional seed: `floor(cumsum(weights[..k-1]) × n)`.
pub fn initial_splits(weights: &[f64], cells: usize) -> Vec<usize> {
    let mut acc = 0.0;
    weights
        .iter()
        .take(weights.len().saturating_sub(1))
        .map(|w| {
            acc += w;
            to_index(acc * cells as f64, cells)
        })
        .collect()
}

/// `x_j − x_{j+1} ≤ −1` for every adjacent pair; `None` for fewer than two cuts.
pub fn ordering_constraint(cuts: usize) -> Option<LinearConstraint> {
    if cuts < 2 {
        return None;
    }
    let rows = cuts - 1;
    let mut a = DMatrix::zeros(rows, cuts);
    for r in 0..rows {
        a[(r, r)] = 1.0;
        a[(r, r + 1)] = -1.0;
    }
    Some(LinearConstraint {
        a,
        lb: DVector::from_element(rows, f64::NEG_INFINITY),
        ub: DVector::from_element(rows, -1.0),
    })
}

/// Search box `[0, n]` per cut, ordering constraint and proportional seed.
///
/// `None` when there is nothing to cut (a single weight).
pub fn split_problem(weights: &[f64], cells: usize) -> Option<Problem> {
    let cuts = weights.len().checked_sub(1).filter(|&c| c > 0)?;
    let x0 = initial_splits(weights, cells);
    Some(Problem {
        bounds: vec![(0.0, cells as f64); cuts],
        constraints: ordering_constraint(cuts),
        x0: Some(DVector::from_iterator(
            cuts,
            x0.into_iter().map(|s| s as f64),
        )),
    })
}

/// Truncate toward zero and clamp into `[0, n]`.
#[inline]
fn to_index(v: f64, cells: usize) -> usize {
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        (v.trunc() as usize).min(cells)
    }
}

/// Real-valued search point → integer cut positions.
pub fn truncate_splits(x: &DVector<f64>, cells: usize) -> Vec<usize> {
    x.iter().map(|&v| to_index(v, cells)).collect()
}

/// Mean absolute deviation between target weights and achieved area fractions.
pub fn area_deviation(weights: &[f64], areas: &[f64], total: f64) -> f64 {
    if weights.is_empty() {
        return 0.0;
    }
    let sum: f64 = weights
        .iter()
        .zip(areas)
        .map(|(w, a)| (w - a / total).abs())
        .sum();
    sum / weights.len() as f64
}

/// Whether cut positions are strictly increasing.
pub fn is_strictly_increasing(splits: &[usize]) -> bool {
    splits.windows(2).all(|w| w[0] < w[1])
}
