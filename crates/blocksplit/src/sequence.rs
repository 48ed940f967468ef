//! Spatial ordering of cells by graph distance from an extremal cell.
//!
//! Model
//! - All-pairs shortest paths (Floyd–Warshall) over the adjacency costs.
//! - The farthest pair (largest finite distance; first in row-major order on
//!   ties) picks the start cell; cells are then sorted by their distance from
//!   it, ties by index.
//! - A disconnected graph has no well-defined farthest pair and is an error.

use std::fmt;

use nalgebra::DMatrix;
use tracing::debug;

use crate::adjacency::AdjacencyGraph;

/// Errors surfaced by the sequencer.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceError {
    /// No cells to order.
    Empty,
    /// Some pair of cells is unreachable; names the first such pair.
    Disconnected { from: usize, to: usize },
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::Empty => write!(f, "cannot order an empty cell set"),
            SequenceError::Disconnected { from, to } => write!(
                f,
                "adjacency graph is disconnected (cell {to} unreachable from cell {from}); farthest pair is undefined"
            ),
        }
    }
}

impl std::error::Error for SequenceError {}

/// Result of sequencing: the start cell, its distance row and the visiting order.
#[derive(Clone, Debug)]
pub struct SpatialOrder {
    pub start: usize,
    /// Largest pairwise shortest-path distance.
    pub diameter: f64,
    /// Distance of every cell from `start`, indexed by cell.
    pub distance: Vec<f64>,
    /// Cell indices sorted by `distance` (stable on index).
    pub order: Vec<usize>,
}

/// Floyd–Warshall over a cost matrix where `+∞` (or any non-finite entry) means no edge.
pub fn all_pairs_shortest_paths(costs: &DMatrix<f64>) -> DMatrix<f64> {
    let n = costs.nrows();
    let mut d = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            0.0
        } else {
            let c = costs[(i, j)];
            if c.is_finite() {
                c
            } else {
                f64::INFINITY
            }
        }
    });
    for k in 0..n {
        for i in 0..n {
            let dik = d[(i, k)];
            if !dik.is_finite() {
                continue;
            }
            for j in 0..n {
                let via = dik + d[(k, j)];
                if via < d[(i, j)] {
                    d[(i, j)] = via;
                }
            }
        }
    }
    d
}

/// First pair `(i, j)` in row-major order achieving the maximum distance.
fn farthest_pair(dist: &DMatrix<f64>) -> Result<(usize, usize, f64), SequenceError> {
    let n = dist.nrows();
    let mut best = (0, 0, f64::NEG_INFINITY);
    for i in 0..n {
        for j in 0..n {
            let d = dist[(i, j)];
            if !d.is_finite() {
                return Err(SequenceError::Disconnected { from: i, to: j });
            }
            if d > best.2 {
                best = (i, j, d);
            }
        }
    }
    Ok(best)
}

/// Order cells by graph distance from one end of the farthest pair.
pub fn spatial_order(graph: &AdjacencyGraph) -> Result<SpatialOrder, SequenceError> {
    if graph.is_empty() {
        return Err(SequenceError::Empty);
    }
    let dist = all_pairs_shortest_paths(&graph.cost_matrix());
    let (start, end, diameter) = farthest_pair(&dist)?;
    let distance: Vec<f64> = dist.row(start).iter().copied().collect();
    let mut order: Vec<usize> = (0..graph.len()).collect();
    order.sort_by(|&a, &b| distance[a].total_cmp(&distance[b]));
    debug!(start, end, diameter, "sequenced cells");
    Ok(SpatialOrder {
        start,
        diameter,
        distance,
        order,
    })
}
