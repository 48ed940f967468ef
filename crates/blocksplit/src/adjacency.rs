//! Weighted adjacency between cells.
//!
//! Cells sharing an edge are joined with `EDGE_WEIGHT`, cells touching only at
//! a corner with the costlier `CORNER_WEIGHT`, so shortest paths prefer to walk
//! through full edges. Pair tests are quadratic in the cell count; cheap
//! bounding-box rejection keeps that affordable for typical cell sizes.

use std::fmt;

use nalgebra::DMatrix;
use tracing::debug;

use crate::geom::{polygon_intersection, Cell, Intersection};

/// Traversal cost between cells sharing a boundary segment.
pub const EDGE_WEIGHT: f64 = 1.0;
/// Traversal cost between cells touching at a point only.
pub const CORNER_WEIGHT: f64 = 1.5;

/// Errors surfaced while building the adjacency graph.
#[derive(Debug, Clone, PartialEq)]
pub enum AdjacencyError {
    /// Two cells share area, which a disjoint tiling never produces.
    Overlap { a: usize, b: usize, kind: &'static str },
    /// Two cells touch in several separate places, or along an edge and apart
    /// from it at a point.
    MixedContact { a: usize, b: usize },
}

impl fmt::Display for AdjacencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjacencyError::Overlap { a, b, kind } => {
                write!(f, "cells {a} and {b} overlap ({kind}); discretization is not disjoint")
            }
            AdjacencyError::MixedContact { a, b } => {
                write!(f, "cells {a} and {b} touch in several separate places")
            }
        }
    }
}

impl std::error::Error for AdjacencyError {}

/// `n × n` traversal-cost matrix; `0` means "no edge", the diagonal is `0`.
#[derive(Clone, Debug)]
pub struct AdjacencyGraph {
    pub weights: DMatrix<f64>,
}

impl AdjacencyGraph {
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        self.weights[(i, j)]
    }

    /// Costs with absent edges encoded as `+∞`, ready for shortest paths.
    pub fn cost_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.len(), self.len(), |i, j| {
            let w = self.weights[(i, j)];
            if i == j {
                0.0
            } else if w > 0.0 {
                w
            } else {
                f64::INFINITY
            }
        })
    }
}

/// Build the adjacency graph for `cells` with contact tolerance `eps`.
pub fn build_adjacency(cells: &[Cell], eps: f64) -> Result<AdjacencyGraph, AdjacencyError> {
    let n = cells.len();
    let mut weights = DMatrix::<f64>::zeros(n, n);
    let mut edges = 0usize;
    let mut corners = 0usize;
    for i in 0..n {
        // Intersection is symmetric; classify each unordered pair once.
        for j in (i + 1)..n {
            let w = match polygon_intersection(&cells[i].shape, &cells[j].shape, eps) {
                Intersection::Empty => continue,
                Intersection::Point => {
                    corners += 1;
                    CORNER_WEIGHT
                }
                Intersection::Line => {
                    edges += 1;
                    EDGE_WEIGHT
                }
                overlap @ (Intersection::Polygon(_) | Intersection::MultiPolygon(_)) => {
                    return Err(AdjacencyError::Overlap {
                        a: i,
                        b: j,
                        kind: overlap.kind(),
                    });
                }
                Intersection::Mixed => {
                    return Err(AdjacencyError::MixedContact { a: i, b: j });
                }
            };
            weights[(i, j)] = w;
            weights[(j, i)] = w;
        }
    }
    debug!(cells = n, edges, corners, "built adjacency graph");
    Ok(AdjacencyGraph { weights })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, polygon};

    use crate::geom::shapes::square;

    fn grid_cells(nx: usize, ny: usize) -> Vec<Cell> {
        let mut cells = Vec::new();
        for ix in 0..nx {
            for iy in 0..ny {
                let c = coord! { x: ix as f64 + 0.5, y: iy as f64 + 0.5 };
                cells.push(Cell::new(cells.len(), square(c, 1.0)));
            }
        }
        cells
    }

    #[test]
    fn grid_weights() {
        // Layout (x-major): 0=(0,0) 1=(0,1) 2=(1,0) 3=(1,1)
        let g = build_adjacency(&grid_cells(2, 2), 1e-9).unwrap();
        assert_eq!(g.len(), 4);
        assert_eq!(g.weight(0, 1), EDGE_WEIGHT);
        assert_eq!(g.weight(0, 2), EDGE_WEIGHT);
        assert_eq!(g.weight(0, 3), CORNER_WEIGHT);
        assert_eq!(g.weight(1, 2), CORNER_WEIGHT);
        for i in 0..4 {
            assert_eq!(g.weight(i, i), 0.0);
            for j in 0..4 {
                assert_eq!(g.weight(i, j), g.weight(j, i));
            }
        }
    }

    #[test]
    fn distant_cells_have_no_edge() {
        let cells = grid_cells(3, 1);
        let g = build_adjacency(&cells, 1e-9).unwrap();
        assert_eq!(g.weight(0, 2), 0.0);
        let c = g.cost_matrix();
        assert!(c[(0, 2)].is_infinite());
        assert_eq!(c[(0, 1)], EDGE_WEIGHT);
        assert_eq!(c[(1, 1)], 0.0);
    }

    #[test]
    fn partial_edge_counts_as_edge() {
        // Right neighbour spans only the upper half of the shared side.
        let a = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let b = polygon![(x: 1.0, y: 0.5), (x: 2.0, y: 0.5), (x: 2.0, y: 1.0), (x: 1.0, y: 1.0)];
        let g = build_adjacency(&[Cell::new(0, a), Cell::new(1, b)], 1e-9).unwrap();
        assert_eq!(g.weight(0, 1), EDGE_WEIGHT);
    }

    #[test]
    fn overlapping_cells_are_a_defect() {
        let a = square(coord! { x: 0.0, y: 0.0 }, 1.0);
        let b = square(coord! { x: 0.5, y: 0.5 }, 1.0);
        let err = build_adjacency(&[Cell::new(0, a), Cell::new(1, b)], 1e-9).unwrap_err();
        assert_eq!(
            err,
            AdjacencyError::Overlap {
                a: 0,
                b: 1,
                kind: "Polygon"
            }
        );
    }

    fn unit_square() -> geo::Polygon<f64> {
        polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)]
    }

    fn pair_error(b: geo::Polygon<f64>) -> AdjacencyError {
        build_adjacency(&[Cell::new(0, unit_square()), Cell::new(1, b)], 1e-9).unwrap_err()
    }

    #[test]
    fn coinciding_cells_are_a_defect() {
        assert_eq!(
            pair_error(unit_square()),
            AdjacencyError::Overlap {
                a: 0,
                b: 1,
                kind: "Polygon"
            }
        );
    }

    #[test]
    fn nested_cells_are_a_defect() {
        // Left half shares three sides with the unit square.
        let half = polygon![(x: 0.0, y: 0.0), (x: 0.5, y: 0.0), (x: 0.5, y: 1.0), (x: 0.0, y: 1.0)];
        assert!(matches!(
            pair_error(half),
            AdjacencyError::Overlap { kind: "Polygon", .. }
        ));
        // Strictly inside, no boundary contact at all.
        let inner = polygon![
            (x: 0.25, y: 0.25),
            (x: 0.75, y: 0.25),
            (x: 0.75, y: 0.75),
            (x: 0.25, y: 0.75),
        ];
        assert!(matches!(
            pair_error(inner),
            AdjacencyError::Overlap { kind: "Polygon", .. }
        ));
    }

    #[test]
    fn sliver_overlap_is_a_defect() {
        let sliver = polygon![
            (x: 1.0 - 1e-7, y: 0.25),
            (x: 2.0, y: 0.25),
            (x: 2.0, y: 0.75),
            (x: 1.0 - 1e-7, y: 0.75),
        ];
        let cells = [Cell::new(0, unit_square()), Cell::new(1, sliver)];
        assert!(build_adjacency(&cells, 1e-9).is_err());
    }

    #[test]
    fn edge_and_separate_corner_is_a_defect() {
        // Shares [0, 0.4] of the top side, then comes back down to the corner (1, 1).
        let b = polygon![
            (x: 0.0, y: 1.0),
            (x: 0.4, y: 1.0),
            (x: 0.7, y: 1.4),
            (x: 1.0, y: 1.0),
            (x: 1.2, y: 2.0),
            (x: 0.0, y: 2.0),
        ];
        assert_eq!(pair_error(b), AdjacencyError::MixedContact { a: 0, b: 1 });
    }
}
