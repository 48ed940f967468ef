//! Segment assembly: contiguous runs of ordered cells → sub-regions.
//!
//! Cut vector `s` of length `k-1` yields segments `[0, s₀)`, `[s₀, s₁)`, …,
//! `[s_{k-2}, n)` over the spatial order. Non-increasing cuts collapse: a cut
//! below an earlier one is lifted to it, so the affected segment is empty and
//! every cell still lands in exactly one segment.

use std::fmt;
use std::ops::Range;

use geo::{BooleanOps, MultiPolygon};

use crate::geom::Cell;

/// Malformed cut vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidSplitError {
    WrongCount { expected: usize, got: usize },
    OutOfRange { position: usize, value: usize, cells: usize },
}

impl fmt::Display for InvalidSplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidSplitError::WrongCount { expected, got } => {
                write!(f, "need {expected} split indices, got {got}")
            }
            InvalidSplitError::OutOfRange {
                position,
                value,
                cells,
            } => write!(
                f,
                "split index {value} at position {position} exceeds cell count {cells}"
            ),
        }
    }
}

impl std::error::Error for InvalidSplitError {}

/// Cells in spatial order plus prefix sums of their areas.
#[derive(Clone, Debug)]
pub struct OrderedCells {
    cells: Vec<Cell>,
    /// `prefix[i]` = total area of the first `i` ordered cells.
    prefix: Vec<f64>,
}

impl OrderedCells {
    /// Reorder `cells` by `order` (a permutation of cell indices).
    pub fn new(cells: &[Cell], order: &[usize]) -> Self {
        let cells: Vec<Cell> = order.iter().map(|&i| cells[i].clone()).collect();
        let mut prefix = Vec::with_capacity(cells.len() + 1);
        prefix.push(0.0);
        let mut acc = 0.0;
        for c in &cells {
            acc += c.area;
            prefix.push(acc);
        }
        Self { cells, prefix }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in spatial order.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Sum of all cell areas.
    #[inline]
    pub fn total_area(&self) -> f64 {
        self.prefix[self.cells.len()]
    }

    /// Check `splits` against `segments` and the cell count.
    pub fn validate(&self, splits: &[usize], segments: usize) -> Result<(), InvalidSplitError> {
        let expected = segments.saturating_sub(1);
        if splits.len() != expected {
            return Err(InvalidSplitError::WrongCount {
                expected,
                got: splits.len(),
            });
        }
        let n = self.len();
        if let Some((position, &value)) = splits.iter().enumerate().find(|&(_, &v)| v > n) {
            return Err(InvalidSplitError::OutOfRange {
                position,
                value,
                cells: n,
            });
        }
        Ok(())
    }

    /// Position ranges of each segment; collapsed cuts give empty ranges.
    pub fn segment_ranges(&self, splits: &[usize]) -> Vec<Range<usize>> {
        let mut ranges = Vec::with_capacity(splits.len() + 1);
        let mut begin = 0;
        for &s in splits {
            let end = s.max(begin);
            ranges.push(begin..end);
            begin = end;
        }
        ranges.push(begin..self.len());
        ranges
    }

    /// Area of each segment without building geometry (cells are disjoint).
    pub fn segment_areas(
        &self,
        splits: &[usize],
        segments: usize,
    ) -> Result<Vec<f64>, InvalidSplitError> {
        self.validate(splits, segments)?;
        Ok(self
            .segment_ranges(splits)
            .into_iter()
            .map(|r| self.prefix[r.end] - self.prefix[r.start])
            .collect())
    }

    /// Union each segment's cells into one (possibly empty) sub-region.
    pub fn assemble(
        &self,
        splits: &[usize],
        segments: usize,
    ) -> Result<Vec<MultiPolygon<f64>>, InvalidSplitError> {
        self.validate(splits, segments)?;
        Ok(self
            .segment_ranges(splits)
            .into_iter()
            .map(|r| union_cells(&self.cells[r]))
            .collect())
    }
}

fn union_cells(cells: &[Cell]) -> MultiPolygon<f64> {
    cells
        .iter()
        .fold(MultiPolygon::new(vec![]), |acc, c| acc.union(&c.shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, Area};
    use proptest::prelude::*;

    use crate::geom::shapes::square;

    /// A 1×n strip of unit squares, ordered left to right.
    fn strip(n: usize) -> OrderedCells {
        let cells: Vec<Cell> = (0..n)
            .map(|i| Cell::new(i, square(coord! { x: i as f64 + 0.5, y: 0.5 }, 1.0)))
            .collect();
        let order: Vec<usize> = (0..n).collect();
        OrderedCells::new(&cells, &order)
    }

    #[test]
    fn reorders_by_permutation() {
        let cells: Vec<Cell> = (0..3)
            .map(|i| Cell::new(i, square(coord! { x: i as f64, y: 0.0 }, 1.0 + i as f64)))
            .collect();
        let oc = OrderedCells::new(&cells, &[2, 0, 1]);
        let idx: Vec<usize> = oc.cells().iter().map(|c| c.index).collect();
        assert_eq!(idx, vec![2, 0, 1]);
        assert!((oc.total_area() - (1.0 + 4.0 + 9.0)).abs() < 1e-12);
    }

    #[test]
    fn segments_follow_cuts() {
        let oc = strip(10);
        let areas = oc.segment_areas(&[3, 7], 3).unwrap();
        assert_eq!(areas, vec![3.0, 4.0, 3.0]);
        let shapes = oc.assemble(&[3, 7], 3).unwrap();
        assert_eq!(shapes.len(), 3);
        for (s, a) in shapes.iter().zip(&areas) {
            assert!((s.unsigned_area() - a).abs() < 1e-6);
        }
        // A run of edge-adjacent squares merges into one polygon.
        assert_eq!(shapes[1].0.len(), 1);
    }

    #[test]
    fn collapsed_cuts_give_empty_segments() {
        let oc = strip(10);
        assert_eq!(oc.segment_areas(&[4, 4], 3).unwrap(), vec![4.0, 0.0, 6.0]);
        // Decreasing cut is lifted to the previous one.
        assert_eq!(oc.segment_areas(&[6, 2], 3).unwrap(), vec![6.0, 0.0, 4.0]);
        let shapes = oc.assemble(&[0, 10], 3).unwrap();
        assert!(shapes[0].0.is_empty());
        assert!(shapes[2].0.is_empty());
        assert!((shapes[1].unsigned_area() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn malformed_cuts_are_rejected() {
        let oc = strip(5);
        assert_eq!(
            oc.segment_areas(&[1], 3).unwrap_err(),
            InvalidSplitError::WrongCount {
                expected: 2,
                got: 1
            }
        );
        assert_eq!(
            oc.assemble(&[2, 6], 3).unwrap_err(),
            InvalidSplitError::OutOfRange {
                position: 1,
                value: 6,
                cells: 5
            }
        );
        // Cut at n is allowed: the last segment is empty.
        assert_eq!(oc.segment_areas(&[5], 2).unwrap(), vec![5.0, 0.0]);
    }

    #[test]
    fn single_segment_takes_everything() {
        let oc = strip(4);
        assert_eq!(oc.segment_areas(&[], 1).unwrap(), vec![4.0]);
    }

    proptest! {
        #[test]
        fn segment_areas_conserve_total(cuts in prop::collection::vec(0usize..=12, 0..6)) {
            let oc = strip(12);
            let areas = oc.segment_areas(&cuts, cuts.len() + 1).unwrap();
            prop_assert_eq!(areas.len(), cuts.len() + 1);
            prop_assert!(areas.iter().all(|&a| a >= 0.0));
            let sum: f64 = areas.iter().sum();
            prop_assert!((sum - oc.total_area()).abs() < 1e-9);
        }
    }
}
