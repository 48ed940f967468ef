//! Splitting session: `Unprepared → Prepared → Optimized`.

use std::fmt;

use geo::{Area, Geometry, MultiPolygon};
use nalgebra::DVector;
use tracing::{debug, warn};

use crate::adjacency::{build_adjacency, AdjacencyError};
use crate::assemble::{InvalidSplitError, OrderedCells};
use crate::discretize::{discretize, DiscretizeError};
use crate::geom::{Cell, GeomCfg, Region, RegionError};
use crate::optimize::{DeCfg, DifferentialEvolution, MinimizeError, Minimizer};
use crate::sequence::{spatial_order, SequenceError, SpatialOrder};

use super::weights::{area_deviation, is_strictly_increasing, split_problem, truncate_splits};

/// One output piece: the union of a contiguous run of ordered cells.
pub type SubRegion = MultiPolygon<f64>;

/// Session configuration.
#[derive(Clone, Copy, Debug)]
pub struct SplitCfg {
    /// Cell side as a fraction of the bounding box's shorter side, in `(0, 1)`.
    pub cell_fraction: f64,
    pub geom: GeomCfg,
    pub de: DeCfg,
}

impl Default for SplitCfg {
    fn default() -> Self {
        Self {
            cell_fraction: 0.05,
            geom: GeomCfg::default(),
            de: DeCfg::default(),
        }
    }
}

/// Errors surfaced by a splitting session.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitError {
    Region(RegionError),
    InvalidWeights { reason: &'static str },
    InvalidCellFraction(f64),
    Discretize(DiscretizeError),
    Adjacency(AdjacencyError),
    Sequence(SequenceError),
    InvalidSplit(InvalidSplitError),
    Minimize(MinimizeError),
    /// `prepare()` has not run.
    NotPrepared,
    /// `optimize()` has not produced cut positions yet.
    NotOptimized,
}

impl fmt::Display for SplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitError::Region(e) => write!(f, "invalid region: {e}"),
            SplitError::InvalidWeights { reason } => write!(f, "invalid weights: {reason}"),
            SplitError::InvalidCellFraction(b) => {
                write!(f, "cell fraction must be in (0, 1), got {b}")
            }
            SplitError::Discretize(e) => write!(f, "discretization failed: {e}"),
            SplitError::Adjacency(e) => write!(f, "adjacency failed: {e}"),
            SplitError::Sequence(e) => write!(f, "sequencing failed: {e}"),
            SplitError::InvalidSplit(e) => write!(f, "invalid split: {e}"),
            SplitError::Minimize(e) => write!(f, "optimization failed: {e}"),
            SplitError::NotPrepared => write!(f, "session is not prepared; call prepare() first"),
            SplitError::NotOptimized => write!(f, "splits are not optimized"),
        }
    }
}

impl std::error::Error for SplitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SplitError::Region(e) => Some(e),
            SplitError::Discretize(e) => Some(e),
            SplitError::Adjacency(e) => Some(e),
            SplitError::Sequence(e) => Some(e),
            SplitError::InvalidSplit(e) => Some(e),
            SplitError::Minimize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegionError> for SplitError {
    fn from(e: RegionError) -> Self {
        SplitError::Region(e)
    }
}
impl From<DiscretizeError> for SplitError {
    fn from(e: DiscretizeError) -> Self {
        SplitError::Discretize(e)
    }
}
impl From<AdjacencyError> for SplitError {
    fn from(e: AdjacencyError) -> Self {
        SplitError::Adjacency(e)
    }
}
impl From<SequenceError> for SplitError {
    fn from(e: SequenceError) -> Self {
        SplitError::Sequence(e)
    }
}
impl From<InvalidSplitError> for SplitError {
    fn from(e: InvalidSplitError) -> Self {
        SplitError::InvalidSplit(e)
    }
}
impl From<MinimizeError> for SplitError {
    fn from(e: MinimizeError) -> Self {
        SplitError::Minimize(e)
    }
}

/// Observable session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unprepared,
    Prepared,
    Optimized,
}

/// Per-segment outcome of an optimized session.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentSummary {
    pub index: usize,
    /// Requested area fraction.
    pub target: f64,
    pub area: f64,
    /// Achieved area fraction.
    pub fraction: f64,
    /// Number of cells in the segment.
    pub cells: usize,
}

/// Structures derived once by `prepare()`.
#[derive(Clone, Debug)]
struct Prepared {
    cells: Vec<Cell>,
    order: SpatialOrder,
    ordered: OrderedCells,
}

#[derive(Clone, Debug)]
enum Phase {
    Unprepared,
    Prepared(Prepared),
    Optimized {
        prepared: Prepared,
        splits: Vec<usize>,
    },
}

/// Splits a region into `weights.len()` contiguous pieces with areas
/// proportional to `weights`.
#[derive(Clone, Debug)]
pub struct BlockSplitter {
    region: Region,
    weights: Vec<f64>,
    cfg: SplitCfg,
    phase: Phase,
}

fn check_weights(weights: &[f64]) -> Result<(), SplitError> {
    if weights.is_empty() {
        return Err(SplitError::InvalidWeights {
            reason: "at least one weight is required",
        });
    }
    if weights.iter().any(|w| !w.is_finite()) {
        return Err(SplitError::InvalidWeights {
            reason: "weights must be finite",
        });
    }
    if weights.iter().any(|&w| w < 0.0) {
        return Err(SplitError::InvalidWeights {
            reason: "weights must be non-negative",
        });
    }
    Ok(())
}

impl BlockSplitter {
    pub fn new(region: Region, weights: Vec<f64>, cell_fraction: f64) -> Result<Self, SplitError> {
        Self::with_cfg(
            region,
            weights,
            SplitCfg {
                cell_fraction,
                ..SplitCfg::default()
            },
        )
    }

    pub fn with_cfg(region: Region, weights: Vec<f64>, cfg: SplitCfg) -> Result<Self, SplitError> {
        check_weights(&weights)?;
        if !(cfg.cell_fraction > 0.0 && cfg.cell_fraction < 1.0) {
            return Err(SplitError::InvalidCellFraction(cfg.cell_fraction));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            warn!(sum, "weights do not sum to one; fractions are not renormalized");
        }
        Ok(Self {
            region,
            weights,
            cfg,
            phase: Phase::Unprepared,
        })
    }

    /// Validate an arbitrary geometry as the region (Polygon or MultiPolygon only).
    pub fn from_geometry(
        geometry: Geometry<f64>,
        weights: Vec<f64>,
        cell_fraction: f64,
    ) -> Result<Self, SplitError> {
        Self::new(Region::try_from(geometry)?, weights, cell_fraction)
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn cfg(&self) -> &SplitCfg {
        &self.cfg
    }

    /// Number of output segments.
    #[inline]
    pub fn segments(&self) -> usize {
        self.weights.len()
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Unprepared => SessionState::Unprepared,
            Phase::Prepared(_) => SessionState::Prepared,
            Phase::Optimized { .. } => SessionState::Optimized,
        }
    }

    fn prepared(&self) -> Result<&Prepared, SplitError> {
        match &self.phase {
            Phase::Unprepared => Err(SplitError::NotPrepared),
            Phase::Prepared(p) | Phase::Optimized { prepared: p, .. } => Ok(p),
        }
    }

    /// Cells in discretization order (their `index` is their position here).
    pub fn cells(&self) -> Option<&[Cell]> {
        self.prepared().ok().map(|p| p.cells.as_slice())
    }

    /// Cell indices in visiting order.
    pub fn spatial_order(&self) -> Option<&[usize]> {
        self.prepared().ok().map(|p| p.order.order.as_slice())
    }

    /// Index of the cell the spatial order starts from.
    pub fn start_cell(&self) -> Option<usize> {
        self.prepared().ok().map(|p| p.order.start)
    }

    pub fn optimized_splits(&self) -> Option<&[usize]> {
        match &self.phase {
            Phase::Optimized { splits, .. } => Some(splits),
            _ => None,
        }
    }

    /// Discretize, build adjacency and order the cells.
    ///
    /// Re-running recomputes everything and drops any previous optimization.
    pub fn prepare(&mut self) -> Result<(), SplitError> {
        if self.state() != SessionState::Unprepared {
            debug!("re-preparing session; previous results are discarded");
        }
        self.phase = Phase::Unprepared;
        let cells = discretize(&self.region, self.cfg.cell_fraction, &self.cfg.geom)?;
        let eps = self.region.tolerance(&self.cfg.geom);
        let graph = build_adjacency(&cells, eps)?;
        let order = spatial_order(&graph)?;
        let ordered = OrderedCells::new(&cells, &order.order);
        debug!(
            cells = cells.len(),
            start = order.start,
            diameter = order.diameter,
            "session prepared"
        );
        self.phase = Phase::Prepared(Prepared {
            cells,
            order,
            ordered,
        });
        Ok(())
    }

    /// Sub-regions for arbitrary cut positions on a prepared session.
    pub fn assemble(&self, splits: &[usize]) -> Result<Vec<SubRegion>, SplitError> {
        let p = self.prepared()?;
        Ok(p.ordered.assemble(splits, self.segments())?)
    }

    /// Objective value (mean absolute weight deviation) of `splits`.
    pub fn deviation(&self, splits: &[usize]) -> Result<f64, SplitError> {
        let p = self.prepared()?;
        let areas = p.ordered.segment_areas(splits, self.segments())?;
        Ok(area_deviation(&self.weights, &areas, p.ordered.total_area()))
    }

    /// Optimize with the default differential-evolution search.
    pub fn optimize(&mut self) -> Result<&[usize], SplitError> {
        let mut de = DifferentialEvolution::new(self.cfg.de);
        self.optimize_with(&mut de)
    }

    /// Optimize cut positions with an injected minimizer.
    pub fn optimize_with<M: Minimizer + ?Sized>(
        &mut self,
        minimizer: &mut M,
    ) -> Result<&[usize], SplitError> {
        let p = self.prepared()?;
        let n = p.ordered.len();
        let splits = match split_problem(&self.weights, n) {
            None => Vec::new(),
            Some(problem) => {
                let ordered = &p.ordered;
                let weights = &self.weights;
                let segments = weights.len();
                let total = ordered.total_area();
                let objective = |x: &DVector<f64>| {
                    let s = truncate_splits(x, n);
                    match ordered.segment_areas(&s, segments) {
                        Ok(areas) => area_deviation(weights, &areas, total),
                        Err(_) => f64::INFINITY,
                    }
                };
                let min = minimizer.minimize(&objective, &problem)?;
                let splits = truncate_splits(&min.x, n);
                debug!(
                    value = min.value,
                    generations = min.generations,
                    evaluations = min.evaluations,
                    converged = min.converged,
                    "optimized splits"
                );
                splits
            }
        };
        p.ordered.validate(&splits, self.segments())?;
        // Collapsed cuts are accepted and yield empty segments.
        if !is_strictly_increasing(&splits) {
            warn!(?splits, "accepted split indices are not strictly increasing");
        }

        let phase = std::mem::replace(&mut self.phase, Phase::Unprepared);
        self.phase = match phase {
            Phase::Prepared(prepared) | Phase::Optimized { prepared, .. } => {
                Phase::Optimized { prepared, splits }
            }
            Phase::Unprepared => Phase::Unprepared,
        };
        self.optimized_splits().ok_or(SplitError::NotPrepared)
    }

    /// The `k` sub-regions for the optimized cut positions.
    pub fn final_shapes(&self) -> Result<Vec<SubRegion>, SplitError> {
        match &self.phase {
            Phase::Optimized { prepared, splits } => {
                Ok(prepared.ordered.assemble(splits, self.segments())?)
            }
            _ => Err(SplitError::NotOptimized),
        }
    }

    /// Target versus achieved fraction per segment of the optimized result.
    pub fn summary(&self) -> Result<Vec<SegmentSummary>, SplitError> {
        let Phase::Optimized { prepared, splits } = &self.phase else {
            return Err(SplitError::NotOptimized);
        };
        let ordered = &prepared.ordered;
        let total = ordered.total_area();
        let areas = ordered.segment_areas(splits, self.segments())?;
        Ok(ordered
            .segment_ranges(splits)
            .into_iter()
            .zip(areas)
            .enumerate()
            .map(|(index, (range, area))| SegmentSummary {
                index,
                target: self.weights[index],
                area,
                fraction: area / total,
                cells: range.len(),
            })
            .collect())
    }
}

/// Total area of a set of sub-regions.
pub fn total_area(shapes: &[SubRegion]) -> f64 {
    shapes.iter().map(|s| s.unsigned_area()).sum()
}
