//! Curated surface for callers outside the crate (CLI, benches, examples).
//!
//! Prefer these re-exports over reaching into individual pipeline modules.

// Geometry
pub use crate::geom::shapes::{
    circle, circle_with_area, hexagon, hexagon_with_area, regular_polygon, square,
    square_with_area,
};
pub use crate::geom::{polygon_intersection, Cell, GeomCfg, Intersection, Region, RegionError};
// Pipeline stages
pub use crate::adjacency::{build_adjacency, AdjacencyGraph, CORNER_WEIGHT, EDGE_WEIGHT};
pub use crate::assemble::{InvalidSplitError, OrderedCells};
pub use crate::discretize::{cell_side, discretize, square_tiles};
pub use crate::sequence::{all_pairs_shortest_paths, spatial_order, SpatialOrder};
// Search
pub use crate::optimize::{DeCfg, DifferentialEvolution, LinearConstraint, Minimizer, Problem};
// Session
pub use crate::splitter::{
    initial_splits, total_area, BlockSplitter, SegmentSummary, SessionState, SplitCfg, SplitError,
    SubRegion,
};
