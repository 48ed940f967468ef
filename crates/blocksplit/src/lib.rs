//! Weighted splitting of planar regions into contiguous blocks.
//!
//! A region is covered by small square cells, the cells are put into a linear
//! spatial order by graph distance from one end of the region, and cut
//! positions along that order are searched so that each contiguous run of
//! cells matches a target area fraction.
//!
//! Modules
//! - `geom`: validated `Region`, intersection classification, test shapes.
//! - `discretize`, `adjacency`, `sequence`, `assemble`: the pipeline stages.
//! - `optimize`: the `Minimizer` seam and differential evolution.
//! - `splitter`: the `BlockSplitter` session tying it together.

pub mod adjacency;
pub mod api;
pub mod assemble;
pub mod discretize;
pub mod geom;
pub mod optimize;
pub mod sequence;
pub mod splitter;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use geom::{GeomCfg, Region};
pub use splitter::{BlockSplitter, SplitCfg, SplitError};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::geom::shapes::{circle_with_area, hexagon_with_area, square_with_area};
    pub use crate::geom::{Cell, GeomCfg, Intersection, Region, RegionError};
    pub use crate::optimize::{DeCfg, DifferentialEvolution, Minimizer};
    pub use crate::splitter::{
        BlockSplitter, SegmentSummary, SessionState, SplitCfg, SplitError, SubRegion,
    };
}
