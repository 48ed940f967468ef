//! Weighted block splitting of a region.
//!
//! Purpose
//! - Drive the pipeline discretize → adjacency → spatial order → cut search →
//!   assembly behind one session object, `BlockSplitter`.
//!
//! Model
//! - The session moves `Unprepared → Prepared → Optimized`. `prepare()` derives
//!   cells and their spatial order once; `optimize()` searches integer cut
//!   positions over that order; `final_shapes()` unions each contiguous run of
//!   cells into one sub-region.
//! - The objective is the mean absolute deviation between the target weights
//!   and the achieved area fractions. Segment areas come from prefix sums over
//!   the ordered cell areas, so no geometry is built during the search.
//! - The minimizer is injected through `optimize_with`; `optimize()` uses
//!   `DifferentialEvolution` configured by `SplitCfg::de`.

mod session;
mod weights;

pub use session::{
    total_area, BlockSplitter, SegmentSummary, SessionState, SplitCfg, SplitError, SubRegion,
};
pub use weights::{area_deviation, initial_splits, ordering_constraint, split_problem};
