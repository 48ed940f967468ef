//! Planar geometry provider for the splitter.
//!
//! Purpose
//! - Wrap `geo` polygons in a validated `Region`, classify intersections into
//!   the closed `Intersection` variant, and detect edge/corner contact between
//!   cells with an explicit tolerance.
//! - Provide the few primitive shapes used by tests, benches and the CLI.
//!
//! Conventions
//! - Areal booleans go through `geo::BooleanOps`; lower-dimensional contact is
//!   recovered from boundaries (`contact`), because the boolean engine drops it.
//! - Tolerances are relative (`GeomCfg::rel_eps`) and scaled by the region's
//!   bounding box.

mod contact;
mod region;
pub mod shapes;
mod types;

pub use contact::polygon_intersection;
pub use region::{Region, RegionError};
pub use types::{Cell, GeomCfg, Intersection};
