//! Basic planar types shared by the splitting pipeline.
//!
//! - `GeomCfg`: centralizes the relative tolerance used by contact predicates.
//! - `Intersection`: closed classification of an intersection result
//!   (empty / point / line / polygon / multi-polygon / mixed).
//! - `Cell`: one clipped tile of the discretized region.

use geo::{Area, MultiPolygon, Polygon, Rect};

/// Geometry configuration (tolerances).
#[derive(Clone, Copy, Debug)]
pub struct GeomCfg {
    /// Relative tolerance; scaled by the larger side of the region's bounding box.
    pub rel_eps: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self { rel_eps: 1e-8 }
    }
}

impl GeomCfg {
    /// Absolute tolerance for a region with bounding box `bounds`.
    #[inline]
    pub fn tolerance(&self, bounds: &Rect<f64>) -> f64 {
        let extent = bounds.width().max(bounds.height());
        if extent.is_finite() && extent > 0.0 {
            self.rel_eps * extent
        } else {
            self.rel_eps
        }
    }
}

/// Type of an intersection between two planar shapes.
///
/// Lower-dimensional variants carry no payload: callers only branch on them.
#[derive(Clone, Debug)]
pub enum Intersection {
    Empty,
    /// Boundaries touch at isolated points only.
    Point,
    /// Boundaries share at least one segment of positive length.
    Line,
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    /// Several disjoint contacts, or pieces of different dimension (area plus
    /// a stray line or point). Also reported when boundaries cross but the
    /// overlap is below the boolean engine's resolution.
    Mixed,
}

impl Intersection {
    /// Short name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Intersection::Empty => "Empty",
            Intersection::Point => "Point",
            Intersection::Line => "Line",
            Intersection::Polygon(_) => "Polygon",
            Intersection::MultiPolygon(_) => "MultiPolygon",
            Intersection::Mixed => "Mixed",
        }
    }

    /// Classify an areal boolean result by part count.
    pub(crate) fn from_areal(mut mp: MultiPolygon<f64>) -> Self {
        match mp.0.len() {
            0 => Intersection::Empty,
            1 => Intersection::Polygon(mp.0.remove(0)),
            _ => Intersection::MultiPolygon(mp),
        }
    }
}

/// A bounded piece of the region produced by discretization.
///
/// `index` is the cell's identity for adjacency, ordering and assembly.
#[derive(Clone, Debug)]
pub struct Cell {
    pub index: usize,
    pub shape: Polygon<f64>,
    pub area: f64,
}

impl Cell {
    pub fn new(index: usize, shape: Polygon<f64>) -> Self {
        let area = shape.unsigned_area();
        Self { index, shape, area }
    }
}
