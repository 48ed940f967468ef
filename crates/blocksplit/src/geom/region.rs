//! The caller-owned planar region to be partitioned.

use std::fmt;

use geo::{Area, BooleanOps, BoundingRect, Geometry, LineString, MultiPolygon, Polygon, Rect};

use super::contact::{boundary_contact, multi_polygon_rings, polygon_rings};
use super::types::{GeomCfg, Intersection};

/// Errors raised while validating a region.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionError {
    /// Only `Polygon` and `MultiPolygon` describe an area.
    UnsupportedGeometry(&'static str),
    /// No polygons, or zero total area.
    Empty,
    /// A coordinate is NaN or infinite.
    NonFinite,
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionError::UnsupportedGeometry(kind) => {
                write!(f, "region must be a Polygon or MultiPolygon, got {kind}")
            }
            RegionError::Empty => write!(f, "region has no area"),
            RegionError::NonFinite => write!(f, "region has non-finite coordinates"),
        }
    }
}

impl std::error::Error for RegionError {}

/// Immutable, validated polygonal area (possibly multi-part).
#[derive(Clone, Debug)]
pub struct Region {
    shape: MultiPolygon<f64>,
    area: f64,
    bounds: Rect<f64>,
}

impl Region {
    pub fn new(shape: MultiPolygon<f64>) -> Result<Self, RegionError> {
        let finite = shape
            .0
            .iter()
            .flat_map(polygon_rings)
            .flat_map(|r| r.coords())
            .all(|c| c.x.is_finite() && c.y.is_finite());
        if !finite {
            return Err(RegionError::NonFinite);
        }
        let bounds = shape.bounding_rect().ok_or(RegionError::Empty)?;
        let area = shape.unsigned_area();
        if !(area > 0.0) {
            return Err(RegionError::Empty);
        }
        Ok(Self {
            shape,
            area,
            bounds,
        })
    }

    pub fn from_polygon(polygon: Polygon<f64>) -> Result<Self, RegionError> {
        Self::new(MultiPolygon::new(vec![polygon]))
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.area
    }

    #[inline]
    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    #[inline]
    pub fn shape(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    /// Boundary rings (exteriors and holes of every part).
    pub fn rings(&self) -> impl Iterator<Item = &LineString<f64>> + Clone {
        multi_polygon_rings(&self.shape)
    }

    /// Absolute tolerance for predicates on this region.
    pub fn tolerance(&self, cfg: &GeomCfg) -> f64 {
        cfg.tolerance(&self.bounds)
    }

    /// `polygon ∩ self`, classified.
    ///
    /// Areal parts win as long as every boundary contact lies on them. A contact
    /// that leaves the areal part (a hole or notch touching the polygon's rim)
    /// makes the result `Mixed`, as do crossing boundaries with no resolvable area.
    pub fn intersect_polygon(&self, polygon: &Polygon<f64>, eps: f64) -> Intersection {
        let areal = polygon.intersection(&self.shape);
        let contact = boundary_contact(polygon_rings(polygon), self.rings(), eps);
        if areal.0.is_empty() {
            return if contact.crossing {
                Intersection::Mixed
            } else {
                contact.lower_dim(eps)
            };
        }
        if contact.has_stray(multi_polygon_rings(&areal), eps) {
            return Intersection::Mixed;
        }
        Intersection::from_areal(areal)
    }
}

impl TryFrom<Geometry<f64>> for Region {
    type Error = RegionError;

    fn try_from(g: Geometry<f64>) -> Result<Self, Self::Error> {
        match g {
            Geometry::Polygon(p) => Region::from_polygon(p),
            Geometry::MultiPolygon(mp) => Region::new(mp),
            Geometry::Rect(r) => Region::from_polygon(r.to_polygon()),
            Geometry::Triangle(t) => Region::from_polygon(t.to_polygon()),
            Geometry::Point(_) => Err(RegionError::UnsupportedGeometry("Point")),
            Geometry::Line(_) => Err(RegionError::UnsupportedGeometry("Line")),
            Geometry::LineString(_) => Err(RegionError::UnsupportedGeometry("LineString")),
            Geometry::MultiPoint(_) => Err(RegionError::UnsupportedGeometry("MultiPoint")),
            Geometry::MultiLineString(_) => {
                Err(RegionError::UnsupportedGeometry("MultiLineString"))
            }
            Geometry::GeometryCollection(_) => {
                Err(RegionError::UnsupportedGeometry("GeometryCollection"))
            }
        }
    }
}
