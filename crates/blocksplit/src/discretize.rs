//! Region discretization into square cells.
//!
//! A regular axis-aligned square tiling is laid over the region's bounding box
//! and every tile is clipped to the region. Tiles cut into several parts (by a
//! concave or multi-part region) contribute one cell per part, so the cells
//! cover the region exactly and their areas add up to the region's area.

use std::fmt;

use geo::{coord, Polygon, Rect};
use tracing::debug;

use crate::geom::{Cell, GeomCfg, Intersection, Region};

/// Errors surfaced while discretizing a region.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscretizeError {
    /// `cell_fraction` must lie strictly between 0 and 1.
    InvalidCellFraction(f64),
    /// A tile met the region only along a line or at a point, or touched it
    /// away from the area they share.
    DegenerateFragment { tile: usize, kind: &'static str },
    /// No tile produced a cell.
    NoCells,
}

impl fmt::Display for DiscretizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscretizeError::InvalidCellFraction(b) => {
                write!(f, "cell fraction must be in (0, 1), got {b}")
            }
            DiscretizeError::DegenerateFragment { tile, kind } => write!(
                f,
                "tile {tile} intersects the region as a {kind}; cannot build a cell from it"
            ),
            DiscretizeError::NoCells => write!(f, "discretization produced no cells"),
        }
    }
}

impl std::error::Error for DiscretizeError {}

/// Number of tiles of size `side` needed to cover `extent` (at least one).
fn tile_count(extent: f64, side: f64) -> usize {
    let ratio = extent / side;
    // Absorb round-off so an exact multiple does not spawn a sliver tile.
    ((ratio - ratio.abs() * 1e-9).ceil() as usize).max(1)
}

/// Axis-aligned square tiles covering `bounds`, x-major then y.
///
/// The last tile in each axis is clamped to the bounding box so the union is
/// exactly `bounds`.
pub fn square_tiles(bounds: &Rect<f64>, side: f64) -> Vec<Polygon<f64>> {
    let (min, max) = (bounds.min(), bounds.max());
    let nx = tile_count(bounds.width(), side);
    let ny = tile_count(bounds.height(), side);
    let edge = |lo: f64, hi: f64, i: usize, n: usize| {
        if i >= n {
            hi
        } else {
            lo + i as f64 * side
        }
    };
    let mut tiles = Vec::with_capacity(nx * ny);
    for ix in 0..nx {
        let x0 = edge(min.x, max.x, ix, nx);
        let x1 = edge(min.x, max.x, ix + 1, nx);
        for iy in 0..ny {
            let y0 = edge(min.y, max.y, iy, ny);
            let y1 = edge(min.y, max.y, iy + 1, ny);
            tiles.push(Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon());
        }
    }
    tiles
}

/// Cell side for a region: `cell_fraction × min(width, height)`.
pub fn cell_side(region: &Region, cell_fraction: f64) -> f64 {
    let b = region.bounds();
    cell_fraction * b.width().min(b.height())
}

/// Clip a square tiling to `region`; cells are indexed in tile scan order.
pub fn discretize(
    region: &Region,
    cell_fraction: f64,
    cfg: &GeomCfg,
) -> Result<Vec<Cell>, DiscretizeError> {
    if !(cell_fraction > 0.0 && cell_fraction < 1.0) {
        return Err(DiscretizeError::InvalidCellFraction(cell_fraction));
    }
    let side = cell_side(region, cell_fraction);
    let eps = region.tolerance(cfg);
    let tiles = square_tiles(&region.bounds(), side);

    let mut cells = Vec::new();
    for (tile, poly) in tiles.iter().enumerate() {
        match region.intersect_polygon(poly, eps) {
            Intersection::Empty => {}
            Intersection::Polygon(p) => cells.push(Cell::new(cells.len(), p)),
            Intersection::MultiPolygon(mp) => {
                for p in mp {
                    cells.push(Cell::new(cells.len(), p));
                }
            }
            degenerate @ (Intersection::Point | Intersection::Line | Intersection::Mixed) => {
                return Err(DiscretizeError::DegenerateFragment {
                    tile,
                    kind: degenerate.kind(),
                });
            }
        }
    }
    if cells.is_empty() {
        return Err(DiscretizeError::NoCells);
    }
    debug!(
        tiles = tiles.len(),
        cells = cells.len(),
        side,
        "discretized region"
    );
    Ok(cells)
}
