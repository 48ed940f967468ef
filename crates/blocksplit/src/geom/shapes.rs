//! Primitive shape constructors (squares, hexagons, approximated circles).
//!
//! All shapes are returned as counter-clockwise `Polygon<f64>` without holes.

use std::f64::consts::{PI, TAU};

use geo::{Coord, LineString, Polygon};

/// Regular `sides`-gon with circumradius `radius`; the first vertex sits at angle `phase`.
pub fn regular_polygon(center: Coord<f64>, radius: f64, sides: usize, phase: f64) -> Polygon<f64> {
    let sides = sides.max(3);
    let step = TAU / sides as f64;
    let ring: Vec<Coord<f64>> = (0..sides)
        .map(|k| {
            let th = phase + k as f64 * step;
            Coord {
                x: center.x + radius * th.cos(),
                y: center.y + radius * th.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

/// Axis-aligned square.
pub fn square(center: Coord<f64>, side: f64) -> Polygon<f64> {
    let h = side / 2.0;
    Polygon::new(
        LineString::from(vec![
            (center.x - h, center.y - h),
            (center.x + h, center.y - h),
            (center.x + h, center.y + h),
            (center.x - h, center.y + h),
        ]),
        vec![],
    )
}

pub fn square_with_area(center: Coord<f64>, area: f64) -> Polygon<f64> {
    square(center, area.max(0.0).sqrt())
}

/// Flat-topped hexagon with edge length `side` (vertex at angle 0).
pub fn hexagon(center: Coord<f64>, side: f64) -> Polygon<f64> {
    regular_polygon(center, side, 6, 0.0)
}

/// Hexagon of area `area`: `A = 3√3/2 · s²`.
pub fn hexagon_with_area(center: Coord<f64>, area: f64) -> Polygon<f64> {
    let side = (2.0 * area.max(0.0) / (3.0 * 3f64.sqrt())).sqrt();
    hexagon(center, side)
}

/// Inscribed `segments`-gon approximating a circle.
pub fn circle(center: Coord<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    regular_polygon(center, radius, segments, 0.0)
}

/// Approximated circle whose polygon (not the ideal disk) has area `area`.
pub fn circle_with_area(center: Coord<f64>, area: f64, segments: usize) -> Polygon<f64> {
    let n = segments.max(3) as f64;
    // Inscribed n-gon area: n/2 · r² · sin(2π/n).
    let r = (2.0 * area.max(0.0) / (n * (2.0 * PI / n).sin())).sqrt();
    circle(center, r, segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, Area};

    #[test]
    fn areas_match_requests() {
        let c = coord! { x: 3.0, y: -1.0 };
        assert!((square_with_area(c, 100.0).unsigned_area() - 100.0).abs() < 1e-9);
        assert!((hexagon_with_area(c, 7.5).unsigned_area() - 7.5).abs() < 1e-9);
        assert!((circle_with_area(c, 2.0, 64).unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn circle_converges_to_disk() {
        let p = circle(coord! { x: 0.0, y: 0.0 }, 1.0, 512);
        assert!((p.unsigned_area() - PI).abs() < 1e-3);
        assert_eq!(p.exterior().0.len(), 513); // closed ring
    }

    #[test]
    fn polygons_are_ccw() {
        let p = hexagon(coord! { x: 0.0, y: 0.0 }, 1.0);
        assert!(p.signed_area() > 0.0);
        let q = square(coord! { x: 0.0, y: 0.0 }, 2.0);
        assert!(q.signed_area() > 0.0);
    }
}
