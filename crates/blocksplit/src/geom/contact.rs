//! Boundary contact between polygons (tolerance-aware).
//!
//! The areal boolean engine only reports 2D results, so touching along an
//! edge or at a corner has to be recovered from the boundaries themselves.
//! Contacts are collected as located pieces (points and collinear overlaps)
//! and grouped into connected components: one component is a `Point` or a
//! `Line`, several components are `Mixed`.
//! All predicates take an absolute tolerance `eps` (see `GeomCfg::tolerance`).

use geo::{Area, BooleanOps, BoundingRect, Coord, Line, LineString, MultiPolygon, Polygon, Rect};

use super::types::Intersection;

/// The boolean engine snaps vertices to an integer grid; boundaries it
/// returns are trusted only up to this multiple of `eps`.
const SNAP_SLACK: f64 = 10.0;

/// How two segments meet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum SegmentContact {
    None,
    /// Shared endpoint, T-junction, or collinear overlap of length ≤ eps.
    Point(Coord<f64>),
    /// Collinear overlap of positive length (the shared part).
    Overlap(Line<f64>),
    /// Interiors cross transversally.
    Crossing,
}

/// One located piece of lower-dimensional contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ContactPiece {
    Point(Coord<f64>),
    Segment(Line<f64>),
}

impl ContactPiece {
    fn distance(&self, other: &ContactPiece) -> f64 {
        match (*self, *other) {
            (ContactPiece::Point(p), ContactPiece::Point(q)) => norm(p - q),
            (ContactPiece::Point(p), ContactPiece::Segment(s))
            | (ContactPiece::Segment(s), ContactPiece::Point(p)) => point_segment_distance(p, s),
            // Pieces of one boundary pair never cross, so endpoints suffice.
            (ContactPiece::Segment(s), ContactPiece::Segment(t)) => point_segment_distance(s.start, t)
                .min(point_segment_distance(s.end, t))
                .min(point_segment_distance(t.start, s))
                .min(point_segment_distance(t.end, s)),
        }
    }

    /// Points that must lie on a boundary for the piece to lie on it.
    fn samples(&self) -> Vec<Coord<f64>> {
        match *self {
            ContactPiece::Point(p) => vec![p],
            ContactPiece::Segment(s) => vec![s.start, (s.start + s.end) / 2.0, s.end],
        }
    }
}

/// Accumulated contact between two boundaries.
#[derive(Clone, Debug, Default)]
pub(crate) struct BoundaryContact {
    pub pieces: Vec<ContactPiece>,
    pub crossing: bool,
}

impl BoundaryContact {
    fn record(&mut self, c: SegmentContact) {
        match c {
            SegmentContact::None => {}
            SegmentContact::Point(p) => self.pieces.push(ContactPiece::Point(p)),
            SegmentContact::Overlap(l) => self.pieces.push(ContactPiece::Segment(l)),
            SegmentContact::Crossing => self.crossing = true,
        }
    }

    /// Number of connected groups of pieces (pieces within `eps` connect).
    fn components(&self, eps: f64) -> usize {
        let n = self.pieces.len();
        let mut label: Vec<usize> = (0..n).collect();
        for i in 0..n {
            for j in (i + 1)..n {
                let (li, lj) = (label[i], label[j]);
                if li != lj && self.pieces[i].distance(&self.pieces[j]) <= eps {
                    for l in label.iter_mut().filter(|l| **l == lj) {
                        *l = li;
                    }
                }
            }
        }
        label.sort_unstable();
        label.dedup();
        label.len()
    }

    /// Lower-dimensional classification, ignoring crossings.
    pub fn lower_dim(&self, eps: f64) -> Intersection {
        if self.pieces.is_empty() {
            return Intersection::Empty;
        }
        if self.components(eps) > 1 {
            return Intersection::Mixed;
        }
        if self
            .pieces
            .iter()
            .any(|p| matches!(p, ContactPiece::Segment(_)))
        {
            Intersection::Line
        } else {
            Intersection::Point
        }
    }

    /// Whether some piece leaves the boundary `rings` (e.g. of an areal result).
    pub fn has_stray<'a>(
        &self,
        rings: impl Iterator<Item = &'a LineString<f64>> + Clone,
        eps: f64,
    ) -> bool {
        let tol = SNAP_SLACK * eps;
        self.pieces.iter().any(|piece| {
            piece.samples().into_iter().any(|q| {
                !rings
                    .clone()
                    .flat_map(|r| r.lines())
                    .any(|l| point_segment_distance(q, l) <= tol)
            })
        })
    }
}

#[inline]
fn cross(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

#[inline]
fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.x + a.y * b.y
}

#[inline]
fn norm(a: Coord<f64>) -> f64 {
    a.x.hypot(a.y)
}

/// Distance from `p` to the closed segment `s`.
fn point_segment_distance(p: Coord<f64>, s: Line<f64>) -> f64 {
    let d = s.end - s.start;
    let len2 = dot(d, d);
    if len2 <= 0.0 {
        return norm(p - s.start);
    }
    let t = (dot(p - s.start, d) / len2).clamp(0.0, 1.0);
    norm(p - (s.start + d * t))
}

/// Classify how segments `a` and `b` meet.
pub(crate) fn segment_contact(a: Line<f64>, b: Line<f64>, eps: f64) -> SegmentContact {
    let da = a.end - a.start;
    let db = b.end - b.start;
    let la = norm(da);
    let lb = norm(db);
    if la <= eps || lb <= eps {
        // Degenerate segment: at most a point contact.
        let (p, other) = if la <= eps { (a.start, b) } else { (b.start, a) };
        return if point_segment_distance(p, other) <= eps {
            SegmentContact::Point(p)
        } else {
            SegmentContact::None
        };
    }

    // Signed distances of b's endpoints from a's supporting line, and vice versa.
    let s1 = cross(da, b.start - a.start) / la;
    let s2 = cross(da, b.end - a.start) / la;
    if s1.abs() <= eps && s2.abs() <= eps {
        // Collinear: overlap of projections onto a, as arc length from a.start.
        let t1 = dot(b.start - a.start, da) / la;
        let t2 = dot(b.end - a.start, da) / la;
        let lo = t1.min(t2).max(0.0);
        let hi = t1.max(t2).min(la);
        let at = |t: f64| a.start + da * (t / la);
        let overlap = hi - lo;
        return if overlap > eps {
            SegmentContact::Overlap(Line::new(at(lo), at(hi)))
        } else if overlap >= -eps {
            SegmentContact::Point(at(((lo + hi) / 2.0).clamp(0.0, la)))
        } else {
            SegmentContact::None
        };
    }

    let s3 = cross(db, a.start - b.start) / lb;
    let s4 = cross(db, a.end - b.start) / lb;
    let strictly_opposite = |u: f64, v: f64| (u > eps && v < -eps) || (u < -eps && v > eps);
    if strictly_opposite(s1, s2) && strictly_opposite(s3, s4) {
        return SegmentContact::Crossing;
    }

    [(a.start, b), (a.end, b), (b.start, a), (b.end, a)]
        .into_iter()
        .find(|&(p, s)| point_segment_distance(p, s) <= eps)
        .map_or(SegmentContact::None, |(p, _)| SegmentContact::Point(p))
}

#[inline]
fn rects_touch(a: &Rect<f64>, b: &Rect<f64>, eps: f64) -> bool {
    a.min().x <= b.max().x + eps
        && b.min().x <= a.max().x + eps
        && a.min().y <= b.max().y + eps
        && b.min().y <= a.max().y + eps
}

/// Whether the boxes share an area wider than `eps` in both directions.
#[inline]
fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>, eps: f64) -> bool {
    let w = a.max().x.min(b.max().x) - a.min().x.max(b.min().x);
    let h = a.max().y.min(b.max().y) - a.min().y.max(b.min().y);
    w > eps && h > eps
}

/// Accumulate segment contacts between two sets of rings.
pub(crate) fn boundary_contact<'a, 'b>(
    a: impl Iterator<Item = &'a LineString<f64>> + Clone,
    b: impl Iterator<Item = &'b LineString<f64>> + Clone,
    eps: f64,
) -> BoundaryContact {
    let mut acc = BoundaryContact::default();
    for ra in a {
        let Some(ba) = ra.bounding_rect() else {
            continue;
        };
        for rb in b.clone() {
            let Some(bb) = rb.bounding_rect() else {
                continue;
            };
            if !rects_touch(&ba, &bb, eps) {
                continue;
            }
            for la in ra.lines() {
                for lb in rb.lines() {
                    acc.record(segment_contact(la, lb, eps));
                }
            }
        }
    }
    acc
}

pub(crate) fn polygon_rings(p: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> + Clone {
    std::iter::once(p.exterior()).chain(p.interiors().iter())
}

pub(crate) fn multi_polygon_rings(
    mp: &MultiPolygon<f64>,
) -> impl Iterator<Item = &LineString<f64>> + Clone {
    mp.0.iter().flat_map(polygon_rings)
}

/// Intersection of two polygons that should only touch, e.g. two cells of a tiling.
///
/// Shared area above `eps²` is returned as the areal variant, whether the
/// boundaries cross, coincide or nest. Otherwise the boundary contact is
/// classified; crossing boundaries without resolvable area are `Mixed`.
pub fn polygon_intersection(a: &Polygon<f64>, b: &Polygon<f64>, eps: f64) -> Intersection {
    let (Some(ra), Some(rb)) = (a.bounding_rect(), b.bounding_rect()) else {
        return Intersection::Empty;
    };
    if !rects_touch(&ra, &rb, eps) {
        return Intersection::Empty;
    }
    let areal = rects_overlap(&ra, &rb, eps).then(|| a.intersection(b));
    if let Some(mp) = &areal {
        if mp.unsigned_area() > eps * eps {
            return Intersection::from_areal(mp.clone());
        }
    }
    let contact = boundary_contact(polygon_rings(a), polygon_rings(b), eps);
    if contact.crossing {
        let mp = areal.unwrap_or_else(|| a.intersection(b));
        return match Intersection::from_areal(mp) {
            Intersection::Empty => Intersection::Mixed,
            areal => areal,
        };
    }
    contact.lower_dim(eps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, polygon};

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Line<f64> {
        Line::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 })
    }

    fn unit_square(x: f64, y: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
        ]
    }

    #[test]
    fn segment_cases() {
        let eps = 1e-9;
        assert_eq!(
            segment_contact(seg(0.0, 0.0, 2.0, 0.0), seg(1.0, 0.0, 3.0, 0.0), eps),
            SegmentContact::Overlap(seg(1.0, 0.0, 2.0, 0.0))
        );
        assert_eq!(
            segment_contact(seg(0.0, 0.0, 1.0, 0.0), seg(1.0, 0.0, 2.0, 0.0), eps),
            SegmentContact::Point(coord! { x: 1.0, y: 0.0 })
        );
        assert_eq!(
            segment_contact(seg(0.0, 0.0, 1.0, 1.0), seg(0.0, 1.0, 1.0, 0.0), eps),
            SegmentContact::Crossing
        );
        // T-junction: endpoint of b lies on a's interior.
        assert_eq!(
            segment_contact(seg(0.0, 0.0, 2.0, 0.0), seg(1.0, 0.0, 1.0, 1.0), eps),
            SegmentContact::Point(coord! { x: 1.0, y: 0.0 })
        );
        assert_eq!(
            segment_contact(seg(0.0, 0.0, 1.0, 0.0), seg(0.0, 1.0, 1.0, 1.0), eps),
            SegmentContact::None
        );
    }

    #[test]
    fn neighbouring_squares() {
        let eps = 1e-9;
        let a = unit_square(0.0, 0.0);
        assert!(matches!(
            polygon_intersection(&a, &unit_square(1.0, 0.0), eps),
            Intersection::Line
        ));
        // Half-offset neighbour: one shared segment plus touching corners.
        assert!(matches!(
            polygon_intersection(&a, &unit_square(1.0, 0.5), eps),
            Intersection::Line
        ));
        assert!(matches!(
            polygon_intersection(&a, &unit_square(1.0, 1.0), eps),
            Intersection::Point
        ));
        assert!(matches!(
            polygon_intersection(&a, &unit_square(2.0, 0.0), eps),
            Intersection::Empty
        ));
    }

    #[test]
    fn overlapping_squares_report_area() {
        let a = unit_square(0.0, 0.0);
        let b = unit_square(0.5, 0.5);
        match polygon_intersection(&a, &b, 1e-9) {
            Intersection::Polygon(p) => assert!((p.unsigned_area() - 0.25).abs() < 1e-6),
            other => panic!("expected polygon, got {}", other.kind()),
        }
    }

    #[test]
    fn coinciding_and_nested_boundaries_report_area() {
        let eps = 1e-9;
        let a = unit_square(0.0, 0.0);
        let half = polygon![(x: 0.0, y: 0.0), (x: 0.5, y: 0.0), (x: 0.5, y: 1.0), (x: 0.0, y: 1.0)];
        let inner = polygon![
            (x: 0.25, y: 0.25),
            (x: 0.75, y: 0.25),
            (x: 0.75, y: 0.75),
            (x: 0.25, y: 0.75),
        ];
        for (b, area) in [(a.clone(), 1.0), (half, 0.5), (inner, 0.25)] {
            match polygon_intersection(&a, &b, eps) {
                Intersection::Polygon(p) => assert!((p.unsigned_area() - area).abs() < 1e-6),
                other => panic!("expected polygon, got {}", other.kind()),
            }
        }
    }

    #[test]
    fn separate_edge_and_corner_contact_is_mixed() {
        // Shares [0, 0.4] of the top edge and, separately, the corner (1, 1).
        let b = polygon![
            (x: 0.0, y: 1.0),
            (x: 0.4, y: 1.0),
            (x: 0.7, y: 1.4),
            (x: 1.0, y: 1.0),
            (x: 1.2, y: 2.0),
            (x: 0.0, y: 2.0),
        ];
        assert!(matches!(
            polygon_intersection(&unit_square(0.0, 0.0), &b, 1e-9),
            Intersection::Mixed
        ));
    }

    #[test]
    fn stray_pieces_are_detected() {
        let contact = BoundaryContact {
            pieces: vec![ContactPiece::Segment(seg(0.0, 1.0, 1.0, 1.0))],
            crossing: false,
        };
        let square = unit_square(0.0, 0.0);
        assert!(!contact.has_stray(polygon_rings(&square), 1e-9));
        let lower = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 0.5), (x: 0.0, y: 0.5)];
        assert!(contact.has_stray(polygon_rings(&lower), 1e-9));
    }
}
