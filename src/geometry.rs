//! Geometric primitives the engine composes: failure-tolerant overlays,
//! masked grids, bounded Voronoi cells, and an R-tree over territories.
//!
//! Overlay operations never abort a batch: a union/intersection that cannot
//! combine its inputs keeps the previous accumulator and logs the failure.

use geo::{
    BooleanOps, BoundingRect, Centroid, Contains, Coord, LineString, MultiPolygon, Point, Polygon,
    Rect,
};
use rstar::{AABB, RTree, RTreeObject};
use tracing::warn;

use crate::proj::{to_geographic, to_planar};

/// Fold one shape into a union accumulator. When the overlay yields an empty
/// result for non-empty inputs, the previous accumulator is retained.
pub fn fold_union(acc: MultiPolygon<f64>, next: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if next.0.is_empty() {
        return acc;
    }
    if acc.0.is_empty() {
        return next.clone();
    }
    let merged = acc.union(next);
    if merged.0.is_empty() {
        warn!("union produced empty output; keeping previous accumulator");
        return acc;
    }
    merged
}

/// Union every shape into a single MultiPolygon, tolerating individual
/// overlay failures. Returns `None` for an empty input.
pub fn union_all(shapes: impl IntoIterator<Item = MultiPolygon<f64>>) -> Option<MultiPolygon<f64>> {
    shapes.into_iter().reduce(|acc, next| fold_union(acc, &next))
}

/// Intersection of two shapes, or `None` when they do not overlap (or the
/// overlay cannot combine them).
pub fn intersect(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    let out = a.intersection(b);
    (!out.0.is_empty()).then_some(out)
}

/// Planar (Web Mercator meters) bounding rectangle of a geographic shape.
pub fn planar_bounds(shape: &MultiPolygon<f64>) -> Option<Rect<f64>> {
    let rect = shape.bounding_rect()?;
    let (min_x, min_y) = to_planar(rect.min().x, rect.min().y);
    let (max_x, max_y) = to_planar(rect.max().x, rect.max().y);
    Some(Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y }))
}

/// Regular point grid over the mask's bounding box at `spacing_m` meters,
/// keeping only points inside the mask. Points are geographic (lon, lat).
pub fn point_grid(mask: &MultiPolygon<f64>, spacing_m: f64) -> Vec<Point<f64>> {
    let Some(bounds) = planar_bounds(mask) else { return Vec::new() };
    if spacing_m <= 0.0 {
        return Vec::new();
    }

    let mut points = Vec::new();
    let mut y = bounds.min().y + spacing_m / 2.0;
    while y < bounds.max().y {
        let mut x = bounds.min().x + spacing_m / 2.0;
        while x < bounds.max().x {
            let (lon, lat) = to_geographic(x, y);
            let point = Point::new(lon, lat);
            if mask.contains(&point) {
                points.push(point);
            }
            x += spacing_m;
        }
        y += spacing_m;
    }
    points
}

/// Flat-top hexagon grid tiling the mask's bounding box with circumradius
/// `cell_m` meters, keeping cells whose centroid lies inside the mask.
/// Cells are geographic polygons.
pub fn hex_grid(mask: &MultiPolygon<f64>, cell_m: f64) -> Vec<Polygon<f64>> {
    let Some(bounds) = planar_bounds(mask) else { return Vec::new() };
    if cell_m <= 0.0 {
        return Vec::new();
    }

    let col_step = 1.5 * cell_m;
    let row_step = 3f64.sqrt() * cell_m;

    let mut cells = Vec::new();
    let mut col = 0usize;
    let mut cx = bounds.min().x;
    while cx < bounds.max().x + col_step {
        let offset = if col % 2 == 1 { row_step / 2.0 } else { 0.0 };
        let mut cy = bounds.min().y + offset;
        while cy < bounds.max().y + row_step {
            let (clon, clat) = to_geographic(cx, cy);
            if mask.contains(&Point::new(clon, clat)) {
                cells.push(hexagon(cx, cy, cell_m));
            }
            cy += row_step;
        }
        cx += col_step;
        col += 1;
    }
    cells
}

/// One flat-top hexagon centered at planar (cx, cy), as a geographic polygon.
fn hexagon(cx: f64, cy: f64, radius_m: f64) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = (0..=6)
        .map(|i| {
            let angle = std::f64::consts::FRAC_PI_3 * (i % 6) as f64;
            let (lon, lat) =
                to_geographic(cx + radius_m * angle.cos(), cy + radius_m * angle.sin());
            Coord { x: lon, y: lat }
        })
        .collect();
    Polygon::new(LineString(ring), vec![])
}

/// Circular buffer of `radius_m` meters around a geographic point,
/// approximated by a 64-gon constructed in the planar frame.
pub fn circle(center: Point<f64>, radius_m: f64) -> Polygon<f64> {
    const SEGMENTS: usize = 64;
    let (cx, cy) = to_planar(center.x(), center.y());
    let ring: Vec<Coord<f64>> = (0..=SEGMENTS)
        .map(|i| {
            let angle = std::f64::consts::TAU * (i % SEGMENTS) as f64 / SEGMENTS as f64;
            let (lon, lat) =
                to_geographic(cx + radius_m * angle.cos(), cy + radius_m * angle.sin());
            Coord { x: lon, y: lat }
        })
        .collect();
    Polygon::new(LineString(ring), vec![])
}

/// Voronoi cell polygons for planar sites, bounded by `bounds`.
///
/// Each cell is built by clipping the bounding rectangle against the
/// perpendicular-bisector half-plane toward every other site. A cell clipped
/// to nothing (coincident sites) yields `None`.
pub fn voronoi_cells(sites: &[Coord<f64>], bounds: Rect<f64>) -> Vec<Option<Polygon<f64>>> {
    sites.iter().enumerate()
        .map(|(i, &site)| {
            let mut ring: Vec<Coord<f64>> = vec![
                bounds.min(),
                Coord { x: bounds.max().x, y: bounds.min().y },
                bounds.max(),
                Coord { x: bounds.min().x, y: bounds.max().y },
            ];
            for (j, &other) in sites.iter().enumerate() {
                if i == j {
                    continue;
                }
                ring = clip_half_plane(&ring, site, other);
                if ring.len() < 3 {
                    return None;
                }
            }
            let mut closed = ring;
            closed.push(closed[0]);
            Some(Polygon::new(LineString(closed), vec![]))
        })
        .collect()
}

/// Clip an open ring to the half-plane of points at least as close to `site`
/// as to `other` (Sutherland-Hodgman against the perpendicular bisector).
fn clip_half_plane(ring: &[Coord<f64>], site: Coord<f64>, other: Coord<f64>) -> Vec<Coord<f64>> {
    let normal = Coord { x: other.x - site.x, y: other.y - site.y };
    let mid = Coord { x: (site.x + other.x) / 2.0, y: (site.y + other.y) / 2.0 };
    let limit = normal.x * mid.x + normal.y * mid.y;
    let side = |p: Coord<f64>| normal.x * p.x + normal.y * p.y - limit;

    let mut out = Vec::with_capacity(ring.len() + 1);
    for k in 0..ring.len() {
        let current = ring[k];
        let next = ring[(k + 1) % ring.len()];
        let (side_current, side_next) = (side(current), side(next));

        if side_current <= 0.0 {
            out.push(current);
        }
        if (side_current < 0.0 && side_next > 0.0) || (side_current > 0.0 && side_next < 0.0) {
            let t = side_current / (side_current - side_next);
            out.push(Coord {
                x: current.x + t * (next.x - current.x),
                y: current.y + t * (next.y - current.y),
            });
        }
    }
    out
}

/// R-tree over territory bounding boxes for point-in-territory lookups.
#[derive(Debug)]
pub struct TerritoryIndex {
    rtree: RTree<IndexedBox>,
}

#[derive(Clone, Debug)]
struct IndexedBox {
    idx: usize,
    bbox: Rect<f64>,
}

impl RTreeObject for IndexedBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

impl TerritoryIndex {
    /// Build an index over the given shapes (degenerate shapes are skipped).
    pub fn new(shapes: &[MultiPolygon<f64>]) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(idx, shape)| {
                        shape.bounding_rect().map(|bbox| IndexedBox { idx, bbox })
                    })
                    .collect(),
            ),
        }
    }

    /// Indices of shapes whose bounding box contains the point. Callers must
    /// confirm membership with an exact point-in-polygon test.
    pub fn candidates(&self, point: Point<f64>) -> impl Iterator<Item = usize> + '_ {
        self.rtree
            .locate_in_envelope_intersecting(&AABB::from_point([point.x(), point.y()]))
            .map(|entry| entry.idx)
    }
}
