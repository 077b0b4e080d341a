//! Flat polygon buffers in projected coordinates.
//!
//! Buffers are assembled from circle approximations: a point buffers to a
//! polygonized circle, a segment to the convex hull of its endpoint
//! circles, and lines and polygons to the boolean union of their segment
//! capsules.

use geo::{
    Area, BooleanOps, ConvexHull, Coord, LineString, MultiPoint, MultiPolygon, Point, Polygon,
};

/// Vertices used to approximate a circle.
const CIRCLE_SEGMENTS: usize = 32;

fn circle(center: Coord<f64>, radius: f64) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = (0..=CIRCLE_SEGMENTS)
        .map(|i| {
            let angle = std::f64::consts::TAU * (i as f64) / (CIRCLE_SEGMENTS as f64);
            Coord {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::new(coords), vec![])
}

/// Buffer of a single segment: the convex hull of both endpoint circles.
fn capsule(a: Coord<f64>, b: Coord<f64>, radius: f64) -> Polygon<f64> {
    let points: Vec<Point<f64>> = circle(a, radius)
        .exterior()
        .points()
        .chain(circle(b, radius).exterior().points())
        .collect();
    MultiPoint::new(points).convex_hull()
}

fn union_all(polygons: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    let mut result = MultiPolygon::new(Vec::new());
    for polygon in polygons {
        if polygon.unsigned_area() == 0.0 {
            continue;
        }
        result = result.union(&MultiPolygon::new(vec![polygon]));
    }
    result
}

pub fn buffer_point(point: &Point<f64>, radius: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![circle(point.0, radius)])
}

pub fn buffer_line(line: &LineString<f64>, radius: f64) -> MultiPolygon<f64> {
    union_all(
        line.lines()
            .map(|segment| capsule(segment.start, segment.end, radius))
            .collect(),
    )
}

/// Buffer a polygon outward: the polygon itself unioned with a capsule per
/// exterior segment.
pub fn buffer_polygon(polygon: &Polygon<f64>, radius: f64) -> MultiPolygon<f64> {
    let mut parts: Vec<Polygon<f64>> = polygon
        .exterior()
        .lines()
        .map(|segment| capsule(segment.start, segment.end, radius))
        .collect();
    if polygon.unsigned_area() > 0.0 {
        parts.push(polygon.clone());
    }
    union_all(parts)
}
