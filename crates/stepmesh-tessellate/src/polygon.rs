//! Ear-clipping triangulation of planar polygons with holes.

use thiserror::Error;

/// A 2D point in a face's parameter plane.
pub type Point2 = (f64, f64);

/// Why a polygon could not be triangulated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolygonError {
    /// The outer loop has fewer than three distinct points.
    #[error("outer loop has {0} points, need at least 3")]
    TooFewPoints(usize),
    /// The outer loop encloses no area.
    #[error("outer loop encloses no area")]
    ZeroArea,
}

/// Output of [`triangulate`]: vertices and counter-clockwise triangles over them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    /// Outer loop first, then each hole, in input order.
    pub vertices: Vec<Point2>,
    /// Indices into `vertices`.
    pub triangles: Vec<[u32; 3]>,
}

/// Twice the signed area; positive for counter-clockwise loops.
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.0 * b.1 - b.0 * a.1
        })
        .sum()
}

fn cross(o: Point2, a: Point2, b: Point2) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Triangulate `outer` minus `holes`.
///
/// Loop orientation in the input does not matter: the outer loop is made
/// counter-clockwise and holes clockwise before bridging. Holes with fewer
/// than three points are ignored.
pub fn triangulate(outer: &[Point2], holes: &[Vec<Point2>]) -> Result<Triangulation, PolygonError> {
    if outer.len() < 3 {
        return Err(PolygonError::TooFewPoints(outer.len()));
    }
    let area = signed_area(outer);
    let scale = bbox_extent(outer).powi(2);
    if !(area.abs() > 1e-12 * scale) {
        return Err(PolygonError::ZeroArea);
    }

    let mut vertices: Vec<Point2> = outer.to_vec();
    if area < 0.0 {
        vertices.reverse();
    }
    let mut loops: Vec<(usize, usize)> = Vec::new();
    for hole in holes.iter().filter(|h| h.len() >= 3) {
        let start = vertices.len();
        vertices.extend_from_slice(hole);
        if signed_area(hole) > 0.0 {
            vertices[start..].reverse();
        }
        loops.push((start, hole.len()));
    }

    let mut polygon: Vec<usize> = (0..outer.len()).collect();

    // Rightmost holes first, so later bridges never cross earlier ones.
    let rightmost = |&(start, len): &(usize, usize)| {
        (start..start + len)
            .max_by(|&a, &b| vertices[a].0.total_cmp(&vertices[b].0))
            .unwrap_or(start)
    };
    loops.sort_by(|a, b| vertices[rightmost(b)].0.total_cmp(&vertices[rightmost(a)].0));

    for (k, &(start, len)) in loops.iter().enumerate() {
        let m = rightmost(&(start, len));
        let pending = &loops[k + 1..];
        let Some(j) = find_bridge(&vertices, &polygon, (start, len), pending, m) else {
            continue;
        };

        let hole: Vec<usize> = (0..len).map(|i| start + (m - start + i) % len).collect();
        let mut merged = Vec::with_capacity(polygon.len() + len + 2);
        merged.extend_from_slice(&polygon[..=j]);
        merged.extend_from_slice(&hole);
        merged.push(m);
        merged.push(polygon[j]);
        merged.extend_from_slice(&polygon[j + 1..]);
        polygon = merged;
    }

    let triangles = ear_clip(&vertices, polygon);
    Ok(Triangulation { vertices, triangles })
}

fn bbox_extent(points: &[Point2]) -> f64 {
    let (mut lo, mut hi) = ((f64::MAX, f64::MAX), (f64::MIN, f64::MIN));
    for p in points {
        lo = (lo.0.min(p.0), lo.1.min(p.1));
        hi = (hi.0.max(p.0), hi.1.max(p.1));
    }
    (hi.0 - lo.0).max(hi.1 - lo.1)
}

/// Position in `polygon` of the vertex hole vertex `m` should connect to.
///
/// Candidates are tried nearest first; a bridge must start inside the
/// polygon's corner at that vertex and cross no edge of the polygon, the
/// hole itself, or holes not yet merged.
fn find_bridge(
    vertices: &[Point2],
    polygon: &[usize],
    hole: (usize, usize),
    pending: &[(usize, usize)],
    m: usize,
) -> Option<usize> {
    let pm = vertices[m];
    let dist2 = |i: usize| {
        let p = vertices[i];
        (p.0 - pm.0).powi(2) + (p.1 - pm.1).powi(2)
    };
    let mut order: Vec<usize> = (0..polygon.len()).collect();
    order.sort_by(|&a, &b| dist2(polygon[a]).total_cmp(&dist2(polygon[b])));

    let n = polygon.len();
    let loop_edges = |(start, len): (usize, usize)| (0..len).map(move |i| (start + i, start + (i + 1) % len));
    let polygon_edges = (0..n).map(|i| (polygon[i], polygon[(i + 1) % n]));

    let edges: Vec<(usize, usize)> = polygon_edges
        .chain(loop_edges(hole))
        .chain(pending.iter().flat_map(|&l| loop_edges(l)))
        .collect();

    order.into_iter().find(|&j| {
        let p = polygon[j];
        let prev = vertices[polygon[(j + n - 1) % n]];
        let next = vertices[polygon[(j + 1) % n]];
        locally_inside(prev, vertices[p], next, pm)
            && !edges.iter().any(|&(a, b)| {
                a != p && b != p && a != m && b != m
                    && segments_cross(vertices[p], pm, vertices[a], vertices[b])
            })
    })
}

/// Does `q` lie inside the corner `prev → p → next` of a counter-clockwise polygon?
fn locally_inside(prev: Point2, p: Point2, next: Point2, q: Point2) -> bool {
    if cross(prev, p, next) >= 0.0 {
        cross(prev, p, q) > 0.0 && cross(p, next, q) > 0.0
    } else {
        cross(prev, p, q) > 0.0 || cross(p, next, q) > 0.0
    }
}

/// Proper intersection of segments `ab` and `cd` (touching does not count).
fn segments_cross(a: Point2, b: Point2, c: Point2, d: Point2) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Clip ears off a counter-clockwise polygon given as indices into `vertices`.
fn ear_clip(vertices: &[Point2], mut remaining: Vec<usize>) -> Vec<[u32; 3]> {
    let mut out = Vec::with_capacity(remaining.len().saturating_sub(2));
    let mut cursor = 0;

    while remaining.len() > 3 {
        let n = remaining.len();
        let corner = |i: usize| ((i + n - 1) % n, i, (i + 1) % n);

        let ear = (0..n).map(|k| (cursor + k) % n).find(|&i| {
            let (prev, _, next) = corner(i);
            let (a, b, c) = (remaining[prev], remaining[i], remaining[next]);
            cross(vertices[a], vertices[b], vertices[c]) > 0.0
                && !remaining.iter().any(|&v| {
                    v != a && v != b && v != c
                        && point_in_triangle(vertices[v], vertices[a], vertices[b], vertices[c])
                })
        });

        // No clean ear: clip the sharpest convex corner, or stop if none is left.
        let ear = ear.or_else(|| {
            (0..n)
                .map(|i| {
                    let (prev, _, next) = corner(i);
                    (i, cross(vertices[remaining[prev]], vertices[remaining[i]], vertices[remaining[next]]))
                })
                .filter(|&(_, c)| c > 0.0)
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i)
        });
        let Some(i) = ear else {
            break;
        };

        let (prev, _, next) = corner(i);
        out.push([remaining[prev] as u32, remaining[i] as u32, remaining[next] as u32]);
        remaining.remove(i);
        cursor = if i == 0 { 0 } else { i - 1 };
    }

    if remaining.len() == 3 && cross(vertices[remaining[0]], vertices[remaining[1]], vertices[remaining[2]]) > 0.0 {
        out.push([remaining[0] as u32, remaining[1] as u32, remaining[2] as u32]);
    }
    out
}

/// Strictly inside, by barycentric coordinates.
fn point_in_triangle(p: Point2, a: Point2, b: Point2, c: Point2) -> bool {
    let v0 = (c.0 - a.0, c.1 - a.1);
    let v1 = (b.0 - a.0, b.1 - a.1);
    let v2 = (p.0 - a.0, p.1 - a.1);

    let dot00 = v0.0 * v0.0 + v0.1 * v0.1;
    let dot01 = v0.0 * v1.0 + v0.1 * v1.1;
    let dot02 = v0.0 * v2.0 + v0.1 * v2.1;
    let dot11 = v1.0 * v1.0 + v1.1 * v1.1;
    let dot12 = v1.0 * v2.0 + v1.1 * v2.1;

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom == 0.0 {
        return false;
    }
    let u = (dot11 * dot02 - dot01 * dot12) / denom;
    let v = (dot00 * dot12 - dot01 * dot02) / denom;

    let eps = 1e-10;
    u > eps && v > eps && (u + v) < 1.0 - eps
}
