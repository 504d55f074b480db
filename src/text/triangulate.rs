//! Polygon triangulation for glyph caps.
//!
//! Glyph outlines arrive as loose contours. [`group_contours`] sorts them into
//! shapes (an outer boundary plus its holes) by containment, [`triangulate`]
//! bridges each hole into its boundary and ear-clips the resulting single
//! polygon.

use glam::Vec2;

use super::font::Contour;

const EPSILON: f32 = 1e-9;

/// An outer boundary and the holes cut out of it.
///
/// After [`group_contours`] the outer contour winds counter-clockwise and
/// holes wind clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub outer: Contour,
    pub holes: Vec<Contour>,
}

impl Shape {
    /// Filled area: outer area minus hole areas.
    pub fn area(&self) -> f32 {
        signed_area(&self.outer).abs() - self.holes.iter().map(|h| signed_area(h).abs()).sum::<f32>()
    }
}

/// Shoelace area; positive for counter-clockwise winding.
pub fn signed_area(contour: &[Vec2]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| contour[i].perp_dot(contour[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

/// Even-odd point in polygon test.
pub fn contains_point(contour: &[Vec2], p: Vec2) -> bool {
    let n = contour.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let a = contour[i];
        let b = contour[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Group contours into shapes by nesting depth.
///
/// A contour inside an even number of others is an outer boundary; one inside
/// an odd number is a hole of the smallest boundary around it. Winding in the
/// input is ignored, so fonts of either orientation convention work.
pub fn group_contours(contours: Vec<Contour>) -> Vec<Shape> {
    let areas: Vec<f32> = contours.iter().map(|c| signed_area(c).abs()).collect();
    let inside = |inner: usize, outer: usize| -> bool {
        inner != outer && areas[outer] > areas[inner] && contains_point(&contours[outer], contours[inner][0])
    };

    let depth: Vec<usize> = (0..contours.len())
        .map(|i| (0..contours.len()).filter(|&j| inside(i, j)).count())
        .collect();

    let mut shape_of = vec![usize::MAX; contours.len()];
    let mut shapes = Vec::new();
    for i in 0..contours.len() {
        if depth[i] % 2 == 0 {
            shape_of[i] = shapes.len();
            shapes.push(Shape {
                outer: with_winding(contours[i].clone(), true),
                holes: Vec::new(),
            });
        }
    }

    for i in 0..contours.len() {
        if depth[i] % 2 == 1 {
            let parent = (0..contours.len())
                .filter(|&j| depth[j] + 1 == depth[i] && inside(i, j))
                .min_by(|&a, &b| areas[a].total_cmp(&areas[b]));
            if let Some(parent) = parent {
                shapes[shape_of[parent]]
                    .holes
                    .push(with_winding(contours[i].clone(), false));
            }
        }
    }

    shapes
}

fn with_winding(mut contour: Contour, ccw: bool) -> Contour {
    if (signed_area(&contour) > 0.0) != ccw {
        contour.reverse();
    }
    contour
}

/// Triangulate a shape.
///
/// Returns the polygon's points (outer first, then each hole in order) and
/// counter-clockwise triangles indexing into them.
pub fn triangulate(shape: &Shape) -> (Vec<Vec2>, Vec<[u32; 3]>) {
    let mut points = shape.outer.clone();
    let mut hole_starts = Vec::with_capacity(shape.holes.len());
    for hole in &shape.holes {
        hole_starts.push(points.len());
        points.extend_from_slice(hole);
    }

    let mut polygon: Vec<usize> = (0..shape.outer.len()).collect();

    // rightmost holes first so earlier bridges cannot block later ones
    let mut order: Vec<usize> = (0..shape.holes.len()).collect();
    order.sort_by(|&a, &b| max_x(&shape.holes[b]).total_cmp(&max_x(&shape.holes[a])));

    for (done, &h) in order.iter().enumerate() {
        let hole: Vec<usize> = (hole_starts[h]..hole_starts[h] + shape.holes[h].len()).collect();
        let pending: Vec<&Contour> = order[done + 1..].iter().map(|&o| &shape.holes[o]).collect();
        polygon = bridge_hole(&points, polygon, &hole, &pending);
    }

    let triangles = ear_clip(&points, polygon);
    (points, triangles)
}

fn max_x(contour: &[Vec2]) -> f32 {
    contour.iter().map(|p| p.x).fold(f32::MIN, f32::max)
}

/// Splice `hole` into `polygon` through the closest mutually visible vertex pair.
fn bridge_hole(points: &[Vec2], polygon: Vec<usize>, hole: &[usize], pending: &[&Contour]) -> Vec<usize> {
    let (m_pos, &m) = hole
        .iter()
        .enumerate()
        .max_by(|a, b| points[*a.1].x.total_cmp(&points[*b.1].x).then(points[*b.1].y.total_cmp(&points[*a.1].y)))
        .unwrap_or((0, &hole[0]));
    let from = points[m];
    let hole_points: Vec<Vec2> = hole.iter().map(|&i| points[i]).collect();

    let mut candidates: Vec<usize> = (0..polygon.len()).collect();
    candidates.sort_by(|&a, &b| {
        points[polygon[a]]
            .distance_squared(from)
            .total_cmp(&points[polygon[b]].distance_squared(from))
    });

    let visible = candidates
        .iter()
        .copied()
        .find(|&c| {
            let to = points[polygon[c]];
            let blocked_by_polygon = (0..polygon.len()).any(|e| {
                let a = points[polygon[e]];
                let b = points[polygon[(e + 1) % polygon.len()]];
                segments_cross(from, to, a, b)
            });
            let mut holes = std::iter::once(hole_points.as_slice()).chain(pending.iter().map(|c| c.as_slice()));
            let blocked_by_holes = holes.clone().any(|contour| {
                (0..contour.len()).any(|e| segments_cross(from, to, contour[e], contour[(e + 1) % contour.len()]))
            });
            // the bridge must run through solid, not across a hole
            let mid = (from + to) * 0.5;
            let through_hole = holes.any(|contour| contains_point(contour, mid));
            !blocked_by_polygon && !blocked_by_holes && !through_hole
        })
        .unwrap_or(candidates[0]);

    let mut merged = Vec::with_capacity(polygon.len() + hole.len() + 2);
    merged.extend_from_slice(&polygon[..=visible]);
    merged.extend(hole[m_pos..].iter().chain(&hole[..=m_pos]));
    merged.extend_from_slice(&polygon[visible..]);
    merged
}

/// Proper intersection of segments `p1-p2` and `q1-q2`.
///
/// Segments sharing an endpoint position, or merely touching, do not cross.
fn segments_cross(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let shared = |a: Vec2, b: Vec2| a.distance_squared(b) < EPSILON;
    if shared(p1, q1) || shared(p1, q2) || shared(p2, q1) || shared(p2, q2) {
        return false;
    }
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    ((d1 > EPSILON && d2 < -EPSILON) || (d1 < -EPSILON && d2 > EPSILON))
        && ((d3 > EPSILON && d4 < -EPSILON) || (d3 < -EPSILON && d4 > EPSILON))
}

/// Z component of `(b - a) × (c - a)`.
fn cross(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

fn in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    cross(a, b, p) >= -EPSILON && cross(b, c, p) >= -EPSILON && cross(c, a, p) >= -EPSILON
}

/// Ear-clip a counter-clockwise polygon given as indices into `points`.
fn ear_clip(points: &[Vec2], mut polygon: Vec<usize>) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(polygon.len().saturating_sub(2));

    while polygon.len() > 3 {
        let n = polygon.len();
        let ear = (0..n).find(|&i| {
            let (ia, ib, ic) = (polygon[(i + n - 1) % n], polygon[i], polygon[(i + 1) % n]);
            let (a, b, c) = (points[ia], points[ib], points[ic]);
            if cross(a, b, c) <= EPSILON {
                return false;
            }
            // only reflex vertices can poke into an ear
            !(0..n).any(|k| {
                let p = points[polygon[k]];
                let corner = [a, b, c].iter().any(|q| q.distance_squared(p) < EPSILON);
                let reflex = cross(points[polygon[(k + n - 1) % n]], p, points[polygon[(k + 1) % n]]) <= EPSILON;
                !corner && reflex && in_triangle(p, a, b, c)
            })
        });

        match ear {
            Some(i) => {
                triangles.push([
                    polygon[(i + n - 1) % n] as u32,
                    polygon[i] as u32,
                    polygon[(i + 1) % n] as u32,
                ]);
                polygon.remove(i);
            }
            None => {
                // Nothing clips cleanly (degenerate input). Drop the flattest
                // vertex so the loop still terminates.
                let flattest = (0..n)
                    .min_by(|&x, &y| {
                        let fx = cross(points[polygon[(x + n - 1) % n]], points[polygon[x]], points[polygon[(x + 1) % n]]).abs();
                        let fy = cross(points[polygon[(y + n - 1) % n]], points[polygon[y]], points[polygon[(y + 1) % n]]).abs();
                        fx.total_cmp(&fy)
                    })
                    .unwrap_or(0);
                polygon.remove(flattest);
            }
        }
    }

    if polygon.len() == 3 && cross(points[polygon[0]], points[polygon[1]], points[polygon[2]]) > EPSILON {
        triangles.push([polygon[0] as u32, polygon[1] as u32, polygon[2] as u32]);
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f32, max: f32) -> Contour {
        vec![
            Vec2::new(min, min),
            Vec2::new(max, min),
            Vec2::new(max, max),
            Vec2::new(min, max),
        ]
    }

    fn triangulated_area(points: &[Vec2], triangles: &[[u32; 3]]) -> f32 {
        triangles
            .iter()
            .map(|t| {
                let area = cross(points[t[0] as usize], points[t[1] as usize], points[t[2] as usize]) * 0.5;
                assert!(area > 0.0, "triangle {:?} is not counter-clockwise", t);
                area
            })
            .sum()
    }

    #[test]
    fn test_square_gives_two_triangles() {
        let shapes = group_contours(vec![square(0.0, 1.0)]);
        let (points, triangles) = triangulate(&shapes[0]);
        assert_eq!(triangles.len(), 2);
        assert!((triangulated_area(&points, &triangles) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_clockwise_input_is_normalised() {
        let mut cw = square(0.0, 2.0);
        cw.reverse();
        let shapes = group_contours(vec![cw]);
        assert!(signed_area(&shapes[0].outer) > 0.0);
        let (points, triangles) = triangulate(&shapes[0]);
        assert!((triangulated_area(&points, &triangles) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_square_with_hole() {
        for reverse_hole in [false, true] {
            let mut hole = square(1.0, 3.0);
            if reverse_hole {
                hole.reverse();
            }
            let shapes = group_contours(vec![hole, square(0.0, 4.0)]);
            assert_eq!(shapes.len(), 1);
            assert_eq!(shapes[0].holes.len(), 1);
            assert!(signed_area(&shapes[0].holes[0]) < 0.0);
            assert!((shapes[0].area() - 12.0).abs() < 1e-5);

            let (points, triangles) = triangulate(&shapes[0]);
            assert_eq!(triangles.len(), 8);
            assert!((triangulated_area(&points, &triangles) - 12.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_island_inside_hole_is_its_own_shape() {
        let shapes = group_contours(vec![square(0.0, 10.0), square(2.0, 8.0), square(4.0, 6.0)]);
        assert_eq!(shapes.len(), 2);
        let total: f32 = shapes
            .iter()
            .map(|s| {
                let (points, triangles) = triangulate(s);
                triangulated_area(&points, &triangles)
            })
            .sum();
        assert!((total - (100.0 - 36.0 + 4.0)).abs() < 1e-3);
    }

    #[test]
    fn test_two_holes() {
        let shapes = group_contours(vec![
            square(0.0, 10.0),
            vec![Vec2::new(1.0, 1.0), Vec2::new(4.0, 1.0), Vec2::new(4.0, 9.0), Vec2::new(1.0, 9.0)],
            vec![Vec2::new(6.0, 1.0), Vec2::new(9.0, 1.0), Vec2::new(9.0, 9.0), Vec2::new(6.0, 9.0)],
        ]);
        assert_eq!(shapes[0].holes.len(), 2);
        let (points, triangles) = triangulate(&shapes[0]);
        assert!((triangulated_area(&points, &triangles) - (100.0 - 48.0)).abs() < 1e-3);
    }

    #[test]
    fn test_concave_outline() {
        // L shape
        let l = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 3.0),
            Vec2::new(0.0, 3.0),
        ];
        let shapes = group_contours(vec![l]);
        let (points, triangles) = triangulate(&shapes[0]);
        assert_eq!(triangles.len(), 4);
        assert!((triangulated_area(&points, &triangles) - 5.0).abs() < 1e-5);
    }
}
