//! Extruded text meshes.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use super::font::{Contour, Typeface};
use super::triangulate::{group_contours, triangulate, Shape};
use crate::error::FontError;
use crate::mesh::{MeshData, MeshVertex};

/// Rounded edge between the caps and the side walls.
///
/// The caps move out by `thickness` along Z while the walls grow outward by
/// `size`, joined by `segments` quarter-circle steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bevel {
    pub thickness: f32,
    pub size: f32,
    pub segments: u32,
}

impl Default for Bevel {
    fn default() -> Self {
        Self {
            thickness: 0.2,
            size: 0.05,
            segments: 5,
        }
    }
}

/// Size and extrusion parameters for [`text_mesh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel: Option<Bevel>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 3.0,
            depth: 0.5,
            curve_segments: 12,
            bevel: Some(Bevel::default()),
        }
    }
}

/// Build the extruded, centred mesh for `text`.
///
/// UVs are planar in scene units: caps use `(x, y)`, side walls run along the
/// dominant edge axis with `1 - z` as the second coordinate.
pub fn text_mesh(font: &Typeface, text: &str, style: &TextStyle) -> Result<MeshData, FontError> {
    let mut mesh = MeshData::default();
    for glyph in font.layout(text, style.size, style.curve_segments)? {
        for shape in group_contours(glyph) {
            extrude_shape(&mut mesh, &shape, style.depth, style.bevel.as_ref());
        }
    }

    if mesh.is_empty() {
        return Err(FontError::EmptyText);
    }
    mesh.center();
    Ok(mesh)
}

/// Append the caps and side walls of one shape, extruded from `z = 0` to
/// `z = depth`. A bevel pushes the caps out to `-thickness` and
/// `depth + thickness`.
pub fn extrude_shape(mesh: &mut MeshData, shape: &Shape, depth: f32, bevel: Option<&Bevel>) {
    let (points, triangles) = triangulate(shape);
    if triangles.is_empty() {
        return;
    }

    let profile = wall_profile(depth, bevel);
    let (back_z, front_z) = match (profile.first(), profile.last()) {
        (Some(back), Some(front)) => (back.0, front.0),
        _ => (0.0, depth),
    };

    // front cap faces +Z
    let base = mesh.vertices.len() as u32;
    mesh.vertices
        .extend(points.iter().map(|p| MeshVertex::new(p.extend(front_z), Vec3::Z, *p)));
    for t in &triangles {
        mesh.indices.extend([base + t[0], base + t[1], base + t[2]]);
    }

    // back cap faces -Z, so its winding flips
    let base = mesh.vertices.len() as u32;
    mesh.vertices
        .extend(points.iter().map(|p| MeshVertex::new(p.extend(back_z), Vec3::NEG_Z, *p)));
    for t in &triangles {
        mesh.indices.extend([base + t[0], base + t[2], base + t[1]]);
    }

    side_walls(mesh, &shape.outer, &profile);
    for hole in &shape.holes {
        side_walls(mesh, hole, &profile);
    }
}

/// `(z, outward offset)` stations from the back cap edge to the front cap edge.
fn wall_profile(depth: f32, bevel: Option<&Bevel>) -> Vec<(f32, f32)> {
    let Some(bevel) = bevel.filter(|b| b.thickness > 0.0 || b.size > 0.0) else {
        return vec![(0.0, 0.0), (depth, 0.0)];
    };
    let segments = bevel.segments.max(1);
    let station = |k: u32| {
        let angle = k as f32 / segments as f32 * FRAC_PI_2;
        (bevel.thickness * angle.cos(), bevel.size * angle.sin())
    };

    let mut profile = Vec::with_capacity(2 * segments as usize + 2);
    profile.extend((0..=segments).map(|k| {
        let (z, offset) = station(k);
        (-z, offset)
    }));
    profile.extend((0..=segments).rev().map(|k| {
        let (z, offset) = station(k);
        (depth + z, offset)
    }));
    profile
}

/// Per-vertex outward direction, scaled so offset edges stay parallel.
fn miter_directions(contour: &Contour) -> Vec<Vec2> {
    let n = contour.len();
    let outward = |a: Vec2, b: Vec2| {
        let edge = b - a;
        Vec2::new(edge.y, -edge.x).normalize_or_zero()
    };
    (0..n)
        .map(|i| {
            let prev = contour[(i + n - 1) % n];
            let here = contour[i];
            let next = contour[(i + 1) % n];
            let (n0, n1) = (outward(prev, here), outward(here, next));
            let dir = (n0 + n1).normalize_or_zero();
            if dir == Vec2::ZERO {
                return n1;
            }
            // clamp the miter on sharp spikes
            dir / dir.dot(n1).max(0.25)
        })
        .collect()
}

/// Flat-shaded quads per contour edge between consecutive profile stations,
/// facing away from the solid.
fn side_walls(mesh: &mut MeshData, contour: &Contour, profile: &[(f32, f32)]) {
    let n = contour.len();
    let miters = miter_directions(contour);
    for i in 0..n {
        let j = (i + 1) % n;
        let (a, b) = (contour[i], contour[j]);
        let edge = b - a;
        if edge.length_squared() <= f32::EPSILON * f32::EPSILON {
            continue;
        }
        let along_x = edge.x.abs() > edge.y.abs();
        let uv = |p: Vec3| Vec2::new(if along_x { p.x } else { p.y }, 1.0 - p.z);

        for band in profile.windows(2) {
            let (z0, off0) = band[0];
            let (z1, off1) = band[1];
            let a0 = (a + miters[i] * off0).extend(z0);
            let b0 = (b + miters[j] * off0).extend(z0);
            let b1 = (b + miters[j] * off1).extend(z1);
            let a1 = (a + miters[i] * off1).extend(z1);
            // outer contours run CCW and holes CW, so the diagonals' cross points outward
            let normal = (b1 - a0).cross(a1 - b0).normalize_or_zero();
            if normal == Vec3::ZERO {
                continue;
            }

            let base = mesh.vertices.len() as u32;
            mesh.vertices.extend([
                MeshVertex::new(a0, normal, uv(a0)),
                MeshVertex::new(b0, normal, uv(b0)),
                MeshVertex::new(b1, normal, uv(b1)),
                MeshVertex::new(a1, normal, uv(a1)),
            ]);
            mesh.indices
                .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::font::TEST_FONT;

    fn face_normal(mesh: &MeshData, tri: usize) -> Vec3 {
        let p = |k: usize| Vec3::from_array(mesh.vertices[mesh.indices[tri * 3 + k] as usize].position);
        (p(1) - p(0)).cross(p(2) - p(0))
    }

    #[test]
    fn test_extruded_square() {
        let square = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let mut mesh = MeshData::default();
        extrude_shape(&mut mesh, &group_contours(vec![square]).remove(0), 0.5, None);

        // 2 per cap plus 2 per side
        assert_eq!(mesh.triangle_count(), 2 + 2 + 4 * 2);
        // every triangle's winding agrees with its stored normal
        for tri in 0..mesh.triangle_count() {
            let normal = Vec3::from_array(mesh.vertices[mesh.indices[tri * 3] as usize].normal);
            assert!(face_normal(&mesh, tri).dot(normal) > 0.0, "triangle {}", tri);
        }
    }

    #[test]
    fn test_hole_walls_face_into_the_hole() {
        let font = Typeface::from_json_str(TEST_FONT).unwrap();
        let mesh = text_mesh(&font, "o", &TextStyle { size: 1.0, depth: 0.2, curve_segments: 4, bevel: None }).unwrap();
        // caps: 8 triangles each; walls: 8 edges
        assert_eq!(mesh.triangle_count(), 8 * 2 + 8 * 2);
        for tri in 0..mesh.triangle_count() {
            let normal = Vec3::from_array(mesh.vertices[mesh.indices[tri * 3] as usize].normal);
            assert!(face_normal(&mesh, tri).dot(normal) > 0.0);
        }
        // a wall on the hole's right edge faces -X toward the hole's centre
        let inner_right = mesh.vertices.iter().any(|v| {
            (v.position[0] - 0.2).abs() < 1e-5 && (Vec3::from_array(v.normal) - Vec3::NEG_X).length() < 1e-5
        });
        assert!(inner_right);
    }

    #[test]
    fn test_text_is_centred() {
        let font = Typeface::from_json_str(TEST_FONT).unwrap();
        let style = TextStyle { bevel: None, ..TextStyle::default() };
        let mesh = text_mesh(&font, "lol", &style).unwrap();
        let (min, max) = mesh.bounds().unwrap();
        assert!((min + max).length() < 1e-4);
        assert!((max.z - min.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_bevelled_square() {
        let square = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let bevel = Bevel { thickness: 0.2, size: 0.05, segments: 3 };
        let mut mesh = MeshData::default();
        extrude_shape(&mut mesh, &group_contours(vec![square]).remove(0), 0.5, Some(&bevel));

        // caps, then 2 * segments + 1 bands of 4 sides
        assert_eq!(mesh.triangle_count(), 2 + 2 + (2 * 3 + 1) * 4 * 2);
        for tri in 0..mesh.triangle_count() {
            let normal = Vec3::from_array(mesh.vertices[mesh.indices[tri * 3] as usize].normal);
            assert!(face_normal(&mesh, tri).dot(normal) > 0.0, "triangle {}", tri);
        }

        let (min, max) = mesh.bounds().unwrap();
        assert!((min - Vec3::new(-0.05, -0.05, -0.2)).length() < 1e-5);
        assert!((max - Vec3::new(1.05, 1.05, 0.7)).length() < 1e-5);
    }

    #[test]
    fn test_bevel_widens_text() {
        let font = Typeface::from_json_str(TEST_FONT).unwrap();
        let flat = text_mesh(&font, "lo", &TextStyle { bevel: None, ..TextStyle::default() }).unwrap();
        let bevelled = text_mesh(&font, "lo", &TextStyle::default()).unwrap();

        let (flat_min, flat_max) = flat.bounds().unwrap();
        let (min, max) = bevelled.bounds().unwrap();
        assert!((max.z - min.z) - (flat_max.z - flat_min.z) > 0.39);
        assert!((max.x - min.x) - (flat_max.x - flat_min.x) > 0.09);
        assert!(bevelled.triangle_count() > flat.triangle_count());
    }

    #[test]
    fn test_empty_text() {
        let font = Typeface::from_json_str(TEST_FONT).unwrap();
        assert!(matches!(
            text_mesh(&font, "   ", &TextStyle::default()),
            Err(FontError::EmptyText)
        ));
    }
}
