//! CPU-side triangle meshes shared by the sky dome and the text.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Vertex layout used by every mesh pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }

    /// Vertex buffer layout: position, normal, uv at locations 0, 1, 2.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from_array(v.position));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Translate so the bounding box is centred on the origin.
    pub fn center(&mut self) {
        if let Some((min, max)) = self.bounds() {
            let offset = (min + max) * 0.5;
            for v in &mut self.vertices {
                v.position = (Vec3::from_array(v.position) - offset).to_array();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
    }

    #[test]
    fn test_center() {
        let mut mesh = MeshData {
            vertices: vec![
                MeshVertex::new(Vec3::new(2.0, 2.0, 0.0), Vec3::Z, Vec2::ZERO),
                MeshVertex::new(Vec3::new(6.0, 4.0, 1.0), Vec3::Z, Vec2::ZERO),
            ],
            indices: vec![],
        };
        mesh.center();
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::new(-2.0, -1.0, -0.5));
        assert_eq!(max, Vec3::new(2.0, 1.0, 0.5));
    }
}
