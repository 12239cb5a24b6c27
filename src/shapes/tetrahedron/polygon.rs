use std::mem;

use bytemuck::{Pod, Zeroable};

pub const POS_ATTR_LOCATION: u32 = 0;
pub const COL_ATTR_LOCATION: u32 = 1;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    pub const POSITION_OFFSET: wgpu::BufferAddress = 0;
    pub const COLOR_OFFSET: wgpu::BufferAddress = mem::size_of::<[f32; 3]>() as wgpu::BufferAddress;

    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: Self::POSITION_OFFSET,
            shader_location: POS_ATTR_LOCATION,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: Self::COLOR_OFFSET,
            shader_location: COL_ATTR_LOCATION,
        },
    ];

    /// Interleaved layout: one record per vertex, position then color.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Host-side staging copy of the mesh, consumed by the upload.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Regular tetrahedron inscribed in the unit sphere, apex on +Z.
    ///
    /// Faces wind counter-clockwise when seen from outside.
    pub fn tetrahedron() -> Self {
        let third = 1.0 / 3.0;
        let vertices = vec![
            Vertex {
                position: [(8.0f32 / 9.0).sqrt(), 0.0, -third],
                color: [1.0, 0.25, 0.25],
            },
            Vertex {
                position: [-(2.0f32 / 9.0).sqrt(), (2.0f32 / 3.0).sqrt(), -third],
                color: [0.25, 1.0, 0.25],
            },
            Vertex {
                position: [-(2.0f32 / 9.0).sqrt(), -(2.0f32 / 3.0).sqrt(), -third],
                color: [0.25, 0.25, 1.0],
            },
            Vertex {
                position: [0.0, 0.0, 1.0],
                color: [1.0, 1.0, 0.25],
            },
        ];

        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, // base
            0, 1, 3,
            3, 1, 2,
            3, 2, 0,
        ];

        Geometry { vertices, indices }
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|face| [face[0], face[1], face[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    const EPS: f32 = 1e-5;

    fn position(geometry: &Geometry, index: u32) -> Vector3<f32> {
        Vector3::from(geometry.vertices[index as usize].position)
    }

    #[test]
    fn vertices_lie_on_unit_sphere() {
        let geometry = Geometry::tetrahedron();
        assert_eq!(geometry.vertices.len(), 4);
        for vertex in &geometry.vertices {
            let r = Vector3::from(vertex.position).magnitude();
            assert!((r - 1.0).abs() < EPS, "radius {}", r);
        }
    }

    #[test]
    fn tetrahedron_is_regular_and_centered() {
        let geometry = Geometry::tetrahedron();
        let edge = (position(&geometry, 0) - position(&geometry, 1)).magnitude();
        for a in 0..4 {
            for b in (a + 1)..4 {
                let d = (position(&geometry, a) - position(&geometry, b)).magnitude();
                assert!((d - edge).abs() < EPS);
            }
        }
        let centroid = (0..4).map(|i| position(&geometry, i)).sum::<Vector3<f32>>() / 4.0;
        assert!(centroid.magnitude() < EPS);
    }

    #[test]
    fn colors_are_distinct() {
        let geometry = Geometry::tetrahedron();
        for (i, a) in geometry.vertices.iter().enumerate() {
            for b in &geometry.vertices[i + 1..] {
                assert_ne!(a.color, b.color);
            }
        }
    }

    #[test]
    fn indices_form_four_triangles_in_range() {
        let geometry = Geometry::tetrahedron();
        assert_eq!(geometry.indices.len(), 12);
        assert_eq!(geometry.triangles().count(), 4);
        assert!(geometry.indices.iter().all(|&i| i < 4));
        for face in geometry.triangles() {
            assert!(face[0] != face[1] && face[1] != face[2] && face[0] != face[2]);
        }
    }

    #[test]
    fn faces_wind_counter_clockwise_from_outside() {
        let geometry = Geometry::tetrahedron();
        for [a, b, c] in geometry.triangles() {
            let (pa, pb, pc) = (position(&geometry, a), position(&geometry, b), position(&geometry, c));
            let normal = (pb - pa).cross(pc - pa);
            let center = (pa + pb + pc) / 3.0;
            assert!(normal.dot(center) > 0.0, "face {:?} faces inward", [a, b, c]);
        }
    }

    #[test]
    fn every_edge_is_shared_in_opposite_directions() {
        let geometry = Geometry::tetrahedron();
        let edges: Vec<(u32, u32)> = geometry
            .triangles()
            .flat_map(|[a, b, c]| [(a, b), (b, c), (c, a)])
            .collect();
        assert_eq!(edges.len(), 12);
        for &(a, b) in &edges {
            assert!(edges.contains(&(b, a)));
        }
    }

    #[test]
    fn layout_matches_vertex_record() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].shader_location, POS_ATTR_LOCATION);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].shader_location, COL_ATTR_LOCATION);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&Geometry::tetrahedron().vertices).len(), 96);
    }
}
