//! Mesh representation for 3D models
//!
//! A [`Mesh`] pairs an immutable indexed vertex buffer with its own
//! [`Transform`] and [`Material`]. Vertex and index arrays live behind
//! [`Arc`] so instancing a mesh never copies geometry.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use crate::assets::vertex_indexer::{self, VERTEX_STRIDE};
use crate::foundation::math::{Transform, Vec3};
use crate::render::material::Material;

/// Vertex data structure for 3D rendering with position, normal, and texture coordinates.
///
/// The `#[repr(C)]` layout matches the flattened 8-float stream produced by
/// the scene loaders, so buffers can be handed to the graphics API as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }

    /// Build a vertex from one 8-float record
    fn from_record(record: &[f32]) -> Self {
        Self {
            position: [record[0], record[1], record[2]],
            normal: [record[3], record[4], record[5]],
            tex_coord: [record[6], record[7]],
        }
    }
}

/// 3D mesh with indexed geometry, placement and surface description
///
/// Geometry is immutable after construction. The local bounding radius is
/// computed once and scaled by the transform on demand.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Arc<[Vertex]>,
    indices: Arc<[u32]>,
    local_radius: f32,

    /// World placement (owned; copied on instancing)
    pub transform: Transform,

    /// Surface description (texture shared, tints owned)
    pub material: Material,
}

impl Mesh {
    /// Create a mesh from already-indexed geometry
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, transform: Transform, material: Material) -> Self {
        let local_radius = max_vertex_distance(&vertices);
        Self {
            vertices: vertices.into(),
            indices: indices.into(),
            local_radius,
            transform,
            material,
        }
    }

    /// Create a mesh from an uncompressed 8-float-per-corner vertex stream
    ///
    /// The stream is deduplicated through the vertex indexer first.
    pub fn from_uncompressed(stream: &[f32], transform: Transform, material: Material) -> Self {
        let indexed = vertex_indexer::index_vertices(stream, VERTEX_STRIDE);
        let vertices = indexed
            .vertices
            .chunks_exact(VERTEX_STRIDE)
            .map(Vertex::from_record)
            .collect();
        Self::new(vertices, indexed.indices, transform, material)
    }

    /// Unit cube (side 1) centred on the origin, 36 corners indexed down to 24 vertices
    pub fn default_cube(material: Material) -> Self {
        Self::from_uncompressed(&cube_stream(), Transform::identity(), material)
    }

    /// Copy this mesh, sharing its geometry buffers
    ///
    /// The copy receives `transform` or, if `None`, a copy of this mesh's
    /// transform. The material is always copied.
    pub fn instantiate(&self, transform: Option<Transform>) -> Self {
        Self {
            vertices: Arc::clone(&self.vertices),
            indices: Arc::clone(&self.indices),
            local_radius: self.local_radius,
            transform: transform.unwrap_or(self.transform),
            material: self.material.clone(),
        }
    }

    /// Unique vertices
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle index list
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex buffer as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Number of unique vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Whether two meshes share the same geometry buffers
    pub fn shares_geometry_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.vertices, &other.vertices) && Arc::ptr_eq(&self.indices, &other.indices)
    }

    /// Largest vertex distance from the local origin, unscaled
    pub fn local_radius(&self) -> f32 {
        self.local_radius
    }

    /// Bounding sphere radius in world units
    pub fn bounding_radius(&self) -> f32 {
        self.local_radius * self.transform.scale
    }

    /// Bounding sphere centre in world space
    pub fn center(&self) -> Vec3 {
        self.transform.position
    }
}

fn max_vertex_distance(vertices: &[Vertex]) -> f32 {
    vertices
        .iter()
        .map(|vertex| Vec3::from(vertex.position).norm_squared())
        .fold(0.0_f32, f32::max)
        .sqrt()
}

/// Flattened corners of the unit cube, two triangles per face
fn cube_stream() -> Vec<f32> {
    // (normal, tangent u, tangent v) per face; u × v == normal keeps winding CCW
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ];
    const CORNERS: [[f32; 2]; 6] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]];

    let mut stream = Vec::with_capacity(FACES.len() * CORNERS.len() * VERTEX_STRIDE);
    for (normal, u, v) in FACES {
        let (normal, u, v) = (Vec3::from(normal), Vec3::from(u), Vec3::from(v));
        for [s, t] in CORNERS {
            let position = normal * 0.5 + u * (s - 0.5) + v * (t - 0.5);
            stream.extend_from_slice(position.as_slice());
            stream.extend_from_slice(normal.as_slice());
            stream.extend_from_slice(&[s, t]);
        }
    }
    stream
}
