//! Vertex deduplication
//!
//! Turns an uncompressed per-corner vertex stream into unique vertices plus a
//! triangle index list. Two vertices are merged only when every float is
//! bit-identical, so `-0.0` and `0.0` stay distinct and NaN payloads are
//! compared exactly.

use std::collections::HashMap;

/// Floats per vertex: position (3), normal (3), texture coordinate (2)
pub const VERTEX_STRIDE: usize = 8;

/// Result of indexing a vertex stream
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedVertices {
    /// Unique vertices, flattened, in first-occurrence order
    pub vertices: Vec<f32>,
    /// One entry per input vertex, pointing into `vertices`
    pub indices: Vec<u32>,
}

impl IndexedVertices {
    /// Number of vertices in the input stream
    pub fn original_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of distinct vertices
    pub fn unique_count(&self, stride: usize) -> usize {
        if stride == 0 {
            0
        } else {
            self.vertices.len() / stride
        }
    }

    /// Fraction of input vertices eliminated by deduplication
    pub fn simplification_ratio(&self, stride: usize) -> f32 {
        let original = self.original_count();
        if original == 0 {
            return 0.0;
        }
        1.0 - self.unique_count(stride) as f32 / original as f32
    }
}

/// Deduplicate `stream`, a concatenation of fixed-`stride` vertices
///
/// Unique vertices are numbered from 0 in order of first appearance and
/// `indices[i]` names the unique slot of input vertex `i`. A trailing partial
/// vertex (fewer than `stride` floats) is ignored.
pub fn index_vertices(stream: &[f32], stride: usize) -> IndexedVertices {
    if stride == 0 || stream.len() < stride {
        return IndexedVertices {
            vertices: Vec::new(),
            indices: Vec::new(),
        };
    }

    let bits: Vec<u32> = stream.iter().map(|value| value.to_bits()).collect();
    let vertex_count = stream.len() / stride;

    let mut lookup: HashMap<&[u32], u32> = HashMap::with_capacity(vertex_count);
    let mut vertices = Vec::with_capacity(stream.len());
    let mut indices = Vec::with_capacity(vertex_count);

    for (vertex, key) in stream.chunks_exact(stride).zip(bits.chunks_exact(stride)) {
        let next = lookup.len() as u32;
        let index = *lookup.entry(key).or_insert_with(|| {
            vertices.extend_from_slice(vertex);
            next
        });
        indices.push(index);
    }

    let indexed = IndexedVertices { vertices, indices };
    log::debug!(
        "Indexed {} vertices into {} unique ({:.1}% removed)",
        indexed.original_count(),
        indexed.unique_count(stride),
        indexed.simplification_ratio(stride) * 100.0
    );
    indexed
}

/// Rebuild the uncompressed stream from unique vertices and indices
///
/// Indices pointing past the vertex array are skipped.
pub fn expand_indexed(vertices: &[f32], indices: &[u32], stride: usize) -> Vec<f32> {
    let mut stream = Vec::with_capacity(indices.len() * stride);
    for &index in indices {
        let start = index as usize * stride;
        if let Some(vertex) = vertices.get(start..start + stride) {
            stream.extend_from_slice(vertex);
        }
    }
    stream
}

/// Trivial index list `0..count` for streams drawn without deduplication
pub fn sequential_indices(count: usize) -> Vec<u32> {
    (0..count as u32).collect()
}
