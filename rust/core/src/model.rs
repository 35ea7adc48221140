// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building element data model.
//!
//! Elements are read-only input: a stable id, a schema type tag, and an
//! optional geometry record exactly as the geometry store produced it.
//! [`DecodedGeometry`] is the validated numeric form the detection
//! algorithms consume.

use nalgebra::{Matrix4, Point3};

use crate::bounds::Aabb;
use crate::buffers;
use crate::error::{Error, Result};

/// Stable identity of a building element, matching the entity id assigned
/// by the model store.
pub type ElementId = u32;

/// A building element handed to the detector by the model store.
#[derive(Debug, Clone)]
pub struct Element {
    /// Stable element identity.
    pub id: ElementId,
    /// Schema type tag, e.g. `"IfcWall"` or `"IfcDoor"`.
    pub ifc_type: String,
    /// Triangulated geometry. Elements without geometry are counted and
    /// skipped by the detector; they never appear in a clash.
    pub geometry: Option<GeometryRecord>,
}

impl Element {
    /// Creates an element with geometry.
    pub fn new(id: ElementId, ifc_type: impl Into<String>, geometry: GeometryRecord) -> Self {
        Self {
            id,
            ifc_type: ifc_type.into(),
            geometry: Some(geometry),
        }
    }

    /// Creates an element that carries no geometry.
    pub fn without_geometry(id: ElementId, ifc_type: impl Into<String>) -> Self {
        Self {
            id,
            ifc_type: ifc_type.into(),
            geometry: None,
        }
    }
}

/// Raw per-element geometry exactly as produced by the geometry store.
///
/// All buffers are packed little-endian. The bounding box is world-space,
/// already transform-applied by the producer.
#[derive(Debug, Clone)]
pub struct GeometryRecord {
    /// Packed `i32` triangle indices, three per triangle.
    pub indices: Vec<u8>,
    /// Packed `f32` vertex coordinates, (x, y, z) per vertex, object-local.
    pub vertices: Vec<u8>,
    /// Packed `f64` 4x4 local-to-world transform, row-major.
    pub transform: Vec<u8>,
    /// World-space bounding box.
    pub bounds: Aabb,
}

/// Numeric form of one [`GeometryRecord`], validated on construction.
#[derive(Debug, Clone)]
pub struct DecodedGeometry {
    /// Triangle indices, three per triangle, all verified in range.
    pub indices: Vec<u32>,
    /// Flat vertex coordinates, three per vertex, object-local.
    pub vertices: Vec<f32>,
    /// Local-to-world transform, applied as `v' = M * v`.
    pub transform: Matrix4<f64>,
    /// World-space bounding box copied from the record.
    pub bounds: Aabb,
}

impl DecodedGeometry {
    /// Decodes and validates a raw geometry record.
    ///
    /// Rejects buffers inconsistent with their stride and indices that fall
    /// outside the vertex sequence.
    pub fn decode(record: &GeometryRecord) -> Result<Self> {
        let raw_indices = buffers::decode_indices(&record.indices)?;
        let vertices = buffers::decode_vertices(&record.vertices)?;
        let values = buffers::decode_transform(&record.transform)?;

        let vertex_count = vertices.len() / 3;
        let mut indices = Vec::with_capacity(raw_indices.len());
        for &index in &raw_indices {
            if index < 0 || index as usize >= vertex_count {
                return Err(Error::IndexOutOfRange {
                    index,
                    vertex_count,
                });
            }
            indices.push(index as u32);
        }

        Ok(Self {
            indices,
            vertices,
            transform: Matrix4::from_row_slice(&values),
            bounds: record.bounds,
        })
    }

    /// Number of triangles in the mesh.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The three vertex indices of triangle `tri`.
    #[inline]
    pub fn triangle_indices(&self, tri: usize) -> [u32; 3] {
        let base = tri * 3;
        [
            self.indices[base],
            self.indices[base + 1],
            self.indices[base + 2],
        ]
    }

    /// Object-local position of vertex `index`.
    #[inline]
    pub fn local_vertex(&self, index: u32) -> Point3<f64> {
        let base = index as usize * 3;
        Point3::new(
            self.vertices[base] as f64,
            self.vertices[base + 1] as f64,
            self.vertices[base + 2] as f64,
        )
    }
}
