// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry decoding.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding raw geometry buffers.
///
/// All variants are structural precondition violations: the producer handed
/// over buffers inconsistent with the documented byte layout. They abort the
/// affected operation instead of degrading into a silent "no geometry",
/// which could hide a true clash.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Index buffer length is not a whole number of triangles.
    #[error("index buffer is {len} bytes, expected a multiple of 12 (three 4-byte indices per triangle)")]
    IndexBufferSize { len: usize },

    /// Vertex buffer length is not a whole number of (x, y, z) triples.
    #[error("vertex buffer is {len} bytes, expected a multiple of 12 (three 4-byte floats per vertex)")]
    VertexBufferSize { len: usize },

    /// Transform buffer does not hold exactly a 4x4 double matrix.
    #[error("transform buffer is {len} bytes, expected exactly 128 (sixteen 8-byte doubles)")]
    TransformSize { len: usize },

    /// An index references a vertex that does not exist.
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: i32, vertex_count: usize },
}
