// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Little-endian buffer decoding.
//!
//! The geometry store produces packed binary buffers: 32-bit signed triangle
//! indices, 32-bit float vertex coordinates, and 64-bit float transform
//! values, all little-endian. The byte layout lives here, isolated from the
//! geometric algorithms, so those can be tested against plain numeric
//! arrays.

use crate::error::{Error, Result};

/// Decodes a packed little-endian `i32` index buffer.
///
/// Indices arrive in whole-triangle groups, so the byte length must be a
/// multiple of 12 (three 4-byte indices per triangle).
pub fn decode_indices(bytes: &[u8]) -> Result<Vec<i32>> {
    if bytes.len() % 12 != 0 {
        return Err(Error::IndexBufferSize { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Decodes a packed little-endian `f32` vertex buffer.
///
/// Coordinates arrive as (x, y, z) triples, so the byte length must be a
/// multiple of 12 (three 4-byte floats per vertex).
pub fn decode_vertices(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 12 != 0 {
        return Err(Error::VertexBufferSize { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Decodes a packed little-endian `f64` transform buffer.
///
/// Exactly 16 values forming a 4x4 matrix; any other length is malformed.
pub fn decode_transform(bytes: &[u8]) -> Result<Vec<f64>> {
    if bytes.len() != 128 {
        return Err(Error::TransformSize { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(8)
        .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
        .collect())
}
