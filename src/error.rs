// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for mesh operations

use thiserror::Error;

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors raised when a mesh violates its structural invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references vertex {index} (mesh has {vertex_count} vertices)")]
    IndexOutOfRange {
        /// Position of the offending triangle.
        triangle: usize,
        /// The invalid vertex index.
        index: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// An optional attribute covers only part of its owning array.
    #[error("{attribute} has {actual} entries, expected 0 or {expected}")]
    AttributeLength {
        /// Name of the attribute array.
        attribute: &'static str,
        /// Length of the owning array.
        expected: usize,
        /// Actual length found.
        actual: usize,
    },

    /// Weld tolerance is negative or not finite.
    #[error("invalid weld tolerance {0}: must be finite and >= 0")]
    InvalidTolerance(f64),
}
