// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Mesh
//!
//! Triangle mesh geometry engine: parallel vertex/attribute/triangle arrays
//! plus bounding boxes, homogeneous transforms, normal estimation, mesh
//! concatenation and topological cleanup.

pub mod config;
pub mod error;
pub mod geometry;
pub mod utils;

pub use config::CleanupConfig;
pub use error::{MeshError, MeshResult};
pub use geometry::{BoundingBox, Geometry, GeometryType, PurgeReport, Triangle, TriangleMesh};

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_basic_mesh() {
        let mut mesh = TriangleMesh::new();
        assert!(mesh.is_empty());

        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(Triangle::new([a, b, c]));

        assert!(!mesh.is_empty());
        assert_eq!(mesh.geometry_type(), GeometryType::TriangleMesh);
        assert_eq!(mesh.dimension(), 3);
        assert!(mesh.validate().is_ok());
    }
}
