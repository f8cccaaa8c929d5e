// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Normal estimation for triangle meshes

use super::TriangleMesh;
use crate::error::MeshResult;
use crate::utils::math::{normalize_or_default, triangle_normal};
use nalgebra::Vector3;
use tracing::trace;

impl TriangleMesh {
    /// Cross product of each triangle's edges, stored unnormalized in
    /// `triangle_normals`. Degenerate triangles get the zero vector.
    pub fn compute_triangle_normals(&mut self) -> MeshResult<()> {
        self.check_indices()?;

        self.triangle_normals = self
            .triangles
            .iter()
            .map(|triangle| {
                let [i0, i1, i2] = triangle.indices;
                triangle_normal(&self.vertices[i0], &self.vertices[i1], &self.vertices[i2])
            })
            .collect();

        trace!(triangles = self.triangle_normals.len(), "computed triangle normals");
        Ok(())
    }

    /// Sum of the unnormalized normals of every triangle touching each
    /// vertex. Larger triangles weigh more; vertices no triangle touches get
    /// the zero vector. Does not read `triangle_normals`.
    pub fn compute_vertex_normals(&mut self) -> MeshResult<()> {
        self.check_indices()?;

        let mut normal_sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); self.vertices.len()];
        for triangle in &self.triangles {
            let [i0, i1, i2] = triangle.indices;
            let face_normal =
                triangle_normal(&self.vertices[i0], &self.vertices[i1], &self.vertices[i2]);

            for &idx in &triangle.indices {
                normal_sums[idx] += face_normal;
            }
        }

        self.vertex_normals = normal_sums;
        trace!(vertices = self.vertex_normals.len(), "computed vertex normals");
        Ok(())
    }

    /// Scale every vertex and triangle normal to unit length.
    /// Zero-length normals become (0, 0, 1).
    pub fn normalize_normals(&mut self) {
        for normal in self
            .vertex_normals
            .iter_mut()
            .chain(self.triangle_normals.iter_mut())
        {
            *normal = normalize_or_default(normal);
        }
    }
}
