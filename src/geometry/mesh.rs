// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle mesh representation and utilities

use super::{BoundingBox, Geometry, GeometryType};
use crate::error::{MeshError, MeshResult};
use crate::utils::math::{transform_direction, transform_point};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    /// Same triangle with every index shifted by `offset`.
    /// Saturates at `usize::MAX`, which no mesh can hold as a valid index.
    pub fn offset(&self, offset: usize) -> Self {
        Self::new(self.indices.map(|i| i.saturating_add(offset)))
    }

    /// True when the three indices are not pairwise distinct
    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.indices;
        a == b || b == c || a == c
    }

    /// Indices in ascending order; equal for triangles spanning the same
    /// vertex set regardless of winding
    pub fn sorted(&self) -> [usize; 3] {
        let mut key = self.indices;
        key.sort_unstable();
        key
    }
}

impl From<[usize; 3]> for Triangle {
    fn from(indices: [usize; 3]) -> Self {
        Self::new(indices)
    }
}

/// Triangle mesh stored as parallel attribute arrays.
///
/// `vertex_normals` and `vertex_colors` are either empty or one entry per
/// vertex; `triangle_normals` is either empty or one entry per triangle.
/// Presence of an attribute is decided by length alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3<f64>>,
    pub vertex_normals: Vec<Vector3<f64>>,
    pub vertex_colors: Vec<Vector3<f64>>,
    pub triangles: Vec<Triangle>,
    pub triangle_normals: Vec<Vector3<f64>>,
}

impl TriangleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            vertex_normals: Vec::new(),
            vertex_colors: Vec::new(),
            triangles: Vec::with_capacity(triangle_count),
            triangle_normals: Vec::new(),
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(position);
        index
    }

    /// Add a triangle
    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Empty all five arrays
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.vertex_normals.clear();
        self.vertex_colors.clear();
        self.triangles.clear();
        self.triangle_normals.clear();
    }

    pub fn has_vertices(&self) -> bool {
        !self.vertices.is_empty()
    }

    pub fn has_triangles(&self) -> bool {
        self.has_vertices() && !self.triangles.is_empty()
    }

    pub fn has_vertex_normals(&self) -> bool {
        self.has_vertices() && self.vertex_normals.len() == self.vertices.len()
    }

    pub fn has_vertex_colors(&self) -> bool {
        self.has_vertices() && self.vertex_colors.len() == self.vertices.len()
    }

    pub fn has_triangle_normals(&self) -> bool {
        self.has_triangles() && self.triangle_normals.len() == self.triangles.len()
    }

    /// Componentwise minimum of the vertices; the origin for an empty mesh
    pub fn min_bound(&self) -> Point3<f64> {
        BoundingBox::from_points(&self.vertices).min
    }

    /// Componentwise maximum of the vertices; the origin for an empty mesh
    pub fn max_bound(&self) -> Point3<f64> {
        BoundingBox::from_points(&self.vertices).max
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    /// Apply a homogeneous transform.
    ///
    /// Vertices are mapped as `(x, y, z, 1)` and keep the first three
    /// components. Vertex and triangle normals only see the upper-left 3x3
    /// block: no translation, no inverse-transpose, no renormalization.
    /// Call [`normalize_normals`](Self::normalize_normals) afterwards when
    /// unit normals are needed.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            *vertex = transform_point(matrix, vertex);
        }

        let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        for normal in self.vertex_normals.iter_mut().chain(self.triangle_normals.iter_mut()) {
            *normal = transform_direction(&linear, normal);
        }
    }

    /// Append `other` to this mesh.
    ///
    /// Vertices and triangles are concatenated, with `other`'s triangle
    /// indices shifted by this mesh's vertex count. An optional attribute
    /// survives only if both sides carry it; a side whose owning array is
    /// empty does not count. Appending a mesh without vertices is a no-op.
    ///
    /// `other`'s indices are shifted, not checked: an out-of-range index
    /// stays out of range in the result and is reported by
    /// [`validate`](Self::validate) and by every operation that reads
    /// vertices through triangles.
    pub fn append(&mut self, other: &TriangleMesh) {
        if other.is_empty() {
            return;
        }

        let offset = self.vertices.len();
        let triangle_count = self.triangles.len();

        append_attribute(
            &mut self.vertex_normals,
            offset,
            &other.vertex_normals,
            other.vertices.len(),
        );
        append_attribute(
            &mut self.vertex_colors,
            offset,
            &other.vertex_colors,
            other.vertices.len(),
        );
        append_attribute(
            &mut self.triangle_normals,
            triangle_count,
            &other.triangle_normals,
            other.triangles.len(),
        );

        self.vertices.extend_from_slice(&other.vertices);
        self.triangles
            .extend(other.triangles.iter().map(|triangle| triangle.offset(offset)));
    }

    /// New mesh holding `a` followed by `b`
    pub fn merged(a: &TriangleMesh, b: &TriangleMesh) -> TriangleMesh {
        let mut result = a.clone();
        result.append(b);
        result
    }

    /// Set every vertex color to `color`, clamped to [0, 1]
    pub fn paint_uniform_color(&mut self, color: Vector3<f64>) {
        let color = color.map(|c| c.clamp(0.0, 1.0));
        self.vertex_colors = vec![color; self.vertices.len()];
    }

    /// Check that every triangle index is in range and that every optional
    /// attribute is either empty or fully populated
    pub fn validate(&self) -> MeshResult<()> {
        check_attribute("vertex_normals", self.vertex_normals.len(), self.vertices.len())?;
        check_attribute("vertex_colors", self.vertex_colors.len(), self.vertices.len())?;
        check_attribute(
            "triangle_normals",
            self.triangle_normals.len(),
            self.triangles.len(),
        )?;
        self.check_indices()
    }

    /// Fail on the first triangle index that is not a valid vertex
    pub(crate) fn check_indices(&self) -> MeshResult<()> {
        let vertex_count = self.vertices.len();
        for (triangle, t) in self.triangles.iter().enumerate() {
            if let Some(&index) = t.indices.iter().find(|&&i| i >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }
}

impl Geometry for TriangleMesh {
    fn geometry_type(&self) -> GeometryType {
        GeometryType::TriangleMesh
    }

    fn is_empty(&self) -> bool {
        TriangleMesh::is_empty(self)
    }

    fn clear(&mut self) {
        TriangleMesh::clear(self)
    }

    fn min_bound(&self) -> Point3<f64> {
        TriangleMesh::min_bound(self)
    }

    fn max_bound(&self) -> Point3<f64> {
        TriangleMesh::max_bound(self)
    }

    fn bounding_box(&self) -> BoundingBox {
        TriangleMesh::bounding_box(self)
    }
}

impl AddAssign<&TriangleMesh> for TriangleMesh {
    fn add_assign(&mut self, other: &TriangleMesh) {
        self.append(other);
    }
}

impl AddAssign for TriangleMesh {
    fn add_assign(&mut self, other: TriangleMesh) {
        self.append(&other);
    }
}

impl Add<&TriangleMesh> for &TriangleMesh {
    type Output = TriangleMesh;

    fn add(self, other: &TriangleMesh) -> TriangleMesh {
        TriangleMesh::merged(self, other)
    }
}

impl Add for TriangleMesh {
    type Output = TriangleMesh;

    fn add(mut self, other: TriangleMesh) -> TriangleMesh {
        self.append(&other);
        self
    }
}

/// Concatenate one optional attribute.
/// `ours_owner`/`theirs_owner` are the lengths of the arrays the attribute
/// is indexed by, before the append.
fn append_attribute<T: Clone>(
    ours: &mut Vec<T>,
    ours_owner: usize,
    theirs: &[T],
    theirs_owner: usize,
) {
    let theirs_present = theirs_owner > 0 && theirs.len() == theirs_owner;

    if theirs_owner == 0 {
        return;
    }
    if ours_owner == 0 {
        ours.clear();
        if theirs_present {
            ours.extend_from_slice(theirs);
        }
        return;
    }

    if theirs_present && ours.len() == ours_owner {
        ours.extend_from_slice(theirs);
    } else {
        ours.clear();
    }
}

fn check_attribute(attribute: &'static str, actual: usize, expected: usize) -> MeshResult<()> {
    if actual == 0 || actual == expected {
        Ok(())
    } else {
        Err(MeshError::AttributeLength {
            attribute,
            expected,
            actual,
        })
    }
}
