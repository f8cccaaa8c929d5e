// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Topological cleanup: duplicate vertices, degenerate and duplicate
//! triangles, unreferenced vertices

use super::{BoundingBox, TriangleMesh};
use crate::config::CleanupConfig;
use crate::error::MeshResult;
use ahash::{AHashMap, AHashSet};
use tracing::{debug, warn};

/// How many elements each cleanup pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub duplicated_vertices: usize,
    pub degenerate_triangles: usize,
    pub duplicated_triangles: usize,
    pub unreferenced_vertices: usize,
}

impl PurgeReport {
    pub fn vertices_removed(&self) -> usize {
        self.duplicated_vertices + self.unreferenced_vertices
    }

    pub fn triangles_removed(&self) -> usize {
        self.degenerate_triangles + self.duplicated_triangles
    }

    /// True when no pass changed the mesh
    pub fn is_clean(&self) -> bool {
        self.vertices_removed() == 0 && self.triangles_removed() == 0
    }
}

impl TriangleMesh {
    /// Remove exact duplicate vertices, degenerate triangles, duplicate
    /// triangles and unreferenced vertices, in that order.
    ///
    /// Fails without touching the mesh if it does not pass
    /// [`validate`](Self::validate).
    pub fn purge(&mut self) -> MeshResult<()> {
        self.purge_with(&CleanupConfig::default()).map(|_| ())
    }

    /// [`purge`](Self::purge) with explicit parameters
    pub fn purge_with(&mut self, config: &CleanupConfig) -> MeshResult<PurgeReport> {
        config.validate()?;
        if let Err(err) = self.validate() {
            warn!(%err, "refusing to purge invalid mesh");
            return Err(err);
        }

        let mut report = PurgeReport {
            duplicated_vertices: if config.is_exact() {
                self.remove_duplicated_vertices()?
            } else {
                self.weld_vertices(config.weld_tolerance)?
            },
            ..PurgeReport::default()
        };
        if config.remove_degenerate {
            report.degenerate_triangles = self.remove_degenerate_triangles();
        }
        if config.remove_duplicate_triangles {
            report.duplicated_triangles = self.remove_duplicated_triangles();
        }
        if config.remove_unreferenced {
            report.unreferenced_vertices = self.remove_unreferenced_vertices()?;
        }

        debug!(
            vertices = self.vertices.len(),
            triangles = self.triangles.len(),
            ?report,
            "purged mesh"
        );
        Ok(report)
    }

    /// Merge vertices with bit-identical coordinates into their first
    /// occurrence. Attributes of the first occurrence are kept and triangles
    /// are rewritten to point at it. Returns the number of vertices removed.
    pub fn remove_duplicated_vertices(&mut self) -> MeshResult<usize> {
        self.check_indices()?;

        let mut first_seen: AHashMap<[u64; 3], usize> =
            AHashMap::with_capacity(self.vertices.len());
        let representatives: Vec<usize> = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let key = [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()];
                *first_seen.entry(key).or_insert(i)
            })
            .collect();

        let removed = self.collapse_vertices(&representatives);
        debug!(removed, "removed duplicated vertices");
        Ok(removed)
    }

    /// Weld vertices that are within `epsilon` distance of an earlier
    /// surviving vertex. Returns the number of vertices removed.
    pub fn weld_vertices(&mut self, epsilon: f64) -> MeshResult<usize> {
        CleanupConfig::with_weld_tolerance(epsilon).validate()?;
        self.check_indices()?;

        let mut survivors: Vec<usize> = Vec::new();
        let mut representatives: Vec<usize> = Vec::with_capacity(self.vertices.len());

        for (i, position) in self.vertices.iter().enumerate() {
            let found = survivors
                .iter()
                .copied()
                .find(|&j| (position - self.vertices[j]).norm() < epsilon);

            match found {
                Some(j) => representatives.push(j),
                None => {
                    survivors.push(i);
                    representatives.push(i);
                }
            }
        }

        let removed = self.collapse_vertices(&representatives);
        debug!(removed, epsilon, "welded vertices");
        Ok(removed)
    }

    /// Remove triangles whose indices are not pairwise distinct.
    /// Returns the number of triangles removed.
    pub fn remove_degenerate_triangles(&mut self) -> usize {
        let keep: Vec<bool> = self.triangles.iter().map(|t| !t.is_degenerate()).collect();
        let removed = self.retain_triangles(&keep);
        debug!(removed, "removed degenerate triangles");
        removed
    }

    /// Remove triangles that span the same vertex set as an earlier one,
    /// whatever their winding. Returns the number of triangles removed.
    pub fn remove_duplicated_triangles(&mut self) -> usize {
        let mut seen: AHashSet<[usize; 3]> = AHashSet::with_capacity(self.triangles.len());
        let keep: Vec<bool> = self
            .triangles
            .iter()
            .map(|t| seen.insert(t.sorted()))
            .collect();
        let removed = self.retain_triangles(&keep);
        debug!(removed, "removed duplicated triangles");
        removed
    }

    /// Remove vertices not referenced by any triangle, preserving the order
    /// of the rest. Returns the number of vertices removed.
    pub fn remove_unreferenced_vertices(&mut self) -> MeshResult<usize> {
        self.check_indices()?;

        let mut referenced = vec![false; self.vertices.len()];
        for triangle in &self.triangles {
            for &idx in &triangle.indices {
                referenced[idx] = true;
            }
        }

        let before = self.vertices.len();
        let new_indices = self.retain_vertices(&referenced);
        self.remap_triangles(&new_indices);

        let removed = before - self.vertices.len();
        debug!(removed, "removed unreferenced vertices");
        Ok(removed)
    }

    /// Copy of the part of this mesh inside `bbox`: vertices inside the
    /// closed box, and the triangles whose three vertices are all inside
    pub fn crop(&self, bbox: &BoundingBox) -> MeshResult<TriangleMesh> {
        self.validate()?;

        let inside: Vec<bool> = self.vertices.iter().map(|v| bbox.contains(v)).collect();
        let keep_triangles: Vec<bool> = self
            .triangles
            .iter()
            .map(|t| t.indices.iter().all(|&i| inside[i]))
            .collect();

        let mut cropped = self.clone();
        cropped.retain_triangles(&keep_triangles);
        let new_indices = cropped.retain_vertices(&inside);
        cropped.remap_triangles(&new_indices);

        debug!(
            vertices = cropped.vertices.len(),
            triangles = cropped.triangles.len(),
            "cropped mesh"
        );
        Ok(cropped)
    }

    /// Drop every vertex `i` with `representatives[i] != i` and point
    /// triangles at the representative instead. Representatives must not
    /// come after the vertex they replace.
    fn collapse_vertices(&mut self, representatives: &[usize]) -> usize {
        let keep: Vec<bool> = representatives
            .iter()
            .enumerate()
            .map(|(i, &rep)| rep == i)
            .collect();

        let before = self.vertices.len();
        let mut new_indices = self.retain_vertices(&keep);
        for (i, &rep) in representatives.iter().enumerate() {
            if rep != i {
                new_indices[i] = new_indices[rep];
            }
        }
        self.remap_triangles(&new_indices);

        before - self.vertices.len()
    }

    /// Keep the vertices flagged in `keep` along with their normals and
    /// colors. Returns old index -> new index; entries for dropped vertices
    /// are left at `usize::MAX`.
    fn retain_vertices(&mut self, keep: &[bool]) -> Vec<usize> {
        let mut new_indices = vec![usize::MAX; keep.len()];
        let mut next = 0;
        for (old, _) in keep.iter().enumerate().filter(|&(_, &k)| k) {
            new_indices[old] = next;
            next += 1;
        }

        retain_by_mask(&mut self.vertices, keep);
        retain_by_mask(&mut self.vertex_normals, keep);
        retain_by_mask(&mut self.vertex_colors, keep);
        new_indices
    }

    /// Keep the triangles flagged in `keep` along with their normals.
    /// Returns the number of triangles removed.
    fn retain_triangles(&mut self, keep: &[bool]) -> usize {
        let before = self.triangles.len();
        retain_by_mask(&mut self.triangles, keep);
        retain_by_mask(&mut self.triangle_normals, keep);
        before - self.triangles.len()
    }

    fn remap_triangles(&mut self, new_indices: &[usize]) {
        for triangle in &mut self.triangles {
            triangle.indices = triangle.indices.map(|i| new_indices[i]);
        }
    }
}

/// Retain `items[i]` where `keep[i]` is set. Arrays whose length differs
/// from the mask are absent attributes and are left alone.
fn retain_by_mask<T>(items: &mut Vec<T>, keep: &[bool]) {
    if items.len() != keep.len() {
        return;
    }
    let mut index = 0;
    items.retain(|_| {
        let k = keep[index];
        index += 1;
        k
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use crate::geometry::Triangle;
    use nalgebra::{Point3, Vector3};

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    /// Two triangles sharing an edge, written out with the shared vertices
    /// duplicated, plus a colour per vertex to follow them through cleanup
    fn split_quad() -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        mesh.vertices = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ];
        mesh.vertex_colors = (0..6).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect();
        mesh.triangles = vec![Triangle::new([0, 1, 2]), Triangle::new([3, 4, 5])];
        mesh.triangle_normals = vec![Vector3::z(), Vector3::new(0.0, 0.0, 2.0)];
        mesh
    }

    #[test]
    fn test_remove_duplicated_vertices() {
        let mut mesh = split_quad();
        assert_eq!(mesh.remove_duplicated_vertices().unwrap(), 2);

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.vertices[3], p(0.0, 1.0, 0.0));
        assert_eq!(mesh.triangles[1].indices, [0, 2, 3]);
        // First occurrence keeps its colour
        assert_eq!(mesh.vertex_colors[0].x, 0.0);
        assert_eq!(mesh.vertex_colors[3].x, 5.0);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_duplicate_detection_is_bitwise() {
        let mut mesh = TriangleMesh::new();
        mesh.vertices = vec![p(0.1, 0.0, 0.0), p(0.1 + 1e-15, 0.0, 0.0), p(0.1, 0.0, 0.0)];
        assert_eq!(mesh.remove_duplicated_vertices().unwrap(), 1);
        assert_eq!(mesh.vertex_count(), 2);
    }

    #[test]
    fn test_weld_vertices_with_tolerance() {
        let mut mesh = TriangleMesh::new();
        mesh.vertices = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 0.0, 1e-4),
            p(0.0, 1.0, 0.0),
        ];
        mesh.triangles = vec![Triangle::new([2, 1, 3])];

        assert_eq!(mesh.weld_vertices(1e-3).unwrap(), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangles[0].indices, [0, 1, 2]);
        assert_eq!(mesh.weld_vertices(-1.0), Err(MeshError::InvalidTolerance(-1.0)));
    }

    #[test]
    fn test_remove_degenerate_triangles_keeps_normals_in_step() {
        let mut mesh = split_quad();
        mesh.triangles.insert(1, Triangle::new([0, 0, 2]));
        mesh.triangle_normals.insert(1, Vector3::x());

        assert_eq!(mesh.remove_degenerate_triangles(), 1);
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.triangle_normals, vec![Vector3::z(), Vector3::new(0.0, 0.0, 2.0)]);
    }

    #[test]
    fn test_remove_duplicated_triangles_ignores_winding() {
        let mut mesh = split_quad();
        mesh.triangles.push(Triangle::new([2, 1, 0]));
        mesh.triangles.push(Triangle::new([1, 2, 0]));
        mesh.triangle_normals.push(Vector3::x());
        mesh.triangle_normals.push(Vector3::y());

        assert_eq!(mesh.remove_duplicated_triangles(), 2);
        assert_eq!(mesh.triangles[0].indices, [0, 1, 2]);
        assert_eq!(mesh.triangle_normals.len(), 2);
        assert_eq!(mesh.triangle_normals[0], Vector3::z());
    }

    #[test]
    fn test_remove_unreferenced_vertices() {
        let mut mesh = split_quad();
        mesh.triangles.truncate(1);
        mesh.triangle_normals.truncate(1);

        assert_eq!(mesh.remove_unreferenced_vertices().unwrap(), 3);
        assert_eq!(mesh.vertices, vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)]);
        assert_eq!(mesh.vertex_colors.len(), 3);
    }

    #[test]
    fn test_unreferenced_with_no_triangles_drops_everything() {
        let mut mesh = split_quad();
        mesh.triangles.clear();
        mesh.triangle_normals.clear();
        assert_eq!(mesh.remove_unreferenced_vertices().unwrap(), 6);
        assert!(mesh.is_empty());
        assert!(mesh.vertex_colors.is_empty());
    }

    #[test]
    fn test_purge_full_pipeline() {
        let mut mesh = split_quad();
        // Becomes degenerate only after duplicate vertices merge
        mesh.triangles.push(Triangle::new([0, 3, 1]));
        mesh.triangle_normals.push(Vector3::x());
        // Same vertex set as the first triangle once remapped
        mesh.triangles.push(Triangle::new([4, 1, 3]));
        mesh.triangle_normals.push(Vector3::y());
        // Stray vertex
        mesh.vertices.push(p(7.0, 7.0, 7.0));
        mesh.vertex_colors.push(Vector3::new(6.0, 0.0, 0.0));

        let report = mesh.purge_with(&CleanupConfig::default()).unwrap();
        assert_eq!(
            report,
            PurgeReport {
                duplicated_vertices: 2,
                degenerate_triangles: 1,
                duplicated_triangles: 1,
                unreferenced_vertices: 1,
            }
        );
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangle_normals, vec![Vector3::z(), Vector3::new(0.0, 0.0, 2.0)]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_purge_is_idempotent() {
        let mut mesh = split_quad();
        mesh.purge().unwrap();
        let once = mesh.clone();

        let report = mesh.purge_with(&CleanupConfig::default()).unwrap();
        assert!(report.is_clean());
        assert_eq!(mesh, once);
    }

    #[test]
    fn test_purge_rejects_invalid_mesh_untouched() {
        let mut mesh = split_quad();
        mesh.triangles.push(Triangle::new([0, 1, 99]));
        let before = mesh.clone();

        assert!(matches!(
            mesh.purge(),
            Err(MeshError::AttributeLength { attribute: "triangle_normals", .. })
        ));
        mesh.triangle_normals.push(Vector3::z());
        assert!(matches!(mesh.purge(), Err(MeshError::IndexOutOfRange { index: 99, .. })));

        mesh.triangle_normals.pop();
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_purge_with_passes_disabled() {
        let mut mesh = split_quad();
        mesh.triangles.push(Triangle::new([0, 3, 1]));
        mesh.triangle_normals.push(Vector3::x());

        let config = CleanupConfig {
            remove_degenerate: false,
            ..CleanupConfig::default()
        };
        let report = mesh.purge_with(&config).unwrap();
        assert_eq!(report.degenerate_triangles, 0);
        assert_eq!(mesh.triangles[2].indices, [0, 0, 1]);
    }

    #[test]
    fn test_crop() {
        let mut mesh = split_quad();
        mesh.vertices[5] = p(0.0, 5.0, 0.0);

        let bbox = BoundingBox::new(p(-0.5, -0.5, -0.5), p(1.5, 1.5, 0.5));
        let cropped = mesh.crop(&bbox).unwrap();

        assert_eq!(cropped.vertex_count(), 5);
        assert_eq!(cropped.triangle_count(), 1);
        assert_eq!(cropped.triangles[0].indices, [0, 1, 2]);
        assert_eq!(cropped.triangle_normals, vec![Vector3::z()]);
        assert_eq!(cropped.vertex_colors.len(), 5);
        assert!(cropped.validate().is_ok());
        // Source untouched
        assert_eq!(mesh.vertex_count(), 6);
    }

    #[test]
    fn test_report_totals() {
        let report = PurgeReport {
            duplicated_vertices: 2,
            degenerate_triangles: 1,
            duplicated_triangles: 3,
            unreferenced_vertices: 4,
        };
        assert_eq!(report.vertices_removed(), 6);
        assert_eq!(report.triangles_removed(), 4);
        assert!(!report.is_clean());
        assert!(PurgeReport::default().is_clean());
    }
}
