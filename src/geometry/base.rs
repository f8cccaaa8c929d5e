// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Capabilities shared by every geometry kind

use super::BoundingBox;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Kind tag carried by each geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    Unspecified,
    PointCloud,
    TriangleMesh,
}

/// Common contract for 3D geometries: a kind tag, bounds, emptiness and reset.
///
/// Bounds of an empty geometry are the origin, never an error.
pub trait Geometry {
    /// Kind of this geometry
    fn geometry_type(&self) -> GeometryType;

    /// Spatial dimension; always 3 for this crate
    fn dimension(&self) -> usize {
        3
    }

    /// True when the geometry holds no points
    fn is_empty(&self) -> bool;

    /// Drop all data, returning to the freshly constructed state
    fn clear(&mut self);

    /// Componentwise minimum over all points
    fn min_bound(&self) -> Point3<f64>;

    /// Componentwise maximum over all points
    fn max_bound(&self) -> Point3<f64>;

    /// Axis-aligned box spanning [`min_bound`](Self::min_bound) to
    /// [`max_bound`](Self::max_bound)
    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.min_bound(), self.max_bound())
    }
}
