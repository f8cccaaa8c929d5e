// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - triangle mesh representation and operations

mod base;
mod bbox;
mod cleanup;
mod mesh;
mod normals;

pub use base::{Geometry, GeometryType};
pub use bbox::BoundingBox;
pub use cleanup::PurgeReport;
pub use mesh::{Triangle, TriangleMesh};
