// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cleanup configuration

use crate::error::{MeshError, MeshResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file looked up by [`CleanupConfig::load`]
pub const CONFIG_FILE: &str = "polyframe-mesh.toml";

/// Environment variable overriding [`CleanupConfig::weld_tolerance`]
pub const WELD_TOLERANCE_ENV: &str = "POLYFRAME_WELD_TOLERANCE";

/// Parameters for [`TriangleMesh::purge_with`](crate::TriangleMesh::purge_with)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Distance under which two vertices are merged. `0.0` compares
    /// coordinates bit for bit.
    pub weld_tolerance: f64,
    /// Drop triangles whose indices are not pairwise distinct
    pub remove_degenerate: bool,
    /// Drop triangles that repeat an earlier triangle's vertex set
    pub remove_duplicate_triangles: bool,
    /// Drop vertices no surviving triangle references
    pub remove_unreferenced: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            weld_tolerance: 0.0,
            remove_degenerate: true,
            remove_duplicate_triangles: true,
            remove_unreferenced: true,
        }
    }
}

impl CleanupConfig {
    /// Exact-duplicate cleanup with a distance-based vertex weld
    pub fn with_weld_tolerance(weld_tolerance: f64) -> Self {
        Self {
            weld_tolerance,
            ..Self::default()
        }
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: CleanupConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `polyframe-mesh.toml` from the working directory if present,
    /// then apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(".")
    }

    /// Load `polyframe-mesh.toml` from `dir` if present, then apply
    /// environment overrides
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        if let Ok(tolerance) = std::env::var(WELD_TOLERANCE_ENV) {
            config.weld_tolerance = tolerance
                .parse()
                .with_context(|| format!("Invalid {}: {}", WELD_TOLERANCE_ENV, tolerance))?;
        }

        config
            .validate()
            .with_context(|| format!("Invalid {}", WELD_TOLERANCE_ENV))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Reject tolerances that cannot be compared against a distance
    pub fn validate(&self) -> MeshResult<()> {
        if !self.weld_tolerance.is_finite() || self.weld_tolerance < 0.0 {
            return Err(MeshError::InvalidTolerance(self.weld_tolerance));
        }
        Ok(())
    }

    /// True when duplicate vertices are matched bit for bit
    pub fn is_exact(&self) -> bool {
        self.weld_tolerance == 0.0
    }
}
