//! Analysis configuration shared by every component boundary.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Settings that drive network weighting, POI matching, and the
/// accessibility horizon. One explicit value object is passed through all
/// components instead of per-call defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Assumed pedestrian walking speed in miles per hour.
    pub walking_mph: f64,
    /// Maximum travel time considered, in minutes. Results at or beyond
    /// the horizon are excluded.
    pub max_minutes: f64,
    /// EPSG code of the projected coordinate system (meters) the datasets
    /// are stored in. Carried for provenance; all geometry is assumed to
    /// already be in this CRS.
    pub epsg: u32,
    /// Number of nearest POIs to report per node when an id has multiple
    /// features.
    pub num_pois: usize,
    /// Maximum allowable distance between a POI and the edge network for
    /// that POI to be analyzed at all, in meters.
    pub poi_match_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            walking_mph: 2.5,
            max_minutes: 45.0,
            epsg: 26918,
            num_pois: 3,
            poi_match_threshold: 45.0,
        }
    }
}

impl AnalysisConfig {
    /// Read a configuration from a JSON file. Missing fields fall back to
    /// the defaults.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::InvalidData(format!("config {}: {e}", path.display())))
    }
}
