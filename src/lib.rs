//! Walking-distance accessibility analysis for pedestrian networks.
//!
//! `walkshed` builds a routable network from edge and node datasets, snaps
//! categorized points of interest onto it, and computes, for every network
//! node, the travel time to the N nearest POIs in each category within a
//! time horizon. From those results it derives reachable-area isochrones
//! per POI and compares accessibility across two alternative networks
//! (for example a sparse sidewalk network against denser street
//! centerlines) via an isochrone area ratio.
//!
//! The engine is batch-oriented and single-threaded: long runs are made
//! resumable through idempotent dataset preparation and per-id output
//! files, not through checkpointing.

pub mod algo;
pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod store;

pub use config::AnalysisConfig;
pub use error::Error;

/// Node identifier, scoped to one edge/node dataset pair.
pub type NodeId = i64;

/// Graph cost in whole seconds.
pub type Time = u32;

/// Maximum distance in meters between an edge endpoint and the node it is
/// assigned to. Endpoints with no node inside this tolerance stay
/// unassigned and their edges are excluded from the graph.
pub const NODE_SNAP_TOLERANCE: f64 = 5.0;

/// Meters per statute mile, used by the travel-time weight formula.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Concavity used for isochrone hulls; close to convex.
pub const HULL_CONCAVITY: f64 = 0.99;

/// Cartographic buffer applied to isochrone hulls, in projected units.
/// A display convention, not a physical distance.
pub const ISOCHRONE_BUFFER: f64 = 45.0;

/// Convert a travel time in minutes to integer graph cost.
pub(crate) fn minutes_to_cost(minutes: f64) -> Time {
    (minutes * 60.0).round() as Time
}

/// Convert an integer graph cost back to minutes.
pub(crate) fn cost_to_minutes(cost: Time) -> f64 {
    f64::from(cost) / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_conversion_round_trips_whole_seconds() {
        assert_eq!(minutes_to_cost(0.75), 45);
        assert_eq!(cost_to_minutes(45), 0.75);
        assert_eq!(minutes_to_cost(0.0), 0);
    }
}
