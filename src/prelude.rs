// Re-export key components
pub use crate::algo::isochrone::{IsochroneGenerator, save_ab_ratios, save_isochrones};
pub use crate::analysis::{
    DoubleNetworkComparator, NetworkSpec, OutputLocation, SharedArgs, compute_all_categories,
};
pub use crate::config::AnalysisConfig;
pub use crate::error::Error;
pub use crate::loading::{NetworkBuilder, generate_nodes};
pub use crate::model::{CategoryCatalog, Network, Poi};
pub use crate::store::Workspace;

// Core scalar types
pub use crate::NodeId;
pub use crate::Time; // graph cost, seconds
