//! Network preparation: lazily derived edge columns and graph
//! construction.

mod builder;

pub use builder::{NetworkBuilder, SnapReport, generate_nodes};
