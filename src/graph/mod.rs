//! Walking graph engine: undirected weighted graph construction,
//! horizon-bounded shortest paths, and nearest-POI queries.

mod dijkstra;
mod engine;

pub use engine::WalkGraph;
