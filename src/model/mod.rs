//! Data model: network nodes and edges, points of interest, and the
//! category catalog.

pub mod network;
pub mod poi;

pub use network::{Edge, Network, Node};
pub use poi::{Category, CategoryCatalog, Poi, sanitize_id};
