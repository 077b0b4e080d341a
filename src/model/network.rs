//! Routable network components: nodes, edges, and the analysis-ready
//! network snapshot.

use geo::{LineString, Point};
use hashbrown::HashMap;
use rstar::RTree;
use rstar::primitives::{GeomWithData, Line as IndexedSegment};

use crate::NodeId;
use crate::graph::WalkGraph;

/// Network node, generated once from edge endpoints and never mutated.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Projected coordinates, meters.
    pub geometry: Point<f64>,
}

/// Network edge with lazily derived travel weights.
///
/// `start_id`, `end_id` and `minutes` are computed exactly once by the
/// network builder; values already present are never overwritten. An
/// endpoint with no node inside the snap tolerance stays `None` and the
/// edge is excluded from the graph.
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: u64,
    pub geometry: LineString<f64>,
    pub start_id: Option<NodeId>,
    pub end_id: Option<NodeId>,
    pub len_meters: Option<f64>,
    pub minutes: Option<f64>,
}

type EdgeSegment = GeomWithData<IndexedSegment<[f64; 2]>, usize>;

/// Immutable snapshot of one routable network: nodes, edges, the walking
/// graph precomputed to the analysis horizon, and a spatial index over all
/// edge segments for POI proximity checks.
///
/// One `Network` is scoped to one (edge table, node table, node id column)
/// triple; extending the horizon requires building a new one.
pub struct Network {
    pub edge_table: String,
    pub node_table: String,
    pub node_id_column: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub graph: WalkGraph,
    edge_index: RTree<EdgeSegment>,
    node_points: HashMap<NodeId, Point<f64>>,
}

impl Network {
    pub(crate) fn new(
        edge_table: &str,
        node_table: &str,
        node_id_column: &str,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        graph: WalkGraph,
    ) -> Self {
        let mut segments = Vec::new();
        for (i, edge) in edges.iter().enumerate() {
            for line in edge.geometry.lines() {
                segments.push(GeomWithData::new(
                    IndexedSegment::new(
                        [line.start.x, line.start.y],
                        [line.end.x, line.end.y],
                    ),
                    i,
                ));
            }
        }
        let node_points = nodes.iter().map(|n| (n.id, n.geometry)).collect();

        Self {
            edge_table: edge_table.to_string(),
            node_table: node_table.to_string(),
            node_id_column: node_id_column.to_string(),
            nodes,
            edges,
            graph,
            edge_index: RTree::bulk_load(segments),
            node_points,
        }
    }

    /// Geometry of a node by id.
    pub fn node_point(&self, id: NodeId) -> Option<Point<f64>> {
        self.node_points.get(&id).copied()
    }

    /// Whether `point` lies within `threshold` meters of any edge segment.
    /// This is a proximity filter over the whole edge table, including
    /// dangling edges, not a topological snap.
    pub fn within_edge_distance(&self, point: &Point<f64>, threshold: f64) -> bool {
        self.edge_index
            .locate_within_distance([point.x(), point.y()], threshold * threshold)
            .next()
            .is_some()
    }
}
