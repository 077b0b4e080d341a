use geo::line_measures::LengthMeasurable;
use geo::{Euclidean, Point};
use hashbrown::{HashMap, HashSet};
use log::{info, warn};
use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::config::AnalysisConfig;
use crate::graph::WalkGraph;
use crate::model::{Edge, Network, Node};
use crate::store::{self, Workspace};
use crate::{Error, METERS_PER_MILE, NODE_SNAP_TOLERANCE, NodeId};

/// Outcome of assigning node ids to edge endpoints.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapReport {
    pub edges: usize,
    pub matched_endpoints: usize,
    pub unmatched_endpoints: usize,
    /// Edges with at least one unassigned endpoint; these are excluded
    /// from the graph but kept in the dataset.
    pub dangling_edges: usize,
}

/// Prepares an edge/node dataset pair and builds a ready-to-query network.
pub struct NetworkBuilder<'a> {
    workspace: &'a Workspace,
    config: &'a AnalysisConfig,
}

impl<'a> NetworkBuilder<'a> {
    pub fn new(workspace: &'a Workspace, config: &'a AnalysisConfig) -> Self {
        Self { workspace, config }
    }

    /// Ensure the edge dataset carries endpoint node ids and travel-time
    /// weights, then build the graph precomputed to the configured
    /// horizon.
    ///
    /// Columns that already exist are never recomputed or overwritten; a
    /// second run over the same datasets performs no writes.
    pub fn ensure_ready(
        &self,
        edge_table: &str,
        node_table: &str,
        node_id_column: &str,
    ) -> Result<Network, Error> {
        let mut dataset = store::load_edges(self.workspace, edge_table)?;

        if !self.workspace.table_exists(node_table) {
            info!("Generating {node_table} from {edge_table} endpoints");
            let generated = generate_nodes(&dataset.edges);
            store::save_nodes(self.workspace, node_table, node_id_column, &generated)?;
        }
        let nodes = store::load_nodes(self.workspace, node_table, node_id_column)?;
        if nodes.is_empty() {
            return Err(Error::InvalidData(format!(
                "node table {node_table} is empty"
            )));
        }

        let mut dirty = false;

        if !dataset.has_node_ids {
            info!("Assigning node id values to {edge_table}");
            let report = assign_node_ids(&mut dataset.edges, &nodes);
            if report.dangling_edges > 0 {
                warn!(
                    "{} of {} edges have an endpoint with no node within {NODE_SNAP_TOLERANCE}m; they will be excluded from the graph",
                    report.dangling_edges, report.edges
                );
            }
            dirty = true;
        }

        if !dataset.has_minutes {
            info!("Adding travel time weights to {edge_table}");
            add_travel_time_weights(&mut dataset.edges, self.config.walking_mph);
            dirty = true;
        }

        if dirty {
            store::save_edges(self.workspace, edge_table, &dataset.edges)?;
        }

        construct_network(
            edge_table,
            node_table,
            node_id_column,
            nodes,
            dataset.edges,
            self.config.max_minutes,
        )
    }
}

/// Assign each edge endpoint the id of the nearest node within the snap
/// tolerance, nearest first. Endpoints already carrying an id keep it.
fn assign_node_ids(edges: &mut [Edge], nodes: &[Node]) -> SnapReport {
    let tree = RTree::bulk_load(
        nodes
            .iter()
            .map(|n| GeomWithData::new([n.geometry.x(), n.geometry.y()], n.id))
            .collect(),
    );
    let tolerance_sq = NODE_SNAP_TOLERANCE * NODE_SNAP_TOLERANCE;

    let snap = |coord: Option<&geo::Coord<f64>>| -> Option<NodeId> {
        let c = coord?;
        tree.nearest_neighbor_iter_with_distance_2(&[c.x, c.y])
            .next()
            .filter(|(_, d2)| *d2 <= tolerance_sq)
            .map(|(n, _)| n.data)
    };

    let mut report = SnapReport {
        edges: edges.len(),
        ..Default::default()
    };
    for edge in edges.iter_mut() {
        if edge.start_id.is_none() {
            edge.start_id = snap(edge.geometry.0.first());
        }
        if edge.end_id.is_none() {
            edge.end_id = snap(edge.geometry.0.last());
        }
        for id in [edge.start_id, edge.end_id] {
            match id {
                Some(_) => report.matched_endpoints += 1,
                None => report.unmatched_endpoints += 1,
            }
        }
        if edge.start_id.is_none() || edge.end_id.is_none() {
            report.dangling_edges += 1;
        }
    }
    report
}

/// Derive `len_meters` and the `minutes` walking weight:
/// meters / 1609.34 / walking_mph * 60. Existing values are kept as-is.
fn add_travel_time_weights(edges: &mut [Edge], walking_mph: f64) {
    for edge in edges.iter_mut() {
        if edge.len_meters.is_none() {
            edge.len_meters = Some(edge.geometry.length(&Euclidean));
        }
        if edge.minutes.is_none()
            && let Some(len) = edge.len_meters
        {
            edge.minutes = Some(len / METERS_PER_MILE / walking_mph * 60.0);
        }
    }
}

fn construct_network(
    edge_table: &str,
    node_table: &str,
    node_id_column: &str,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    max_minutes: f64,
) -> Result<Network, Error> {
    let known: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();

    // Defensive filter against stale ids: only edges whose endpoints both
    // reference a node present in the node table enter the graph.
    let routable: Vec<(NodeId, NodeId, f64)> = edges
        .iter()
        .filter_map(|e| match (e.start_id, e.end_id, e.minutes) {
            (Some(s), Some(t), Some(m)) if known.contains(&s) && known.contains(&t) => {
                Some((s, t, m))
            }
            _ => None,
        })
        .collect();

    info!(
        "Making network: {} nodes, {} routable edges",
        nodes.len(),
        routable.len()
    );
    let mut graph = WalkGraph::construct(&nodes, &routable)?;
    info!("Precomputing the network to {max_minutes} minutes");
    graph.precompute(max_minutes);

    Ok(Network::new(
        edge_table,
        node_table,
        node_id_column,
        nodes,
        edges,
        graph,
    ))
}

/// Derive a node set from the distinct edge endpoints, deduplicated by
/// geometry, with sequential ids starting at 1.
pub fn generate_nodes(edges: &[Edge]) -> Vec<Node> {
    let mut seen: HashMap<(u64, u64), NodeId> = HashMap::new();
    let mut nodes = Vec::new();
    for edge in edges {
        for coord in [edge.geometry.0.first(), edge.geometry.0.last()]
            .into_iter()
            .flatten()
        {
            let key = (coord.x.to_bits(), coord.y.to_bits());
            if !seen.contains_key(&key) {
                let id = (nodes.len() + 1) as NodeId;
                seen.insert(key, id);
                nodes.push(Node {
                    id,
                    geometry: Point::new(coord.x, coord.y),
                });
            }
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::LineString;

    fn edge(id: u64, points: Vec<(f64, f64)>) -> Edge {
        Edge {
            id,
            geometry: LineString::from(points),
            start_id: None,
            end_id: None,
            len_meters: None,
            minutes: None,
        }
    }

    #[test]
    fn generate_nodes_dedupes_shared_endpoints() {
        let edges = vec![
            edge(0, vec![(0.0, 0.0), (50.0, 0.0)]),
            edge(1, vec![(50.0, 0.0), (100.0, 0.0)]),
        ];
        let nodes = generate_nodes(&edges);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].id, 1);
        assert_eq!(nodes[2].geometry, Point::new(100.0, 0.0));
    }

    #[test]
    fn assignment_leaves_far_endpoints_unmatched() {
        let nodes = generate_nodes(&[edge(0, vec![(0.0, 0.0), (50.0, 0.0)])]);
        let mut edges = vec![
            edge(0, vec![(0.0, 0.0), (50.0, 0.0)]),
            // end point is 20m from any node, beyond the 5m tolerance
            edge(1, vec![(50.0, 0.0), (50.0, 20.0)]),
        ];
        let report = assign_node_ids(&mut edges, &nodes);
        assert_eq!(report.dangling_edges, 1);
        assert_eq!(edges[0].start_id, Some(1));
        assert_eq!(edges[0].end_id, Some(2));
        assert_eq!(edges[1].end_id, None);
    }

    #[test]
    fn weights_follow_the_walking_speed_formula() {
        let mut edges = vec![edge(0, vec![(0.0, 0.0), (100.0, 0.0)])];
        add_travel_time_weights(&mut edges, 2.5);
        assert_eq!(edges[0].len_meters, Some(100.0));
        let minutes = edges[0].minutes.unwrap();
        assert!((minutes - 100.0 / 1609.34 / 2.5 * 60.0).abs() < 1e-12);
    }

    #[test]
    fn weights_never_overwrite_existing_values() {
        let mut edges = vec![edge(0, vec![(0.0, 0.0), (100.0, 0.0)])];
        edges[0].minutes = Some(999.0);
        add_travel_time_weights(&mut edges, 2.5);
        assert_eq!(edges[0].minutes, Some(999.0));
    }
}
