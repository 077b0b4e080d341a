//! The graph-engine surface: build once from node coordinates and weighted
//! edges, precompute to a horizon, attach labeled POI sets, and query
//! per-node distances to the N nearest POIs per label.

use std::collections::BTreeMap;

use geo::Point;
use hashbrown::HashMap;
use petgraph::graph::{NodeIndex, UnGraph};
use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::dijkstra::dijkstra_path_weights;
use crate::model::Node;
use crate::{Error, NodeId, Time, cost_to_minutes, minutes_to_cost};

/// Graph node payload.
#[derive(Debug, Clone)]
pub(super) struct GraphNode {
    pub id: NodeId,
}

/// Graph edge payload: walking time in seconds.
#[derive(Debug, Clone)]
pub(super) struct GraphEdge {
    pub weight: Time,
}

pub(super) type WalkingGraph = UnGraph<GraphNode, GraphEdge>;

type IndexedNode = GeomWithData<[f64; 2], NodeId>;

/// A labeled POI set attached to the graph.
struct PoiSet {
    /// Snapped graph node per POI, as (input index, graph index).
    assignments: Vec<(usize, NodeIndex)>,
    /// Search cap in graph cost units. Inherited simplification: callers
    /// pass the horizon in minutes here, not a distance.
    max_dist: Time,
    /// Candidates kept per node.
    max_items: usize,
}

/// Undirected weighted walking graph with nearest-POI queries.
pub struct WalkGraph {
    graph: WalkingGraph,
    node_lookup: HashMap<NodeId, NodeIndex>,
    node_index: RTree<IndexedNode>,
    horizon: Time,
    pois: HashMap<String, PoiSet>,
}

impl WalkGraph {
    /// Build an undirected graph from nodes and `(start, end, minutes)`
    /// edge triples. Every referenced node id must exist.
    pub fn construct(nodes: &[Node], edges: &[(NodeId, NodeId, f64)]) -> Result<Self, Error> {
        if nodes.is_empty() {
            return Err(Error::NoPointsFound);
        }

        let mut graph = WalkingGraph::default();
        let mut node_lookup = HashMap::with_capacity(nodes.len());
        let mut indexed = Vec::with_capacity(nodes.len());
        for node in nodes {
            let idx = graph.add_node(GraphNode { id: node.id });
            node_lookup.insert(node.id, idx);
            indexed.push(GeomWithData::new(
                [node.geometry.x(), node.geometry.y()],
                node.id,
            ));
        }

        for &(start, end, minutes) in edges {
            let (Some(&a), Some(&b)) = (node_lookup.get(&start), node_lookup.get(&end)) else {
                return Err(Error::InvalidData(format!(
                    "edge references unknown node {start} or {end}"
                )));
            };
            graph.add_edge(
                a,
                b,
                GraphEdge {
                    weight: minutes_to_cost(minutes),
                },
            );
        }

        Ok(Self {
            graph,
            node_lookup,
            node_index: RTree::bulk_load(indexed),
            horizon: Time::MAX,
            pois: HashMap::new(),
        })
    }

    /// Cap shortest-path exploration at `horizon_minutes`. Queries beyond
    /// the horizon require a new graph.
    pub fn precompute(&mut self, horizon_minutes: f64) {
        self.horizon = minutes_to_cost(horizon_minutes);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nearest graph node id per query point, within `mapping_distance`
    /// projected units of the point.
    pub fn get_node_ids(
        &self,
        points: &[Point<f64>],
        mapping_distance: f64,
    ) -> Vec<Option<NodeId>> {
        points
            .iter()
            .map(|p| {
                self.node_index
                    .nearest_neighbor_iter_with_distance_2(&[p.x(), p.y()])
                    .next()
                    .filter(|(_, d2)| *d2 <= mapping_distance * mapping_distance)
                    .map(|(n, _)| n.data)
            })
            .collect()
    }

    /// Attach a labeled POI set, snapping each POI to its nearest graph
    /// node. `max_dist` is in minutes and caps how far this set's
    /// influence is searched; `max_items` caps candidates kept per node.
    pub fn set_pois(&mut self, label: &str, points: &[Point<f64>], max_dist: f64, max_items: usize) {
        let assignments: Vec<(usize, NodeIndex)> = points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                self.node_index
                    .nearest_neighbor(&[p.x(), p.y()])
                    .map(|n| (i, self.node_lookup[&n.data]))
            })
            .collect();

        self.pois.insert(
            label.to_string(),
            PoiSet {
                assignments,
                max_dist: minutes_to_cost(max_dist),
                max_items,
            },
        );
    }

    /// The recorded POI-to-node assignment for a label, as
    /// (input index, node id) pairs.
    pub fn poi_assignments(&self, label: &str) -> Option<Vec<(usize, NodeId)>> {
        self.pois.get(label).map(|set| {
            set.assignments
                .iter()
                .map(|&(i, idx)| (i, self.graph[idx].id))
                .collect()
        })
    }

    /// Travel minutes from every graph node to its 1..=`num_pois` nearest
    /// POIs under `label`, bounded by `distance` minutes, the precomputed
    /// horizon, and the set's own cap. Ranks with no reachable POI are
    /// `None`. Every graph node gets a row.
    pub fn nearest_pois(
        &self,
        label: &str,
        distance: f64,
        num_pois: usize,
    ) -> Result<BTreeMap<NodeId, Vec<Option<f64>>>, Error> {
        let set = self
            .pois
            .get(label)
            .ok_or_else(|| Error::UnknownLabel(label.to_string()))?;
        let bound = minutes_to_cost(distance)
            .min(self.horizon)
            .min(set.max_dist);
        let keep = num_pois.min(set.max_items);

        // The graph is undirected, so per-POI distance maps double as
        // node-to-POI distances.
        let mut candidates: HashMap<NodeIndex, Vec<Time>> = HashMap::new();
        for &(_, poi_node) in &set.assignments {
            for (idx, cost) in dijkstra_path_weights(&self.graph, poi_node, Some(bound)) {
                candidates.entry(idx).or_default().push(cost);
            }
        }

        let mut rows = BTreeMap::new();
        for idx in self.graph.node_indices() {
            let mut ranks: Vec<Option<f64>> = vec![None; num_pois];
            if let Some(costs) = candidates.get_mut(&idx) {
                costs.sort_unstable();
                for (rank, &cost) in costs.iter().take(keep).enumerate() {
                    ranks[rank] = Some(cost_to_minutes(cost));
                }
            }
            rows.insert(self.graph[idx].id, ranks);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: NodeId, x: f64, y: f64) -> Node {
        Node {
            id,
            geometry: Point::new(x, y),
        }
    }

    fn line_graph() -> WalkGraph {
        // Three nodes in a line, one minute per hop.
        let nodes = vec![node(1, 0.0, 0.0), node(2, 100.0, 0.0), node(3, 200.0, 0.0)];
        let edges = vec![(1, 2, 1.0), (2, 3, 1.0)];
        WalkGraph::construct(&nodes, &edges).unwrap()
    }

    #[test]
    fn construct_rejects_empty_node_set() {
        assert!(matches!(
            WalkGraph::construct(&[], &[]),
            Err(Error::NoPointsFound)
        ));
    }

    #[test]
    fn nearest_pois_reports_ranked_minutes() {
        let mut graph = line_graph();
        graph.precompute(45.0);
        graph.set_pois("library", &[Point::new(1.0, 1.0)], 45.0, 3);

        let rows = graph.nearest_pois("library", 45.0, 3).unwrap();
        assert_eq!(rows[&1][0], Some(0.0));
        assert_eq!(rows[&2][0], Some(1.0));
        assert_eq!(rows[&3][0], Some(2.0));
        // Only one POI in the set, so ranks 2 and 3 stay empty.
        assert_eq!(rows[&1][1], None);
        assert_eq!(rows[&1][2], None);
    }

    #[test]
    fn nearest_pois_respects_the_horizon() {
        let mut graph = line_graph();
        graph.precompute(1.0);
        graph.set_pois("library", &[Point::new(0.0, 0.0)], 1.0, 1);

        let rows = graph.nearest_pois("library", 1.0, 1).unwrap();
        // Cost equal to the bound is kept; beyond it is not explored.
        assert_eq!(rows[&2][0], Some(1.0));
        assert_eq!(rows[&3][0], None);
    }

    #[test]
    fn get_node_ids_enforces_mapping_distance() {
        let graph = line_graph();
        let points = vec![Point::new(0.0, 0.5), Point::new(0.0, 50.0)];
        let ids = graph.get_node_ids(&points, 1.0);
        assert_eq!(ids, vec![Some(1), None]);
    }

    #[test]
    fn unknown_label_is_an_error() {
        let graph = line_graph();
        assert!(graph.nearest_pois("nothing", 45.0, 1).is_err());
    }
}
