use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::HashMap;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use super::engine::WalkingGraph;
use crate::Time;

#[derive(Copy, Clone, Eq, PartialEq)]
struct State {
    cost: Time,
    node: NodeIndex,
}

// Min-heap by cost (reversed from standard Rust BinaryHeap)
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra's algorithm over the walking graph.
/// Returns walking time in seconds for every node reachable from `start`
/// within `max_cost`; costs equal to the bound are kept.
pub(super) fn dijkstra_path_weights(
    graph: &WalkingGraph,
    start: NodeIndex,
    max_cost: Option<Time>,
) -> HashMap<NodeIndex, Time> {
    let mut distances: HashMap<NodeIndex, Time> = HashMap::new();
    let mut heap = BinaryHeap::new();

    heap.push(State {
        cost: 0,
        node: start,
    });
    distances.insert(start, 0);

    while let Some(State { cost, node }) = heap.pop() {
        // Skip if we've already found a better path
        if let Some(&best) = distances.get(&node) {
            if cost > best {
                continue;
            }
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let next_cost = cost.saturating_add(edge.weight().weight);

            if let Some(max) = max_cost {
                if next_cost > max {
                    continue;
                }
            }

            // Add or update distance if better using the Entry API
            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    distances
}
