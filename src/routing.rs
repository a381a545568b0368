//! Routing-table recomputation: BFS shortest path over the symmetrized
//! neighbor/TC graph.
//!
//! All link costs are 1 hop, so a FIFO breadth-first search is sufficient
//! to compute hop-count-optimal shortest paths; there is no need for
//! Dijkstra's priority-queue machinery.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::neighbor::NeighborTable;
use crate::tc_table::TcTable;

/// Maps destination identifier to the first-hop neighbor on a shortest path.
#[derive(Debug, Default, Clone)]
pub struct RoutingTable {
    first_hop: HashMap<u32, u32>,
}

impl RoutingTable {
    pub fn first_hop(&self, destination: u32) -> Option<u32> {
        self.first_hop.get(&destination).copied()
    }

    pub fn len(&self) -> usize {
        self.first_hop.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_hop.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, destination: u32) -> bool {
        self.first_hop.contains_key(&destination)
    }
}

/// Recompute the routing table from scratch: build an undirected graph
/// rooted at `self_id` from 1-hop symmetric neighbors and TC-advertised
/// MPR-selector sets, symmetrize it, then BFS for hop-count shortest paths
/// and extract first hops.
pub fn compute_routing_table(self_id: u32, neighbors: &NeighborTable, tc_table: &TcTable) -> RoutingTable {
    let mut graph: HashMap<u32, HashSet<u32>> = HashMap::new();
    graph.entry(self_id).or_default().extend(neighbors.symmetric_ids());

    for (originator, entry) in tc_table.iter() {
        graph
            .entry(*originator)
            .or_default()
            .extend(entry.mpr_selectors.iter().copied());
    }

    let directed_edges: Vec<(u32, u32)> = graph
        .iter()
        .flat_map(|(u, vs)| vs.iter().map(move |v| (*u, *v)))
        .collect();
    for (u, v) in directed_edges {
        graph.entry(v).or_default().insert(u);
    }

    let mut dist: HashMap<u32, u32> = HashMap::from([(self_id, 0)]);
    let mut previous: HashMap<u32, u32> = HashMap::new();
    let mut frontier: VecDeque<u32> = VecDeque::from([self_id]);

    while let Some(u) = frontier.pop_front() {
        let du = dist[&u];
        let Some(edges) = graph.get(&u) else { continue };
        let mut sorted_edges: Vec<u32> = edges.iter().copied().collect();
        sorted_edges.sort_unstable();
        for v in sorted_edges {
            if !dist.contains_key(&v) {
                dist.insert(v, du + 1);
                previous.insert(v, u);
                frontier.push_back(v);
            }
        }
    }

    let mut first_hop = HashMap::new();
    for destination in dist.keys().copied() {
        if destination == self_id {
            continue;
        }
        let mut node = destination;
        loop {
            let parent = previous[&node];
            if parent == self_id {
                break;
            }
            node = parent;
        }
        first_hop.insert(destination, node);
    }

    RoutingTable { first_hop }
}
