// Snowcap: Synthesizing Network-Wide Configuration Updates
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # IGP Topology
//!
//! Every router holds its own copy of the link-state topology, and runs the shortest path
//! computation on it. Links are undirected, and a link with weight `0.0` does not exist.

use crate::netsim::{DeviceError, LinkWeight, NetworkError, RouterId};
use petgraph::graphmap::UnGraphMap;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Undirected IGP graph, mapping every link to its weight.
pub type IgpNetwork = UnGraphMap<RouterId, LinkWeight>;

/// Cost and next hop of every router in the graph, as computed by the last shortest path run.
type PathTable = HashMap<RouterId, (LinkWeight, Option<RouterId>)>;

/// Heap entry of the shortest path computation. The heap pops the lowest cost first, and the
/// lowest router id among equal costs.
#[derive(Debug, Clone, Copy)]
struct State {
    cost: LinkWeight,
    router: RouterId,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed for a min-heap
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.router.cmp(&self.router))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// # Topology Graph
/// Link-state view of the network, used by a single router. The struct remembers the result of
/// the last call to [`TopologyGraph::shortest_paths`], such that the cost to every destination can
/// be queried afterwards.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    graph: IgpNetwork,
    paths: Option<PathTable>,
}

impl TopologyGraph {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self { graph: IgpNetwork::new(), paths: None }
    }

    /// Build the topology from an adjacency map. Every router appearing as a key is a node. Links
    /// with weight `0.0` are skipped. Every link must be listed in both directions with the same
    /// weight, otherwise `NetworkError::AsymmetricLink` is returned.
    pub fn from_adjacency(
        adjacency: &HashMap<RouterId, HashMap<RouterId, LinkWeight>>,
    ) -> Result<Self, NetworkError> {
        let mut graph = IgpNetwork::new();
        let mut routers: Vec<RouterId> = adjacency.keys().cloned().collect();
        routers.sort();
        for r in routers.iter() {
            graph.add_node(*r);
        }
        for (a, neighbors) in adjacency.iter() {
            for (b, weight) in neighbors.iter() {
                if *weight == 0.0 {
                    continue;
                }
                match adjacency.get(b).and_then(|n| n.get(a)) {
                    Some(w) if w == weight => {}
                    _ => return Err(NetworkError::AsymmetricLink(*a, *b)),
                }
                graph.add_edge(*a, *b, *weight);
            }
        }
        Ok(Self { graph, paths: None })
    }

    /// Add a router without any link. Nothing happens if the router is already present.
    pub fn add_router(&mut self, router: RouterId) {
        self.graph.add_node(router);
    }

    /// Returns a reference to the underlying graph
    pub fn graph(&self) -> &IgpNetwork {
        &self.graph
    }

    /// Returns all routers of the topology, ordered by their id.
    pub fn nodes(&self) -> Vec<RouterId> {
        let mut nodes: Vec<RouterId> = self.graph.nodes().collect();
        nodes.sort();
        nodes
    }

    /// Returns all direct neighbors of a router, ordered by their id.
    pub fn neighbors(&self, router: RouterId) -> Vec<RouterId> {
        if !self.graph.contains_node(router) {
            return Vec::new();
        }
        let mut neighbors: Vec<RouterId> = self.graph.neighbors(router).collect();
        neighbors.sort();
        neighbors
    }

    /// Returns true if there exists a direct link between `a` and `b`.
    pub fn has_link(&self, a: RouterId, b: RouterId) -> bool {
        self.graph.contains_edge(a, b)
    }

    /// Returns the weight of the link between `a` and `b`, if it exists.
    pub fn link_weight(&self, a: RouterId, b: RouterId) -> Option<LinkWeight> {
        self.graph.edge_weight(a, b).cloned()
    }

    /// Add a new link. If the link already exists, nothing is changed and `false` is returned.
    pub fn create_link(&mut self, a: RouterId, b: RouterId, weight: LinkWeight) -> bool {
        if weight == 0.0 || self.has_link(a, b) {
            return false;
        }
        self.graph.add_edge(a, b, weight);
        true
    }

    /// Set the weight of a link, creating the link if it is absent. The weight must be positive.
    pub fn update_cost(&mut self, a: RouterId, b: RouterId, weight: LinkWeight) {
        self.graph.add_edge(a, b, weight);
    }

    /// Remove the link between `a` and `b`. Returns `false` if the link did not exist.
    pub fn destroy_link(&mut self, a: RouterId, b: RouterId) -> bool {
        self.graph.remove_edge(a, b).is_some()
    }

    /// Compute the shortest paths from `source` to every router of the topology, and return the
    /// next hop for each of them. The source itself and all unreachable routers map to `None`.
    ///
    /// Among several nodes with the same tentative distance, the one with the lowest id is
    /// settled first, and a predecessor is only replaced on a strictly smaller distance. Hence,
    /// equal cost paths are always resolved the same way.
    pub fn shortest_paths(
        &mut self,
        source: RouterId,
    ) -> Result<HashMap<RouterId, Option<RouterId>>, DeviceError> {
        if !self.graph.contains_node(source) {
            return Err(DeviceError::RouterNotFound(source));
        }
        let nodes = self.nodes();
        let mut dist: HashMap<RouterId, LinkWeight> =
            nodes.iter().map(|r| (*r, LinkWeight::INFINITY)).collect();
        let mut pred: HashMap<RouterId, RouterId> = HashMap::new();
        let mut settled: HashSet<RouterId> = HashSet::new();
        let mut heap: BinaryHeap<State> = BinaryHeap::new();
        dist.insert(source, 0.0);
        heap.push(State { cost: 0.0, router: source });

        while let Some(State { cost, router: current }) = heap.pop() {
            // skip stale entries
            if !settled.insert(current) {
                continue;
            }
            for (_, neighbor, weight) in self.graph.edges(current) {
                if settled.contains(&neighbor) {
                    continue;
                }
                let alt = cost + *weight;
                if alt < dist[&neighbor] {
                    dist.insert(neighbor, alt);
                    pred.insert(neighbor, current);
                    heap.push(State { cost: alt, router: neighbor });
                }
            }
        }

        let mut table: PathTable = HashMap::with_capacity(nodes.len());
        for router in nodes {
            let cost = dist[&router];
            let next_hop = if router == source || cost.is_infinite() {
                None
            } else {
                // walk back along the predecessors until we reach the source
                let mut hop = router;
                while let Some(p) = pred.get(&hop) {
                    if *p == source {
                        break;
                    }
                    hop = *p;
                }
                Some(hop)
            };
            table.insert(router, (cost, next_hop));
        }

        let result = table.iter().map(|(r, (_, nh))| (*r, *nh)).collect();
        self.paths = Some(table);
        Ok(result)
    }

    /// Returns the cost to reach `dest`, as computed by the last call to `shortest_paths`.
    /// Unreachable routers have infinite cost.
    pub fn cost(&self, dest: RouterId) -> Result<LinkWeight, DeviceError> {
        match self.paths.as_ref() {
            None => Err(DeviceError::IgpNotComputed),
            Some(table) => {
                table.get(&dest).map(|(c, _)| *c).ok_or(DeviceError::RouterNotFound(dest))
            }
        }
    }
}
