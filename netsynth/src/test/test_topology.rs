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

//! Test the shortest path computation of the topology.

use crate::netsim::topology::{IgpNetwork, TopologyGraph};
use crate::netsim::{DeviceError, LinkWeight, NetworkError, RouterId};
use assert_approx_eq::assert_approx_eq;
use maplit::hashmap;
use petgraph::algo::dijkstra;
use rand::prelude::*;
use std::collections::HashMap;

fn random_topology(rng: &mut StdRng, n: u32, p: f64) -> TopologyGraph {
    let mut t = TopologyGraph::new();
    for i in 0..n {
        t.add_router(i.into());
    }
    for a in 0..n {
        for b in (a + 1)..n {
            if rng.gen_bool(p) {
                let w: u32 = rng.gen_range(1, 10);
                t.create_link(a.into(), b.into(), w as LinkWeight);
            }
        }
    }
    t
}

fn reference_costs(graph: &IgpNetwork, source: RouterId) -> HashMap<RouterId, LinkWeight> {
    dijkstra(graph, source, None, |(_, _, w)| *w)
}

#[test]
fn test_shortest_paths_random() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let mut t = random_topology(&mut rng, 12, 0.25);
        let nodes = t.nodes();
        for source in nodes.iter() {
            let next_hops = t.shortest_paths(*source).unwrap();
            let expected = reference_costs(t.graph(), *source);
            for dest in nodes.iter() {
                match expected.get(dest) {
                    Some(exp) => {
                        assert_approx_eq!(t.cost(*dest).unwrap(), *exp);
                        if dest == source {
                            assert_eq!(next_hops[dest], None);
                            continue;
                        }
                        // the next hop must be on a shortest path
                        let nh = next_hops[dest].unwrap();
                        let link = t.link_weight(*source, nh).unwrap();
                        let rest = reference_costs(t.graph(), nh)[dest];
                        assert_approx_eq!(link + rest, *exp);
                    }
                    None => {
                        assert!(t.cost(*dest).unwrap().is_infinite());
                        assert_eq!(next_hops[dest], None);
                    }
                }
            }
        }
    }
}

#[test]
fn test_shortest_paths_stable() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut t = random_topology(&mut rng, 15, 0.4);
    let source: RouterId = 0.into();
    let first = t.shortest_paths(source).unwrap();
    for _ in 0..10 {
        let mut copy = t.clone();
        assert_eq!(copy.shortest_paths(source).unwrap(), first);
    }
}

#[test]
fn test_tie_break_lowest_id() {
    // 0 -- 1 -- 3
    // |         |
    // 2 ------- +
    let mut t = TopologyGraph::new();
    t.create_link(0.into(), 2.into(), 1.0);
    t.create_link(0.into(), 1.into(), 1.0);
    t.create_link(2.into(), 3.into(), 1.0);
    t.create_link(1.into(), 3.into(), 1.0);
    let r0: RouterId = 0.into();
    let r3: RouterId = 3.into();
    let next_hops = t.shortest_paths(r0).unwrap();
    assert_eq!(next_hops[&r3], Some(1.into()));
    assert_approx_eq!(t.cost(r3).unwrap(), 2.0);

    let next_hops = t.shortest_paths(r3).unwrap();
    assert_eq!(next_hops[&r0], Some(1.into()));
}

#[test]
fn test_cost_errors() {
    let mut t = TopologyGraph::new();
    t.add_router(0.into());
    t.add_router(1.into());
    assert_eq!(t.cost(0.into()), Err(DeviceError::IgpNotComputed));
    assert_eq!(t.shortest_paths(5.into()), Err(DeviceError::RouterNotFound(5.into())));

    let next_hops = t.shortest_paths(0.into()).unwrap();
    assert_eq!(next_hops, hashmap! {0.into() => None, 1.into() => None});
    assert_approx_eq!(t.cost(0.into()).unwrap(), 0.0);
    assert!(t.cost(1.into()).unwrap().is_infinite());
    assert_eq!(t.cost(5.into()), Err(DeviceError::RouterNotFound(5.into())));
}

#[test]
fn test_link_changes() {
    let mut t = TopologyGraph::new();
    assert!(t.create_link(0.into(), 1.into(), 1.0));
    assert!(!t.create_link(1.into(), 0.into(), 5.0));
    assert!(!t.create_link(1.into(), 2.into(), 0.0));
    assert_eq!(t.link_weight(0.into(), 1.into()), Some(1.0));

    t.update_cost(1.into(), 0.into(), 3.0);
    assert_eq!(t.link_weight(0.into(), 1.into()), Some(3.0));
    assert_eq!(t.neighbors(0.into()), vec![1.into()]);

    assert!(t.destroy_link(0.into(), 1.into()));
    assert!(!t.destroy_link(0.into(), 1.into()));
    assert!(!t.has_link(0.into(), 1.into()));
    assert_eq!(t.nodes(), vec![0.into(), 1.into()]);
}

#[test]
fn test_from_adjacency() {
    let r0: RouterId = 0.into();
    let r1: RouterId = 1.into();
    let r2: RouterId = 2.into();
    let t = TopologyGraph::from_adjacency(&hashmap! {
        r0 => hashmap! {r1 => 1.0, r2 => 0.0},
        r1 => hashmap! {r0 => 1.0},
        r2 => hashmap! {},
    })
    .unwrap();
    assert_eq!(t.nodes(), vec![r0, r1, r2]);
    assert!(t.has_link(r0, r1));
    assert!(!t.has_link(r0, r2));

    let err = TopologyGraph::from_adjacency(&hashmap! {
        r0 => hashmap! {r1 => 1.0},
        r1 => hashmap! {r0 => 2.0},
    });
    assert!(matches!(err, Err(NetworkError::AsymmetricLink(_, _))));

    let err = TopologyGraph::from_adjacency(&hashmap! {
        r0 => hashmap! {r1 => 1.0},
        r1 => hashmap! {},
    });
    assert_eq!(err.unwrap_err(), NetworkError::AsymmetricLink(r0, r1));
}
