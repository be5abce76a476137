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

//! Test the iBGP propagation through route reflectors on the entire network.

use crate::example_networks::permit_all;
use crate::netsim::bgp::{AdEntry, RouterRole};
use crate::netsim::config::RouterConfig;
use crate::netsim::{
    Destination, DeviceError, Network, NetworkError, Prefix, RouterId, Termination,
};
use lazy_static::lazy_static;
use maplit::hashmap;
use std::collections::HashMap;

lazy_static! {
    static ref B0: RouterId = 0.into();
    static ref B1: RouterId = 1.into();
    static ref RR2: RouterId = 2.into();
    static ref RR3: RouterId = 3.into();
    static ref C4: RouterId = 4.into();
    static ref C5: RouterId = 5.into();
    static ref C6: RouterId = 6.into();
}

/// # Test network
///
/// ```text
/// B0        B1
/// |         |
/// RR2 ---- RR3 ---- C6
/// |         |
/// C4 ----- C5
/// ```
///
/// C6 has no iBGP session.
fn get_test_net() -> Network {
    let topology = hashmap! {
        *B0 => hashmap! { *RR2 => 1.0 },
        *B1 => hashmap! { *RR3 => 1.0 },
        *RR2 => hashmap! { *B0 => 1.0, *RR3 => 1.0, *C4 => 1.0 },
        *RR3 => hashmap! { *B1 => 1.0, *RR2 => 1.0, *C5 => 1.0, *C6 => 1.0 },
        *C4 => hashmap! { *RR2 => 1.0, *C5 => 1.0 },
        *C5 => hashmap! { *RR3 => 1.0, *C4 => 1.0 },
        *C6 => hashmap! { *RR3 => 1.0 },
    };
    let routers = hashmap! {
        *B0 => RouterConfig::border("B0", vec![], vec![*RR2, *RR3]),
        *B1 => RouterConfig::border("B1", vec![], vec![*RR2, *RR3]),
        *RR2 => RouterConfig::reflector("RR2", vec![*B0, *B1], vec![*C4, *C5]),
        *RR3 => RouterConfig::reflector("RR3", vec![*B0, *B1], vec![*C4, *C5]),
        *C4 => RouterConfig::ordinary("C4", vec![*RR2, *RR3]),
        *C5 => RouterConfig::ordinary("C5", vec![*RR2, *RR3]),
        *C6 => RouterConfig::ordinary("C6", vec![]),
    };
    let mut net = Network::new(&topology, &routers).unwrap();
    let acl = permit_all(&net, &[Prefix(0), Prefix(3)]);
    net.apply_config(&acl).unwrap();
    net
}

fn next_hop(net: &Network, router: RouterId, prefix: Prefix) -> Option<Option<RouterId>> {
    net.get_router(router).unwrap().get_next_hop(prefix)
}

fn routing_tables(net: &Network) -> HashMap<RouterId, HashMap<Destination, Option<RouterId>>> {
    net.get_routers()
        .into_iter()
        .map(|r| (r, net.get_router(r).unwrap().get_routing_table().clone()))
        .collect()
}

#[test]
fn test_propagation() {
    let _ = pretty_env_logger::try_init();
    let mut net = get_test_net();
    net.insert_ebgp(Prefix(0), *B0).unwrap();
    net.insert_ebgp(Prefix(0), *B1).unwrap();
    assert!(net.get_known_prefixes().contains(&Prefix(0)));

    assert_eq!(next_hop(&net, *B0, Prefix(0)), Some(None));
    assert_eq!(next_hop(&net, *B1, Prefix(0)), Some(None));
    assert_eq!(next_hop(&net, *RR2, Prefix(0)), Some(Some(*B0)));
    assert_eq!(next_hop(&net, *RR3, Prefix(0)), Some(Some(*B1)));

    // the advertisements of B1 replaced the ones of B0 on the clients
    assert_eq!(
        net.get_router(*C4).unwrap().get_ibgp_ads(Prefix(0)),
        &[AdEntry { gate: *B1, advertiser: *RR2 }, AdEntry { gate: *B1, advertiser: *RR3 }]
    );
    assert_eq!(next_hop(&net, *C4, Prefix(0)), Some(Some(*RR2)));
    assert_eq!(next_hop(&net, *C5, Prefix(0)), Some(Some(*RR3)));
    assert_eq!(next_hop(&net, *C6, Prefix(0)), None);

    let trace = net.route_packet(*C4, Prefix(0)).unwrap();
    assert_eq!(trace.path, vec![*C4, *RR2, *B0]);
    assert_eq!(trace.outcome, Termination::HandedOff(*B0));
    assert!(trace.reached());

    let trace = net.route_packet(*C5, Prefix(0)).unwrap();
    assert_eq!(trace.path, vec![*C5, *RR3, *B1]);

    let trace = net.route_packet(*C6, Prefix(0)).unwrap();
    assert_eq!(trace.outcome, Termination::DestinationUnreachable(*C6));
    assert!(!trace.reached());

    assert!(net.check_node_reachability(*C4, Prefix(0)).unwrap());
    assert!(!net.check_node_reachability(*C6, Prefix(0)).unwrap());
}

#[test]
fn test_withdrawal_symmetry() {
    let mut net = get_test_net();
    let before = routing_tables(&net);

    net.insert_ebgp(Prefix(0), *B0).unwrap();
    net.insert_ebgp(Prefix(0), *B1).unwrap();
    assert_ne!(routing_tables(&net), before);

    // only B0 remains
    net.remove_ebgp(Prefix(0), *B1).unwrap();
    assert!(net.get_known_prefixes().contains(&Prefix(0)));
    assert_eq!(next_hop(&net, *B1, Prefix(0)), None);
    assert_eq!(next_hop(&net, *RR3, Prefix(0)), Some(Some(*RR2)));
    assert_eq!(
        net.get_router(*C4).unwrap().get_ibgp_ads(Prefix(0)),
        &[AdEntry { gate: *B0, advertiser: *RR2 }, AdEntry { gate: *B0, advertiser: *RR3 }]
    );
    let trace = net.route_packet(*C5, Prefix(0)).unwrap();
    assert_eq!(trace.path, vec![*C5, *RR3, *RR2, *B0]);
    assert_eq!(trace.outcome, Termination::HandedOff(*B0));

    net.remove_ebgp(Prefix(0), *B0).unwrap();
    assert!(net.get_known_prefixes().is_empty());
    assert_eq!(routing_tables(&net), before);
    for r in net.get_routers() {
        assert!(net.get_router(r).unwrap().get_ibgp_ads(Prefix(0)).is_empty());
    }
}

#[test]
fn test_withdrawal_on_session_teardown() {
    let mut net = get_test_net();
    let before = routing_tables(&net);
    net.insert_ebgp(Prefix(0), *B0).unwrap();
    assert_eq!(
        net.get_router(*C5).unwrap().get_ibgp_ads(Prefix(0)),
        &[AdEntry { gate: *B0, advertiser: *RR2 }, AdEntry { gate: *B0, advertiser: *RR3 }]
    );

    // RR3 still reflects the route of B0
    net.destroy_ibgp_session(*B0, *RR2).unwrap();
    assert!(net.get_router(*RR2).unwrap().get_ibgp_ads(Prefix(0)).is_empty());
    assert_eq!(next_hop(&net, *RR2, Prefix(0)), None);
    for c in vec![*C4, *C5] {
        assert_eq!(
            net.get_router(c).unwrap().get_ibgp_ads(Prefix(0)),
            &[AdEntry { gate: *B0, advertiser: *RR3 }]
        );
    }
    assert_eq!(next_hop(&net, *RR3, Prefix(0)), Some(Some(*RR2)));

    // B0 has no session left, and every learned entry is gone
    net.destroy_ibgp_session(*B0, *RR3).unwrap();
    for r in net.get_routers() {
        let router = net.get_router(r).unwrap();
        assert!(router.get_ibgp_ads(Prefix(0)).is_empty());
        assert!(router.get_known_prefixes().is_empty());
        if r == *B0 {
            assert_eq!(router.get_next_hop(Prefix(0)), Some(None));
        } else {
            assert_eq!(router.get_next_hop(Prefix(0)), None);
            assert_eq!(router.get_routing_table(), &before[&r]);
        }
    }
    assert_eq!(
        net.destroy_ibgp_session(*B0, *RR3),
        Err(NetworkError::DeviceError(DeviceError::UnknownPeer(*RR3)))
    );
}

#[test]
fn test_session_sync() {
    let mut net = get_test_net();
    net.insert_ebgp(Prefix(0), *B0).unwrap();
    net.insert_ebgp(Prefix(0), *B1).unwrap();

    net.start_ibgp_session(*RR3, *C6).unwrap();
    assert_eq!(
        net.get_router(*C6).unwrap().get_ibgp_ads(Prefix(0)),
        &[AdEntry { gate: *B1, advertiser: *RR3 }]
    );
    assert_eq!(next_hop(&net, *C6, Prefix(0)), Some(Some(*RR3)));

    assert_eq!(
        net.start_ibgp_session(*RR3, *C6),
        Err(NetworkError::DeviceError(DeviceError::SessionAlreadyExists(*C6)))
    );
    assert_eq!(
        net.start_ibgp_session(*C4, *C6),
        Err(NetworkError::InvalidSessionRole(*C4, RouterRole::Ordinary))
    );

    net.destroy_ibgp_session(*RR3, *C6).unwrap();
    assert_eq!(next_hop(&net, *C6, Prefix(0)), None);
    assert_eq!(
        net.destroy_ibgp_session(*RR3, *C6),
        Err(NetworkError::DeviceError(DeviceError::UnknownPeer(*C6)))
    );

    // C4 still learns the route over RR3
    net.destroy_ibgp_session(*RR2, *C4).unwrap();
    assert_eq!(
        net.get_router(*C4).unwrap().get_ibgp_ads(Prefix(0)),
        &[AdEntry { gate: *B1, advertiser: *RR3 }]
    );
    assert_eq!(next_hop(&net, *C4, Prefix(0)), Some(Some(*RR2)));
}

#[test]
fn test_session_to_border() {
    let mut net = get_test_net();
    net.insert_ebgp(Prefix(3), *B1).unwrap();
    net.start_ibgp_session(*B1, *C6).unwrap();
    assert_eq!(
        net.get_router(*C6).unwrap().get_ibgp_ads(Prefix(3)),
        &[AdEntry { gate: *B1, advertiser: *B1 }]
    );
    assert!(net.get_router(*B1).unwrap().get_bgp_sessions().is_client(*C6));
    assert!(net.get_router(*C6).unwrap().get_bgp_sessions().is_server(*B1));
}

#[test]
fn test_ebgp_errors() {
    let mut net = get_test_net();
    assert_eq!(
        net.insert_ebgp(Prefix(0), *C4),
        Err(NetworkError::DeviceError(DeviceError::NotABorderRouter(*C4)))
    );
    assert_eq!(
        net.remove_ebgp(Prefix(0), *B0),
        Err(NetworkError::DeviceError(DeviceError::UnknownPrefix(Prefix(0))))
    );
    assert_eq!(net.insert_ebgp(Prefix(0), 10.into()), Err(NetworkError::DeviceNotFound(10.into())));
    assert!(net.get_known_prefixes().is_empty());
}

#[test]
fn test_no_convergence() {
    let mut net = get_test_net();
    net.set_msg_limit(Some(1));
    assert_eq!(net.insert_ebgp(Prefix(0), *B0), Err(NetworkError::NoConvergence));

    net.set_msg_limit(None);
    net.insert_ebgp(Prefix(0), *B1).unwrap();
    assert_eq!(next_hop(&net, *C5, Prefix(0)), Some(Some(*RR3)));
}

#[test]
fn test_invalid_session_role() {
    let topology = hashmap! {
        *B0 => hashmap! { *B1 => 1.0 },
        *B1 => hashmap! { *B0 => 1.0 },
    };
    let routers = hashmap! {
        *B0 => RouterConfig::ordinary("B0", vec![]),
        *B1 => RouterConfig { clients: vec![*B0], ..RouterConfig::ordinary("B1", vec![]) },
    };
    assert_eq!(
        Network::new(&topology, &routers).unwrap_err(),
        NetworkError::InvalidSessionRole(*B1, RouterRole::Ordinary)
    );
}

#[test]
fn test_unknown_session_peer() {
    let topology = hashmap! {
        *B0 => hashmap! { *B1 => 1.0 },
        *B1 => hashmap! { *B0 => 1.0 },
    };
    let routers = hashmap! {
        *B0 => RouterConfig::border("B0", vec![], vec![*B1, 7.into()]),
        *B1 => RouterConfig::ordinary("B1", vec![*B0]),
    };
    assert_eq!(
        Network::new(&topology, &routers).unwrap_err(),
        NetworkError::DeviceNotFound(7.into())
    );
}
