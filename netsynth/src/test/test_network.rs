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

//! Test the simple functionality of the network, without any iBGP.

use crate::example_networks::{ExampleNetwork, RingNet};
use crate::netsim::acl::AclRule;
use crate::netsim::config::{ConfigExpr::*, ConfigModifier, ConfigModifier::*, RouterConfig};
use crate::netsim::{
    printer, ConfigError, Destination, DeviceError, Network, NetworkError, RouterId, Termination,
};
use lazy_static::lazy_static;
use maplit::hashmap;

lazy_static! {
    static ref R0: RouterId = 0.into();
    static ref R1: RouterId = 1.into();
    static ref R2: RouterId = 2.into();
    static ref R3: RouterId = 3.into();
}

fn edges(net: &Network, src: RouterId, dst: RouterId) -> Vec<(RouterId, RouterId)> {
    net.route_packet(src, dst).unwrap().edges
}

fn static_route(router: RouterId, dst: RouterId, next_hop: RouterId) -> crate::netsim::config::ConfigExpr {
    StaticRoute { router, dst: dst.into(), next_hop }
}

/// # Test network
///
/// ```text
///  R0 ---- R1
///  |     /  |
///  |   /    |
///  R3 ---- R2
/// ```
fn get_test_net() -> Network {
    let net = RingNet::net();
    assert_eq!(net.get_router_id("r0").unwrap(), *R0);
    assert_eq!(net.get_router_id("r3").unwrap(), *R3);
    net
}

#[test]
fn test_ring_scenario() {
    let _ = pretty_env_logger::try_init();
    let mut net = get_test_net();
    assert_eq!(edges(&net, *R1, *R3), vec![(*R1, *R3)]);

    let append = Append(static_route(*R1, *R3, *R0));
    net.apply_modifier(&append).unwrap();
    assert_eq!(edges(&net, *R1, *R3), vec![(*R1, *R0), (*R0, *R3)]);

    let update = Update { from: static_route(*R1, *R3, *R0), to: static_route(*R1, *R3, *R2) };
    net.apply_modifier(&update).unwrap();
    assert_eq!(edges(&net, *R1, *R3), vec![(*R1, *R2), (*R2, *R3)]);

    let remove = Remove(Acl { router: *R2, rule: AclRule::permit(*R1, *R3), position: None });
    net.apply_modifier(&remove).unwrap();
    let trace = net.route_packet(*R1, *R3).unwrap();
    assert_eq!(trace.edges, vec![(*R1, *R2)]);
    assert_eq!(trace.path, vec![*R1]);
    assert_eq!(trace.outcome, Termination::AclDenied(*R2));
    assert!(!net.check_node_reachability(*R1, *R3).unwrap());

    // undo everything
    for m in vec![append, update, remove].into_iter().rev() {
        net.apply_modifier(&m.reverse()).unwrap();
    }
    assert_eq!(edges(&net, *R1, *R3), vec![(*R1, *R3)]);
    assert!(net.check_node_reachability(*R1, *R3).unwrap());
    assert!(!net.get_router(*R1).unwrap().is_static(*R3));
}

#[test]
fn test_route_all_pairs() {
    let net = get_test_net();
    for src in net.get_routers() {
        for dst in net.get_routers() {
            let trace = net.route_packet(src, dst).unwrap();
            assert_eq!(trace.outcome, Termination::Delivered);
            assert_eq!(trace.path.first(), Some(&src));
            assert_eq!(trace.path.last(), Some(&dst));
            assert!(net.check_node_reachability(src, dst).unwrap());
        }
    }
}

#[test]
fn test_forwarding_loop() {
    let mut net = get_test_net();
    net.apply_config(&[
        Append(static_route(*R1, *R3, *R0)),
        Append(static_route(*R0, *R3, *R1)),
    ])
    .unwrap();
    let trace = net.route_packet(*R1, *R3).unwrap();
    assert!(matches!(trace.outcome, Termination::ForwardingLoop(_)));
    assert_eq!(trace.path.len(), 16);
    assert!(!net.check_node_reachability(*R1, *R3).unwrap());
    // R2 still reaches R3 directly
    assert!(net.check_node_reachability(*R2, *R3).unwrap());
}

#[test]
fn test_reachability_via_static_route() {
    let mut net = get_test_net();
    net.apply_modifier(&Append(static_route(*R1, *R3, *R2))).unwrap();
    assert!(net.check_node_reachability(*R1, *R3).unwrap());
    // R2 does not accept traffic from R1 to R3 anymore
    net.apply_modifier(&Remove(Acl { router: *R2, rule: AclRule::permit(*R1, *R3), position: None }))
        .unwrap();
    assert!(!net.check_node_reachability(*R1, *R3).unwrap());
    assert!(net.check_node_reachability(*R0, *R3).unwrap());
}

#[test]
fn test_modifier_errors_leave_state() {
    let mut net = get_test_net();
    let before = net.route_packet(*R0, *R2).unwrap();

    // no link between R0 and R2
    let m = Append(static_route(*R0, *R2, *R2));
    assert_eq!(
        net.apply_modifier(&m),
        Err(NetworkError::DeviceError(DeviceError::StaticRouteConflict((*R2).into(), *R2)))
    );
    assert!(!net.get_router(*R0).unwrap().is_static(*R2));

    // nothing to remove
    let m = Remove(static_route(*R0, *R2, *R1));
    assert_eq!(net.apply_modifier(&m), Err(NetworkError::ConfigError(ConfigError::ConfigMismatch(m.clone()))));

    // the old value does not match
    let m = Update { from: static_route(*R0, *R2, *R1), to: static_route(*R0, *R2, *R3) };
    assert_eq!(net.apply_modifier(&m), Err(NetworkError::ConfigError(ConfigError::ConfigMismatch(m.clone()))));

    // different kinds of expressions
    let m = Update {
        from: static_route(*R0, *R2, *R1),
        to: Acl { router: *R0, rule: AclRule::deny(*R0, *R2), position: None },
    };
    assert_eq!(net.apply_modifier(&m), Err(NetworkError::ConfigError(ConfigError::InvalidUpdate(m.clone()))));

    // duplicate ACL rule
    let m = Append(Acl { router: *R0, rule: AclRule::permit(*R0, *R2), position: None });
    assert_eq!(
        net.apply_modifier(&m),
        Err(NetworkError::DeviceError(DeviceError::AclRuleExists(AclRule::permit(*R0, *R2))))
    );

    // invalid link weight
    let m = Append(IgpLinkWeight { a: *R0, b: *R2, weight: -1.0 });
    assert_eq!(net.apply_modifier(&m), Err(NetworkError::ConfigError(ConfigError::InvalidLinkWeight(m.clone()))));

    // unknown router
    let m = Append(static_route(9.into(), *R2, *R1));
    assert_eq!(net.apply_modifier(&m), Err(NetworkError::DeviceNotFound(9.into())));

    assert_eq!(net.route_packet(*R0, *R2).unwrap(), before);
    assert!(!net.get_topology().has_link(*R0, *R2));
}

#[test]
fn test_apply_config_rollback() {
    let mut net = get_test_net();
    let result = net.apply_config(&[
        Append(static_route(*R1, *R3, *R0)),
        Append(static_route(*R0, *R2, *R2)),
    ]);
    assert!(result.is_err());
    assert_eq!(edges(&net, *R1, *R3), vec![(*R1, *R3)]);
    assert!(!net.get_router(*R1).unwrap().is_static(*R3));

    net.apply_config(&[Append(static_route(*R1, *R3, *R0)), Append(static_route(*R0, *R3, *R3))])
        .unwrap();
    assert_eq!(edges(&net, *R1, *R3), vec![(*R1, *R0), (*R0, *R3)]);
}

#[test]
fn test_link_weights() {
    let mut net = get_test_net();
    net.apply_modifier(&Append(IgpLinkWeight { a: *R0, b: *R2, weight: 1.0 })).unwrap();
    assert_eq!(edges(&net, *R0, *R2), vec![(*R0, *R2)]);
    assert_eq!(net.get_router(*R2).unwrap().graph().link_weight(*R0, *R2), Some(1.0));

    net.apply_modifier(&Update {
        from: IgpLinkWeight { a: *R2, b: *R0, weight: 1.0 },
        to: IgpLinkWeight { a: *R2, b: *R0, weight: 5.0 },
    })
    .unwrap();
    assert_eq!(edges(&net, *R0, *R2), vec![(*R0, *R1), (*R1, *R2)]);

    net.apply_modifier(&Remove(IgpLinkWeight { a: *R0, b: *R2, weight: 5.0 })).unwrap();
    assert!(!net.get_topology().has_link(*R0, *R2));
    assert!(!net.get_router(*R3).unwrap().graph().has_link(*R0, *R2));

    // equal cost paths: lower id wins
    net.update_link_cost(*R1, *R3, 0.0).unwrap();
    assert_eq!(edges(&net, *R1, *R3), vec![(*R1, *R0), (*R0, *R3)]);
    assert_eq!(net.update_link_cost(*R1, 9.into(), 1.0), Err(NetworkError::DeviceNotFound(9.into())));
}

#[test]
fn test_dead_router() {
    let topology = hashmap! {
        *R0 => hashmap! { *R1 => 1.0 },
        *R1 => hashmap! { *R0 => 1.0, *R2 => 1.0 },
        *R2 => hashmap! { *R1 => 1.0 },
    };
    let routers = hashmap! {
        *R0 => RouterConfig::ordinary("r0", vec![]),
        *R1 => RouterConfig::ordinary("r1", vec![]),
    };
    let mut net = Network::new(&topology, &routers).unwrap();
    for router in [*R0, *R1].iter() {
        net.apply_modifier(&Append(Acl { router: *router, rule: AclRule::permit(*R0, *R2), position: None }))
            .unwrap();
    }
    let trace = net.route_packet(*R0, *R2).unwrap();
    assert_eq!(trace.edges, vec![(*R0, *R1), (*R1, *R2)]);
    assert_eq!(trace.outcome, Termination::DeadRouter(*R2));
    assert_eq!(net.route_packet(*R2, *R0), Err(NetworkError::DeviceNotFound(*R2)));
}

#[test]
fn test_helpers() {
    let net = get_test_net();
    assert_eq!(net.get_routers(), vec![*R0, *R1, *R2, *R3]);
    assert_eq!(net.get_router_name(*R2), Ok("r2"));
    assert_eq!(net.get_router_id("r7"), Err(NetworkError::DeviceNameNotFound("r7".to_string())));
    assert_eq!(net.get_topology().neighbors(*R1), vec![*R0, *R2, *R3]);
    assert_eq!(
        printer::path(&net, &net.route_packet(*R0, *R2).unwrap().path).unwrap(),
        "r0 => r1 => r2"
    );
    assert_eq!(
        printer::destination(&net, Destination::Router(*R3)).unwrap(),
        "r3"
    );
    let table = printer::routing_table(&net, net.get_router(*R0).unwrap()).unwrap();
    assert_eq!(table, vec!["  r0 -> local", "  r1 -> r1", "  r2 -> r1", "  r3 -> r3"]);
    assert_eq!(
        printer::config_modifier(&net, &ConfigModifier::Append(static_route(*R1, *R3, *R0))).unwrap(),
        "Append: Static Route on r1: r3 via r0"
    );
}

#[test]
fn test_result_independent_of_log_level() {
    // all log arguments are evaluated
    log::set_max_level(log::LevelFilter::Trace);
    let mut net = get_test_net();
    let unknown: RouterId = 9.into();
    let modifier = Append(Acl { router: *R0, rule: AclRule::permit(unknown, *R3), position: None });
    assert_eq!(net.apply_modifier(&modifier), Ok(()));
    assert!(net.get_router(*R0).unwrap().check_acl(unknown, *R3));
    assert!(net.route_packet(*R0, *R3).unwrap().reached());
}
