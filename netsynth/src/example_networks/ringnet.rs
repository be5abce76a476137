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

//! # RingNet

use super::{permit_all, ExampleNetwork};
use crate::hard_policies::Policy;
use crate::netsim::acl::AclRule;
use crate::netsim::config::{ConfigExpr::*, ConfigModifier, RouterConfig};
use crate::netsim::{Destination, Network, RouterId};

use maplit::hashmap;

/// # RingNet
///
/// Four routers, connected as a ring `r0 - r1 - r2 - r3 - r0`, with an additional link
/// `r1 - r3`. All links have weight 1, and every router permits all traffic.
///
/// ```text
///  r0 ---- r1
///  |     /  |
///  |   /    |
///  r3 ---- r2
/// ```
///
/// The modifiers redirect the traffic from `r1` to `r3` over `r2`, and deny this traffic on `r2`.
pub struct RingNet {}

impl ExampleNetwork for RingNet {
    fn net() -> Network {
        let r: Vec<RouterId> = (0..4).map(|i: u32| i.into()).collect();
        let topology = hashmap! {
            r[0] => hashmap! { r[1] => 1.0, r[3] => 1.0 },
            r[1] => hashmap! { r[0] => 1.0, r[2] => 1.0, r[3] => 1.0 },
            r[2] => hashmap! { r[1] => 1.0, r[3] => 1.0 },
            r[3] => hashmap! { r[0] => 1.0, r[1] => 1.0, r[2] => 1.0 },
        };
        let routers = r
            .iter()
            .map(|id| (*id, RouterConfig::ordinary(format!("r{}", id.index()), vec![])))
            .collect();
        let mut net = Network::new(&topology, &routers).unwrap();
        let acl = permit_all(&net, &[]);
        net.apply_config(&acl).unwrap();
        net
    }

    /// - `Append(StaticRoute(r3 via r2))` on `r1`
    /// - `Remove(Acl(permit r1 -> r3))` on `r2`
    fn modifiers(net: &Network) -> Vec<ConfigModifier> {
        let r1 = net.get_router_id("r1").unwrap();
        let r2 = net.get_router_id("r2").unwrap();
        let r3 = net.get_router_id("r3").unwrap();
        vec![
            ConfigModifier::Append(StaticRoute { router: r1, dst: r3.into(), next_hop: r2 }),
            ConfigModifier::Remove(Acl { router: r2, rule: AclRule::permit(r1, r3), position: None }),
        ]
    }

    /// `r0` and `r2` must reach `r3`.
    fn get_policy(net: &Network) -> Vec<Policy> {
        let r0 = net.get_router_id("r0").unwrap();
        let r2 = net.get_router_id("r2").unwrap();
        let r3 = net.get_router_id("r3").unwrap();
        vec![
            Policy::Reachability(r0, Destination::Router(r3)),
            Policy::Reachability(r2, Destination::Router(r3)),
        ]
    }
}
