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

//! # ReflectorNet

use super::{permit_all, ExampleNetwork};
use crate::hard_policies::Policy;
use crate::netsim::config::{ConfigExpr::*, ConfigModifier, RouterConfig};
use crate::netsim::{Network, Prefix, RouterId};

use maplit::hashmap;

/// # ReflectorNet
///
/// Two border routers `b0` and `b1` both learn `Prefix(0)` over eBGP. They advertise it to the
/// two route reflectors `rr2` and `rr3`, which reflect it to the clients `c4` and `c5`. All links
/// have weight 1, and every router permits all traffic.
///
/// ```text
///  b0        b1
///  |         |
///  rr2 ---- rr3
///  |         |
///  c4 ----- c5
/// ```
///
/// The modifier raises the weight of the link `b0 - rr2` to 10, such that all routers leave the
/// network through `b1`.
pub struct ReflectorNet {}

impl ExampleNetwork for ReflectorNet {
    fn net() -> Network {
        let r: Vec<RouterId> = (0..6).map(|i: u32| i.into()).collect();
        let topology = hashmap! {
            r[0] => hashmap! { r[2] => 1.0 },
            r[1] => hashmap! { r[3] => 1.0 },
            r[2] => hashmap! { r[0] => 1.0, r[3] => 1.0, r[4] => 1.0 },
            r[3] => hashmap! { r[1] => 1.0, r[2] => 1.0, r[5] => 1.0 },
            r[4] => hashmap! { r[2] => 1.0, r[5] => 1.0 },
            r[5] => hashmap! { r[3] => 1.0, r[4] => 1.0 },
        };
        let routers = hashmap! {
            r[0] => RouterConfig::border("b0", vec![], vec![r[2], r[3]]),
            r[1] => RouterConfig::border("b1", vec![], vec![r[2], r[3]]),
            r[2] => RouterConfig::reflector("rr2", vec![r[0], r[1]], vec![r[4], r[5]]),
            r[3] => RouterConfig::reflector("rr3", vec![r[0], r[1]], vec![r[4], r[5]]),
            r[4] => RouterConfig::ordinary("c4", vec![r[2], r[3]]),
            r[5] => RouterConfig::ordinary("c5", vec![r[2], r[3]]),
        };
        let mut net = Network::new(&topology, &routers).unwrap();
        let acl = permit_all(&net, &[Prefix(0)]);
        net.apply_config(&acl).unwrap();
        net.insert_ebgp(Prefix(0), r[0]).unwrap();
        net.insert_ebgp(Prefix(0), r[1]).unwrap();
        net
    }

    /// `Update(IgpLinkWeight(b0 - rr2): 1 -> 10)`
    fn modifiers(net: &Network) -> Vec<ConfigModifier> {
        let b0 = net.get_router_id("b0").unwrap();
        let rr2 = net.get_router_id("rr2").unwrap();
        vec![ConfigModifier::Update {
            from: IgpLinkWeight { a: b0, b: rr2, weight: 1.0 },
            to: IgpLinkWeight { a: b0, b: rr2, weight: 10.0 },
        }]
    }

    /// Both clients must reach `Prefix(0)`.
    fn get_policy(net: &Network) -> Vec<Policy> {
        let c4 = net.get_router_id("c4").unwrap();
        let c5 = net.get_router_id("c5").unwrap();
        vec![
            Policy::Reachability(c4, Prefix(0).into()),
            Policy::Reachability(c5, Prefix(0).into()),
        ]
    }
}
