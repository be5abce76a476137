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

//! # LadderNet

use super::{permit_all, ExampleNetwork};
use crate::hard_policies::Policy;
use crate::netsim::config::{ConfigExpr::*, ConfigModifier, RouterConfig};
use crate::netsim::{Destination, Network, RouterId};

use maplit::hashmap;

/// # LadderNet
///
/// Six routers with unit link weights. Every router permits all traffic. Initially, the traffic
/// from `r5` to `r1` follows `r5 -> r3 -> r2 -> r1`, enforced by static routes on `r3` and `r2`.
///
/// ```text
///       r0
///     /    \
///   r1 ---- r2
///   | \    / |
///   |  \  /  |
///   |   \/   |
///   |   /\   |
///   |  /  \  |
///   r3 ---- r4
///     \    /
///       r5
/// ```
///
/// After reconfiguration, the traffic follows `r5 -> r3 -> r4 -> r2 -> r0 -> r1`. The new path
/// contains two zones: `{r4}` behind `r3`, and `{r0}` behind `r2`.
pub struct LadderNet {}

impl ExampleNetwork for LadderNet {
    fn net() -> Network {
        let r: Vec<RouterId> = (0..6).map(|i: u32| i.into()).collect();
        let topology = hashmap! {
            r[0] => hashmap! { r[1] => 1.0, r[2] => 1.0 },
            r[1] => hashmap! { r[0] => 1.0, r[2] => 1.0, r[3] => 1.0, r[4] => 1.0 },
            r[2] => hashmap! { r[0] => 1.0, r[1] => 1.0, r[3] => 1.0, r[4] => 1.0 },
            r[3] => hashmap! { r[1] => 1.0, r[2] => 1.0, r[4] => 1.0, r[5] => 1.0 },
            r[4] => hashmap! { r[1] => 1.0, r[2] => 1.0, r[3] => 1.0, r[5] => 1.0 },
            r[5] => hashmap! { r[3] => 1.0, r[4] => 1.0 },
        };
        let routers = r
            .iter()
            .map(|id| (*id, RouterConfig::ordinary(format!("r{}", id.index()), vec![])))
            .collect();
        let mut net = Network::new(&topology, &routers).unwrap();
        let mut config = permit_all(&net, &[]);
        config.push(ConfigModifier::Append(StaticRoute { router: r[3], dst: r[1].into(), next_hop: r[2] }));
        config.push(ConfigModifier::Append(StaticRoute { router: r[2], dst: r[1].into(), next_hop: r[1] }));
        net.apply_config(&config).unwrap();
        net
    }

    /// 0. `Update(StaticRoute(r1 via r2) -> StaticRoute(r1 via r4))` on `r3`
    /// 1. `Append(StaticRoute(r1 via r2))` on `r4`
    /// 2. `Update(StaticRoute(r1 via r1) -> StaticRoute(r1 via r0))` on `r2`
    /// 3. `Append(StaticRoute(r1 via r1))` on `r0`
    fn modifiers(net: &Network) -> Vec<ConfigModifier> {
        let r0 = net.get_router_id("r0").unwrap();
        let r1 = net.get_router_id("r1").unwrap();
        let r2 = net.get_router_id("r2").unwrap();
        let r3 = net.get_router_id("r3").unwrap();
        let r4 = net.get_router_id("r4").unwrap();
        let dst: Destination = r1.into();
        vec![
            ConfigModifier::Update {
                from: StaticRoute { router: r3, dst, next_hop: r2 },
                to: StaticRoute { router: r3, dst, next_hop: r4 },
            },
            ConfigModifier::Append(StaticRoute { router: r4, dst, next_hop: r2 }),
            ConfigModifier::Update {
                from: StaticRoute { router: r2, dst, next_hop: r1 },
                to: StaticRoute { router: r2, dst, next_hop: r0 },
            },
            ConfigModifier::Append(StaticRoute { router: r0, dst, next_hop: r1 }),
        ]
    }

    /// `r5` must reach `r1`.
    fn get_policy(net: &Network) -> Vec<Policy> {
        let r1 = net.get_router_id("r1").unwrap();
        let r5 = net.get_router_id("r5").unwrap();
        vec![Policy::Reachability(r5, r1.into())]
    }
}
