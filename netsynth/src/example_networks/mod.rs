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

//! # Example Networks
//!
//! Prepared networks, together with a set of modifiers and the policies which must hold while the
//! modifiers are applied.

use crate::hard_policies::Policy;
use crate::netsim::acl::AclRule;
use crate::netsim::config::{ConfigExpr, ConfigModifier};
use crate::netsim::{Destination, Network, Prefix};

use itertools::iproduct;

mod ringnet;
pub use ringnet::RingNet;

mod laddernet;
pub use laddernet::LadderNet;

mod reflectornet;
pub use reflectornet::ReflectorNet;

/// Trait for easier access to example networks.
pub trait ExampleNetwork {
    /// Get the network in its initial state.
    fn net() -> Network;
    /// Get the modifiers which transform the initial state into the final state.
    fn modifiers(net: &Network) -> Vec<ConfigModifier>;
    /// Get the hard policies.
    fn get_policy(net: &Network) -> Vec<Policy>;
}

/// Modifiers installing ACL rules on every router, permitting traffic from all routers towards all
/// routers and towards the given prefixes.
pub fn permit_all(net: &Network, prefixes: &[Prefix]) -> Vec<ConfigModifier> {
    let routers = net.get_routers();
    let destinations: Vec<Destination> = routers
        .iter()
        .map(|r| Destination::Router(*r))
        .chain(prefixes.iter().map(|p| Destination::Prefix(*p)))
        .collect();
    iproduct!(routers.iter(), routers.iter(), destinations.iter())
        .map(|(router, src, dst)| {
            ConfigModifier::Append(ConfigExpr::Acl {
                router: *router,
                rule: AclRule::permit(*src, *dst),
                position: None,
            })
        })
        .collect()
}
