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

#![deny(missing_docs, missing_debug_implementations)]

//! # NetSim
//!
//! This is a library for simulating the data plane of a single network, configured with static
//! routes, ACLs, IGP link weights and iBGP route reflection.
//!
//! ## Example usage
//!
//! The following example generates a ring of four routers, where every router permits all
//! traffic. Then, a static route forces the traffic from `r1` to `r3` over `r0`.
//!
//! ```rust
//! use netsynth::netsim::{Network, Destination, RouterId};
//! use netsynth::netsim::acl::AclRule;
//! use netsynth::netsim::config::{ConfigExpr, ConfigModifier, RouterConfig};
//! use maplit::hashmap;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let r: Vec<RouterId> = (0..4).map(|i| i.into()).collect();
//!     let topology = hashmap! {
//!         r[0] => hashmap! { r[1] => 1.0, r[3] => 1.0 },
//!         r[1] => hashmap! { r[0] => 1.0, r[2] => 1.0, r[3] => 1.0 },
//!         r[2] => hashmap! { r[1] => 1.0, r[3] => 1.0 },
//!         r[3] => hashmap! { r[0] => 1.0, r[1] => 1.0, r[2] => 1.0 },
//!     };
//!     let routers = r
//!         .iter()
//!         .map(|id| (*id, RouterConfig::ordinary(format!("r{}", id.index()), vec![])))
//!         .collect();
//!     let mut net = Network::new(&topology, &routers)?;
//!
//!     // permit all traffic
//!     for router in r.iter() {
//!         for src in r.iter() {
//!             for dst in r.iter() {
//!                 net.apply_modifier(&ConfigModifier::Append(ConfigExpr::Acl {
//!                     router: *router,
//!                     rule: AclRule::permit(*src, *dst),
//!                     position: None,
//!                 }))?;
//!             }
//!         }
//!     }
//!     assert_eq!(net.route_packet(r[1], r[3])?.edges, vec![(r[1], r[3])]);
//!
//!     net.apply_modifier(&ConfigModifier::Append(ConfigExpr::StaticRoute {
//!         router: r[1],
//!         dst: Destination::Router(r[3]),
//!         next_hop: r[0],
//!     }))?;
//!     assert_eq!(net.route_packet(r[1], r[3])?.edges, vec![(r[1], r[0]), (r[0], r[3])]);
//!
//!     Ok(())
//! }
//! ```

pub mod acl;
pub mod bgp;
pub mod config;
pub mod event;
pub mod network;
pub mod packet;
pub mod printer;
pub mod router;
pub mod topology;
mod types;

pub use bgp::RouterRole;
pub use event::Event;
pub use network::{Network, PacketTrace};
pub use packet::{Packet, Termination};
pub use types::{
    ConfigError, Destination, DeviceError, LinkWeight, NetworkError, Prefix, RouterId,
};
