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

//! # Helper (printer) functions for the Network
//! Module containing helper functions to get formatted strings and print information about the
//! network.

use crate::netsim::bgp::{Advertisement, BgpEvent};
use crate::netsim::config::{ConfigExpr, ConfigModifier};
use crate::netsim::event::Event;
use crate::netsim::network::Network;
use crate::netsim::router::Router;
use crate::netsim::{Destination, NetworkError, RouterId};
use itertools::Itertools;

/// Returns the name of a router, or the prefix number.
pub fn destination(net: &Network, dst: Destination) -> Result<String, NetworkError> {
    Ok(match dst {
        Destination::Router(r) => net.get_router_name(r)?.to_string(),
        Destination::Prefix(p) => format!("prefix {}", p.0),
    })
}

/// Returns the path as a string, with all router names inserted, like `r0 => r1 => r2`.
pub fn path(net: &Network, path: &[RouterId]) -> Result<String, NetworkError> {
    Ok(path.iter().map(|r| net.get_router_name(*r)).collect::<Result<Vec<_>, _>>()?.join(" => "))
}

/// Get a vector of strings, which represent the routing table of the router, ordered by the
/// destination. Local destinations are shown with `local`.
pub fn routing_table(net: &Network, router: &Router) -> Result<Vec<String>, NetworkError> {
    let mut result = Vec::new();
    for (dst, next_hop) in router.get_routing_table().iter().sorted_by_key(|(dst, _)| **dst) {
        let marker = if router.is_static(*dst) { "S" } else { " " };
        let nh = match next_hop {
            Some(nh) => net.get_router_name(*nh)?.to_string(),
            None => String::from("local"),
        };
        result.push(format!("{} {} -> {}", marker, destination(net, *dst)?, nh));
    }
    Ok(result)
}

/// Returns a formatted string for a given advertisement.
pub fn advertisement(net: &Network, ad: &Advertisement) -> Result<String, NetworkError> {
    Ok(format!(
        "prefixes: {:?}, gate: {}, advertiser: {}",
        ad.dest.iter().map(|p| p.0).collect::<Vec<_>>(),
        net.get_router_name(ad.gate)?,
        net.get_router_name(ad.advertiser)?
    ))
}

/// Return a formatted string for a given event
pub fn event(net: &Network, event: &Event) -> Result<String, NetworkError> {
    Ok(match event {
        Event::Bgp(from, to, BgpEvent::Update(ad)) => format!(
            "BGP Event: {} -> {}: Update [{}]",
            net.get_router_name(*from)?,
            net.get_router_name(*to)?,
            advertisement(net, ad)?
        ),
        Event::Bgp(from, to, BgpEvent::Withdraw(_)) => format!(
            "BGP Event: {} -> {}: Withdraw prefixes {:?}",
            net.get_router_name(*from)?,
            net.get_router_name(*to)?,
            event.prefixes().iter().map(|p| p.0).collect::<Vec<_>>()
        ),
    })
}

/// Returns the config expr as a string, where all router names are inserted.
pub fn config_expr(net: &Network, expr: &ConfigExpr) -> Result<String, NetworkError> {
    Ok(match expr {
        ConfigExpr::Acl { router, rule, position } => format!(
            "ACL on {}: {} {} -> {}{}",
            net.get_router_name(*router)?,
            if rule.permit { "permit" } else { "deny" },
            net.get_router_name(rule.src)?,
            destination(net, rule.dst)?,
            position.map(|p| format!(" at {}", p)).unwrap_or_default()
        ),
        ConfigExpr::StaticRoute { router, dst, next_hop } => format!(
            "Static Route on {}: {} via {}",
            net.get_router_name(*router)?,
            destination(net, *dst)?,
            net.get_router_name(*next_hop)?
        ),
        ConfigExpr::IgpLinkWeight { a, b, weight } => format!(
            "IGP Link Weight: {} -- {}: {}",
            net.get_router_name(*a)?,
            net.get_router_name(*b)?,
            weight
        ),
    })
}

/// Returns the config modifier as a string, where all router names are inserted.
pub fn config_modifier(net: &Network, modifier: &ConfigModifier) -> Result<String, NetworkError> {
    Ok(match modifier {
        ConfigModifier::Append(e) => format!("Append: {}", config_expr(net, e)?),
        ConfigModifier::Remove(e) => format!("Remove: {}", config_expr(net, e)?),
        ConfigModifier::Update { from: a, to: b } => {
            format!("Modify: {} --> {}", config_expr(net, a)?, config_expr(net, b)?)
        }
    })
}
