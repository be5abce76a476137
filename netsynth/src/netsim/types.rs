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

//! Module containing all type definitions

use crate::netsim::bgp::RouterRole;
use crate::netsim::config::ConfigModifier;
use petgraph::prelude::*;
use std::fmt;
use thiserror::Error;

type IndexType = u32;
/// Router Identification
pub type RouterId = NodeIndex<IndexType>;
/// IP Prefix (simple representation), learned from outside of the network
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct Prefix(pub u32);
/// Link Weight for the IGP graph. A weight of `0.0` means that the link does not exist.
pub type LinkWeight = f32;

/// Destination of a packet, an ACL rule or a routing table entry. Routers and external prefixes
/// live in separate namespaces.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub enum Destination {
    /// Router inside the network
    Router(RouterId),
    /// Prefix learned via eBGP
    Prefix(Prefix),
}

impl Destination {
    /// Returns the router id, if the destination is a router.
    pub fn router(&self) -> Option<RouterId> {
        match self {
            Self::Router(r) => Some(*r),
            Self::Prefix(_) => None,
        }
    }

    /// Returns the prefix, if the destination is an external prefix.
    pub fn prefix(&self) -> Option<Prefix> {
        match self {
            Self::Router(_) => None,
            Self::Prefix(p) => Some(*p),
        }
    }
}

impl From<RouterId> for Destination {
    fn from(r: RouterId) -> Self {
        Self::Router(r)
    }
}

impl From<Prefix> for Destination {
    fn from(p: Prefix) -> Self {
        Self::Prefix(p)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Router(r) => write!(f, "r{}", r.index()),
            Self::Prefix(p) => write!(f, "prefix {}", p.0),
        }
    }
}

/// Configuration Error
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// The stated prior value of an `Update` or `Remove` does not match the installed state
    #[error("The ConfigModifier does not match the current configuration: {0:?}")]
    ConfigMismatch(ConfigModifier),
    /// The `from` and `to` expression of an `Update` do not address the same configuration item
    #[error("The ConfigModifier updates two different expressions: {0:?}")]
    InvalidUpdate(ConfigModifier),
    /// The new link weight is not a positive, finite number
    #[error("The ConfigModifier sets an invalid link weight: {0:?}")]
    InvalidLinkWeight(ConfigModifier),
}

/// Router Errors
#[derive(Error, Debug, PartialEq)]
pub enum DeviceError {
    /// The exact same ACL rule is already installed
    #[error("ACL rule {0:?} already exists")]
    AclRuleExists(crate::netsim::acl::AclRule),
    /// The ACL rule to remove is not installed
    #[error("ACL rule {0:?} does not exist")]
    NoAclRule(crate::netsim::acl::AclRule),
    /// A static route can only be installed for a destination in static mode, pointing to a
    /// direct neighbor.
    #[error("Cannot install static route for {0} via {1:?}")]
    StaticRouteConflict(Destination, RouterId),
    /// No static route is installed for the destination
    #[error("Static route for {0} does not yet exist")]
    NoStaticRoute(Destination),
    /// There is no iBGP session with the peer
    #[error("BGP Session with {0:?} is not yet created!")]
    UnknownPeer(RouterId),
    /// BGP session is already established
    #[error("BGP Session with {0:?} is already created!")]
    SessionAlreadyExists(RouterId),
    /// The border router does not originate the prefix
    #[error("Router does not originate {0:?}")]
    UnknownPrefix(Prefix),
    /// Only border routers can originate eBGP prefixes
    #[error("Router {0:?} is not a border router")]
    NotABorderRouter(RouterId),
    /// The shortest paths were never computed on this graph
    #[error("Shortest paths are not yet computed")]
    IgpNotComputed,
    /// Router was not found in the IGP topology
    #[error("Router {0:?} is not known in the IGP topology")]
    RouterNotFound(RouterId),
}

/// Network Errors
#[derive(Error, Debug, PartialEq)]
pub enum NetworkError {
    /// Device Error which cannot be handled
    #[error("Device Error: {0}")]
    DeviceError(#[from] DeviceError),
    /// Configuration error
    #[error("Configuration Error: {0}")]
    ConfigError(#[from] ConfigError),
    /// Device is not present in the topology
    #[error("Network device was not found in topology: {0:?}")]
    DeviceNotFound(RouterId),
    /// Device name is not present in the topology
    #[error("Network device name was not found in topology: {0}")]
    DeviceNameNotFound(String),
    /// The initial adjacency lists a link with two different costs
    #[error("Link {0:?} -- {1:?} has different costs in each direction")]
    AsymmetricLink(RouterId, RouterId),
    /// The role of the router does not allow the requested session
    #[error("Router {0:?} with role {1:?} cannot serve iBGP clients")]
    InvalidSessionRole(RouterId, RouterRole),
    /// Convergence Problem
    #[error("Network cannot converge in the given time!")]
    NoConvergence,
}
