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

//! # Network Configuration
//! This module represents the network configuration. There are several different structs in this
//! module. Here is an overview:
//!
//! - [`RouterConfig`]: Static description of a router (name, iBGP role and sessions), used to
//!   build the [`Network`](crate::netsim::Network).
//! - [`ConfigExpr`]: Single configuration expression (line in a router configuration).
//! - [`ConfigModifier`]: A modification of a single [`ConfigExpr`]. A modification can either be
//!   an append of a new expression, a removal of an existing expression, or an update of an
//!   existing expression.
//!
//! # Example Usage
//!
//! ```rust
//! use netsynth::netsim::acl::AclRule;
//! use netsynth::netsim::config::{ConfigExpr, ConfigModifier};
//! use netsynth::netsim::Destination;
//!
//! let r0 = 0.into();
//! let r1 = 1.into();
//! let r3 = 3.into();
//!
//! // route traffic towards r3 via r0
//! let add = ConfigModifier::Append(ConfigExpr::StaticRoute {
//!     router: r1,
//!     dst: Destination::Router(r3),
//!     next_hop: r0,
//! });
//! assert_eq!(add.router(), r1);
//!
//! // drop the traffic from r1 to r3
//! let remove = ConfigModifier::Remove(ConfigExpr::Acl {
//!     router: r0,
//!     rule: AclRule::permit(r1, r3),
//!     position: None,
//! });
//! assert!(!add.key_eq(&remove));
//! ```

use crate::netsim::acl::AclRule;
use crate::netsim::bgp::RouterRole;
use crate::netsim::{Destination, LinkWeight, RouterId};

/// Static configuration of a router, used when building the network.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterConfig {
    /// Name of the router
    pub name: String,
    /// iBGP role of the router
    pub role: RouterRole,
    /// Routers sending advertisements to this router
    pub servers: Vec<RouterId>,
    /// Routers receiving advertisements from this router
    pub clients: Vec<RouterId>,
}

impl RouterConfig {
    /// Ordinary router, receiving routes from the given servers
    pub fn ordinary(name: impl Into<String>, servers: Vec<RouterId>) -> Self {
        Self { name: name.into(), role: RouterRole::Ordinary, servers, clients: Vec::new() }
    }

    /// Route reflector
    pub fn reflector(
        name: impl Into<String>,
        servers: Vec<RouterId>,
        clients: Vec<RouterId>,
    ) -> Self {
        Self { name: name.into(), role: RouterRole::Reflector, servers, clients }
    }

    /// Border router
    pub fn border(name: impl Into<String>, servers: Vec<RouterId>, clients: Vec<RouterId>) -> Self {
        Self { name: name.into(), role: RouterRole::Border, servers, clients }
    }
}

/// # Single configuration expression
/// Every expression lives on a single router, except the link weight, which is configured on the
/// entire network.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigExpr {
    /// ACL rule on a router
    Acl {
        /// Router on which the rule is installed
        router: RouterId,
        /// The rule itself
        rule: AclRule,
        /// Position at which the rule is inserted when appended. `None` appends at the end.
        position: Option<usize>,
    },
    /// Static route on a router
    StaticRoute {
        /// Router on which the static route is installed
        router: RouterId,
        /// Destination of the route
        dst: Destination,
        /// Next hop, which must be a direct neighbor of `router`
        next_hop: RouterId,
    },
    /// IGP link weight, applied on every router
    IgpLinkWeight {
        /// First endpoint of the link
        a: RouterId,
        /// Second endpoint of the link
        b: RouterId,
        /// Weight of the link
        weight: LinkWeight,
    },
}

/// Key identifying the configuration item addressed by an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigExprKey {
    /// ACL rule (the position is not part of the key)
    Acl {
        /// Router of the rule
        router: RouterId,
        /// The rule
        rule: AclRule,
    },
    /// Static route for a destination on a router
    StaticRoute {
        /// Router of the static route
        router: RouterId,
        /// Destination of the route
        dst: Destination,
    },
    /// Link between two routers, with the lower id first
    IgpLinkWeight {
        /// Lower endpoint
        a: RouterId,
        /// Higher endpoint
        b: RouterId,
    },
}

impl ConfigExpr {
    /// Returns the router on which this expression is applied. For link weights, this is the
    /// first endpoint.
    pub fn router(&self) -> RouterId {
        match self {
            Self::Acl { router, .. } => *router,
            Self::StaticRoute { router, .. } => *router,
            Self::IgpLinkWeight { a, .. } => *a,
        }
    }

    /// Returns the key of the expression. Two expressions with the same key address the same
    /// configuration item.
    pub fn key(&self) -> ConfigExprKey {
        match self {
            Self::Acl { router, rule, .. } => ConfigExprKey::Acl { router: *router, rule: *rule },
            Self::StaticRoute { router, dst, .. } => {
                ConfigExprKey::StaticRoute { router: *router, dst: *dst }
            }
            Self::IgpLinkWeight { a, b, .. } if a <= b => {
                ConfigExprKey::IgpLinkWeight { a: *a, b: *b }
            }
            Self::IgpLinkWeight { a, b, .. } => ConfigExprKey::IgpLinkWeight { a: *b, b: *a },
        }
    }
}

/// # Config Modifier
/// A single edit, applied on the running network.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigModifier {
    /// Append a new expression
    Append(ConfigExpr),
    /// Remove an existing expression
    Remove(ConfigExpr),
    /// Replace an existing expression
    Update {
        /// Expression currently installed
        from: ConfigExpr,
        /// New expression, which replaces the `from` expression.
        to: ConfigExpr,
    },
}

impl ConfigModifier {
    /// Returns the router on which this modifier is applied.
    pub fn router(&self) -> RouterId {
        self.expr().router()
    }

    /// Returns the (new) expression of the modifier.
    pub fn expr(&self) -> &ConfigExpr {
        match self {
            Self::Append(e) => e,
            Self::Remove(e) => e,
            Self::Update { to, .. } => to,
        }
    }

    /// Returns true if both modifiers address the same configuration item.
    pub fn key_eq(&self, other: &Self) -> bool {
        self.expr().key() == other.expr().key()
    }

    /// Returns true if the modifier installs or changes a static route.
    pub fn is_static_route(&self) -> bool {
        matches!(self.expr(), ConfigExpr::StaticRoute { .. })
    }

    /// Reverses the modifier. An append becomes a remove, and vice versa. An update updates from
    /// the new one to the old one.
    pub fn reverse(self) -> Self {
        match self {
            Self::Append(e) => Self::Remove(e),
            Self::Remove(e) => Self::Append(e),
            Self::Update { from, to } => Self::Update { from: to, to: from },
        }
    }
}
