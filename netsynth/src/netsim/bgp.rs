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

//! Module containing definitions for iBGP

use crate::netsim::{Prefix, RouterId};

/// Role of a router in the iBGP topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterRole {
    /// Only receives routes from its servers (route reflectors).
    Ordinary,
    /// Route reflector. Receives routes from its servers, and reflects them to its clients.
    Reflector,
    /// Border router. Originates the prefixes learned via eBGP and sends them to its clients.
    Border,
}

impl RouterRole {
    /// Returns true if the role allows the router to have iBGP clients.
    pub fn can_serve(&self) -> bool {
        matches!(self, Self::Reflector | Self::Border)
    }
}

/// iBGP advertisement: all prefixes in `dest` can leave the network at `gate`. The message was
/// sent by `advertiser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    /// Advertised prefixes
    pub dest: Vec<Prefix>,
    /// Border router at which the traffic leaves the network
    pub gate: RouterId,
    /// Router that sent this advertisement
    pub advertiser: RouterId,
}

/// BGP Events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BgpEvent {
    /// Prefixes are reachable via the given gate.
    Update(Advertisement),
    /// Prefixes are no longer reachable via the sender.
    Withdraw(Vec<Prefix>),
}

/// Stored advertisement for a single prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdEntry {
    /// Egress router
    pub gate: RouterId,
    /// Router from which the advertisement was received
    pub advertiser: RouterId,
}

/// iBGP sessions of a single router. `servers` send routes to this router, `clients` receive
/// routes from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BgpSessions {
    servers: Vec<RouterId>,
    clients: Vec<RouterId>,
}

impl BgpSessions {
    /// Create the sessions, dropping duplicate entries.
    pub fn new(servers: &[RouterId], clients: &[RouterId]) -> Self {
        let mut s = Self::default();
        servers.iter().for_each(|r| {
            s.add_server(*r);
        });
        clients.iter().for_each(|r| {
            s.add_client(*r);
        });
        s
    }

    /// Routers from which this router receives advertisements
    pub fn servers(&self) -> &[RouterId] {
        &self.servers
    }

    /// Routers to which this router sends advertisements
    pub fn clients(&self) -> &[RouterId] {
        &self.clients
    }

    /// Returns true if `router` is a server of this router.
    pub fn is_server(&self, router: RouterId) -> bool {
        self.servers.contains(&router)
    }

    /// Returns true if `router` is a client of this router.
    pub fn is_client(&self, router: RouterId) -> bool {
        self.clients.contains(&router)
    }

    pub(crate) fn add_server(&mut self, router: RouterId) -> bool {
        if self.is_server(router) {
            false
        } else {
            self.servers.push(router);
            true
        }
    }

    pub(crate) fn add_client(&mut self, router: RouterId) -> bool {
        if self.is_client(router) {
            false
        } else {
            self.clients.push(router);
            true
        }
    }

    pub(crate) fn remove_server(&mut self, router: RouterId) -> bool {
        let len = self.servers.len();
        self.servers.retain(|r| *r != router);
        len != self.servers.len()
    }

    pub(crate) fn remove_client(&mut self, router: RouterId) -> bool {
        let len = self.clients.len();
        self.clients.retain(|r| *r != router);
        len != self.clients.len()
    }
}
