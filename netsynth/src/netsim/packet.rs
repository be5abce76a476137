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

//! # Packets
//!
//! A packet travels hop by hop through the network. Each router it visits stamps its id onto the
//! packet. Once a router decides that the packet cannot (or must not) travel further, the packet
//! is terminated, and the reason is recorded.

use crate::netsim::{Destination, RouterId};
use std::fmt;

/// Initial time to live of every packet.
pub const DEFAULT_TTL: u8 = 16;

/// Reason why a packet stopped travelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The packet arrived at the destination router.
    Delivered,
    /// The ACL of the router dropped the packet.
    AclDenied(RouterId),
    /// The router has no route towards the destination.
    DestinationUnreachable(RouterId),
    /// The time to live expired on this router.
    ForwardingLoop(RouterId),
    /// The router hands the packet to an external network (Intra-AS -> Inter-AS).
    HandedOff(RouterId),
    /// The next hop does not exist in the network.
    DeadRouter(RouterId),
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => write!(f, "Delivered"),
            Self::AclDenied(r) => write!(f, "Denied by ACL at r{}", r.index()),
            Self::DestinationUnreachable(r) => {
                write!(f, "Destination not reachable from r{}", r.index())
            }
            Self::ForwardingLoop(r) => write!(f, "Forwarding loop detected at r{}", r.index()),
            Self::HandedOff(r) => write!(f, "Intra-AS -> Inter-AS at r{}", r.index()),
            Self::DeadRouter(r) => write!(f, "Next hop r{} does not exist", r.index()),
        }
    }
}

/// Packet travelling through the network
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    sender: RouterId,
    receiver: Destination,
    ttl: u8,
    path: Vec<RouterId>,
    termination: Option<Termination>,
}

impl Packet {
    /// Create a new packet with the default time to live.
    pub fn new(sender: RouterId, receiver: impl Into<Destination>) -> Self {
        Self {
            sender,
            receiver: receiver.into(),
            ttl: DEFAULT_TTL,
            path: Vec::new(),
            termination: None,
        }
    }

    /// Router which sent the packet
    pub fn sender(&self) -> RouterId {
        self.sender
    }

    /// Destination of the packet
    pub fn receiver(&self) -> Destination {
        self.receiver
    }

    /// Remaining time to live
    pub fn ttl(&self) -> u8 {
        self.ttl
    }

    /// All routers that have stamped the packet, in the order of the visit.
    pub fn path(&self) -> &[RouterId] {
        &self.path
    }

    /// Reason of the termination, or `None` if the packet is still travelling.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Returns true if the packet was terminated.
    pub fn has_terminated(&self) -> bool {
        self.termination.is_some()
    }

    /// Record that the packet passed through `router`.
    pub(crate) fn stamp(&mut self, router: RouterId) {
        self.path.push(router);
    }

    /// Decrement the time to live by one. The time to live never drops below zero.
    pub(crate) fn dec_ttl(&mut self) {
        self.ttl = self.ttl.saturating_sub(1);
    }

    /// Terminate the packet. Only the first termination reason is kept.
    pub(crate) fn terminate(&mut self, reason: Termination) {
        if self.termination.is_none() {
            self.termination = Some(reason);
        }
    }
}
