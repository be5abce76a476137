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

//! # Access Control Lists
//!
//! Every router filters the packets it receives with an ordered list of rules. The first rule
//! matching the `(sender, receiver)` pair decides. If no rule matches, the packet is dropped.

use crate::netsim::{Destination, DeviceError, RouterId};

/// Single ACL rule, matching on the sender and the receiver of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AclRule {
    /// `true` if matching packets are forwarded, `false` if they are dropped.
    pub permit: bool,
    /// Sender of the packet
    pub src: RouterId,
    /// Destination of the packet
    pub dst: Destination,
}

impl AclRule {
    /// Rule forwarding all packets from `src` to `dst`.
    pub fn permit(src: RouterId, dst: impl Into<Destination>) -> Self {
        Self { permit: true, src, dst: dst.into() }
    }

    /// Rule dropping all packets from `src` to `dst`.
    pub fn deny(src: RouterId, dst: impl Into<Destination>) -> Self {
        Self { permit: false, src, dst: dst.into() }
    }

    /// Returns true if the rule applies to a packet from `src` to `dst`.
    pub fn matches(&self, src: RouterId, dst: Destination) -> bool {
        self.src == src && self.dst == dst
    }
}

/// Ordered list of ACL rules. No rule is contained twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessList {
    rules: Vec<AclRule>,
}

impl AccessList {
    /// Create an empty access list, which drops everything.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// First match decides, with an implicit deny at the end.
    pub fn check(&self, src: RouterId, dst: Destination) -> bool {
        self.rules.iter().find(|r| r.matches(src, dst)).map(|r| r.permit).unwrap_or(false)
    }

    /// Insert a rule at `position`, or append it if no position is given. A position past the
    /// end of the list appends the rule.
    pub fn add(&mut self, rule: AclRule, position: Option<usize>) -> Result<(), DeviceError> {
        if self.rules.contains(&rule) {
            return Err(DeviceError::AclRuleExists(rule));
        }
        match position {
            Some(pos) if pos < self.rules.len() => self.rules.insert(pos, rule),
            _ => self.rules.push(rule),
        }
        Ok(())
    }

    /// Remove the (only) occurrence of the exact rule.
    pub fn remove(&mut self, rule: &AclRule) -> Result<(), DeviceError> {
        match self.rules.iter().position(|r| r == rule) {
            Some(pos) => {
                self.rules.remove(pos);
                Ok(())
            }
            None => Err(DeviceError::NoAclRule(*rule)),
        }
    }

    /// Returns true if the exact rule is installed.
    pub fn contains(&self, rule: &AclRule) -> bool {
        self.rules.contains(rule)
    }

    /// Returns all rules in the order in which they are evaluated.
    pub fn rules(&self) -> &[AclRule] {
        &self.rules
    }
}
