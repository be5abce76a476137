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

//! Module for defining events

use crate::netsim::bgp::BgpEvent;
use crate::netsim::{Prefix, RouterId};
use std::collections::VecDeque;

/// Event to handle
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// BGP Event from `#0` to `#1`.
    Bgp(RouterId, RouterId, BgpEvent),
}

impl Event {
    /// Returns the prefixes this event talks about.
    pub fn prefixes(&self) -> &[Prefix] {
        match self {
            Event::Bgp(_, _, BgpEvent::Update(ad)) => &ad.dest,
            Event::Bgp(_, _, BgpEvent::Withdraw(prefixes)) => prefixes,
        }
    }

    /// Returns the router which must handle the event
    pub fn receiver(&self) -> RouterId {
        match self {
            Event::Bgp(_, to, _) => *to,
        }
    }
}

/// Event queue for enqueuing events. Events are processed in FIFO order.
pub(crate) type EventQueue = VecDeque<Event>;
