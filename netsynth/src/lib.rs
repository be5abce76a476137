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

//! # Netsynth
//!
//! Netsynth simulates the forwarding plane of a single autonomous system, and computes an order
//! in which a set of configuration changes can be applied without violating reachability policies
//! in any intermediate state.
//!
//! ## Structure
//!
//! - [`netsim`]: Simulator of the network. Every router computes its own IGP routing table,
//!   forwards packets according to its ACL and static routes, and exchanges iBGP advertisements
//!   with its peers and route reflectors.
//! - [`hard_policies`]: Conditions on the forwarding state (reachability, isolation and
//!   waypointing) which must hold at every step of the reconfiguration.
//! - [`dep_groups`]: Compares the path of a flow before and after the reconfiguration, and groups
//!   the changed part into zones, each hanging off a boundary router.
//! - [`scheduler`]: Generic dependency graph, which releases tasks once all of their predecessors
//!   are done.
//! - [`strategies`]: Combines the zones and the dependency graph into an ordering of the
//!   configuration changes.
//!
//! ## Usage
//!
//! ```
//! use netsynth::example_networks::{ExampleNetwork, LadderNet};
//! use netsynth::{synthesize, Error};
//!
//! fn main() -> Result<(), Error> {
//!     let net = LadderNet::net();
//!     let modifiers = LadderNet::modifiers(&net);
//!     let policies = LadderNet::get_policy(&net);
//!
//!     let sequence = synthesize(net, modifiers, policies)?;
//!     assert_eq!(sequence.len(), 4);
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]

// test modules
pub mod example_networks;
mod test;

pub mod dep_groups;
mod error;
pub mod hard_policies;
pub mod netsim;
pub mod scheduler;
pub mod strategies;

mod synthesize;
pub use synthesize::synthesize;

pub use error::Error;

use std::sync::{Arc, RwLock};

/// Stopper, to check when to stop, or to send the stop command
#[derive(Clone, Debug)]
pub struct Stopper {
    b: Arc<RwLock<bool>>,
}

impl Default for Stopper {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopper {
    /// Create a new stopper
    pub fn new() -> Self {
        Self { b: Arc::new(RwLock::new(false)) }
    }

    /// Send the stop command. This function will block until the write lock can be acquired.
    pub fn send_stop(&self) {
        match self.b.write() {
            Ok(mut b) => *b = true,
            Err(poisoned) => *poisoned.into_inner() = true,
        }
    }

    /// Checks if the stop flag is set. This function will block until the read lock can be
    /// acquired.
    pub fn is_stop(&self) -> bool {
        match self.b.read() {
            Ok(b) => *b,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
