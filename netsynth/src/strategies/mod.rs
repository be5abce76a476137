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

//! # Strategies
//!
//! This module contains the trait definition for `Strategy`, used to find an order in which a set
//! of configuration modifiers can be applied, and its implementation [`StrategyZone`].
//!
//! ## Zone Strategy
//!
//! For every policy, the path of the flow in the initial network is compared to the path after all
//! modifiers are applied. The changed part of the new path is split into zones (see
//! [`dep_groups`](crate::dep_groups)). Inside each zone, the new forwarding state must be prepared
//! before the boundary router redirects the traffic into it. Zones further along the new path are
//! only touched after the previous zone is done. These constraints are inserted into a
//! [`DependencyGraph`](crate::scheduler::DependencyGraph), which then releases the modifiers.

mod zone;
pub use zone::StrategyZone;

use crate::hard_policies::Policy;
use crate::netsim::config::ConfigModifier;
use crate::netsim::Network;
use crate::{Error, Stopper};

use log::*;

/// Interface for all ordering strategies
pub trait Strategy {
    /// Wrapper, that creates the strategy and synthesizes the network update order.
    fn synthesize(
        net: Network,
        modifiers: Vec<ConfigModifier>,
        policies: Vec<Policy>,
        abort: Stopper,
    ) -> Result<Vec<ConfigModifier>, Error> {
        let mut strategy = match Self::new(net, modifiers, policies) {
            Ok(s) => {
                info!("Initial configuration is valid!");
                s
            }
            Err(e) => {
                error!("Unexpected error while setting up the strategy: {}", e);
                return Err(e);
            }
        };
        strategy.work(abort)
    }

    /// Create the strategy
    fn new(
        net: Network,
        modifiers: Vec<ConfigModifier>,
        policies: Vec<Policy>,
    ) -> Result<Box<Self>, Error>;

    /// Main function to find a valid reconfiguration sequence (if it exists) and return it.
    fn work(&mut self, abort: Stopper) -> Result<Vec<ConfigModifier>, Error>;
}
