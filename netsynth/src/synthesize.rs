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
//! Wrapper function to synthesize configuration updates

use crate::hard_policies::Policy;
use crate::netsim::config::ConfigModifier;
use crate::netsim::Network;
use crate::strategies::{Strategy, StrategyZone};
use crate::{Error, Stopper};

use log::*;

/// # Synthesize Configuration Updates
///
/// This is the main function to interact with the system. It uses the
/// [`StrategyZone`](crate::strategies::StrategyZone) and returns the modifiers in the order in
/// which they can be applied, such that all `policies` hold after every single step.
///
/// ## Usage
///
/// ```
/// use netsynth::hard_policies::Policy;
/// use netsynth::netsim::Destination;
/// use netsynth::synthesize;
/// use netsynth::Error;
/// # use netsynth::example_networks::*;
///
/// fn main() -> Result<(), Error> {
///     // prepare the network
///     // let net = ...
///     // let modifiers = ...
/// # let net = LadderNet::net();
/// # let modifiers = LadderNet::modifiers(&net);
///
///     // prepare the policies
///     let policies = vec![Policy::Reachability(5.into(), Destination::Router(1.into()))];
///
///     // synthesize the reconfiguration
///     let sequence = synthesize(net, modifiers, policies)?;
///
///     Ok(())
/// }
/// ```
pub fn synthesize(
    net: Network,
    modifiers: Vec<ConfigModifier>,
    policies: Vec<Policy>,
) -> Result<Vec<ConfigModifier>, Error> {
    info!("Solving the problem...");

    let mut strategy = StrategyZone::new(net, modifiers, policies)?;

    // try to solve the problem
    match strategy.work(Stopper::new()) {
        Ok(sequence) => {
            info!("Found a valid solution!");
            Ok(sequence)
        }
        Err(e) => {
            error!("Could not solve the problem: {}", e);
            Err(e)
        }
    }
}
