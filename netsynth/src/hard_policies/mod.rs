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

//! # Hard Policies
//!
//! Policies are requirements on the data plane, which must hold in every intermediate state while
//! the configuration is changed.
//!
//! - [`Policy::Reachability`]: the source is able to reach the destination, i.e., there exists a
//!   loop-free path along which every router forwards the packet towards the destination.
//! - [`Policy::Isolation`]: the source is not able to reach the destination.
//! - [`Policy::Waypoint`]: packets from the source are delivered to the destination, and they
//!   pass through a specific router on the way.

use crate::netsim::{Destination, Network, NetworkError, RouterId, Termination};
use std::fmt;
use thiserror::Error;

/// Single hard policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// `src` must be able to reach `dst`.
    Reachability(RouterId, Destination),
    /// `src` must not be able to reach `dst`.
    Isolation(RouterId, Destination),
    /// Traffic from `src` to `dst` must traverse the router `via`.
    Waypoint(RouterId, Destination, RouterId),
}

impl Policy {
    /// Returns the source and the destination of the policy.
    pub fn endpoints(&self) -> (RouterId, Destination) {
        match self {
            Self::Reachability(src, dst)
            | Self::Isolation(src, dst)
            | Self::Waypoint(src, dst, _) => (*src, *dst),
        }
    }

    /// Check the policy on the current state of the network.
    pub fn check(&self, net: &Network) -> Result<(), PolicyError> {
        match self {
            Self::Reachability(src, dst) => {
                if net.check_node_reachability(*src, *dst)? {
                    Ok(())
                } else {
                    let trace = net.route_packet(*src, *dst)?;
                    Err(PolicyError::Unreachable {
                        src: *src,
                        dst: *dst,
                        path: trace.path,
                        outcome: trace.outcome,
                    })
                }
            }
            Self::Isolation(src, dst) => {
                if net.check_node_reachability(*src, *dst)? {
                    Err(PolicyError::UnallowedPathExists { src: *src, dst: *dst })
                } else {
                    Ok(())
                }
            }
            Self::Waypoint(src, dst, via) => {
                let trace = net.route_packet(*src, *dst)?;
                if trace.reached() && trace.path.contains(via) {
                    Ok(())
                } else {
                    Err(PolicyError::WaypointMissed { src: *src, dst: *dst, via: *via, path: trace.path })
                }
            }
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachability(src, dst) => write!(f, "Reachability(r{} -> {})", src.index(), dst),
            Self::Isolation(src, dst) => write!(f, "Isolation(r{} -> {})", src.index(), dst),
            Self::Waypoint(src, dst, via) => {
                write!(f, "Waypoint(r{} -> {} via r{})", src.index(), dst, via.index())
            }
        }
    }
}

/// Check all policies, and return the first violation.
pub fn check_all(policies: &[Policy], net: &Network) -> Result<(), PolicyError> {
    policies.iter().try_for_each(|p| p.check(net))
}

/// Error type thrown when a policy is violated
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    /// The destination cannot be reached
    #[error("{dst} is not reachable from {src:?}: path {path:?} ({outcome})")]
    Unreachable {
        /// Source of the traffic
        src: RouterId,
        /// Destination of the traffic
        dst: Destination,
        /// The path the traffic actually takes
        path: Vec<RouterId>,
        /// Why the traffic stops
        outcome: Termination,
    },
    /// The destination can be reached, although it should be isolated
    #[error("{dst} can be reached from {src:?}")]
    UnallowedPathExists {
        /// Source of the traffic
        src: RouterId,
        /// Destination of the traffic
        dst: Destination,
    },
    /// The traffic does not pass through the waypoint
    #[error("Traffic from {src:?} to {dst} misses {via:?}: path {path:?}")]
    WaypointMissed {
        /// Source of the traffic
        src: RouterId,
        /// Destination of the traffic
        dst: Destination,
        /// Required waypoint
        via: RouterId,
        /// The path the traffic actually takes
        path: Vec<RouterId>,
    },
    /// The network could not be queried
    #[error("Network Error: {0}")]
    NetworkError(#[from] NetworkError),
}
