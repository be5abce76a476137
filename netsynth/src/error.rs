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

//! Module containing all error types

use crate::hard_policies::PolicyError;
use crate::netsim::{ConfigError, NetworkError};
use crate::scheduler::DagError;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error propagated from `netsim`
    #[error("Network Error: {0}")]
    NetworkError(#[from] NetworkError),
    /// A policy is violated
    #[error("Policy Error: {0}")]
    PolicyError(#[from] PolicyError),
    /// Error while building or traversing the dependency graph
    #[error("Dependency Graph Error: {0}")]
    DagError(#[from] DagError<usize>),
    /// No safe ordering can be found
    #[error("No safe ordering can be found!")]
    NoSafeOrdering,
    /// The zone constraints of the policies contradict each other
    #[error("The modifier dependencies are cyclic")]
    CyclicDependency,
    /// On an operation abort
    #[error("The operation was aborted")]
    Abort,
}

impl From<ConfigError> for Error {
    fn from(cause: ConfigError) -> Self {
        Self::NetworkError(NetworkError::ConfigError(cause))
    }
}
