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

//! Zone computation on old and new packet traces.

use crate::netsim::config::ConfigModifier;
use crate::netsim::{Destination, Network, NetworkError, RouterId};

use log::*;

/// Part of the new path which differs from the old path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Router on both paths, after which the new path enters the zone
    pub boundary: RouterId,
    /// Routers of the new path inside the zone, in path order
    pub routers: Vec<RouterId>,
}

/// Modifiers which belong to a zone, as indices into the list of modifiers.
///
/// All `interior` modifiers must be applied before the `gateway` modifier, which redirects the
/// traffic into the zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneDependency {
    /// Boundary router of the zone
    pub boundary: RouterId,
    /// Modifiers on routers inside the zone
    pub interior: Vec<usize>,
    /// Static route modifier on the boundary router
    pub gateway: Option<usize>,
}

/// Compute the zones of the flow from `src` to `dst`, and assign every modifier to the zone it
/// belongs to. The zones are returned in the order in which the new path traverses them. Modifiers
/// that do not belong to any zone are not part of the result.
pub fn path_synthesize(
    src: RouterId,
    dst: impl Into<Destination>,
    old_net: &Network,
    new_net: &Network,
    modifiers: &[ConfigModifier],
) -> Result<Vec<ZoneDependency>, NetworkError> {
    let dst = dst.into();
    let old_edges = old_net.route_packet(src, dst)?.edges;
    let new_edges = new_net.route_packet(src, dst)?.edges;

    let common = find_common_nodes(&edges_to_nodes(&old_edges), &edges_to_nodes(&new_edges));
    let diff = find_diff_edges(&old_edges, &new_edges);
    let boundary = find_boundary_routers(&common, &diff);
    let zones = find_zones(&diff, &boundary);
    debug!("Zones of {:?} => {}: {:?}", src, dst, zones);

    Ok(zones
        .into_iter()
        .map(|zone| {
            let mut dep = ZoneDependency { boundary: zone.boundary, interior: vec![], gateway: None };
            for (i, m) in modifiers.iter().enumerate() {
                let router = m.router();
                if zone.routers.contains(&router) {
                    dep.interior.push(i);
                } else if router == zone.boundary && m.is_static_route() {
                    dep.gateway = Some(i);
                }
            }
            dep
        })
        .collect())
}

/// Transforms a list of consecutive edges into the list of nodes along them.
pub fn edges_to_nodes(edges: &[(RouterId, RouterId)]) -> Vec<RouterId> {
    let mut nodes: Vec<RouterId> = edges.iter().map(|(a, _)| *a).collect();
    if let Some((_, b)) = edges.last() {
        nodes.push(*b);
    }
    nodes
}

/// Longest common subsequence of both lists. If the first elements match, they are always taken.
/// On equal length, the solution which skips an element of `b` is preferred.
pub fn find_common_nodes<T: Copy + PartialEq>(a: &[T], b: &[T]) -> Vec<T> {
    let n = a.len();
    let m = b.len();
    // len[i][j] is the length of the common subsequence of a[i..] and b[j..]
    let mut len = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            len[i][j] = if a[i] == b[j] {
                len[i + 1][j + 1] + 1
            } else {
                len[i + 1][j].max(len[i][j + 1])
            };
        }
    }

    let mut result = Vec::with_capacity(len[0][0]);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            result.push(a[i]);
            i += 1;
            j += 1;
        } else if len[i + 1][j] > len[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    result
}

/// Edges of `new` which are not part of `old`, in the order of `new`.
pub fn find_diff_edges(
    old: &[(RouterId, RouterId)],
    new: &[(RouterId, RouterId)],
) -> Vec<(RouterId, RouterId)> {
    new.iter().filter(|e| !old.contains(e)).cloned().collect()
}

/// Routers which are on the common path and on the new edges.
pub fn find_boundary_routers(
    common: &[RouterId],
    new_edges: &[(RouterId, RouterId)],
) -> Vec<RouterId> {
    find_common_nodes(&edges_to_nodes(new_edges), common)
}

/// Split the new edges into zones. Every edge starting at a boundary router opens a new zone, and
/// every other edge adds its source to the current zone.
pub fn find_zones(new_edges: &[(RouterId, RouterId)], boundary: &[RouterId]) -> Vec<Zone> {
    let mut zones: Vec<Zone> = Vec::new();
    for (a, _) in new_edges {
        if boundary.contains(a) {
            zones.push(Zone { boundary: *a, routers: Vec::new() });
        } else if let Some(zone) = zones.last_mut() {
            if !zone.routers.contains(a) {
                zone.routers.push(*a);
            }
        } else {
            warn!("New edge starting at {:?} before any boundary router", a);
        }
    }
    zones
}
