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

//! # Top-level Network module
//!
//! This module represents the network topology, applies the configuration, and simulates the
//! network.

use crate::netsim::bgp::BgpSessions;
use crate::netsim::config::{ConfigExpr, ConfigModifier, RouterConfig};
use crate::netsim::event::EventQueue;
use crate::netsim::packet::{Packet, Termination};
use crate::netsim::printer;
use crate::netsim::router::Router;
use crate::netsim::topology::TopologyGraph;
use crate::netsim::{
    ConfigError, Destination, DeviceError, LinkWeight, NetworkError, Prefix, RouterId,
};

use itertools::Itertools;
use log::*;
use petgraph::algo::all_simple_paths;
use std::collections::{HashMap, HashSet};

static DEFAULT_STOP_AFTER: usize = 10_000;

/// Trace of a single packet through the network.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketTrace {
    /// Destination of the packet
    pub receiver: Destination,
    /// Every hop the packet took, as `(from, to)`
    pub edges: Vec<(RouterId, RouterId)>,
    /// Routers which stamped the packet
    pub path: Vec<RouterId>,
    /// Why the packet stopped
    pub outcome: Termination,
}

impl PacketTrace {
    /// Returns true if the packet reached its destination. A router destination is reached if the
    /// packet was delivered, and a prefix is reached if the packet left the network.
    pub fn reached(&self) -> bool {
        reaches(self.receiver, Some(self.outcome))
    }
}

#[derive(Debug, Clone)]
/// # Network struct
/// The struct contains the configured topology, owns all routers and handles all iBGP messages
/// between them. Every router keeps its own copy of the topology. Link weight changes are applied
/// to the network-wide topology and to the copy of every router.
///
/// All iBGP messages are put into a FIFO queue, and processed until the queue is empty. Every
/// operation that causes messages returns only after the network has converged.
pub struct Network {
    topology: TopologyGraph,
    routers: HashMap<RouterId, Router>,
    known_prefixes: HashSet<Prefix>,
    queue: EventQueue,
    stop_after: Option<usize>,
}

impl Network {
    /// Generate the network from the adjacency map (with link weights) and the configuration of
    /// every router. Routers of the configuration that do not appear in the adjacency map are
    /// added without any link.
    ///
    /// ```rust
    /// use netsynth::netsim::Network;
    /// use netsynth::netsim::config::RouterConfig;
    /// use maplit::hashmap;
    ///
    /// # fn main() -> Result<(), netsynth::netsim::NetworkError> {
    /// let (r0, r1) = (0.into(), 1.into());
    /// let net = Network::new(
    ///     &hashmap! { r0 => hashmap! { r1 => 1.0 }, r1 => hashmap! { r0 => 1.0 } },
    ///     &hashmap! {
    ///         r0 => RouterConfig::ordinary("r0", vec![]),
    ///         r1 => RouterConfig::ordinary("r1", vec![]),
    ///     },
    /// )?;
    /// assert_eq!(net.get_router(r0)?.get_next_hop(r1), Some(Some(r1)));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        topology: &HashMap<RouterId, HashMap<RouterId, LinkWeight>>,
        routers: &HashMap<RouterId, RouterConfig>,
    ) -> Result<Self, NetworkError> {
        let mut graph = TopologyGraph::from_adjacency(topology)?;
        for id in routers.keys() {
            graph.add_router(*id);
        }
        let mut net = Self {
            topology: graph,
            routers: HashMap::with_capacity(routers.len()),
            known_prefixes: HashSet::new(),
            queue: EventQueue::new(),
            stop_after: Some(DEFAULT_STOP_AFTER),
        };
        for (id, config) in routers.iter() {
            if !config.role.can_serve() && !config.clients.is_empty() {
                return Err(NetworkError::InvalidSessionRole(*id, config.role));
            }
            let mut peers = config.servers.iter().chain(config.clients.iter());
            if let Some(peer) = peers.find(|p| !routers.contains_key(*p)) {
                return Err(NetworkError::DeviceNotFound(*peer));
            }
            let sessions = BgpSessions::new(&config.servers, &config.clients);
            let router = Router::new(
                config.name.clone(),
                *id,
                config.role,
                net.topology.clone(),
                sessions,
            )?;
            net.routers.insert(*id, router);
        }
        Ok(net)
    }

    // *******************
    // * Packet Handling *
    // *******************

    /// Send a packet from `sender` to `receiver`, and record every hop until the packet stops.
    pub fn route_packet(
        &self,
        sender: RouterId,
        receiver: impl Into<Destination>,
    ) -> Result<PacketTrace, NetworkError> {
        let receiver = receiver.into();
        if !self.routers.contains_key(&sender) {
            return Err(NetworkError::DeviceNotFound(sender));
        }
        let mut packet = Packet::new(sender, receiver);
        let mut edges: Vec<(RouterId, RouterId)> = Vec::new();
        let mut current = sender;
        loop {
            let router = match self.routers.get(&current) {
                Some(r) => r,
                None => {
                    packet.terminate(Termination::DeadRouter(current));
                    break;
                }
            };
            match router.route(&mut packet) {
                Some(next_hop) => {
                    edges.push((current, next_hop));
                    current = next_hop;
                }
                None => break,
            }
        }
        let outcome = packet.termination().unwrap_or(Termination::DeadRouter(current));
        let trace = PacketTrace { receiver, edges, path: packet.path().to_vec(), outcome };
        debug!(
            "Packet {} => {}: {} ({})",
            self.get_router_name(sender).unwrap_or("?"),
            receiver,
            printer::path(self, &trace.path).unwrap_or_else(|_| format!("{:?}", trace.path)),
            outcome
        );
        Ok(trace)
    }

    /// Check if there exists a loop-free path in the configured topology from `src` towards `dst`,
    /// along which every router would forward the packet to the next router of the path, and on
    /// which the last router delivers the packet (or, for a prefix, hands it off to the external
    /// network).
    pub fn check_node_reachability(
        &self,
        src: RouterId,
        dst: impl Into<Destination>,
    ) -> Result<bool, NetworkError> {
        let dst = dst.into();
        if !self.routers.contains_key(&src) {
            return Err(NetworkError::DeviceNotFound(src));
        }
        let targets: Vec<RouterId> = match dst {
            Destination::Router(r) => vec![r],
            Destination::Prefix(p) => self
                .routers
                .values()
                .filter(|r| r.get_ebgp_prefixes().contains(&p))
                .map(|r| r.router_id())
                .sorted()
                .collect(),
        };
        for target in targets {
            if target == src {
                if self.follows_path(&[src], dst) {
                    return Ok(true);
                }
                continue;
            }
            if !self.topology.graph().contains_node(target) {
                continue;
            }
            let paths =
                all_simple_paths::<Vec<RouterId>, _>(self.topology.graph(), src, target, 0, None);
            for path in paths {
                if self.follows_path(&path, dst) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    // *****************
    // * Configuration *
    // *****************

    /// Apply a single configuration modification. The modification is validated against the
    /// current state of the network first. If it is rejected, the network remains unchanged.
    pub fn apply_modifier(&mut self, modifier: &ConfigModifier) -> Result<(), NetworkError> {
        debug!(
            "Applying modifier: {}",
            printer::config_modifier(self, modifier).unwrap_or_else(|_| format!("{:?}", modifier))
        );
        match modifier {
            ConfigModifier::Append(expr) => {
                self.check_applicable(expr, None, modifier)?;
                self.append_expr(expr)
            }
            ConfigModifier::Remove(expr) => {
                self.check_installed(expr, modifier)?;
                self.remove_expr(expr)
            }
            ConfigModifier::Update { from, to } => {
                if !same_target(from, to) {
                    return Err(ConfigError::InvalidUpdate(modifier.clone()).into());
                }
                self.check_installed(from, modifier)?;
                self.check_applicable(to, Some(from), modifier)?;
                self.update_expr(from, to, modifier)
            }
        }
    }

    /// Apply a sequence of modifications as a single transaction. Either all modifications are
    /// applied, or the network remains unchanged.
    pub fn apply_config(&mut self, modifiers: &[ConfigModifier]) -> Result<(), NetworkError> {
        let mut next = self.clone();
        for modifier in modifiers {
            next.apply_modifier(modifier)?;
        }
        *self = next;
        Ok(())
    }

    /// Change the weight of a link on every router. A weight of `0.0` removes the link, and a link
    /// that does not yet exist is created.
    pub fn update_link_cost(
        &mut self,
        a: RouterId,
        b: RouterId,
        weight: LinkWeight,
    ) -> Result<(), NetworkError> {
        for r in [a, b].iter() {
            if !self.routers.contains_key(r) {
                return Err(NetworkError::DeviceNotFound(*r));
            }
        }
        if weight == 0.0 {
            self.topology.destroy_link(a, b);
        } else {
            self.topology.update_cost(a, b, weight);
        }
        for router in self.routers.values_mut() {
            router.update_graph(a, b, weight)?;
        }
        Ok(())
    }

    // ********
    // * iBGP *
    // ********

    /// Originate the prefix at the border router `gateway`, and let the network converge.
    pub fn insert_ebgp(&mut self, prefix: Prefix, gateway: RouterId) -> Result<(), NetworkError> {
        debug!("{} originates prefix {}", self.get_router_name(gateway).unwrap_or("?"), prefix.0);
        self.routers
            .get_mut(&gateway)
            .ok_or(NetworkError::DeviceNotFound(gateway))?
            .insert_ebgp(prefix, &mut self.queue)?;
        self.known_prefixes.insert(prefix);
        self.do_queue()
    }

    /// Stop originating the prefix at the border router `gateway`, and let the network converge.
    pub fn remove_ebgp(&mut self, prefix: Prefix, gateway: RouterId) -> Result<(), NetworkError> {
        debug!("{} retracts prefix {}", self.get_router_name(gateway).unwrap_or("?"), prefix.0);
        self.routers
            .get_mut(&gateway)
            .ok_or(NetworkError::DeviceNotFound(gateway))?
            .remove_ebgp(prefix, &mut self.queue)?;
        if !self.routers.values().any(|r| r.get_ebgp_prefixes().contains(&prefix)) {
            self.known_prefixes.remove(&prefix);
        }
        self.do_queue()
    }

    /// Establish an iBGP session, where `server` sends its routes to `client`. The server must be
    /// a border router or a route reflector. It immediately advertises its routes to the client.
    pub fn start_ibgp_session(
        &mut self,
        server: RouterId,
        client: RouterId,
    ) -> Result<(), NetworkError> {
        let s = self.get_router(server)?;
        let c = self.get_router(client)?;
        if !s.role().can_serve() {
            return Err(NetworkError::InvalidSessionRole(server, s.role()));
        }
        if s.get_bgp_sessions().is_client(client) || c.get_bgp_sessions().is_server(server) {
            return Err(DeviceError::SessionAlreadyExists(client).into());
        }
        if let Some(r) = self.routers.get_mut(&client) {
            r.add_ibgp_server(server)?;
        }
        if let Some(r) = self.routers.get_mut(&server) {
            r.add_ibgp_client(client, &mut self.queue)?;
        }
        self.do_queue()
    }

    /// Tear down the iBGP session between `server` and `client`. The client drops everything it
    /// learned from the server, and withdraws it from its own clients.
    pub fn destroy_ibgp_session(
        &mut self,
        server: RouterId,
        client: RouterId,
    ) -> Result<(), NetworkError> {
        let s = self.get_router(server)?;
        let c = self.get_router(client)?;
        if !s.get_bgp_sessions().is_client(client) {
            return Err(DeviceError::UnknownPeer(client).into());
        }
        if !c.get_bgp_sessions().is_server(server) {
            return Err(DeviceError::UnknownPeer(server).into());
        }
        if let Some(r) = self.routers.get_mut(&server) {
            r.remove_ibgp_client(client)?;
        }
        if let Some(r) = self.routers.get_mut(&client) {
            r.remove_ibgp_server(server, &mut self.queue)?;
        }
        self.do_queue()
    }

    // ********************
    // * Helper Functions *
    // ********************

    /// Returns a reference to the configured topology
    pub fn get_topology(&self) -> &TopologyGraph {
        &self.topology
    }

    /// Returns the router with the given id
    pub fn get_router(&self, id: RouterId) -> Result<&Router, NetworkError> {
        self.routers.get(&id).ok_or(NetworkError::DeviceNotFound(id))
    }

    /// Returns a list of all router IDs in the network, ordered by their id.
    pub fn get_routers(&self) -> Vec<RouterId> {
        self.routers.keys().cloned().sorted().collect()
    }

    /// Get the RouterID with the given name. If multiple routers have the same name, then the
    /// one with the lowest id is returned.
    pub fn get_router_id(&self, name: impl AsRef<str>) -> Result<RouterId, NetworkError> {
        self.routers
            .values()
            .filter(|r| r.name() == name.as_ref())
            .map(|r| r.router_id())
            .min()
            .ok_or_else(|| NetworkError::DeviceNameNotFound(name.as_ref().to_string()))
    }

    /// Returns the name of the router, if the ID was found.
    pub fn get_router_name(&self, router_id: RouterId) -> Result<&str, NetworkError> {
        self.routers.get(&router_id).map(|r| r.name()).ok_or(NetworkError::DeviceNotFound(router_id))
    }

    /// Returns a hashset of all prefixes originated by some border router
    pub fn get_known_prefixes(&self) -> &HashSet<Prefix> {
        &self.known_prefixes
    }

    /// Configure the network to abort processing iBGP messages after a certain number of messages,
    /// and report that it cannot converge. If set to None, the queue runs until it is empty.
    pub fn set_msg_limit(&mut self, stop_after: Option<usize>) {
        self.stop_after = stop_after;
    }

    // *******************
    // * Local Functions *
    // *******************

    /// Check that the packet, starting at the first router of the path, follows the path, and
    /// reaches its destination at the last router.
    fn follows_path(&self, path: &[RouterId], dst: Destination) -> bool {
        let mut packet = match path.first() {
            Some(src) => Packet::new(*src, dst),
            None => return false,
        };
        for (i, hop) in path.iter().enumerate() {
            let router = match self.routers.get(hop) {
                Some(r) => r,
                None => return false,
            };
            let next_hop = router.route(&mut packet);
            match path.get(i + 1) {
                Some(expected) if next_hop != Some(*expected) => return false,
                Some(_) => {}
                None => return next_hop.is_none() && reaches(dst, packet.termination()),
            }
        }
        false
    }

    /// Check that the expression (or, for an update, the `from` part) matches the current state.
    fn check_installed(
        &self,
        expr: &ConfigExpr,
        modifier: &ConfigModifier,
    ) -> Result<(), NetworkError> {
        let installed = match expr {
            ConfigExpr::Acl { router, rule, .. } => self.get_router(*router)?.get_acl().contains(rule),
            ConfigExpr::StaticRoute { router, dst, next_hop } => {
                let r = self.get_router(*router)?;
                r.is_static(*dst) && r.get_next_hop(*dst) == Some(Some(*next_hop))
            }
            ConfigExpr::IgpLinkWeight { a, b, weight } => {
                self.topology.link_weight(*a, *b) == Some(*weight)
            }
        };
        if installed {
            Ok(())
        } else {
            Err(ConfigError::ConfigMismatch(modifier.clone()).into())
        }
    }

    /// Check that the expression can be installed. If `replacing` is given, it will be removed
    /// before the new expression is installed.
    fn check_applicable(
        &self,
        expr: &ConfigExpr,
        replacing: Option<&ConfigExpr>,
        modifier: &ConfigModifier,
    ) -> Result<(), NetworkError> {
        match expr {
            ConfigExpr::Acl { router, rule, .. } => {
                let replaced = match replacing {
                    Some(ConfigExpr::Acl { rule: old, .. }) => old == rule,
                    _ => false,
                };
                if !replaced && self.get_router(*router)?.get_acl().contains(rule) {
                    return Err(DeviceError::AclRuleExists(*rule).into());
                }
            }
            ConfigExpr::StaticRoute { router, dst, next_hop } => {
                if !self.get_router(*router)?.graph().has_link(*router, *next_hop) {
                    return Err(DeviceError::StaticRouteConflict(*dst, *next_hop).into());
                }
            }
            ConfigExpr::IgpLinkWeight { a, b, weight } => {
                self.get_router(*a)?;
                self.get_router(*b)?;
                if a == b || !weight.is_finite() || *weight <= 0.0 {
                    return Err(ConfigError::InvalidLinkWeight(modifier.clone()).into());
                }
            }
        }
        Ok(())
    }

    fn append_expr(&mut self, expr: &ConfigExpr) -> Result<(), NetworkError> {
        match expr {
            ConfigExpr::Acl { router, rule, position } => {
                self.get_router_mut(*router)?.add_acl(*rule, *position)?;
            }
            ConfigExpr::StaticRoute { router, dst, next_hop } => {
                let r = self.get_router_mut(*router)?;
                r.dynamic_to_static(*dst);
                r.add_static_route(*dst, *next_hop)?;
            }
            ConfigExpr::IgpLinkWeight { a, b, weight } => self.update_link_cost(*a, *b, *weight)?,
        }
        Ok(())
    }

    fn remove_expr(&mut self, expr: &ConfigExpr) -> Result<(), NetworkError> {
        match expr {
            ConfigExpr::Acl { router, rule, .. } => {
                self.get_router_mut(*router)?.remove_acl(rule)?;
            }
            ConfigExpr::StaticRoute { router, dst, .. } => {
                let r = self.get_router_mut(*router)?;
                r.remove_static_route(*dst)?;
                r.static_to_dynamic(*dst)?;
            }
            ConfigExpr::IgpLinkWeight { a, b, .. } => self.update_link_cost(*a, *b, 0.0)?,
        }
        Ok(())
    }

    fn update_expr(
        &mut self,
        from: &ConfigExpr,
        to: &ConfigExpr,
        modifier: &ConfigModifier,
    ) -> Result<(), NetworkError> {
        match (from, to) {
            (
                ConfigExpr::Acl { router, rule: old, .. },
                ConfigExpr::Acl { rule: new, position, .. },
            ) => {
                let r = self.get_router_mut(*router)?;
                r.remove_acl(old)?;
                r.add_acl(*new, *position)?;
            }
            (ConfigExpr::StaticRoute { .. }, ConfigExpr::StaticRoute { router, dst, next_hop }) => {
                self.get_router_mut(*router)?.add_static_route(*dst, *next_hop)?;
            }
            (ConfigExpr::IgpLinkWeight { .. }, ConfigExpr::IgpLinkWeight { a, b, weight }) => {
                self.update_link_cost(*a, *b, *weight)?;
            }
            _ => return Err(ConfigError::InvalidUpdate(modifier.clone()).into()),
        }
        Ok(())
    }

    fn get_router_mut(&mut self, id: RouterId) -> Result<&mut Router, NetworkError> {
        self.routers.get_mut(&id).ok_or(NetworkError::DeviceNotFound(id))
    }

    /// Execute the queue
    fn do_queue(&mut self) -> Result<(), NetworkError> {
        let mut remaining_iter = self.stop_after;
        while let Some(event) = self.queue.pop_front() {
            if let Some(rem) = remaining_iter {
                if rem == 0 {
                    debug!("Network cannot converge!");
                    self.queue.clear();
                    return Err(NetworkError::NoConvergence);
                }
                remaining_iter = Some(rem - 1);
            }
            trace!(
                "{}",
                printer::event(self, &event).unwrap_or_else(|_| format!("{:?}", event))
            );
            let to = event.receiver();
            match self.routers.get_mut(&to) {
                Some(r) => {
                    if let Err(e) = r.handle_event(event, &mut self.queue) {
                        self.queue.clear();
                        return Err(e.into());
                    }
                }
                None => warn!("Dropping event for unknown router {:?}", to),
            }
        }
        Ok(())
    }
}

/// Returns true if a packet for `dst` that stopped with `outcome` has reached its destination.
fn reaches(dst: Destination, outcome: Option<Termination>) -> bool {
    match (dst, outcome) {
        (Destination::Router(_), Some(Termination::Delivered)) => true,
        (Destination::Prefix(_), Some(Termination::HandedOff(_))) => true,
        _ => false,
    }
}

/// Returns true if an update from `from` to `to` addresses the same configuration item. ACL rules
/// may change as a whole, but must stay on the same router.
fn same_target(from: &ConfigExpr, to: &ConfigExpr) -> bool {
    match (from, to) {
        (ConfigExpr::Acl { router: r1, .. }, ConfigExpr::Acl { router: r2, .. }) => r1 == r2,
        (ConfigExpr::StaticRoute { .. }, ConfigExpr::StaticRoute { .. })
        | (ConfigExpr::IgpLinkWeight { .. }, ConfigExpr::IgpLinkWeight { .. }) => {
            from.key() == to.key()
        }
        _ => false,
    }
}
