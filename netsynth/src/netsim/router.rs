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

//! Module defining a router of the network, with its forwarding, filtering and iBGP behavior.

use crate::netsim::acl::{AccessList, AclRule};
use crate::netsim::bgp::{AdEntry, Advertisement, BgpEvent, BgpSessions, RouterRole};
use crate::netsim::event::{Event, EventQueue};
use crate::netsim::packet::{Packet, Termination};
use crate::netsim::topology::TopologyGraph;
use crate::netsim::{Destination, DeviceError, LinkWeight, Prefix, RouterId};
use log::*;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Outcome for a single prefix after advertisements were removed from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Withdrawal {
    /// No usable advertisement remains for the prefix.
    Lost(Prefix),
    /// Other advertisements remain, and the best one leaves the network at the given gate.
    Replaced(Prefix, RouterId),
}

/// # Router
///
/// A router owns its own view of the IGP topology, and derives its routing table from it. On top
/// of the IGP routes, the routing table contains static routes and routes towards external
/// prefixes, learned via iBGP (or originated via eBGP on a border router).
///
/// A routing table entry of `None` means that the destination is local: either it is the router
/// itself, or the packet leaves the network at this router. Destinations without an entry are not
/// reachable.
#[derive(Debug, Clone)]
pub struct Router {
    /// Name of the router
    name: String,
    /// ID of the router
    router_id: RouterId,
    /// iBGP role of the router
    role: RouterRole,
    /// local copy of the IGP topology
    graph: TopologyGraph,
    /// next hop for every reachable destination
    routing_table: HashMap<Destination, Option<RouterId>>,
    /// destinations whose entry is not computed, but configured
    static_routes: HashSet<Destination>,
    /// packet filter
    acl: AccessList,
    /// iBGP servers and clients
    sessions: BgpSessions,
    /// Received advertisements. For every prefix, there is at most one entry per advertiser.
    ibgp_ads: HashMap<Prefix, Vec<AdEntry>>,
    /// Prefixes originated by this router (only on border routers)
    ebgp_prefixes: Vec<Prefix>,
}

impl Router {
    pub(crate) fn new(
        name: String,
        router_id: RouterId,
        role: RouterRole,
        graph: TopologyGraph,
        sessions: BgpSessions,
    ) -> Result<Router, DeviceError> {
        let mut router = Router {
            name,
            router_id,
            role,
            graph,
            routing_table: HashMap::new(),
            static_routes: HashSet::new(),
            acl: AccessList::new(),
            sessions,
            ibgp_ads: HashMap::new(),
            ebgp_prefixes: Vec::new(),
        };
        router.update_routing_table()?;
        Ok(router)
    }

    /// Return the idx of the Router
    pub fn router_id(&self) -> RouterId {
        self.router_id
    }

    /// Return the name of the Router
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Return the iBGP role of the router
    pub fn role(&self) -> RouterRole {
        self.role
    }

    /// Returns the local view of the IGP topology
    pub fn graph(&self) -> &TopologyGraph {
        &self.graph
    }

    /// Returns the routing table.
    pub fn get_routing_table(&self) -> &HashMap<Destination, Option<RouterId>> {
        &self.routing_table
    }

    /// Returns the routing table entry for the destination. `None` means that there is no entry,
    /// and `Some(None)` means that the destination is local.
    pub fn get_next_hop(&self, dst: impl Into<Destination>) -> Option<Option<RouterId>> {
        self.routing_table.get(&dst.into()).cloned()
    }

    /// Returns true if the destination is in static mode.
    pub fn is_static(&self, dst: impl Into<Destination>) -> bool {
        self.static_routes.contains(&dst.into())
    }

    /// Returns the set of destinations in static mode.
    pub fn get_static_routes(&self) -> &HashSet<Destination> {
        &self.static_routes
    }

    /// Returns the access list of the router.
    pub fn get_acl(&self) -> &AccessList {
        &self.acl
    }

    /// Returns the iBGP sessions of the router.
    pub fn get_bgp_sessions(&self) -> &BgpSessions {
        &self.sessions
    }

    /// Returns all stored advertisements for the prefix.
    pub fn get_ibgp_ads(&self, prefix: Prefix) -> &[AdEntry] {
        self.ibgp_ads.get(&prefix).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Returns all prefixes for which an advertisement is stored.
    pub fn get_known_prefixes(&self) -> Vec<Prefix> {
        let mut prefixes: Vec<Prefix> = self.ibgp_ads.keys().cloned().collect();
        prefixes.sort();
        prefixes
    }

    /// Returns the prefixes originated by this (border) router.
    pub fn get_ebgp_prefixes(&self) -> &[Prefix] {
        &self.ebgp_prefixes
    }

    // *******************
    // * Packet Handling *
    // *******************

    /// Process a packet that arrived at this router. Returns the next hop, if the packet should be
    /// forwarded. Otherwise, the packet is terminated with the reason why it stops here.
    pub fn route(&self, packet: &mut Packet) -> Option<RouterId> {
        let receiver = packet.receiver();
        if !self.acl.check(packet.sender(), receiver) {
            packet.terminate(Termination::AclDenied(self.router_id));
            return None;
        }
        packet.stamp(self.router_id);
        if receiver == Destination::Router(self.router_id) {
            packet.terminate(Termination::Delivered);
            return None;
        }
        packet.dec_ttl();
        match self.routing_table.get(&receiver) {
            None => {
                packet.terminate(Termination::DestinationUnreachable(self.router_id));
                None
            }
            Some(_) if packet.ttl() == 0 => {
                packet.terminate(Termination::ForwardingLoop(self.router_id));
                None
            }
            Some(None) => {
                packet.terminate(Termination::HandedOff(self.router_id));
                None
            }
            Some(Some(next_hop)) => Some(*next_hop),
        }
    }

    /// Returns true if the ACL permits packets from `src` to `dst`.
    pub fn check_acl(&self, src: RouterId, dst: impl Into<Destination>) -> bool {
        self.acl.check(src, dst.into())
    }

    /// Insert an ACL rule at the given position (or at the end).
    pub(crate) fn add_acl(
        &mut self,
        rule: AclRule,
        position: Option<usize>,
    ) -> Result<(), DeviceError> {
        self.acl.add(rule, position)
    }

    /// Remove an existing ACL rule.
    pub(crate) fn remove_acl(&mut self, rule: &AclRule) -> Result<(), DeviceError> {
        self.acl.remove(rule)
    }

    // *****************
    // * Static Routes *
    // *****************

    /// Switch the destination to static mode, and drop its dynamic entry from the routing table
    /// until a static route is installed. Returns false if the destination was already static.
    pub(crate) fn dynamic_to_static(&mut self, dst: Destination) -> bool {
        if !self.static_routes.insert(dst) {
            return false;
        }
        self.routing_table.remove(&dst);
        true
    }

    /// Switch the destination back to dynamic mode, and recompute the routing table. Returns
    /// `Ok(false)` if the destination was not static.
    pub(crate) fn static_to_dynamic(&mut self, dst: Destination) -> Result<bool, DeviceError> {
        if !self.static_routes.remove(&dst) {
            return Ok(false);
        }
        self.update_routing_table()?;
        Ok(true)
    }

    /// Install a static route. The destination must be in static mode, and the next hop must be
    /// a direct neighbor.
    pub(crate) fn add_static_route(
        &mut self,
        dst: Destination,
        next_hop: RouterId,
    ) -> Result<(), DeviceError> {
        if !self.static_routes.contains(&dst) || !self.graph.has_link(self.router_id, next_hop) {
            return Err(DeviceError::StaticRouteConflict(dst, next_hop));
        }
        self.routing_table.insert(dst, Some(next_hop));
        Ok(())
    }

    /// Remove the static route, leaving the destination without any entry.
    pub(crate) fn remove_static_route(&mut self, dst: Destination) -> Result<(), DeviceError> {
        if !self.static_routes.contains(&dst) {
            return Err(DeviceError::NoStaticRoute(dst));
        }
        match self.routing_table.remove(&dst) {
            Some(_) => Ok(()),
            None => Err(DeviceError::NoStaticRoute(dst)),
        }
    }

    // *******
    // * IGP *
    // *******

    /// Change the weight of a link in the local topology, and recompute the routing table. A
    /// weight of `0.0` removes the link.
    pub(crate) fn update_graph(
        &mut self,
        a: RouterId,
        b: RouterId,
        weight: LinkWeight,
    ) -> Result<(), DeviceError> {
        if weight == 0.0 {
            self.graph.destroy_link(a, b);
        } else {
            self.graph.update_cost(a, b, weight);
        }
        self.update_routing_table()
    }

    /// Rebuild the routing table from the topology. Static entries are kept, and the routes
    /// towards external prefixes are selected again.
    fn update_routing_table(&mut self) -> Result<(), DeviceError> {
        let next_hops = self.graph.shortest_paths(self.router_id)?;
        let mut table: HashMap<Destination, Option<RouterId>> = HashMap::new();
        for (router, next_hop) in next_hops {
            let dst = Destination::Router(router);
            if self.static_routes.contains(&dst) {
                continue;
            }
            if router == self.router_id || next_hop.is_some() {
                table.insert(dst, next_hop);
            }
        }
        for dst in self.static_routes.iter() {
            if let Some(entry) = self.routing_table.get(dst) {
                table.insert(*dst, *entry);
            }
        }
        self.routing_table = table;

        let mut prefixes: Vec<Prefix> =
            self.ibgp_ads.keys().chain(self.ebgp_prefixes.iter()).cloned().collect();
        prefixes.sort();
        prefixes.dedup();
        for prefix in prefixes {
            self.install_prefix_route(prefix)?;
        }
        Ok(())
    }

    // ********
    // * iBGP *
    // ********

    /// handle an `Event`, and enqueue the resulting events. Messages from routers which are not
    /// servers of this router are ignored.
    pub(crate) fn handle_event(
        &mut self,
        event: Event,
        queue: &mut EventQueue,
    ) -> Result<(), DeviceError> {
        match event {
            Event::Bgp(from, to, bgp_event) if to == self.router_id => {
                if !self.sessions.is_server(from) {
                    debug!("{} received a bgp event from a non-server! Ignore event!", self.name);
                    return Ok(());
                }
                match bgp_event {
                    BgpEvent::Update(ad) => {
                        let changed = self.decode_ibgp_ad(&ad)?;
                        if self.role == RouterRole::Reflector && !changed.is_empty() {
                            let reflected = Advertisement {
                                dest: changed,
                                gate: ad.gate,
                                advertiser: self.router_id,
                            };
                            self.send_update(reflected, Some(ad.advertiser), queue);
                        }
                    }
                    BgpEvent::Withdraw(prefixes) => {
                        let withdrawals =
                            self.remove_ads_for(&prefixes, |e| e.advertiser == from)?;
                        if self.role == RouterRole::Reflector {
                            self.propagate_withdrawals(withdrawals, Some(from), queue);
                        }
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Store the advertisement for all its prefixes, replacing an older advertisement of the same
    /// advertiser, and select the best route for each of them. Returns the prefixes for which the
    /// stored advertisements changed.
    pub(crate) fn decode_ibgp_ad(&mut self, ad: &Advertisement) -> Result<Vec<Prefix>, DeviceError> {
        let new_entry = AdEntry { gate: ad.gate, advertiser: ad.advertiser };
        let mut changed = Vec::new();
        for prefix in ad.dest.iter() {
            let entries = self.ibgp_ads.entry(*prefix).or_insert_with(Vec::new);
            match entries.iter().position(|e| e.advertiser == ad.advertiser) {
                Some(pos) if entries[pos] == new_entry => {}
                Some(pos) => {
                    entries.remove(pos);
                    entries.push(new_entry);
                    changed.push(*prefix);
                }
                None => {
                    entries.push(new_entry);
                    changed.push(*prefix);
                }
            }
            self.install_prefix_route(*prefix)?;
        }
        Ok(changed)
    }

    /// Select the best gate for the prefix among all stored advertisements: the gate with the
    /// lowest IGP cost, and the lowest id among equal costs. Unreachable gates are ignored.
    pub fn opt_ibgp_route(&self, prefix: Prefix) -> Result<Option<RouterId>, DeviceError> {
        let mut best: Option<(LinkWeight, RouterId)> = None;
        for entry in self.get_ibgp_ads(prefix) {
            let cost = match self.graph.cost(entry.gate) {
                Ok(cost) => cost,
                Err(DeviceError::RouterNotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            if cost.is_infinite() {
                continue;
            }
            best = match best {
                Some((c, g)) if c < cost || (c == cost && g < entry.gate) => Some((c, g)),
                _ => Some((cost, entry.gate)),
            };
        }
        Ok(best.map(|(_, gate)| gate))
    }

    /// Remove all advertisements received from `advertiser`. If `gate` is given, only the
    /// advertisements using this gate are removed.
    pub(crate) fn remove_ibgp_ad(
        &mut self,
        gate: Option<RouterId>,
        advertiser: RouterId,
    ) -> Result<Vec<Withdrawal>, DeviceError> {
        let prefixes = self.get_known_prefixes();
        self.remove_ads_for(&prefixes, |e| {
            e.advertiser == advertiser && gate.map(|g| g == e.gate).unwrap_or(true)
        })
    }

    /// Draft the advertisement for all prefixes originated by this router.
    pub fn draft_ibgp_ad(&self) -> Advertisement {
        Advertisement {
            dest: self.ebgp_prefixes.clone(),
            gate: self.router_id,
            advertiser: self.router_id,
        }
    }

    /// Originate a prefix learned via eBGP, and advertise all originated prefixes to the clients.
    pub(crate) fn insert_ebgp(
        &mut self,
        prefix: Prefix,
        queue: &mut EventQueue,
    ) -> Result<(), DeviceError> {
        if self.role != RouterRole::Border {
            return Err(DeviceError::NotABorderRouter(self.router_id));
        }
        if !self.ebgp_prefixes.contains(&prefix) {
            self.ebgp_prefixes.push(prefix);
        }
        self.install_prefix_route(prefix)?;
        let ad = self.draft_ibgp_ad();
        self.send_update(ad, None, queue);
        Ok(())
    }

    /// Stop originating a prefix, and withdraw it from all clients.
    pub(crate) fn remove_ebgp(
        &mut self,
        prefix: Prefix,
        queue: &mut EventQueue,
    ) -> Result<(), DeviceError> {
        if self.role != RouterRole::Border {
            return Err(DeviceError::NotABorderRouter(self.router_id));
        }
        if !self.ebgp_prefixes.contains(&prefix) {
            return Err(DeviceError::UnknownPrefix(prefix));
        }
        self.ebgp_prefixes.retain(|p| *p != prefix);
        self.install_prefix_route(prefix)?;
        for client in self.sessions.clients() {
            queue.push_back(Event::Bgp(
                self.router_id,
                *client,
                BgpEvent::Withdraw(vec![prefix]),
            ));
        }
        Ok(())
    }

    /// Accept advertisements from a new server.
    pub(crate) fn add_ibgp_server(&mut self, server: RouterId) -> Result<(), DeviceError> {
        if self.sessions.add_server(server) {
            Ok(())
        } else {
            Err(DeviceError::SessionAlreadyExists(server))
        }
    }

    /// Add a new client, and send it everything this router would advertise.
    pub(crate) fn add_ibgp_client(
        &mut self,
        client: RouterId,
        queue: &mut EventQueue,
    ) -> Result<(), DeviceError> {
        if !self.sessions.add_client(client) {
            return Err(DeviceError::SessionAlreadyExists(client));
        }
        match self.role {
            RouterRole::Border if !self.ebgp_prefixes.is_empty() => queue.push_back(Event::Bgp(
                self.router_id,
                client,
                BgpEvent::Update(self.draft_ibgp_ad()),
            )),
            RouterRole::Reflector => {
                for (gate, dest) in self.best_gates()? {
                    let ad = Advertisement { dest, gate, advertiser: self.router_id };
                    queue.push_back(Event::Bgp(self.router_id, client, BgpEvent::Update(ad)));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Remove a client. The client is responsible for cleaning its own store.
    pub(crate) fn remove_ibgp_client(&mut self, client: RouterId) -> Result<(), DeviceError> {
        if self.sessions.remove_client(client) {
            Ok(())
        } else {
            Err(DeviceError::UnknownPeer(client))
        }
    }

    /// Remove a server, and drop everything learned from it.
    pub(crate) fn remove_ibgp_server(
        &mut self,
        server: RouterId,
        queue: &mut EventQueue,
    ) -> Result<(), DeviceError> {
        if !self.sessions.remove_server(server) {
            return Err(DeviceError::UnknownPeer(server));
        }
        let withdrawals = self.remove_ibgp_ad(None, server)?;
        if self.role == RouterRole::Reflector {
            self.propagate_withdrawals(withdrawals, Some(server), queue);
        }
        Ok(())
    }

    // -----------------
    // Private Functions
    // -----------------

    /// Select the best route for a single prefix and write it into the routing table. Static
    /// entries are never touched, and originated prefixes always leave the network here. Returns
    /// the best gate among the stored advertisements.
    fn install_prefix_route(&mut self, prefix: Prefix) -> Result<Option<RouterId>, DeviceError> {
        let dst = Destination::Prefix(prefix);
        let best = self.opt_ibgp_route(prefix)?;
        if self.static_routes.contains(&dst) {
            return Ok(best);
        }
        if self.ebgp_prefixes.contains(&prefix) {
            self.routing_table.insert(dst, None);
            return Ok(best);
        }
        let entry = match best {
            Some(gate) if gate == self.router_id => Some(None),
            Some(gate) => self.routing_table.get(&Destination::Router(gate)).cloned(),
            None => None,
        };
        match entry {
            Some(next_hop) => self.routing_table.insert(dst, next_hop),
            None => self.routing_table.remove(&dst),
        };
        Ok(best)
    }

    /// Remove all matching advertisements for the given prefixes and select the routes again.
    fn remove_ads_for<F>(
        &mut self,
        prefixes: &[Prefix],
        matches: F,
    ) -> Result<Vec<Withdrawal>, DeviceError>
    where
        F: Fn(&AdEntry) -> bool,
    {
        let mut result = Vec::new();
        for prefix in prefixes {
            let remaining = match self.ibgp_ads.get_mut(prefix) {
                Some(entries) => {
                    let len = entries.len();
                    entries.retain(|e| !matches(e));
                    if entries.len() == len {
                        continue;
                    }
                    entries.len()
                }
                None => continue,
            };
            if remaining == 0 {
                self.ibgp_ads.remove(prefix);
            }
            result.push(match self.install_prefix_route(*prefix)? {
                Some(gate) => Withdrawal::Replaced(*prefix, gate),
                None => Withdrawal::Lost(*prefix),
            });
        }
        Ok(result)
    }

    /// Best gate for every stored prefix, grouped by the gate.
    fn best_gates(&self) -> Result<BTreeMap<RouterId, Vec<Prefix>>, DeviceError> {
        let mut result: BTreeMap<RouterId, Vec<Prefix>> = BTreeMap::new();
        for prefix in self.get_known_prefixes() {
            if let Some(gate) = self.opt_ibgp_route(prefix)? {
                result.entry(gate).or_default().push(prefix);
            }
        }
        Ok(result)
    }

    /// Send an update to all clients, except `skip`.
    fn send_update(&self, ad: Advertisement, skip: Option<RouterId>, queue: &mut EventQueue) {
        for client in self.sessions.clients().iter().filter(|c| Some(**c) != skip) {
            queue.push_back(Event::Bgp(self.router_id, *client, BgpEvent::Update(ad.clone())));
        }
    }

    /// Tell all clients (except `skip`) about removed advertisements. Lost prefixes are withdrawn,
    /// and for all others, the new best gate is advertised.
    fn propagate_withdrawals(
        &self,
        withdrawals: Vec<Withdrawal>,
        skip: Option<RouterId>,
        queue: &mut EventQueue,
    ) {
        let mut lost: Vec<Prefix> = Vec::new();
        let mut replaced: BTreeMap<RouterId, Vec<Prefix>> = BTreeMap::new();
        for w in withdrawals {
            match w {
                Withdrawal::Lost(p) => lost.push(p),
                Withdrawal::Replaced(p, gate) => replaced.entry(gate).or_default().push(p),
            }
        }
        if !lost.is_empty() {
            for client in self.sessions.clients().iter().filter(|c| Some(**c) != skip) {
                queue.push_back(Event::Bgp(
                    self.router_id,
                    *client,
                    BgpEvent::Withdraw(lost.clone()),
                ));
            }
        }
        for (gate, dest) in replaced {
            let ad = Advertisement { dest, gate, advertiser: self.router_id };
            self.send_update(ad, skip, queue);
        }
    }
}
