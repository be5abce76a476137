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

//! # Zone Strategy

use super::Strategy;
use crate::dep_groups::path_synthesize;
use crate::hard_policies::{check_all, Policy};
use crate::netsim::config::ConfigModifier;
use crate::netsim::{printer, Network};
use crate::scheduler::{DependencyGraph, Slot};
use crate::{Error, Stopper};

use log::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// # Zone Strategy
///
/// Orders the modifiers by the zones they belong to. The constraints are:
///
/// - all interior modifiers of a zone depend on the modifiers which opened the previous zone along
///   the new path (its gateway modifier, or its interior modifiers if it has no gateway),
/// - the gateway modifier of a zone depends on all interior modifiers of the same zone (or on the
///   previous zone, if it has no interior modifiers).
///
/// Constraints of all policies are merged. Modifiers which are not part of any zone have no
/// constraint. While applying the modifiers, all policies are checked after every single step.
#[derive(Debug)]
pub struct StrategyZone {
    net: Network,
    modifiers: Vec<ConfigModifier>,
    policies: Vec<Policy>,
    dependencies: BTreeMap<usize, BTreeSet<usize>>,
    dag: DependencyGraph<usize>,
}

impl Strategy for StrategyZone {
    fn new(
        net: Network,
        modifiers: Vec<ConfigModifier>,
        policies: Vec<Policy>,
    ) -> Result<Box<Self>, Error> {
        if let Err(e) = check_all(&policies, &net) {
            error!("Invalid initial state: {}", e);
            return Err(e.into());
        }

        let mut new_net = net.clone();
        new_net.apply_config(&modifiers)?;
        if let Err(e) = check_all(&policies, &new_net) {
            error!("Policies are violated after applying all modifiers: {}", e);
            return Err(Error::NoSafeOrdering);
        }

        let mut dependencies: BTreeMap<usize, BTreeSet<usize>> =
            (0..modifiers.len()).map(|i| (i, BTreeSet::new())).collect();

        for policy in policies.iter() {
            let (src, dst) = policy.endpoints();
            let zones = path_synthesize(src, dst, &net, &new_net, &modifiers)?;
            let mut anchors: Vec<usize> = Vec::new();
            for zone in zones {
                for i in zone.interior.iter() {
                    add_dependencies(&mut dependencies, *i, &anchors);
                }
                if let Some(g) = zone.gateway {
                    if zone.interior.is_empty() {
                        add_dependencies(&mut dependencies, g, &anchors);
                    } else {
                        add_dependencies(&mut dependencies, g, &zone.interior);
                    }
                    anchors = vec![g];
                } else if !zone.interior.is_empty() {
                    anchors = zone.interior;
                }
            }
        }

        for (i, preds) in dependencies.iter().filter(|(_, p)| !p.is_empty()) {
            debug!(
                "{} depends on {:?}",
                printer::config_modifier(&net, &modifiers[*i])
                    .unwrap_or_else(|_| format!("{:?}", modifiers[*i])),
                preds
            );
        }

        let dag = build_dag(&dependencies)?;

        Ok(Box::new(Self { net, modifiers, policies, dependencies, dag }))
    }

    fn work(&mut self, abort: Stopper) -> Result<Vec<ConfigModifier>, Error> {
        let mut net = self.net.clone();
        let mut dag = self.dag.clone();
        let mut sequence: Vec<ConfigModifier> = Vec::with_capacity(self.modifiers.len());

        loop {
            if abort.is_stop() {
                info!("Operation was aborted!");
                return Err(Error::Abort);
            }

            let mut ready = dag.get_ready_tasks();
            if ready.is_empty() {
                break;
            }
            ready.sort_unstable();

            for idx in ready {
                let modifier = &self.modifiers[idx];
                net.apply_modifier(modifier)?;
                if let Err(e) = check_all(&self.policies, &net) {
                    error!(
                        "Policy violated after {}: {}",
                        printer::config_modifier(&net, modifier)
                            .unwrap_or_else(|_| format!("{:?}", modifier)),
                        e
                    );
                    return Err(Error::NoSafeOrdering);
                }
                dag.mark_task_done(&idx)?;
                sequence.push(modifier.clone());
            }
        }

        if !dag.is_complete() {
            return Err(Error::NoSafeOrdering);
        }
        Ok(sequence)
    }
}

impl StrategyZone {
    /// Returns the predecessors of every modifier, as indices into the list of modifiers.
    pub fn dependencies(&self) -> &BTreeMap<usize, BTreeSet<usize>> {
        &self.dependencies
    }
}

fn add_dependencies(deps: &mut BTreeMap<usize, BTreeSet<usize>>, node: usize, preds: &[usize]) {
    let entry = deps.entry(node).or_insert_with(BTreeSet::new);
    entry.extend(preds.iter().filter(|p| **p != node));
}

/// Insert the modifiers in topological order. Modifiers without predecessors follow the `Source`.
fn build_dag(deps: &BTreeMap<usize, BTreeSet<usize>>) -> Result<DependencyGraph<usize>, Error> {
    let mut dag = DependencyGraph::new();
    let mut inserted: HashSet<usize> = HashSet::new();
    while inserted.len() < deps.len() {
        let next = deps
            .iter()
            .find(|(i, preds)| !inserted.contains(*i) && preds.iter().all(|p| inserted.contains(p)));
        match next {
            Some((i, preds)) => {
                let prev: Vec<Slot<usize>> = preds.iter().map(|p| Slot::Task(*p)).collect();
                dag.add_node(&prev, *i, &[Slot::Sink])?;
                inserted.insert(*i);
            }
            None => return Err(Error::CyclicDependency),
        }
    }
    Ok(dag)
}
