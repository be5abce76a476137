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

//! Directed acyclic graph of tasks, bounded by a `Source` and a `Sink` node. The `Source` is done
//! from the start, and the `Sink` becomes ready once every task is done.

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::visit::Dfs;
use petgraph::Directed;
use petgraph::Direction::{Incoming, Outgoing};
use std::fmt::Debug;
use thiserror::Error;

/// Value of a node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot<T> {
    /// Start of the graph, done from the beginning
    Source,
    /// End of the graph
    Sink,
    /// Actual task
    Task(T),
}

/// Errors of the dependency graph
#[derive(Error, Debug, PartialEq)]
pub enum DagError<T: Debug> {
    /// The task is already part of the graph
    #[error("Node {0:?} already exists in the DAG")]
    NodeAlreadyExists(T),
    /// The node is not part of the graph
    #[error("Node {0:?} does not exist in the DAG")]
    NodeDoesNotExist(Slot<T>),
    /// A dependency cannot be added to a node which is already done
    #[error("Node {0:?} is already done")]
    AlreadyDone(Slot<T>),
    /// `Sink` cannot precede, and `Source` cannot follow a task
    #[error("Invalid dependency on {0:?}")]
    InvalidEdge(Slot<T>),
    /// The task still waits for some predecessor
    #[error("Task {0:?} is not ready")]
    NotReady(T),
    /// The new dependencies would close a cycle
    #[error("Found a cycle in the DAG")]
    DagHasCycle,
}

#[derive(Debug, Clone)]
struct DagNode<T> {
    value: Slot<T>,
    /// node is completed
    done: bool,
    /// number of completed predecessors
    done_preds: usize,
    /// all predecessors are completed
    ready: bool,
}

impl<T> DagNode<T> {
    fn new(value: Slot<T>) -> Self {
        Self { value, done: false, done_preds: 0, ready: false }
    }
}

/// # Dependency Graph
///
/// Tasks are inserted between existing nodes using [`DependencyGraph::add_node`]. If a new task is
/// placed between `p` and `n`, and `p` directly precedes `n`, the direct edge is replaced by the
/// path through the new task. Tasks are looked up by their value, which must be unique.
///
/// ```
/// use netsynth::scheduler::{DependencyGraph, Slot};
///
/// # fn main() -> Result<(), netsynth::scheduler::DagError<usize>> {
/// let mut dag = DependencyGraph::new();
/// dag.add_node(&[Slot::Source], 0, &[Slot::Sink])?;
/// dag.add_node(&[Slot::Task(0)], 1, &[Slot::Sink])?;
/// dag.add_node(&[Slot::Source], 2, &[Slot::Sink])?;
///
/// assert_eq!(dag.schedule()?, vec![vec![0, 2], vec![1]]);
/// assert!(dag.is_complete());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DependencyGraph<T> {
    graph: StableGraph<DagNode<T>, (), Directed>,
    source: NodeIndex,
    sink: NodeIndex,
    frontier: Vec<NodeIndex>,
}

impl<T: Clone + PartialEq + Debug> Default for DependencyGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + Debug> DependencyGraph<T> {
    /// Create a graph containing only the `Source` and the `Sink`.
    pub fn new() -> Self {
        let mut graph = StableGraph::default();
        let mut source_node = DagNode::new(Slot::Source);
        source_node.done = true;
        source_node.ready = true;
        let source = graph.add_node(source_node);
        let sink = graph.add_node(DagNode::new(Slot::Sink));
        graph.add_edge(source, sink, ());
        let mut dag = Self { graph, source, sink, frontier: Vec::new() };
        dag.graph[sink].done_preds = 1;
        dag.refresh(sink);
        dag
    }

    /// Insert `value` as a new task, after all nodes in `prev` and before all nodes in `next`.
    /// An empty `prev` means `Source`, and an empty `next` means `Sink`. Direct edges from any
    /// node in `prev` to any node in `next` are removed.
    pub fn add_node(
        &mut self,
        prev: &[Slot<T>],
        value: T,
        next: &[Slot<T>],
    ) -> Result<(), DagError<T>> {
        if self.find(&Slot::Task(value.clone())).is_some() {
            return Err(DagError::NodeAlreadyExists(value));
        }
        let prevs = if prev.is_empty() { vec![self.source] } else { self.resolve(prev)? };
        let nexts = if next.is_empty() { vec![self.sink] } else { self.resolve(next)? };

        for p in prevs.iter() {
            if *p == self.sink {
                return Err(DagError::InvalidEdge(Slot::Sink));
            }
        }
        for n in nexts.iter() {
            if *n == self.source {
                return Err(DagError::InvalidEdge(Slot::Source));
            }
            if self.graph[*n].done {
                return Err(DagError::AlreadyDone(self.graph[*n].value.clone()));
            }
            // the new node closes a cycle if some successor already reaches a predecessor
            let mut dfs = Dfs::new(&self.graph, *n);
            while let Some(x) = dfs.next(&self.graph) {
                if prevs.contains(&x) {
                    return Err(DagError::DagHasCycle);
                }
            }
        }

        let idx = self.graph.add_node(DagNode::new(Slot::Task(value)));
        for p in prevs.iter() {
            for n in nexts.iter() {
                if let Some(e) = self.graph.find_edge(*p, *n) {
                    self.graph.remove_edge(e);
                    if self.graph[*p].done {
                        self.graph[*n].done_preds -= 1;
                    }
                }
            }
            self.graph.add_edge(*p, idx, ());
            if self.graph[*p].done {
                self.graph[idx].done_preds += 1;
            }
        }
        for n in nexts.iter() {
            self.graph.add_edge(idx, *n, ());
            self.refresh(*n);
        }
        self.refresh(idx);
        if self.graph[idx].done_preds > 0 {
            self.frontier.push(idx);
        }
        Ok(())
    }

    /// Returns all tasks which are not yet done, but whose predecessors are all done. The tasks
    /// are returned in the order in which they entered the frontier.
    pub fn get_ready_tasks(&self) -> Vec<T> {
        self.frontier
            .iter()
            .map(|idx| &self.graph[*idx])
            .filter(|node| node.ready && !node.done)
            .filter_map(|node| match &node.value {
                Slot::Task(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    /// Mark a ready task as done, and update all of its successors.
    pub fn mark_task_done(&mut self, value: &T) -> Result<(), DagError<T>> {
        let idx = self
            .find(&Slot::Task(value.clone()))
            .ok_or_else(|| DagError::NodeDoesNotExist(Slot::Task(value.clone())))?;
        if self.graph[idx].done {
            return Err(DagError::AlreadyDone(Slot::Task(value.clone())));
        }
        if !self.graph[idx].ready {
            return Err(DagError::NotReady(value.clone()));
        }
        self.graph[idx].done = true;
        self.frontier.retain(|x| *x != idx);
        let successors: Vec<NodeIndex> = self.graph.neighbors_directed(idx, Outgoing).collect();
        for s in successors {
            self.graph[s].done_preds += 1;
            self.refresh(s);
            if !self.frontier.contains(&s) {
                self.frontier.push(s);
            }
        }
        Ok(())
    }

    /// Release all tasks wave by wave until nothing is ready anymore. Every wave contains the
    /// tasks that were ready at the same time.
    pub fn schedule(&mut self) -> Result<Vec<Vec<T>>, DagError<T>> {
        let mut waves = Vec::new();
        loop {
            let ready = self.get_ready_tasks();
            if ready.is_empty() {
                break;
            }
            for task in ready.iter() {
                self.mark_task_done(task)?;
            }
            waves.push(ready);
        }
        Ok(waves)
    }

    /// Returns true once every predecessor of the `Sink` is done.
    pub fn is_complete(&self) -> bool {
        self.graph[self.sink].ready
    }

    /// Returns true if the task is part of the graph.
    pub fn contains(&self, value: &T) -> bool {
        self.find(&Slot::Task(value.clone())).is_some()
    }

    /// Returns `Some(true)` if the task is done, and `None` if it does not exist.
    pub fn is_done(&self, value: &T) -> Option<bool> {
        self.find(&Slot::Task(value.clone())).map(|idx| self.graph[idx].done)
    }

    /// Number of tasks in the graph
    pub fn len(&self) -> usize {
        self.graph.node_count() - 2
    }

    /// Returns true if the graph has no tasks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth-first search from the `Source` for the node carrying `value`.
    fn find(&self, value: &Slot<T>) -> Option<NodeIndex> {
        match value {
            Slot::Source => Some(self.source),
            Slot::Sink => Some(self.sink),
            Slot::Task(_) => {
                let mut dfs = Dfs::new(&self.graph, self.source);
                while let Some(idx) = dfs.next(&self.graph) {
                    if &self.graph[idx].value == value {
                        return Some(idx);
                    }
                }
                None
            }
        }
    }

    fn resolve(&self, values: &[Slot<T>]) -> Result<Vec<NodeIndex>, DagError<T>> {
        let mut result = Vec::with_capacity(values.len());
        for v in values {
            let idx = self.find(v).ok_or_else(|| DagError::NodeDoesNotExist(v.clone()))?;
            if !result.contains(&idx) {
                result.push(idx);
            }
        }
        Ok(result)
    }

    fn refresh(&mut self, idx: NodeIndex) {
        let in_degree = self.graph.neighbors_directed(idx, Incoming).count();
        let node = &mut self.graph[idx];
        node.ready = node.done_preds == in_degree;
    }
}
