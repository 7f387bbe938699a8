//! Recorded traversal states.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Index;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stepgraph_model::NodeId;

use crate::Algorithm;

/// What a snapshot records. Each kind maps to one pseudocode line per algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Pre-traversal state.
    Initial,
    /// About to process a node, before any mutation.
    Enter,
    /// The node was just added to the visited set.
    MarkVisited,
    /// Looking at one outgoing edge.
    ExamineNeighbor,
    NeighborUnvisited,
    NeighborVisited,
    /// About to recurse into an unvisited neighbor.
    Descend,
    /// Back at the parent after a recursion finished.
    Return,
    /// All outgoing edges of the focused node have been examined.
    Exhausted,
    /// The node was just marked finished.
    Finalize,
    Enqueue,
    Dequeue,
    ExtractMin,
    /// A priority-queue entry for an already finished node was discarded.
    SkipSettled,
    Relax,
    /// Terminal state.
    Complete,
}

/// An entry of the Dijkstra priority queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub node: NodeId,
    pub distance: u64,
}

/// Before/after distances of one edge relaxation. `None` means unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relaxation {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: u32,
    pub before: Option<u64>,
    pub candidate: u64,
    pub after: Option<u64>,
}

impl Relaxation {
    /// Whether the tentative distance improved.
    pub fn improved(&self) -> bool {
        self.before != self.after
    }
}

/// One immutable recorded state.
///
/// Every snapshot owns its containers; later mutation of the recorder's
/// working state never shows through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub kind: StepKind,
    pub visited: BTreeSet<NodeId>,
    pub finished: BTreeSet<NodeId>,
    pub finished_order: Vec<NodeId>,
    /// Node under focus.
    pub active: Option<NodeId>,
    /// Pseudocode line, `None` for the initial and terminal snapshots.
    pub line: Option<usize>,
    pub message: String,
    /// FIFO contents, front first (breadth-first only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<Vec<NodeId>>,
    /// Tentative distances (Dijkstra only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distances: Option<BTreeMap<NodeId, Option<u64>>>,
    /// Priority queue contents, smallest first (Dijkstra only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_queue: Option<Vec<QueueEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relaxation: Option<Relaxation>,
}

impl Snapshot {
    pub fn is_terminal(&self) -> bool {
        self.kind == StepKind::Complete
    }
}

/// The full ordered output of one recording. Cheap to clone and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    algorithm: Algorithm,
    start: NodeId,
    snapshots: Arc<[Snapshot]>,
}

impl History {
    pub(crate) fn new(algorithm: Algorithm, start: NodeId, snapshots: Vec<Snapshot>) -> Self {
        debug_assert!(snapshots.len() >= 2, "history always has initial and terminal snapshots");
        Self {
            algorithm,
            start,
            snapshots: snapshots.into(),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The start node that was requested, present in the graph or not.
    pub fn start(&self) -> &NodeId {
        &self.start
    }

    /// Number of snapshots; always at least 2.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Index of the terminal snapshot.
    pub fn last_index(&self) -> usize {
        self.snapshots.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn first(&self) -> &Snapshot {
        &self.snapshots[0]
    }

    pub fn last(&self) -> &Snapshot {
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }
}

impl Index<usize> for History {
    type Output = Snapshot;

    fn index(&self, index: usize) -> &Snapshot {
        &self.snapshots[index]
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}
