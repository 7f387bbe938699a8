//! Working state shared by all traversals, and the public entry point.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque};

use stepgraph_model::{GraphModel, NodeId};
use tracing::{debug, info};

use crate::snapshot::{History, QueueEntry, Relaxation, Snapshot, StepKind};
use crate::{bfs, dfs, dijkstra, Algorithm};

const INITIAL_MESSAGE: &str = "ready to start";
const COMPLETE_MESSAGE: &str = "traversal complete";

/// Mutable state of a traversal in progress. Every `push` copies it into a
/// fresh [`Snapshot`].
pub(crate) struct Recorder<'g> {
    graph: &'g GraphModel,
    visited: BTreeSet<NodeId>,
    finished: BTreeSet<NodeId>,
    finished_order: Vec<NodeId>,
    queue: Option<VecDeque<NodeId>>,
    distances: Option<BTreeMap<NodeId, Option<u64>>>,
    heap: Option<BinaryHeap<Reverse<(u64, NodeId)>>>,
    snapshots: Vec<Snapshot>,
}

impl<'g> Recorder<'g> {
    fn new(graph: &'g GraphModel, algorithm: Algorithm) -> Self {
        let (queue, distances, heap) = match algorithm {
            Algorithm::DepthFirst => (None, None, None),
            Algorithm::BreadthFirst => (Some(VecDeque::new()), None, None),
            Algorithm::Dijkstra => (
                None,
                Some(graph.ids().map(|id| (id.clone(), None)).collect()),
                Some(BinaryHeap::new()),
            ),
        };

        Self {
            graph,
            visited: BTreeSet::new(),
            finished: BTreeSet::new(),
            finished_order: Vec::new(),
            queue,
            distances,
            heap,
            snapshots: Vec::new(),
        }
    }

    pub(crate) fn graph(&self) -> &'g GraphModel {
        self.graph
    }

    pub(crate) fn is_visited(&self, id: &NodeId) -> bool {
        self.visited.contains(id)
    }

    pub(crate) fn is_finished(&self, id: &NodeId) -> bool {
        self.finished.contains(id)
    }

    pub(crate) fn visit(&mut self, id: &NodeId) {
        self.visited.insert(id.clone());
    }

    pub(crate) fn finish(&mut self, id: &NodeId) {
        if self.finished.insert(id.clone()) {
            self.finished_order.push(id.clone());
        }
    }

    pub(crate) fn enqueue(&mut self, id: &NodeId) {
        if let Some(queue) = self.queue.as_mut() {
            queue.push_back(id.clone());
        }
    }

    pub(crate) fn dequeue(&mut self) -> Option<NodeId> {
        self.queue.as_mut().and_then(VecDeque::pop_front)
    }

    /// Tentative distance of `id`; `None` while unreachable.
    pub(crate) fn distance(&self, id: &NodeId) -> Option<u64> {
        self.distances.as_ref().and_then(|d| d.get(id).copied().flatten())
    }

    pub(crate) fn set_distance(&mut self, id: &NodeId, distance: u64) {
        if let Some(distances) = self.distances.as_mut() {
            distances.insert(id.clone(), Some(distance));
        }
        if let Some(heap) = self.heap.as_mut() {
            heap.push(Reverse((distance, id.clone())));
        }
    }

    /// Pop the smallest `(distance, node)` entry, ties broken by node id.
    pub(crate) fn extract_min(&mut self) -> Option<(u64, NodeId)> {
        self.heap.as_mut().and_then(BinaryHeap::pop).map(|Reverse(entry)| entry)
    }

    /// Record the current working state.
    pub(crate) fn push(&mut self, kind: StepKind, line: usize, active: &NodeId, message: String) {
        self.push_with(kind, Some(line), Some(active.clone()), message, None);
    }

    pub(crate) fn push_relaxation(&mut self, line: usize, relaxation: Relaxation, message: String) {
        let active = relaxation.to.clone();
        self.push_with(StepKind::Relax, Some(line), Some(active), message, Some(relaxation));
    }

    fn push_with(
        &mut self,
        kind: StepKind,
        line: Option<usize>,
        active: Option<NodeId>,
        message: String,
        relaxation: Option<Relaxation>,
    ) {
        let priority_queue = self.heap.as_ref().map(|heap| {
            let mut entries: Vec<_> = heap
                .iter()
                .map(|Reverse((distance, node))| QueueEntry {
                    node: node.clone(),
                    distance: *distance,
                })
                .collect();
            entries.sort_by(|a, b| (a.distance, &a.node).cmp(&(b.distance, &b.node)));
            entries
        });

        self.snapshots.push(Snapshot {
            kind,
            visited: self.visited.clone(),
            finished: self.finished.clone(),
            finished_order: self.finished_order.clone(),
            active,
            line,
            message,
            queue: self.queue.as_ref().map(|q| q.iter().cloned().collect()),
            distances: self.distances.clone(),
            priority_queue,
            relaxation,
        });
    }
}

/// Record `algorithm` running on `graph` from `start`.
///
/// Never fails. When `start` is not a node of `graph` the history holds only
/// the initial and terminal snapshots; validating the start is up to the
/// caller.
pub fn run(graph: &GraphModel, start: &str, algorithm: Algorithm) -> History {
    let mut recorder = Recorder::new(graph, algorithm);
    recorder.push_with(StepKind::Initial, None, None, INITIAL_MESSAGE.to_owned(), None);

    let start = NodeId::from(start);
    if graph.contains(start.as_str()) {
        match algorithm {
            Algorithm::DepthFirst => dfs::record(&mut recorder, start.clone()),
            Algorithm::BreadthFirst => bfs::record(&mut recorder, start.clone()),
            Algorithm::Dijkstra => dijkstra::record(&mut recorder, start.clone()),
        }
    } else {
        debug!(%start, "start node not in graph, recording empty traversal");
    }

    recorder.push_with(StepKind::Complete, None, None, COMPLETE_MESSAGE.to_owned(), None);

    info!(
        algorithm = algorithm.key(),
        %start,
        snapshots = recorder.snapshots.len(),
        finished = recorder.finished_order.len(),
        "recorded traversal"
    );
    History::new(algorithm, start, recorder.snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stepgraph_model::{parse, EdgeSpec, GraphDefinition};

    #[test]
    fn missing_start_yields_two_snapshots() {
        let graph = parse("A: [B]\nB: []").unwrap();

        for algorithm in Algorithm::ALL {
            let history = run(&graph, "Z", algorithm);
            assert_eq!(history.len(), 2);
            assert_eq!(history.first().kind, StepKind::Initial);
            assert!(history.last().is_terminal());
            assert!(history.last().visited.is_empty());
        }
    }

    #[test]
    fn initial_snapshot_is_empty() {
        let graph = parse("A: [B]\nB: []").unwrap();
        let first = run(&graph, "A", Algorithm::DepthFirst).first().clone();

        assert!(first.visited.is_empty());
        assert!(first.finished.is_empty());
        assert!(first.finished_order.is_empty());
        assert_eq!(first.active, None);
        assert_eq!(first.line, None);
        assert_eq!(first.message, INITIAL_MESSAGE);
    }

    #[test]
    fn algorithm_fields_only_where_relevant() {
        let graph = parse("A: [B]\nB: []").unwrap();

        let dfs = run(&graph, "A", Algorithm::DepthFirst);
        assert!(dfs.iter().all(|s| s.queue.is_none() && s.distances.is_none()));

        let bfs = run(&graph, "A", Algorithm::BreadthFirst);
        assert!(bfs.iter().all(|s| s.queue.is_some() && s.distances.is_none()));

        let dijkstra = run(&graph, "A", Algorithm::Dijkstra);
        assert!(dijkstra
            .iter()
            .all(|s| s.distances.is_some() && s.priority_queue.is_some() && s.queue.is_none()));
    }

    #[test]
    fn long_chain_finishes_deepest_first() {
        let n = 500;
        let mut def = GraphDefinition::directed();
        for i in 0..n {
            let edges: Vec<EdgeSpec> = if i + 1 < n {
                vec![EdgeSpec::to(format!("n{:03}", i + 1))]
            } else {
                Vec::new()
            };
            def = def.node(format!("n{i:03}"), edges);
        }
        let graph = GraphModel::load(def).unwrap();

        let history = run(&graph, "n000", Algorithm::DepthFirst);
        let order = &history.last().finished_order;
        assert_eq!(order.len(), n);
        assert_eq!(order[0].as_str(), "n499");
        assert_eq!(order[n - 1].as_str(), "n000");
    }

    fn arb_graph() -> impl Strategy<Value = GraphModel> {
        (1usize..7)
            .prop_flat_map(|n| {
                prop::collection::vec(prop::collection::vec((0..n, 0u32..20), 0..4), n)
            })
            .prop_map(|adjacency| {
                let mut def = GraphDefinition::directed();
                for (i, out) in adjacency.into_iter().enumerate() {
                    let edges: Vec<_> = out
                        .into_iter()
                        .map(|(t, w)| EdgeSpec::weighted(format!("v{t}"), w))
                        .collect();
                    def = def.node(format!("v{i}"), edges);
                }
                GraphModel::load(def).unwrap()
            })
    }

    proptest! {
        #[test]
        fn recording_is_deterministic(graph in arb_graph(), pick in 0usize..3) {
            let algorithm = Algorithm::ALL[pick];
            let a = run(&graph, "v0", algorithm);
            let b = run(&graph, "v0", algorithm);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn every_reachable_node_finishes_once(graph in arb_graph(), pick in 0usize..3) {
            let history = run(&graph, "v0", Algorithm::ALL[pick]);
            let last = history.last();
            let unique: BTreeSet<_> = last.finished_order.iter().collect();
            prop_assert_eq!(unique.len(), last.finished_order.len());
            prop_assert_eq!(&last.visited, &last.finished);
        }

        #[test]
        fn snapshots_grow_monotonically(graph in arb_graph()) {
            let history = run(&graph, "v0", Algorithm::DepthFirst);
            for pair in history.snapshots().windows(2) {
                prop_assert!(pair[0].visited.is_subset(&pair[1].visited));
                prop_assert!(pair[1].finished_order.starts_with(&pair[0].finished_order));
            }
        }
    }
}
