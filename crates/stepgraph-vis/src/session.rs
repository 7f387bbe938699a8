//! The graph under study and its current recording.

use stepgraph_model::{GraphModel, NodeId};
use stepgraph_recorder::{run, Algorithm, History};
use thiserror::Error;
use tracing::debug;

/// Graph served when no graph file is configured.
pub const SAMPLE_GRAPH: &str = "\
# Sample graph
A: [B, [C, 4]]
B: [D, [E, 2]]
C: [[F, 1]]
D: []
E: [[F, 3], C]
F: []
";

/// Why a recording could not be made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("start node `{0}` is not in the graph")]
    UnknownStart(String),

    #[error("graph has no nodes to start from")]
    EmptyGraph,
}

/// A graph together with the history recorded on it.
#[derive(Debug, Clone)]
pub struct Session {
    graph: GraphModel,
    history: History,
}

/// An explicit start must exist; otherwise fall back to the smallest id.
fn resolve_start(graph: &GraphModel, start: Option<&str>) -> Result<NodeId, SessionError> {
    match start {
        Some(id) if graph.contains(id) => Ok(NodeId::from(id)),
        Some(id) => Err(SessionError::UnknownStart(id.to_owned())),
        None => graph.default_start().cloned().ok_or(SessionError::EmptyGraph),
    }
}

impl Session {
    /// Record `algorithm` on `graph` from `start`, or from the default start.
    pub fn new(graph: GraphModel, algorithm: Algorithm, start: Option<&str>) -> Result<Self, SessionError> {
        let start = resolve_start(&graph, start)?;
        let history = run(&graph, start.as_str(), algorithm);
        Ok(Self { graph, history })
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn algorithm(&self) -> Algorithm {
        self.history.algorithm()
    }

    pub fn start(&self) -> &NodeId {
        self.history.start()
    }

    /// Record again with a different algorithm or start.
    pub fn rerun(&mut self, algorithm: Algorithm, start: Option<&str>) -> Result<&History, SessionError> {
        let start = resolve_start(&self.graph, start)?;
        self.history = run(&self.graph, start.as_str(), algorithm);
        Ok(&self.history)
    }

    /// Swap in a new graph and record it with the current algorithm.
    ///
    /// The start is kept when the new graph still has it. A graph with no
    /// nodes records the two-snapshot empty traversal.
    pub fn replace_graph(&mut self, graph: GraphModel) -> &History {
        let start = if graph.contains(self.start().as_str()) {
            self.start().clone()
        } else {
            graph.default_start().cloned().unwrap_or_else(|| self.start().clone())
        };
        debug!(nodes = graph.node_count(), %start, "replacing session graph");

        self.history = run(&graph, start.as_str(), self.algorithm());
        self.graph = graph;
        &self.history
    }
}
