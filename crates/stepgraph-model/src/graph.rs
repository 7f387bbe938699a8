//! The validated graph model and its edits.

use indexmap::IndexMap;
use tracing::debug;

use crate::{GraphError, NodeId};

/// Weight given to edges declared without one.
pub const DEFAULT_WEIGHT: u32 = 1;

/// An outgoing edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub target: NodeId,
    pub weight: u32,
}

/// An edge as written by a caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeSpec {
    pub target: String,
    pub weight: Option<u32>,
}

impl EdgeSpec {
    /// An unweighted edge.
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            weight: None,
        }
    }

    /// A weighted edge.
    pub fn weighted(target: impl Into<String>, weight: u32) -> Self {
        Self {
            target: target.into(),
            weight: Some(weight),
        }
    }
}

impl From<&str> for EdgeSpec {
    fn from(target: &str) -> Self {
        Self::to(target)
    }
}

/// Unvalidated input to [`GraphModel::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphDefinition {
    pub directed: bool,
    pub nodes: Vec<(String, Vec<EdgeSpec>)>,
}

impl GraphDefinition {
    /// An empty directed definition.
    pub fn directed() -> Self {
        Self {
            directed: true,
            nodes: Vec::new(),
        }
    }

    /// An empty undirected definition.
    pub fn undirected() -> Self {
        Self {
            directed: false,
            nodes: Vec::new(),
        }
    }

    /// Append a node with its edges in declaration order.
    pub fn node<I, E>(mut self, id: impl Into<String>, edges: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<EdgeSpec>,
    {
        self.nodes.push((id.into(), edges.into_iter().map(Into::into).collect()));
        self
    }
}

/// A single structural change applied by [`GraphModel::with_edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", rename_all = "snake_case"))]
pub enum GraphEdit {
    AddNode { id: String },
    /// Removes the node and every edge pointing at it.
    RemoveNode { id: String },
    /// Appends an edge after the node's existing edges.
    AddEdge { from: String, to: String, weight: Option<u32> },
    /// Removes the first edge `from -> to`.
    RemoveEdge { from: String, to: String },
    SetWeight { from: String, to: String, weight: u32 },
    SetDirected { directed: bool },
}

/// A validated graph.
///
/// Every edge target names an existing node, identifiers are unique and
/// each node's edges keep their declared order. Node iteration follows
/// declaration order; equality ignores it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphModel {
    directed: bool,
    adjacency: IndexMap<NodeId, Vec<Edge>>,
}

impl GraphModel {
    /// Validate a definition and build a model from it.
    pub fn load(definition: GraphDefinition) -> Result<Self, GraphError> {
        let mut adjacency: IndexMap<NodeId, Vec<Edge>> = IndexMap::with_capacity(definition.nodes.len());

        for (id, edges) in definition.nodes {
            let id = NodeId::from(id);
            if adjacency.contains_key(&id) {
                return Err(GraphError::DuplicateNode(id));
            }
            let edges = edges
                .into_iter()
                .map(|spec| Edge {
                    target: NodeId::from(spec.target),
                    weight: spec.weight.unwrap_or(DEFAULT_WEIGHT),
                })
                .collect();
            adjacency.insert(id, edges);
        }

        for (from, edges) in &adjacency {
            if let Some(edge) = edges.iter().find(|e| !adjacency.contains_key(&e.target)) {
                return Err(GraphError::UnknownTarget {
                    from: from.clone(),
                    target: edge.target.clone(),
                });
            }
        }

        let graph = Self::from_parts(definition.directed, adjacency);
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            directed = graph.directed,
            "loaded graph"
        );
        Ok(graph)
    }

    /// Build a model whose invariants the caller has already checked.
    pub(crate) fn from_parts(directed: bool, adjacency: IndexMap<NodeId, Vec<Edge>>) -> Self {
        Self { directed, adjacency }
    }

    /// Return a new model with `edit` applied. The receiver is untouched.
    pub fn with_edit(&self, edit: GraphEdit) -> Result<Self, GraphError> {
        let mut next = self.clone();

        match edit {
            GraphEdit::AddNode { id } => {
                let id = NodeId::from(id);
                if next.adjacency.contains_key(&id) {
                    return Err(GraphError::DuplicateNode(id));
                }
                next.adjacency.insert(id, Vec::new());
            }
            GraphEdit::RemoveNode { id } => {
                if next.adjacency.shift_remove(id.as_str()).is_none() {
                    return Err(GraphError::UnknownNode(id.into()));
                }
                for edges in next.adjacency.values_mut() {
                    edges.retain(|e| e.target.as_str() != id);
                }
            }
            GraphEdit::AddEdge { from, to, weight } => {
                if !next.adjacency.contains_key(to.as_str()) {
                    return Err(GraphError::UnknownTarget {
                        from: from.into(),
                        target: to.into(),
                    });
                }
                let edges = next.edges_mut(&from)?;
                edges.push(Edge {
                    target: to.into(),
                    weight: weight.unwrap_or(DEFAULT_WEIGHT),
                });
            }
            GraphEdit::RemoveEdge { from, to } => {
                let edges = next.edges_mut(&from)?;
                match edges.iter().position(|e| e.target.as_str() == to) {
                    Some(pos) => {
                        edges.remove(pos);
                    }
                    None => {
                        return Err(GraphError::MissingEdge {
                            from: from.into(),
                            to: to.into(),
                        })
                    }
                }
            }
            GraphEdit::SetWeight { from, to, weight } => {
                let edges = next.edges_mut(&from)?;
                match edges.iter_mut().find(|e| e.target.as_str() == to) {
                    Some(edge) => edge.weight = weight,
                    None => {
                        return Err(GraphError::MissingEdge {
                            from: from.into(),
                            to: to.into(),
                        })
                    }
                }
            }
            GraphEdit::SetDirected { directed } => next.directed = directed,
        }

        debug!(nodes = next.node_count(), edges = next.edge_count(), "applied graph edit");
        Ok(next)
    }

    fn edges_mut(&mut self, id: &str) -> Result<&mut Vec<Edge>, GraphError> {
        self.adjacency
            .get_mut(id)
            .ok_or_else(|| GraphError::UnknownNode(id.into()))
    }

    /// The lexicographically smallest node id, if any.
    pub fn default_start(&self) -> Option<&NodeId> {
        self.adjacency.keys().min()
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    /// Outgoing edges of `id` in declared order, or `None` for unknown nodes.
    pub fn edges(&self, id: &str) -> Option<&[Edge]> {
        self.adjacency.get(id).map(Vec::as_slice)
    }

    /// Nodes with their edges, in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &[Edge])> + '_ {
        self.adjacency.iter().map(|(id, edges)| (id, edges.as_slice()))
    }

    /// Node ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.adjacency.keys()
    }

    /// Node ids in lexicographic order.
    pub fn sorted_ids(&self) -> Vec<&NodeId> {
        let mut ids: Vec<_> = self.adjacency.keys().collect();
        ids.sort();
        ids
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Whether edges are one-way. Traversals always follow edges as declared;
    /// the flag only tells renderers how to draw them.
    pub fn is_directed(&self) -> bool {
        self.directed
    }
}
