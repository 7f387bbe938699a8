//! Error types for graph construction and text parsing.

use thiserror::Error;

use crate::NodeId;

/// Structural errors raised when building or editing a [`GraphModel`](crate::GraphModel).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An edge names a node that does not exist.
    #[error("edge {from} -> {target} points at unknown node {target}")]
    UnknownTarget { from: NodeId, target: NodeId },

    /// A node identifier appears more than once.
    #[error("duplicate node {0}")]
    DuplicateNode(NodeId),

    /// An edit referred to a node that does not exist.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// An edit referred to an edge that does not exist.
    #[error("no edge {from} -> {to}")]
    MissingEdge { from: NodeId, to: NodeId },
}

/// What went wrong while parsing graph text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
    /// A token that does not fit the grammar at this position.
    #[error("unexpected token")]
    UnexpectedToken,

    /// Input ended in the middle of an entry.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A weight that is not a non-negative integer.
    #[error("invalid weight")]
    InvalidWeight,

    /// An edge target that names no declared node.
    #[error("unknown edge target")]
    UnknownTarget,

    /// A node declared twice.
    #[error("duplicate node")]
    DuplicateNode,

    /// Text that declares no nodes at all.
    #[error("empty graph")]
    EmptyGraph,
}

/// A parse failure, naming the offending token and its 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} `{token}` at line {line}")]
pub struct FormatError {
    pub kind: FormatErrorKind,
    pub token: String,
    pub line: usize,
}

impl FormatError {
    pub(crate) fn new(kind: FormatErrorKind, token: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            token: token.into(),
            line,
        }
    }
}
