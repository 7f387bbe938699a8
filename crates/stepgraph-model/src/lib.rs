//! Stepgraph Graph Model
//!
//! Validated directed/undirected weighted graphs for step-by-step traversal
//! playback.
//!
//! # Model
//!
//! A [`GraphModel`] maps node identifiers to an ordered list of outgoing
//! edges. Edge order is significant: it decides the order in which a
//! traversal examines neighbors, and therefore the exact recorded step
//! sequence. Models are immutable; [`GraphModel::with_edit`] returns a new
//! model and never touches the receiver.
//!
//! # Text Format
//!
//! ```text
//! @directed
//! A: [B, [C, 4]]
//! B: [D]
//! C: []
//! D: []
//! ```
//!
//! [`parse`] and [`serialize`] convert between this form and a model, with
//! `parse(&serialize(&g)) == Ok(g)` for every valid `g`.
//!
//! # Layout
//!
//! [`layout`] assigns every node a deterministic position on a canvas so a
//! recorded traversal never jitters between re-renders.

mod codec;
mod error;
mod graph;
mod id;
mod layout;

pub use codec::{parse, serialize};
pub use error::{FormatError, FormatErrorKind, GraphError};
pub use graph::{Edge, EdgeSpec, GraphDefinition, GraphEdit, GraphModel, DEFAULT_WEIGHT};
pub use id::NodeId;
pub use layout::{layout, Point};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_graph_lays_out_every_node() {
        let graph = parse("A: [B, C]\nB: [D]\nC: []\nD: []").unwrap();
        let start = graph.default_start().cloned();
        let positions = layout(&graph, start.as_ref().map(NodeId::as_str), 800.0, 500.0);

        assert_eq!(positions.len(), graph.node_count());
        assert_eq!(start, Some(NodeId::from("A")));
    }
}
