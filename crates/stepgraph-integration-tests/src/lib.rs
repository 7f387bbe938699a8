//! Shared fixtures for the end-to-end tests.

use stepgraph_model::{EdgeSpec, GraphDefinition, GraphModel, GraphError};

/// The four-node tree used throughout the docs.
pub const REFERENCE_GRAPH: &str = "A: [B, C]\nB: [D]\nC: []\nD: []";

/// A weighted graph where the direct edge is not the shortest path.
pub const WEIGHTED_GRAPH: &str = "\
S: [[A, 7], [B, 2]]
A: [[T, 1]]
B: [[A, 3], [T, 9]]
T: []
";

/// `n0 -> n1 -> ... -> n{len-1}`.
pub fn chain(len: usize) -> Result<GraphModel, GraphError> {
    let mut def = GraphDefinition::directed();
    for i in 0..len {
        let edges = if i + 1 < len {
            vec![EdgeSpec::to(format!("n{}", i + 1))]
        } else {
            Vec::new()
        };
        def = def.node(format!("n{i}"), edges);
    }
    GraphModel::load(def)
}
