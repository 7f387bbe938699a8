//! Deterministic layered layout.
//!
//! Nodes are placed in breadth-first layers from the start node. Layer `k`
//! sits on row `k`; nodes within a layer are spread evenly across the width
//! in discovery order. Nodes the start cannot reach are seeded afterwards in
//! lexicographic order and continue on the following rows. The same graph,
//! start and canvas size always produce the same positions.

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::{GraphModel, NodeId};

/// A position on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Breadth-first layers from `start`, then from each unreached node in id order.
fn layers<'a>(graph: &'a GraphModel, start: Option<&str>) -> Vec<Vec<&'a NodeId>> {
    // Undirected graphs also spread along incoming edges.
    let mut incoming: BTreeMap<&NodeId, Vec<&NodeId>> = BTreeMap::new();
    if !graph.is_directed() {
        for (from, edges) in graph.nodes() {
            for edge in edges {
                incoming.entry(&edge.target).or_default().push(from);
            }
        }
    }

    let mut seeds: Vec<&NodeId> = start
        .and_then(|s| graph.ids().find(|id| id.as_str() == s))
        .into_iter()
        .collect();
    seeds.extend(graph.sorted_ids());

    let mut placed: HashSet<&NodeId> = HashSet::new();
    let mut layers: Vec<Vec<&NodeId>> = Vec::new();

    for seed in seeds {
        if !placed.insert(seed) {
            continue;
        }
        let base = layers.len();
        let mut queue = VecDeque::from([(seed, 0usize)]);

        while let Some((node, depth)) = queue.pop_front() {
            if layers.len() <= base + depth {
                layers.push(Vec::new());
            }
            layers[base + depth].push(node);

            let outgoing = graph.edges(node.as_str()).unwrap_or_default().iter().map(|e| &e.target);
            let reverse = incoming.get(node).into_iter().flatten().copied();
            for next in outgoing.chain(reverse) {
                if placed.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
    }

    layers
}

/// Position every node of `graph` on a `width` x `height` canvas.
pub fn layout(graph: &GraphModel, start: Option<&str>, width: f64, height: f64) -> BTreeMap<NodeId, Point> {
    let layers = layers(graph, start);
    let rows = layers.len() as f64;

    let mut positions = BTreeMap::new();
    for (row, layer) in layers.iter().enumerate() {
        let y = height * (row as f64 + 1.0) / (rows + 1.0);
        let columns = layer.len() as f64;
        for (column, id) in layer.iter().enumerate() {
            let x = width * (column as f64 + 1.0) / (columns + 1.0);
            positions.insert((*id).clone(), Point { x, y });
        }
    }
    positions
}
