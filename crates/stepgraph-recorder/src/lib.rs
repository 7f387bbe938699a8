//! Stepgraph Step Recorder
//!
//! Runs a graph traversal and captures every intermediate state as an
//! immutable [`Snapshot`], producing a [`History`] a player can scrub
//! through.
//!
//! # Contract
//!
//! - `history[0]` is the untouched initial state.
//! - The last snapshot is always the terminal "traversal complete" state.
//! - A start node missing from the graph yields exactly those two snapshots.
//! - Recording is eager and deterministic: the same graph, start and
//!   algorithm always produce an identical history.
//!
//! # Usage
//!
//! ```
//! use stepgraph_model::parse;
//! use stepgraph_recorder::{run, Algorithm};
//!
//! let graph = parse("A: [B, C]\nB: [D]\nC: []\nD: []").unwrap();
//! let history = run(&graph, "A", Algorithm::DepthFirst);
//!
//! let order: Vec<_> = history.last().finished_order.iter().map(|n| n.as_str()).collect();
//! assert_eq!(order, ["D", "B", "C", "A"]);
//! ```

mod algorithm;
mod bfs;
mod dfs;
mod dijkstra;
mod recorder;
mod snapshot;

pub use algorithm::{Algorithm, UnknownAlgorithm};
pub use recorder::run;
pub use snapshot::{History, QueueEntry, Relaxation, Snapshot, StepKind};
