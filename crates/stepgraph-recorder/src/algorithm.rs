//! The closed set of recordable traversals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DFS_PSEUDOCODE: &[&str] = &[
    "DFS(u):",
    "  mark u as visited",
    "  for each v in neighbors(u):",
    "    if v is not visited:",
    "      DFS(v)",
    "  mark u as finished",
];

const BFS_PSEUDOCODE: &[&str] = &[
    "BFS(s):",
    "  mark s as visited; enqueue s",
    "  while queue is not empty:",
    "    u = dequeue()",
    "    for each v in neighbors(u):",
    "      if v is not visited:",
    "        mark v as visited; enqueue v",
    "    mark u as finished",
];

const DIJKSTRA_PSEUDOCODE: &[&str] = &[
    "Dijkstra(s):",
    "  dist[s] = 0; insert s into PQ",
    "  while PQ is not empty:",
    "    u = extract-min(PQ)",
    "    if u is finished: continue",
    "    for each (v, w) in neighbors(u):",
    "      if dist[u] + w < dist[v]:",
    "        dist[v] = dist[u] + w; insert v into PQ",
    "    mark u as finished",
];

/// A traversal the recorder knows how to run.
///
/// Adding a traversal means adding a variant here and a recorder module;
/// [`run`](crate::run) keeps the same signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    #[serde(rename = "dfs")]
    DepthFirst,
    #[serde(rename = "bfs")]
    BreadthFirst,
    #[serde(rename = "dijkstra")]
    Dijkstra,
}

impl Algorithm {
    /// Every variant, in menu order.
    pub const ALL: [Algorithm; 3] = [Algorithm::DepthFirst, Algorithm::BreadthFirst, Algorithm::Dijkstra];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::DepthFirst => "Depth-First Search",
            Algorithm::BreadthFirst => "Breadth-First Search",
            Algorithm::Dijkstra => "Dijkstra's Algorithm",
        }
    }

    /// Short identifier, as accepted by [`FromStr`].
    pub fn key(&self) -> &'static str {
        match self {
            Algorithm::DepthFirst => "dfs",
            Algorithm::BreadthFirst => "bfs",
            Algorithm::Dijkstra => "dijkstra",
        }
    }

    /// The pseudocode listing that [`Snapshot::line`](crate::Snapshot::line) indexes into.
    pub fn pseudocode(&self) -> &'static [&'static str] {
        match self {
            Algorithm::DepthFirst => DFS_PSEUDOCODE,
            Algorithm::BreadthFirst => BFS_PSEUDOCODE,
            Algorithm::Dijkstra => DIJKSTRA_PSEUDOCODE,
        }
    }

    /// Whether edge weights affect the traversal.
    pub fn is_weighted(&self) -> bool {
        matches!(self, Algorithm::Dijkstra)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an algorithm name fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown algorithm `{0}` (expected dfs, bfs or dijkstra)")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dfs" | "depth-first" | "depth_first" => Ok(Algorithm::DepthFirst),
            "bfs" | "breadth-first" | "breadth_first" => Ok(Algorithm::BreadthFirst),
            "dijkstra" => Ok(Algorithm::Dijkstra),
            _ => Err(UnknownAlgorithm(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_names() {
        assert_eq!("dfs".parse::<Algorithm>(), Ok(Algorithm::DepthFirst));
        assert_eq!("Breadth-First".parse::<Algorithm>(), Ok(Algorithm::BreadthFirst));
        assert_eq!(" dijkstra ".parse::<Algorithm>(), Ok(Algorithm::Dijkstra));
        assert_eq!("astar".parse::<Algorithm>(), Err(UnknownAlgorithm("astar".into())));
    }

    #[test]
    fn key_round_trips_through_from_str() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.key().parse::<Algorithm>(), Ok(algorithm));
        }
    }

    #[test]
    fn serde_uses_short_keys() {
        let json = serde_json::to_string(&Algorithm::BreadthFirst).unwrap();
        assert_eq!(json, "\"bfs\"");
        let parsed: Algorithm = serde_json::from_str("\"dijkstra\"").unwrap();
        assert_eq!(parsed, Algorithm::Dijkstra);
    }

    #[test]
    fn only_dijkstra_is_weighted() {
        assert!(Algorithm::Dijkstra.is_weighted());
        assert!(!Algorithm::DepthFirst.is_weighted());
        assert_eq!(Algorithm::DepthFirst.pseudocode().len(), 6);
    }
}
