//! Dijkstra's shortest paths.
//!
//! Uses a binary heap with lazy deletion: improving a distance pushes a new
//! entry, and entries for already finished nodes are skipped when popped.
//! `visited` holds every node with a finite distance, `finished` the settled
//! ones. Distances saturate instead of overflowing.

use stepgraph_model::NodeId;

use crate::recorder::Recorder;
use crate::{Relaxation, StepKind};

fn show(distance: Option<u64>) -> String {
    distance.map_or_else(|| "∞".to_owned(), |d| d.to_string())
}

pub(crate) fn record(recorder: &mut Recorder<'_>, start: NodeId) {
    let graph = recorder.graph();

    recorder.push(StepKind::Enter, 0, &start, format!("starting Dijkstra at {start}"));
    recorder.set_distance(&start, 0);
    recorder.visit(&start);
    recorder.push(StepKind::MarkVisited, 1, &start, format!("dist[{start}] = 0, inserted into queue"));

    while let Some((d, u)) = recorder.extract_min() {
        recorder.push(StepKind::ExtractMin, 3, &u, format!("extracted {u} with distance {d}"));

        if recorder.is_finished(&u) {
            recorder.push(StepKind::SkipSettled, 4, &u, format!("{u} is already finished, skipping"));
            continue;
        }

        for edge in graph.edges(u.as_str()).unwrap_or_default() {
            let v = &edge.target;
            recorder.push(
                StepKind::ExamineNeighbor,
                5,
                v,
                format!("examining edge {u} -> {v} (weight {})", edge.weight),
            );

            let before = recorder.distance(v);
            let candidate = d.saturating_add(u64::from(edge.weight));
            let improves = before.map_or(true, |b| candidate < b);

            let (line, message) = if improves {
                recorder.set_distance(v, candidate);
                recorder.visit(v);
                (7, format!("relaxing edge {u} -> {v}: {} -> {candidate}", show(before)))
            } else {
                (6, format!("edge {u} -> {v} does not improve {v}: keeps {} (candidate {candidate})", show(before)))
            };

            let relaxation = Relaxation {
                from: u.clone(),
                to: v.clone(),
                weight: edge.weight,
                before,
                candidate,
                after: recorder.distance(v),
            };
            recorder.push_relaxation(line, relaxation, message);
        }

        recorder.push(StepKind::Exhausted, 8, &u, format!("all edges of {u} relaxed"));
        recorder.finish(&u);
        recorder.push(StepKind::Finalize, 8, &u, format!("finalizing {u} at distance {d}"));
    }
}
