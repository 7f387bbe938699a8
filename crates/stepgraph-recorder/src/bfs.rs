//! Breadth-first search.
//!
//! Instead of descending, unvisited neighbors are marked and enqueued; every
//! snapshot carries the FIFO contents, front first.

use stepgraph_model::NodeId;

use crate::recorder::Recorder;
use crate::StepKind;

pub(crate) fn record(recorder: &mut Recorder<'_>, start: NodeId) {
    let graph = recorder.graph();

    recorder.push(StepKind::Enter, 0, &start, format!("starting breadth-first search at {start}"));
    recorder.visit(&start);
    recorder.enqueue(&start);
    recorder.push(StepKind::Enqueue, 1, &start, format!("marked {start} as visited and enqueued it"));

    while let Some(u) = recorder.dequeue() {
        recorder.push(StepKind::Dequeue, 3, &u, format!("dequeued {u}"));

        for edge in graph.edges(u.as_str()).unwrap_or_default() {
            let v = &edge.target;
            recorder.push(StepKind::ExamineNeighbor, 4, v, format!("examining neighbor {v} of {u}"));

            if recorder.is_visited(v) {
                recorder.push(StepKind::NeighborVisited, 5, v, format!("neighbor {v} already visited"));
            } else {
                recorder.push(StepKind::NeighborUnvisited, 5, v, format!("neighbor {v} is unvisited"));
                recorder.visit(v);
                recorder.enqueue(v);
                recorder.push(StepKind::Enqueue, 6, v, format!("marked {v} as visited and enqueued it"));
            }
        }

        recorder.push(StepKind::Exhausted, 7, &u, format!("all neighbors of {u} examined"));
        recorder.finish(&u);
        recorder.push(StepKind::Finalize, 7, &u, format!("finalizing {u}"));
    }
}
