//! Depth-first search.
//!
//! Recursion is replaced by an explicit stack of `(node, edge cursor)`
//! frames, so recording depth is independent of the host call stack. The
//! emitted sequence is exactly that of the recursive form:
//!
//! | step | line | kind |
//! |------|------|------|
//! | entering `u` | 0 | `Enter` |
//! | `u` marked visited | 1 | `MarkVisited` |
//! | examining `v` | 2 | `ExamineNeighbor` |
//! | `v` unvisited / already visited | 3 | `NeighborUnvisited` / `NeighborVisited` |
//! | descending into `v` | 4 | `Descend` |
//! | back at `u` after `v` | 2 | `Return` |
//! | no unvisited neighbors left | 5 | `Exhausted` |
//! | `u` marked finished | 5 | `Finalize` |

use stepgraph_model::NodeId;

use crate::recorder::Recorder;
use crate::StepKind;

struct Frame {
    node: NodeId,
    cursor: usize,
}

fn enter(recorder: &mut Recorder<'_>, stack: &mut Vec<Frame>, node: NodeId) {
    recorder.push(StepKind::Enter, 0, &node, format!("entering {node}"));
    recorder.visit(&node);
    recorder.push(StepKind::MarkVisited, 1, &node, format!("marked {node} as visited"));
    stack.push(Frame { node, cursor: 0 });
}

pub(crate) fn record(recorder: &mut Recorder<'_>, start: NodeId) {
    let graph = recorder.graph();
    let mut stack = Vec::new();
    enter(recorder, &mut stack, start);

    while let Some(frame) = stack.last_mut() {
        let u = frame.node.clone();
        let edges = graph.edges(u.as_str()).unwrap_or_default();

        if let Some(edge) = edges.get(frame.cursor) {
            frame.cursor += 1;
            let v = edge.target.clone();

            recorder.push(StepKind::ExamineNeighbor, 2, &v, format!("examining neighbor {v} of {u}"));
            if recorder.is_visited(&v) {
                recorder.push(StepKind::NeighborVisited, 3, &v, format!("neighbor {v} already visited"));
            } else {
                recorder.push(StepKind::NeighborUnvisited, 3, &v, format!("neighbor {v} is unvisited"));
                recorder.push(StepKind::Descend, 4, &v, format!("descending into {v}"));
                enter(recorder, &mut stack, v);
            }
            continue;
        }

        recorder.push(StepKind::Exhausted, 5, &u, format!("no more unvisited neighbors for {u}"));
        recorder.finish(&u);
        recorder.push(StepKind::Finalize, 5, &u, format!("finalizing {u}"));
        stack.pop();

        if let Some(parent) = stack.last() {
            let parent = parent.node.clone();
            recorder.push(StepKind::Return, 2, &parent, format!("returned to {parent} after {u}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{run, Algorithm, StepKind};
    use stepgraph_model::parse;

    fn ids(nodes: &[stepgraph_model::NodeId]) -> Vec<&str> {
        nodes.iter().map(|n| n.as_str()).collect()
    }

    #[test]
    fn finish_order_matches_reference_graph() {
        let graph = parse("A: [B, C]\nB: [D]\nC: []\nD: []").unwrap();
        let history = run(&graph, "A", Algorithm::DepthFirst);

        assert_eq!(ids(&history.last().finished_order), ["D", "B", "C", "A"]);
        assert!(history.first().visited.is_empty());
        assert!(history.first().finished.is_empty());
        assert_eq!(history.last().active, None);
        assert_eq!(history.last().line, None);
    }

    #[test]
    fn emits_six_categories_in_order() {
        let graph = parse("A: [B, A]\nB: []").unwrap();
        let history = run(&graph, "A", Algorithm::DepthFirst);

        let steps: Vec<_> = history
            .iter()
            .map(|s| (s.kind, s.line, s.active.as_ref().map(|n| n.to_string())))
            .collect();
        let a = Some("A".to_string());
        let b = Some("B".to_string());

        assert_eq!(
            steps,
            vec![
                (StepKind::Initial, None, None),
                (StepKind::Enter, Some(0), a.clone()),
                (StepKind::MarkVisited, Some(1), a.clone()),
                (StepKind::ExamineNeighbor, Some(2), b.clone()),
                (StepKind::NeighborUnvisited, Some(3), b.clone()),
                (StepKind::Descend, Some(4), b.clone()),
                (StepKind::Enter, Some(0), b.clone()),
                (StepKind::MarkVisited, Some(1), b.clone()),
                (StepKind::Exhausted, Some(5), b.clone()),
                (StepKind::Finalize, Some(5), b.clone()),
                (StepKind::Return, Some(2), a.clone()),
                (StepKind::ExamineNeighbor, Some(2), a.clone()),
                (StepKind::NeighborVisited, Some(3), a.clone()),
                (StepKind::Exhausted, Some(5), a.clone()),
                (StepKind::Finalize, Some(5), a.clone()),
                (StepKind::Complete, None, None),
            ]
        );
    }

    #[test]
    fn enter_is_recorded_before_marking() {
        let graph = parse("A: []").unwrap();
        let history = run(&graph, "A", Algorithm::DepthFirst);

        assert!(history[1].visited.is_empty());
        assert!(history[2].visited.contains("A"));
        // Exhausted still shows A unfinished; Finalize shows it finished.
        assert!(history[3].finished.is_empty());
        assert_eq!(ids(&history[4].finished_order), ["A"]);
    }

    #[test]
    fn return_message_names_child() {
        let graph = parse("A: [B]\nB: []").unwrap();
        let history = run(&graph, "A", Algorithm::DepthFirst);

        let ret = history.iter().find(|s| s.kind == StepKind::Return).unwrap();
        assert_eq!(ret.message, "returned to A after B");
    }

    #[test]
    fn follows_declared_edge_order() {
        let graph = parse("A: [C, B]\nB: []\nC: []").unwrap();
        let history = run(&graph, "A", Algorithm::DepthFirst);
        assert_eq!(ids(&history.last().finished_order), ["C", "B", "A"]);
    }

    #[test]
    fn earlier_snapshots_are_unaffected_by_later_steps() {
        let graph = parse("A: [B]\nB: []").unwrap();
        let history = run(&graph, "A", Algorithm::DepthFirst);

        let mark_a = &history[2];
        assert_eq!(mark_a.visited.len(), 1);
        assert!(mark_a.finished_order.is_empty());
        assert_eq!(history.last().visited.len(), 2);
    }
}
