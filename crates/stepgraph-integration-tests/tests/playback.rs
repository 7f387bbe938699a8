//! Playback over real recordings, by hand and on the timer.

use std::time::Duration;

use stepgraph_integration_tests::{REFERENCE_GRAPH, WEIGHTED_GRAPH};
use stepgraph_model::parse;
use stepgraph_recorder::{run, Algorithm, History};
use stepgraph_vis::{PlaybackController, PlaybackState, Player, TickOutcome};
use tokio::time::sleep;

fn history(algorithm: Algorithm) -> History {
    let graph = parse(WEIGHTED_GRAPH).unwrap();
    run(&graph, "S", algorithm)
}

#[test]
fn stepping_clamps_at_both_ends() {
    for algorithm in Algorithm::ALL {
        let history = history(algorithm);
        let len = history.len();
        let mut controller = PlaybackController::with_history(history, 100);

        for _ in 0..len * 2 {
            controller.step_forward();
        }
        assert_eq!(controller.current_index(), len - 1);

        for _ in 0..len * 2 {
            controller.step_backward();
        }
        assert_eq!(controller.current_index(), 0);
        assert!(!controller.step_backward());
    }
}

#[test]
fn ticking_through_history_ends_paused() {
    let history = history(Algorithm::Dijkstra);
    let len = history.len();
    let mut controller = PlaybackController::with_history(history, 10);
    controller.play();

    let mut advanced = 0;
    while let Some(tick) = controller.pending_tick() {
        if controller.tick(tick.id) == TickOutcome::Advanced {
            advanced += 1;
        }
    }

    assert_eq!(advanced, len - 1);
    assert!(!controller.is_playing());
    assert_eq!(controller.current_index(), len - 1);
    assert!(controller.current_snapshot().unwrap().is_terminal());
}

#[test]
fn speed_change_leaves_pending_tick_alone() {
    let mut controller = PlaybackController::with_history(history(Algorithm::DepthFirst), 1000);
    controller.play();
    let pending = controller.pending_tick().unwrap();

    controller.set_speed(10);
    assert_eq!(controller.pending_tick().unwrap().delay, Duration::from_millis(1000));

    controller.tick(pending.id);
    assert_eq!(controller.pending_tick().unwrap().delay, Duration::from_millis(10));
}

#[tokio::test(start_paused = true)]
async fn player_runs_reference_traversal_to_completion() {
    let graph = parse(REFERENCE_GRAPH).unwrap();
    let history = run(&graph, "A", Algorithm::DepthFirst);
    let len = history.len();

    let player = Player::spawn(PlaybackController::with_history(history, 200));
    let mut views = player.subscribe();
    player.play().await.unwrap();

    // Wait for the terminal snapshot to be published.
    loop {
        views.changed().await.unwrap();
        let view = views.borrow_and_update().clone();
        if !view.status.is_playing {
            assert_eq!(view.status.current_index, len - 1);
            let order: Vec<_> = view
                .snapshot
                .unwrap()
                .finished_order
                .iter()
                .map(|n| n.to_string())
                .collect();
            assert_eq!(order, ["D", "B", "C", "A"]);
            break;
        }
    }

    // Nothing fires afterwards.
    sleep(Duration::from_secs(10)).await;
    let status = player.status().await.unwrap();
    assert_eq!(status.state, PlaybackState::Paused);
    assert_eq!(status.current_index, len - 1);
}

#[tokio::test(start_paused = true)]
async fn reset_during_playback_cancels_tick() {
    let player = Player::spawn(PlaybackController::with_history(history(Algorithm::BreadthFirst), 100));
    player.play().await.unwrap();
    sleep(Duration::from_millis(350)).await;

    let status = player.reset().await.unwrap();
    assert_eq!(status.current_index, 0);
    assert!(!status.is_playing);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(player.status().await.unwrap().current_index, 0);
}

#[tokio::test(start_paused = true)]
async fn loading_new_history_stops_playback() {
    let player = Player::spawn(PlaybackController::with_history(history(Algorithm::DepthFirst), 100));
    player.play().await.unwrap();
    sleep(Duration::from_millis(250)).await;

    let replacement = history(Algorithm::Dijkstra);
    let total = replacement.len();
    let status = player.load(replacement).await.unwrap();

    assert_eq!(status.total_snapshots, total);
    assert_eq!(status.current_index, 0);
    assert_eq!(status.state, PlaybackState::Paused);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(player.status().await.unwrap().current_index, 0);
}
