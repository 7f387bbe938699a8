//! Async driver for a [`PlaybackController`].
//!
//! The player task owns the controller. Commands arrive over an `mpsc`
//! channel and are answered with the resulting [`PlaybackStatus`]; every
//! change is published on a `watch` channel as a [`PlayerView`]. At most one
//! sleep is armed at a time, for the controller's pending tick.

use serde::Serialize;
use stepgraph_recorder::{History, Snapshot};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::playback::{PlaybackController, PlaybackStatus, TickId, TickOutcome};

const COMMAND_BUFFER: usize = 32;

/// The player task has shut down.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("playback task is not running")]
    Closed,
}

/// A command for the player task.
#[derive(Debug, Clone)]
pub enum Command {
    Load(History),
    StepForward,
    StepBackward,
    Play,
    Pause,
    Reset,
    SetSpeed(u64),
    Seek(usize),
    Status,
}

/// What the frontend sees: playback status plus the snapshot at the current index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub status: PlaybackStatus,
    pub snapshot: Option<Snapshot>,
}

impl From<&PlaybackController> for PlayerView {
    fn from(controller: &PlaybackController) -> Self {
        Self {
            status: PlaybackStatus::from(controller),
            snapshot: controller.current_snapshot().cloned(),
        }
    }
}

struct Request {
    command: Command,
    reply: oneshot::Sender<PlaybackStatus>,
}

/// Handle to a running player task. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<Request>,
    view: watch::Receiver<PlayerView>,
}

/// Spawns the player task.
pub struct Player;

impl Player {
    /// Spawn a task driving `controller`. Must be called inside a tokio runtime.
    pub fn spawn(controller: PlaybackController) -> PlayerHandle {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let (view_tx, view) = watch::channel(PlayerView::from(&controller));
        tokio::spawn(drive(controller, rx, view_tx));
        PlayerHandle { commands, view }
    }
}

impl PlayerHandle {
    /// Send a command and wait for the status it produced.
    pub async fn send(&self, command: Command) -> Result<PlaybackStatus, PlayerError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Request { command, reply })
            .await
            .map_err(|_| PlayerError::Closed)?;
        response.await.map_err(|_| PlayerError::Closed)
    }

    pub async fn load(&self, history: History) -> Result<PlaybackStatus, PlayerError> {
        self.send(Command::Load(history)).await
    }

    pub async fn play(&self) -> Result<PlaybackStatus, PlayerError> {
        self.send(Command::Play).await
    }

    pub async fn pause(&self) -> Result<PlaybackStatus, PlayerError> {
        self.send(Command::Pause).await
    }

    pub async fn reset(&self) -> Result<PlaybackStatus, PlayerError> {
        self.send(Command::Reset).await
    }

    pub async fn step_forward(&self) -> Result<PlaybackStatus, PlayerError> {
        self.send(Command::StepForward).await
    }

    pub async fn step_backward(&self) -> Result<PlaybackStatus, PlayerError> {
        self.send(Command::StepBackward).await
    }

    pub async fn set_speed(&self, speed_ms: u64) -> Result<PlaybackStatus, PlayerError> {
        self.send(Command::SetSpeed(speed_ms)).await
    }

    pub async fn seek(&self, index: usize) -> Result<PlaybackStatus, PlayerError> {
        self.send(Command::Seek(index)).await
    }

    pub async fn status(&self) -> Result<PlaybackStatus, PlayerError> {
        self.send(Command::Status).await
    }

    /// The latest published view.
    pub fn view(&self) -> PlayerView {
        self.view.borrow().clone()
    }

    /// A receiver that is notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<PlayerView> {
        self.view.clone()
    }
}

fn apply(controller: &mut PlaybackController, command: Command) {
    match command {
        Command::Load(history) => controller.load(history),
        Command::StepForward => {
            controller.step_forward();
        }
        Command::StepBackward => {
            controller.step_backward();
        }
        Command::Play => controller.play(),
        Command::Pause => controller.pause(),
        Command::Reset => controller.reset(),
        Command::SetSpeed(ms) => controller.set_speed(ms),
        Command::Seek(index) => controller.seek(index),
        Command::Status => {}
    }
}

async fn drive(
    mut controller: PlaybackController,
    mut requests: mpsc::Receiver<Request>,
    view: watch::Sender<PlayerView>,
) {
    let mut armed: Option<(TickId, Instant)> = None;

    loop {
        // Re-arm only when the controller replaced its pending tick, so a
        // running sleep keeps the delay it was scheduled with.
        armed = match (controller.pending_tick(), armed) {
            (Some(tick), Some((id, at))) if tick.id == id => Some((id, at)),
            (Some(tick), _) => Some((tick.id, Instant::now() + tick.delay)),
            (None, _) => None,
        };

        let timer = async move {
            match armed {
                Some((id, at)) => {
                    sleep_until(at).await;
                    id
                }
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            request = requests.recv() => {
                let Some(Request { command, reply }) = request else {
                    break;
                };
                apply(&mut controller, command);
                let _ = reply.send(PlaybackStatus::from(&controller));
            }
            id = timer => {
                if controller.tick(id) == TickOutcome::Finished {
                    debug!(index = controller.current_index(), "auto-advance finished");
                }
            }
        }

        let next = PlayerView::from(&controller);
        view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    info!("playback task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackState;
    use std::time::Duration;
    use stepgraph_model::parse;
    use stepgraph_recorder::{run, Algorithm};
    use tokio::time::sleep;

    fn history() -> History {
        let graph = parse("A: [B, C]\nB: [D]\nC: []\nD: []").unwrap();
        run(&graph, "A", Algorithm::DepthFirst)
    }

    fn spawn(speed_ms: u64) -> (PlayerHandle, usize) {
        let history = history();
        let len = history.len();
        (Player::spawn(PlaybackController::with_history(history, speed_ms)), len)
    }

    #[tokio::test(start_paused = true)]
    async fn plays_to_the_end_and_pauses() {
        let (player, len) = spawn(100);
        player.play().await.unwrap();

        sleep(Duration::from_millis(100 * len as u64 + 50)).await;

        let status = player.status().await.unwrap();
        assert!(!status.is_playing);
        assert_eq!(status.state, PlaybackState::Paused);
        assert_eq!(status.current_index, len - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn advances_once_per_delay() {
        let (player, _) = spawn(100);
        player.play().await.unwrap();

        sleep(Duration::from_millis(250)).await;
        assert_eq!(player.status().await.unwrap().current_index, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_waits_for_pending_tick() {
        let (player, _) = spawn(1000);
        player.play().await.unwrap();

        sleep(Duration::from_millis(10)).await;
        player.set_speed(50).await.unwrap();

        // The tick armed at 1000ms keeps its delay.
        sleep(Duration::from_millis(980)).await;
        assert_eq!(player.status().await.unwrap().current_index, 0);

        sleep(Duration::from_millis(20)).await;
        assert_eq!(player.status().await.unwrap().current_index, 1);

        // The next one uses the new speed.
        sleep(Duration::from_millis(60)).await;
        assert_eq!(player.status().await.unwrap().current_index, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_advancing() {
        let (player, _) = spawn(100);
        player.play().await.unwrap();
        sleep(Duration::from_millis(150)).await;

        let paused = player.pause().await.unwrap();
        sleep(Duration::from_secs(5)).await;

        let status = player.status().await.unwrap();
        assert_eq!(status.current_index, paused.current_index);
        assert!(!status.is_playing);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_step_restarts_timer() {
        let (player, _) = spawn(100);
        player.play().await.unwrap();

        sleep(Duration::from_millis(80)).await;
        assert_eq!(player.step_forward().await.unwrap().current_index, 1);

        // The old tick at 100ms was discarded; the new one fires at 180ms.
        sleep(Duration::from_millis(50)).await;
        assert_eq!(player.status().await.unwrap().current_index, 1);
        sleep(Duration::from_millis(60)).await;
        assert_eq!(player.status().await.unwrap().current_index, 2);
    }

    #[tokio::test]
    async fn publishes_view_changes() {
        let (player, _) = spawn(100);
        let mut rx = player.subscribe();
        assert_eq!(rx.borrow_and_update().status.current_index, 0);

        player.seek(3).await.unwrap();
        rx.changed().await.unwrap();

        let view = rx.borrow().clone();
        assert_eq!(view.status.current_index, 3);
        assert_eq!(view.snapshot, history().get(3).cloned());
    }

    #[test]
    fn closed_player_reports_error() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let player = runtime.block_on(async { spawn(100).0 });
        drop(runtime);

        let status = tokio_test::block_on(player.status());
        assert!(matches!(status, Err(PlayerError::Closed)));
    }
}
