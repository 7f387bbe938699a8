//! Playback controls for a recorded traversal.
//!
//! [`PlaybackController`] is a synchronous state machine. It never sleeps:
//! auto-advance is expressed as at most one [`ScheduledTick`] that the
//! owner (see [`Player`](crate::Player)) fires after its delay by calling
//! [`PlaybackController::tick`]. A tick whose id no longer matches the
//! pending one is stale and ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use stepgraph_recorder::{History, Snapshot};
use tracing::{debug, trace};

/// Default auto-advance delay.
pub const DEFAULT_SPEED_MS: u64 = 1000;

/// Current state of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// No history loaded
    Stopped,
    /// History loaded, not advancing
    Paused,
    /// Auto-advancing
    Playing,
}

/// Identifies one scheduled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickId(u64);

/// The single pending auto-advance tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTick {
    pub id: TickId,
    /// Delay captured when the tick was scheduled.
    pub delay: Duration,
}

/// What a call to [`PlaybackController::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not the pending tick; nothing changed.
    Stale,
    /// Moved forward one snapshot and scheduled the next tick.
    Advanced,
    /// Reached the end (or was not playing); playback is paused.
    Finished,
}

/// Playback controller for a traversal history.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    history: Option<History>,
    current_index: usize,
    state: PlaybackState,
    speed_ms: u64,
    pending: Option<ScheduledTick>,
    next_tick: u64,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_MS)
    }
}

impl PlaybackController {
    /// Create a controller with nothing loaded.
    pub fn new(speed_ms: u64) -> Self {
        Self {
            history: None,
            current_index: 0,
            state: PlaybackState::Stopped,
            speed_ms,
            pending: None,
            next_tick: 0,
        }
    }

    /// Create a controller paused at the start of `history`.
    pub fn with_history(history: History, speed_ms: u64) -> Self {
        let mut controller = Self::new(speed_ms);
        controller.load(history);
        controller
    }

    /// Replace the history. Cancels playback and rewinds to index 0.
    pub fn load(&mut self, history: History) {
        self.cancel();
        debug!(snapshots = history.len(), algorithm = history.algorithm().key(), "loaded history");
        self.history = Some(history);
        self.current_index = 0;
        self.state = PlaybackState::Paused;
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of snapshots in the loaded history, 0 when none.
    pub fn total_snapshots(&self) -> usize {
        self.history.as_ref().map_or(0, History::len)
    }

    fn last_index(&self) -> usize {
        self.total_snapshots().saturating_sub(1)
    }

    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.history.as_ref().and_then(|h| h.get(self.current_index))
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    /// The tick the owner should fire next, if any.
    pub fn pending_tick(&self) -> Option<ScheduledTick> {
        self.pending
    }

    /// Progress through the history (0.0 - 1.0).
    pub fn progress(&self) -> f64 {
        let last = self.last_index();
        if last == 0 {
            0.0
        } else {
            self.current_index as f64 / last as f64
        }
    }

    fn schedule(&mut self) {
        self.next_tick += 1;
        self.pending = Some(ScheduledTick {
            id: TickId(self.next_tick),
            delay: Duration::from_millis(self.speed_ms),
        });
    }

    fn cancel(&mut self) {
        if let Some(tick) = self.pending.take() {
            trace!(tick = tick.id.0, "cancelled pending tick");
        }
    }

    /// A manual move: drop the pending tick, and restart the timer if playing.
    fn interrupt(&mut self) {
        self.cancel();
        if self.is_playing() {
            self.schedule();
        }
    }

    /// Step forward one snapshot. Returns false at the end.
    ///
    /// While playing, a move discards the pending tick and schedules a fresh
    /// one, so the next auto-advance comes a full `speed_ms` later.
    pub fn step_forward(&mut self) -> bool {
        if self.history.is_none() || self.current_index >= self.last_index() {
            return false;
        }
        self.current_index += 1;
        self.interrupt();
        true
    }

    /// Step backward one snapshot. Returns false at the start.
    ///
    /// While playing, a move discards the pending tick and schedules a fresh
    /// one, so the next auto-advance comes a full `speed_ms` later.
    pub fn step_backward(&mut self) -> bool {
        if self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        self.interrupt();
        true
    }

    /// Jump to `index`, clamped to the history bounds.
    ///
    /// While playing, a move discards the pending tick and schedules a fresh
    /// one, so the next auto-advance comes a full `speed_ms` later.
    pub fn seek(&mut self, index: usize) {
        if self.history.is_none() {
            return;
        }
        self.current_index = index.min(self.last_index());
        self.interrupt();
    }

    /// Start auto-advancing. Rewinds first when already at the end.
    pub fn play(&mut self) {
        if self.history.is_none() {
            return;
        }
        if self.current_index >= self.last_index() {
            self.current_index = 0;
        }
        self.state = PlaybackState::Playing;
        self.cancel();
        self.schedule();
        debug!(index = self.current_index, speed_ms = self.speed_ms, "playback started");
    }

    /// Stop auto-advancing and cancel the pending tick.
    pub fn pause(&mut self) {
        self.cancel();
        if self.is_playing() {
            self.state = PlaybackState::Paused;
            debug!(index = self.current_index, "playback paused");
        }
    }

    /// Pause and return to the first snapshot.
    pub fn reset(&mut self) {
        self.pause();
        self.current_index = 0;
    }

    /// Change the auto-advance delay. Applies from the next scheduled tick;
    /// a tick that is already pending keeps its delay.
    pub fn set_speed(&mut self, speed_ms: u64) {
        self.speed_ms = speed_ms;
    }

    /// Fire the tick `id`.
    pub fn tick(&mut self, id: TickId) -> TickOutcome {
        match self.pending {
            Some(tick) if tick.id == id => self.pending = None,
            _ => {
                trace!(tick = id.0, "ignored stale tick");
                return TickOutcome::Stale;
            }
        }

        if !self.is_playing() || self.current_index >= self.last_index() {
            if self.is_playing() {
                self.state = PlaybackState::Paused;
                debug!(index = self.current_index, "playback reached the end");
            }
            return TickOutcome::Finished;
        }

        self.current_index += 1;
        self.schedule();
        TickOutcome::Advanced
    }
}

/// Playback status for sending to frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub current_index: usize,
    pub total_snapshots: usize,
    pub state: PlaybackState,
    pub is_playing: bool,
    pub speed_ms: u64,
    pub progress: f64,
}

impl From<&PlaybackController> for PlaybackStatus {
    fn from(controller: &PlaybackController) -> Self {
        Self {
            current_index: controller.current_index,
            total_snapshots: controller.total_snapshots(),
            state: controller.state,
            is_playing: controller.is_playing(),
            speed_ms: controller.speed_ms,
            progress: controller.progress(),
        }
    }
}
