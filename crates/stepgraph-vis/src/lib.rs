//! Stepgraph Traversal Visualization
//!
//! Step-by-step playback of recorded graph traversals.
//!
//! # Architecture
//!
//! - **Session**: the graph under study and its recorded history
//! - **Playback**: navigate the history by hand or as a timed animation
//! - **Player**: async task owning the playback timer
//! - **WebSocket**: streams the current snapshot to the frontend
//! - **REST API**: edit the graph, re-record, control playback
//!
//! # Usage
//!
//! ```ignore
//! let graph = stepgraph_model::parse(SAMPLE_GRAPH)?;
//! let session = Session::new(graph, Algorithm::DepthFirst, None)?;
//!
//! let config = VisConfig::from_env()?;
//! let server = VisServer::new(session, &config);
//! server.serve(config.addr).await?;
//! ```

mod config;
mod error;
mod playback;
mod player;
mod server;
mod session;

pub use config::{ConfigError, VisConfig};
pub use error::ApiError;
pub use playback::{
    PlaybackController, PlaybackState, PlaybackStatus, ScheduledTick, TickId, TickOutcome, DEFAULT_SPEED_MS,
};
pub use player::{Command, Player, PlayerError, PlayerHandle, PlayerView};
pub use server::VisServer;
pub use session::{Session, SessionError, SAMPLE_GRAPH};
