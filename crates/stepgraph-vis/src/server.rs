//! Axum web server with WebSocket streaming for traversal playback.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use stepgraph_model::{layout, parse, serialize, GraphEdit, NodeId, Point};
use stepgraph_recorder::Algorithm;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

use crate::config::{valid_extent, VisConfig};
use crate::error::ApiError;
use crate::playback::{PlaybackController, PlaybackStatus};
use crate::player::{Command, Player, PlayerHandle, PlayerView};
use crate::session::Session;

/// Shared application state.
pub struct AppState {
    session: RwLock<Session>,
    player: PlayerHandle,
    layout_width: f64,
    layout_height: f64,
}

/// Visualization server.
pub struct VisServer {
    state: Arc<AppState>,
}

impl VisServer {
    /// Create a server for `session` and start its player task.
    pub fn new(session: Session, config: &VisConfig) -> Self {
        let controller = PlaybackController::with_history(session.history().clone(), config.speed_ms);
        Self {
            state: Arc::new(AppState {
                session: RwLock::new(session),
                player: Player::spawn(controller),
                layout_width: config.layout_width,
                layout_height: config.layout_height,
            }),
        }
    }

    /// Handle to the player task.
    pub fn player(&self) -> PlayerHandle {
        self.state.player.clone()
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            // Session
            .route("/api/status", get(status_handler))
            .route("/api/graph", get(graph_handler).put(replace_graph_handler))
            .route("/api/graph/edit", post(edit_graph_handler))
            .route("/api/run", post(run_handler))
            .route("/api/algorithm", get(algorithm_handler))
            .route("/api/layout", get(layout_handler))
            .route("/api/snapshot", get(snapshot_handler))
            // Playback
            .route("/api/playback", get(playback_status_handler))
            .route("/api/playback/play", post(play_handler))
            .route("/api/playback/pause", post(pause_handler))
            .route("/api/playback/reset", post(reset_handler))
            .route("/api/playback/step", post(step_handler))
            .route("/api/playback/speed", post(speed_handler))
            .route("/api/playback/seek", post(seek_handler))
            // WebSocket for real-time updates
            .route("/ws", get(ws_handler))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the given address.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "visualization server listening");
        axum::serve(listener, self.router()).await
    }
}

/// Server status response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: &'static str,
    algorithm: Algorithm,
    start: NodeId,
    directed: bool,
    node_count: usize,
    edge_count: usize,
    snapshot_count: usize,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let session = state.session.read().await;
    let graph = session.graph();
    Json(StatusResponse {
        status: "ok",
        algorithm: session.algorithm(),
        start: session.start().clone(),
        directed: graph.is_directed(),
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        snapshot_count: session.history().len(),
    })
}

async fn graph_handler(State(state): State<Arc<AppState>>) -> String {
    serialize(state.session.read().await.graph())
}

// Graph-changing handlers hold the session write lock until the player has
// loaded the new history, so the player always follows the latest session.
async fn replace_graph_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<PlaybackStatus>, ApiError> {
    let graph = parse(&body)?;
    let mut session = state.session.write().await;
    let history = session.replace_graph(graph).clone();
    Ok(Json(state.player.load(history).await?))
}

async fn edit_graph_handler(
    State(state): State<Arc<AppState>>,
    Json(edit): Json<GraphEdit>,
) -> Result<Json<PlaybackStatus>, ApiError> {
    let mut session = state.session.write().await;
    let graph = session.graph().with_edit(edit)?;
    let history = session.replace_graph(graph).clone();
    Ok(Json(state.player.load(history).await?))
}

#[derive(Deserialize)]
struct RunRequest {
    algorithm: Algorithm,
    start: Option<String>,
}

async fn run_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunRequest>,
) -> Result<Json<PlaybackStatus>, ApiError> {
    let mut session = state.session.write().await;
    let history = session.rerun(req.algorithm, req.start.as_deref())?.clone();
    Ok(Json(state.player.load(history).await?))
}

/// The recorded algorithm and its pseudocode listing.
#[derive(Serialize)]
struct AlgorithmResponse {
    key: &'static str,
    name: &'static str,
    weighted: bool,
    pseudocode: &'static [&'static str],
}

async fn algorithm_handler(State(state): State<Arc<AppState>>) -> Json<AlgorithmResponse> {
    let algorithm = state.session.read().await.algorithm();
    Json(AlgorithmResponse {
        key: algorithm.key(),
        name: algorithm.name(),
        weighted: algorithm.is_weighted(),
        pseudocode: algorithm.pseudocode(),
    })
}

#[derive(Deserialize)]
struct LayoutQuery {
    width: Option<f64>,
    height: Option<f64>,
}

async fn layout_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LayoutQuery>,
) -> Result<Json<BTreeMap<NodeId, Point>>, ApiError> {
    let width = layout_extent("width", query.width, state.layout_width)?;
    let height = layout_extent("height", query.height, state.layout_height)?;

    let session = state.session.read().await;
    Ok(Json(layout(
        session.graph(),
        Some(session.start().as_str()),
        width,
        height,
    )))
}

fn layout_extent(name: &'static str, value: Option<f64>, default: f64) -> Result<f64, ApiError> {
    match value {
        Some(v) if !valid_extent(v) => Err(ApiError::InvalidExtent { name, value: v }),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

async fn snapshot_handler(State(state): State<Arc<AppState>>) -> Json<PlayerView> {
    Json(state.player.view())
}

async fn playback_status_handler(State(state): State<Arc<AppState>>) -> Result<Json<PlaybackStatus>, ApiError> {
    Ok(Json(state.player.status().await?))
}

async fn play_handler(State(state): State<Arc<AppState>>) -> Result<Json<PlaybackStatus>, ApiError> {
    Ok(Json(state.player.play().await?))
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<PlaybackStatus>, ApiError> {
    Ok(Json(state.player.pause().await?))
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<PlaybackStatus>, ApiError> {
    Ok(Json(state.player.reset().await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum StepDirection {
    Forward,
    Backward,
}

#[derive(Deserialize)]
struct StepRequest {
    direction: StepDirection,
}

async fn step_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepRequest>,
) -> Result<Json<PlaybackStatus>, ApiError> {
    let status = match req.direction {
        StepDirection::Forward => state.player.step_forward().await?,
        StepDirection::Backward => state.player.step_backward().await?,
    };
    Ok(Json(status))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeedRequest {
    speed_ms: u64,
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeedRequest>,
) -> Result<Json<PlaybackStatus>, ApiError> {
    Ok(Json(state.player.set_speed(req.speed_ms).await?))
}

#[derive(Deserialize)]
struct SeekRequest {
    index: usize,
}

async fn seek_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeekRequest>,
) -> Result<Json<PlaybackStatus>, ApiError> {
    Ok(Json(state.player.seek(req.index).await?))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetSnapshot,
    GetStatus,
    Play,
    Pause,
    Reset,
    StepForward,
    StepBackward,
    Seek { index: usize },
    SetSpeed { speed_ms: u64 },
}

impl WsCommand {
    fn into_command(self) -> Command {
        match self {
            WsCommand::GetSnapshot | WsCommand::GetStatus => Command::Status,
            WsCommand::Play => Command::Play,
            WsCommand::Pause => Command::Pause,
            WsCommand::Reset => Command::Reset,
            WsCommand::StepForward => Command::StepForward,
            WsCommand::StepBackward => Command::StepBackward,
            WsCommand::Seek { index } => Command::Seek(index),
            WsCommand::SetSpeed { speed_ms } => Command::SetSpeed(speed_ms),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsResponse {
    Snapshot(PlayerView),
    Status(PlaybackStatus),
    Error { message: String },
}

async fn send_response(socket: &mut WebSocket, response: &WsResponse) -> Result<(), axum::Error> {
    match serde_json::to_string(response) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!("Failed to encode WebSocket response: {}", e);
            Ok(())
        }
    }
}

async fn handle_ws_command(state: &AppState, text: &str) -> Option<WsResponse> {
    let cmd = match serde_json::from_str::<WsCommand>(text) {
        Ok(cmd) => cmd,
        Err(e) => {
            return Some(WsResponse::Error {
                message: format!("invalid command: {e}"),
            })
        }
    };
    debug!(?cmd, "WebSocket command");

    let reply = match cmd {
        WsCommand::GetSnapshot => return Some(WsResponse::Snapshot(state.player.view())),
        WsCommand::GetStatus => true,
        _ => false,
    };
    match state.player.send(cmd.into_command()).await {
        Ok(status) if reply => Some(WsResponse::Status(status)),
        // Changes reach the client through the view subscription.
        Ok(_) => None,
        Err(e) => Some(WsResponse::Error { message: e.to_string() }),
    }
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket client connected");
    let mut views = state.player.subscribe();

    let initial = WsResponse::Snapshot(views.borrow_and_update().clone());
    if let Err(e) = send_response(&mut socket, &initial).await {
        warn!("Failed to send initial snapshot: {}", e);
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(response) = handle_ws_command(&state, text.as_str()).await {
                            if let Err(e) = send_response(&mut socket, &response).await {
                                warn!("Failed to send response: {}", e);
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = socket.send(Message::Pong(data)).await {
                            warn!("Failed to send pong: {}", e);
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = WsResponse::Snapshot(views.borrow_and_update().clone());
                if let Err(e) = send_response(&mut socket, &view).await {
                    warn!("Failed to send snapshot update: {}", e);
                    break;
                }
            }
        }
    }

    info!("WebSocket client disconnected");
}
