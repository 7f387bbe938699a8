//! Stepgraph Visualization Server
//!
//! Record a traversal and serve the playback frontend.
//!
//! Usage: `stepgraph-vis [GRAPH_FILE]`. Everything else is read from
//! `STEPGRAPH_*` environment variables.

use std::env;
use std::fs;

use stepgraph_model::parse;
use stepgraph_vis::{Session, VisConfig, VisServer, SAMPLE_GRAPH};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stepgraph_vis=info,stepgraph_recorder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = VisConfig::from_env()?;
    if let Some(path) = env::args().nth(1) {
        config.graph_path = Some(path.into());
    }

    let text = match &config.graph_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading graph");
            fs::read_to_string(path)?
        }
        None => {
            tracing::info!("no graph file given, using the sample graph");
            SAMPLE_GRAPH.to_owned()
        }
    };

    let graph = parse(&text)?;
    let session = Session::new(graph, config.algorithm, config.start.as_deref())?;
    tracing::info!(
        algorithm = session.algorithm().name(),
        start = %session.start(),
        snapshots = session.history().len(),
        "session ready"
    );

    let server = VisServer::new(session, &config);
    server.serve(config.addr).await?;

    Ok(())
}
