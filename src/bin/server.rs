use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use maze_duel_server::config::ServerConfig;
use maze_duel_server::constants::TICK_MS;
use maze_duel_server::engine::{now_ms, GameEngine};
use maze_duel_server::rng::Rng;
use maze_duel_server::room::Room;
use maze_duel_server::world::to_map_view;
use rand::distr::Alphanumeric;
use rand::Rng as _;
use serde_json::json;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const OUTBOUND_QUEUE: usize = 64;
const CLIENT_ID_LEN: usize = 16;

type SharedRoom = Arc<Mutex<Room>>;

#[derive(Debug, Error)]
enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("server runtime failed: {0}")]
    Serve(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();
    let rng = match config.seed {
        Some(seed) => Rng::new(seed),
        None => Rng::from_entropy(),
    };

    let room = Arc::new(Mutex::new(Room::new(GameEngine::with_rng(rng))));
    start_tick_loop(room.clone());

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/map", get(map_handler))
        .route("/ws", get(ws_handler))
        .with_state(room);

    let app = if let Some(static_dir) = config.resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        info!(root = %static_dir.to_string_lossy(), "serving static files");
        app.fallback_service(ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)))
    } else {
        warn!("static file root not found, serving the game socket only");
        app
    };

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind_addr.clone(),
            source,
        })?;

    info!(addr = %bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn map_handler() -> impl IntoResponse {
    Json(to_map_view())
}

async fn ws_handler(ws: WebSocketUpgrade, State(room): State<SharedRoom>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(room, socket))
}

async fn handle_socket(room: SharedRoom, socket: WebSocket) {
    let client_id = make_id("client");
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
    info!(client = %client_id, "connected");

    {
        let mut guard = room.lock().await;
        if let Err(err) = guard.connect(&client_id, tx.clone(), now_ms()) {
            debug!(client = %client_id, %err, "connection left unseated");
        }
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                let mut guard = room.lock().await;
                guard.handle_message(&client_id, raw.as_str());
            }
            Message::Binary(raw) => {
                if let Ok(text) = std::str::from_utf8(&raw) {
                    let mut guard = room.lock().await;
                    guard.handle_message(&client_id, text);
                } else {
                    debug!(client = %client_id, "non-utf8 frame dropped");
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    {
        let mut guard = room.lock().await;
        let departure = guard.disconnect(&client_id, now_ms());
        info!(client = %client_id, ?departure, "disconnected");
    }
    drop(tx);
    let _ = writer.await;
}

fn start_tick_loop(room: SharedRoom) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        loop {
            interval.tick().await;
            let mut guard = room.lock().await;
            guard.tick(now_ms());
        }
    });
}

fn make_id(prefix: &str) -> String {
    let token: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(CLIENT_ID_LEN)
        .map(char::from)
        .collect();
    format!("{prefix}_{token}")
}
