mod assets;

use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use tokio::{
    net::TcpListener,
    sync::{broadcast, mpsc},
    time::MissedTickBehavior,
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{debug, error, info, warn};

use crate::{
    config::GameConfig,
    engine::{Command, Engine, EngineBuilder},
    session::Session,
};

const COMMAND_BUFFER: usize = 256;
const FRAME_BUFFER: usize = 64;

#[derive(Clone)]
struct AppState {
    broadcaster: broadcast::Sender<String>,
    latest_frame: Arc<Mutex<Option<String>>>,
    commands: mpsc::Sender<Command>,
}

pub struct WebServerConfig {
    pub config: GameConfig,
    pub seed: u64,
    pub host: String,
    pub port: u16,
    /// Real time between rendered frames.
    pub frame_interval: Duration,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        config,
        seed,
        host,
        port,
        frame_interval,
    } = config;

    let mut engine = EngineBuilder::standard(&config, seed).build();
    let session = engine.create_session(&config);
    info!(name = %config.name, seed, "session ready");

    let (tx, _) = broadcast::channel::<String>(FRAME_BUFFER);
    let (command_tx, command_rx) = mpsc::channel::<Command>(COMMAND_BUFFER);
    let latest_frame: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    let sim_handle = tokio::spawn(drive(
        engine,
        session,
        command_rx,
        frame_interval,
        tx.clone(),
        latest_frame.clone(),
    ));

    let state = Arc::new(AppState {
        broadcaster: tx,
        latest_frame,
        commands: command_tx,
    });

    let router = Router::new()
        .route("/", get(index))
        .route("/styles.css", get(styles))
        .route("/app.js", get(script))
        .route("/api/state", get(latest_state))
        .route("/api/events", get(stream_events))
        .route("/api/input", post(submit_input))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Expedition live at http://{} (Ctrl+C to stop)", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sim_handle.abort();
    Ok(())
}

/// Owns the engine and session for the life of the server. Commands are
/// applied between frames so the simulation never sees concurrent writes.
async fn drive(
    mut engine: Engine,
    mut session: Session,
    mut commands: mpsc::Receiver<Command>,
    frame_interval: Duration,
    broadcaster: broadcast::Sender<String>,
    latest_frame: Arc<Mutex<Option<String>>>,
) {
    let mut interval = tokio::time::interval(frame_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    loop {
        interval.tick().await;
        while let Ok(command) = commands.try_recv() {
            debug!(?command, "applying input");
            engine.command(&mut session, command);
        }

        let now = Instant::now();
        let dt = now.duration_since(last);
        last = now;

        let frame = match engine.frame(&mut session, dt) {
            Ok(frame) => frame,
            Err(err) => {
                error!(error = ?err, "simulation stopped");
                return;
            }
        };
        let payload = match serde_json::to_string(&frame) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, frame = frame.frame, "frame not serializable");
                continue;
            }
        };
        match latest_frame.lock() {
            Ok(mut guard) => *guard = Some(payload.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(payload.clone()),
        }
        // No subscribers is fine; the latest slot still updates.
        let _ = broadcaster.send(payload);
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down web UI");
}

async fn index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

async fn styles() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        assets::STYLES_CSS,
    )
}

async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        assets::APP_JS,
    )
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Response {
    let frame = match state.latest_frame.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    match frame {
        Some(payload) => ([(header::CONTENT_TYPE, "application/json")], payload).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn submit_input(
    State(state): State<Arc<AppState>>,
    Json(command): Json<Command>,
) -> StatusCode {
    match state.commands.send(command).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
