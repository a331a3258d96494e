//! HTTP + WebSocket API for repcoach
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /exercises - Exercise profile table
//! - POST /session/new - Create new session
//! - GET /session/{id} - Get session status
//! - POST /session/{id}/frame - Analyze one pose frame
//! - POST /session/{id}/reset - Recalibrate
//! - POST /session/{id}/exercise - Switch exercise
//! - POST /session/{id}/voice - Enable/disable speech
//! - GET /session/{id}/summary - Current set summary
//! - DELETE /session/{id} - Stop session, save summary, release it
//! - WS /ws/{id} - Speech commands

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::core::{all_profiles, save_summary, ChannelSink, CoachSession, ExerciseProfile};
use crate::types::{ExerciseKind, PoseFrame, RepState, SessionSummary, SpeechCommand, Thresholds};
use crate::EngineConfig;

const SPEECH_CHANNEL_CAPACITY: usize = 64;

/// Session state
#[derive(Debug)]
pub struct ApiSession {
    pub id: String,
    pub coach: CoachSession,
    pub speech: ChannelSink,
}

/// Live sessions, plus the summaries of stopped ones
#[derive(Debug, Default)]
pub struct SessionTable {
    pub live: HashMap<String, ApiSession>,
    pub stopped: HashMap<String, SessionSummary>,
}

impl SessionTable {
    /// 409 for a stopped session, 404 for an unknown one
    fn live(&self, id: &str) -> Result<&ApiSession, StatusCode> {
        self.live.get(id).ok_or_else(|| self.missing(id))
    }

    fn live_mut(&mut self, id: &str) -> Result<&mut ApiSession, StatusCode> {
        let missing = self.missing(id);
        self.live.get_mut(id).ok_or(missing)
    }

    fn missing(&self, id: &str) -> StatusCode {
        if self.stopped.contains_key(id) {
            StatusCode::CONFLICT
        } else {
            StatusCode::NOT_FOUND
        }
    }
}

/// App state
pub struct AppState {
    pub sessions: RwLock<SessionTable>,
    pub config: EngineConfig,
    /// Where stopped sessions write their summary; `None` disables saving
    pub summary_dir: Option<String>,
}

/// Create new session request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewSessionRequest {
    pub exercise: Option<String>,
    pub voice_enabled: Option<bool>,
}

/// Create new session response
#[derive(Debug, Serialize, Deserialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub exercise: ExerciseKind,
    pub websocket_url: String,
}

/// Session status response
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub exercise: ExerciseKind,
    pub rep_count: u32,
    pub rep_state: RepState,
    pub is_calibrating: bool,
    pub thresholds: Option<Thresholds>,
    pub voice_enabled: bool,
    pub stopped: bool,
    pub frames_processed: u64,
}

impl SessionStatusResponse {
    fn from_session(session: &ApiSession) -> Self {
        let coach = &session.coach;
        Self {
            session_id: session.id.clone(),
            exercise: coach.exercise(),
            rep_count: coach.rep_count(),
            rep_state: coach.rep_state(),
            is_calibrating: coach.is_calibrating(),
            thresholds: coach.thresholds(),
            voice_enabled: coach.voice_enabled(),
            stopped: coach.is_stopped(),
            frames_processed: coach.frames_processed(),
        }
    }

    fn from_stopped(id: &str, summary: &SessionSummary) -> Self {
        Self {
            session_id: id.to_string(),
            exercise: summary.exercise_type,
            rep_count: summary.rep_count,
            rep_state: RepState::Unset,
            is_calibrating: false,
            thresholds: summary.thresholds,
            voice_enabled: false,
            stopped: true,
            frames_processed: summary.frames_processed,
        }
    }
}

/// Switch exercise request
#[derive(Debug, Deserialize)]
pub struct ExerciseRequest {
    pub exercise: String,
}

/// Voice toggle request
#[derive(Debug, Deserialize)]
pub struct VoiceRequest {
    pub enabled: bool,
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router
pub fn create_router(config: EngineConfig, summary_dir: Option<String>) -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(SessionTable::default()),
        config,
        summary_dir,
    });

    Router::new()
        .route("/health", get(health))
        .route("/exercises", get(list_exercises))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(stop_session))
        .route("/session/:id/frame", post(post_frame))
        .route("/session/:id/reset", post(reset_session))
        .route("/session/:id/exercise", post(switch_exercise))
        .route("/session/:id/voice", post(set_voice))
        .route("/session/:id/summary", get(get_summary))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.live.len(),
    })
}

async fn list_exercises() -> Json<&'static [ExerciseProfile]> {
    Json(all_profiles())
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Json<NewSessionResponse> {
    let session_id = generate_session_id();
    let exercise = req
        .exercise
        .as_deref()
        .map(ExerciseKind::parse_or_general)
        .unwrap_or(ExerciseKind::General);

    let speech = ChannelSink::new(SPEECH_CHANNEL_CAPACITY);
    let mut coach = CoachSession::with_sink(exercise, &state.config, Box::new(speech.clone()));
    coach.set_voice_enabled(req.voice_enabled.unwrap_or(true));

    let mut sessions = state.sessions.write().await;
    sessions.live.insert(
        session_id.clone(),
        ApiSession { id: session_id.clone(), coach, speech },
    );
    info!(session = %session_id, %exercise, "session created");

    Json(NewSessionResponse {
        websocket_url: format!("/ws/{}", session_id),
        session_id,
        exercise,
    })
}

/// Get session status; stopped sessions report from their summary
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    if let Some(summary) = sessions.stopped.get(&id) {
        return Ok(Json(SessionStatusResponse::from_stopped(&id, summary)));
    }
    let session = sessions.live(&id)?;
    Ok(Json(SessionStatusResponse::from_session(session)))
}

/// Analyze one frame; 204 when nobody is in view
async fn post_frame(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(frame): Json<PoseFrame>,
) -> Result<Response, StatusCode> {
    if let Err(e) = frame.validate() {
        warn!(session = %id, error = %e, "rejecting frame");
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut sessions = state.sessions.write().await;
    let session = sessions.live_mut(&id)?;

    Ok(match session.coach.process_frame(&frame) {
        Some(analysis) => Json(analysis).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.live_mut(&id)?;
    session.coach.reset();
    Ok(Json(SessionStatusResponse::from_session(session)))
}

async fn switch_exercise(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ExerciseRequest>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.live_mut(&id)?;
    session.coach.switch_exercise(ExerciseKind::parse_or_general(&req.exercise));
    Ok(Json(SessionStatusResponse::from_session(session)))
}

async fn set_voice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<VoiceRequest>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.live_mut(&id)?;
    session.coach.set_voice_enabled(req.enabled);
    Ok(Json(SessionStatusResponse::from_session(session)))
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSummary>, StatusCode> {
    let sessions = state.sessions.read().await;
    if let Some(summary) = sessions.stopped.get(&id) {
        return Ok(Json(summary.clone()));
    }
    let session = sessions.live(&id)?;
    Ok(Json(session.coach.summary()))
}

/// Stop the session and release it; only its summary is kept.
/// The summary is saved once, on the first stop.
async fn stop_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSummary>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    if let Some(summary) = sessions.stopped.get(&id) {
        return Ok(Json(summary.clone()));
    }
    let mut session = sessions.live.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    let summary = session.coach.stop();
    sessions.stopped.insert(id.clone(), summary.clone());
    drop(sessions);

    if let Some(dir) = &state.summary_dir {
        match save_summary(&summary, dir) {
            Ok(path) => info!(session = %id, path = %path, "summary saved"),
            Err(e) => warn!(session = %id, error = %e, "failed to save summary"),
        }
    }
    Ok(Json(summary))
}

/// WebSocket handler for speech commands
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let rx = sessions.live(&id)?.speech.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| handle_websocket(socket, rx)))
}

/// Forward speech commands until either side goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<SpeechCommand>) {
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(command) => {
                    let Ok(json) = serde_json::to_string(&command) else {
                        continue;
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "speech listener lagging, commands dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("session_{:x}_{}", nanos, seq)
}

/// Run the API server
pub async fn run_server(addr: &str, config: EngineConfig, summary_dir: Option<String>) -> crate::Result<()> {
    let router = create_router(config, summary_dir);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "repcoach API listening");
    println!("🏋 repcoach API running on {}", addr);
    println!("  POST   /session/new           - Create session");
    println!("  GET    /session/:id           - Get status");
    println!("  POST   /session/:id/frame     - Analyze frame");
    println!("  POST   /session/:id/reset     - Recalibrate");
    println!("  POST   /session/:id/exercise  - Switch exercise");
    println!("  POST   /session/:id/voice     - Toggle voice");
    println!("  GET    /session/:id/summary   - Set summary");
    println!("  DELETE /session/:id           - Stop session");
    println!("  WS     /ws/:id                - Speech commands");
    println!("  GET    /health                - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
