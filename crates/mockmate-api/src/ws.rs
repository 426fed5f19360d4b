//! WebSocket analysis stream.
//!
//! One socket is one interview session: the client streams base64 camera
//! frames as text messages and receives exactly one JSON reply per frame.
//! All session state (calibration baseline, smoothing buffers) lives on
//! this task and dies with the connection.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use mockmate_models::FrameReply;
use mockmate_vision::{decode_frame, LandmarkDetector, Session};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::metrics;
use crate::state::AppState;

static ACTIVE_WS_CONNECTIONS: AtomicI64 = AtomicI64::new(0);

const WS_SEND_BUFFER_SIZE: usize = 32;
const WS_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const WS_CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// `GET /ws/analyze` upgrade handler.
pub async fn ws_analyze(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let count = ACTIVE_WS_CONNECTIONS.fetch_add(1, Ordering::SeqCst) + 1;
    metrics::set_ws_active_connections(count);
    metrics::record_ws_connection("analyze");
    info!("WebSocket connection opened, {} active", count);

    ws.on_upgrade(move |socket| async move {
        // Runs on every exit path, panics included.
        let _release = scopeguard::guard((), |_| {
            let count = ACTIVE_WS_CONNECTIONS.fetch_sub(1, Ordering::SeqCst) - 1;
            metrics::set_ws_active_connections(count);
        });

        handle_analyze_socket(socket, state).await;
    })
}

async fn handle_analyze_socket(socket: WebSocket, state: AppState) {
    let (ws_sender, mut receiver) = socket.split();

    // Replies go through a bounded channel so slow clients exert
    // backpressure instead of growing an unbounded queue.
    let (tx, mut rx) = mpsc::channel::<Message>(WS_SEND_BUFFER_SIZE);
    let send_task = tokio::spawn(async move {
        let mut ws_sender = ws_sender;
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut session = Session::new();
    info!("Analysis session {} started", session.id());

    let mut heartbeat = interval(WS_HEARTBEAT_INTERVAL);
    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(payload))) => {
                        last_activity = Instant::now();

                        let was_calibrating = session.is_calibrating();
                        let started = Instant::now();
                        let reply =
                            analyze_frame(&mut session, state.detector.as_ref(), &payload).await;
                        metrics::record_frame_processed();
                        metrics::record_frame_duration(started.elapsed().as_secs_f64());
                        if was_calibrating && !session.is_calibrating() {
                            info!("Analysis session {} calibrated", session.id());
                            metrics::record_session_calibrated();
                        }

                        metrics::record_ws_reply(reply_kind(&reply));
                        if !send_reply(&tx, &reply).await {
                            warn!("Reply channel closed for session {}", session.id());
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        last_activity = Instant::now();
                        let reply = FrameReply::bad_image("expected a base64 text frame");
                        metrics::record_ws_reply(reply_kind(&reply));
                        if !send_reply(&tx, &reply).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        last_activity = Instant::now();
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket closed by client for session {}", session.id());
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket receive error for session {}: {}", session.id(), e);
                        break;
                    }
                }
            }
            _ = heartbeat.tick() => {
                if last_activity.elapsed() > WS_CLIENT_TIMEOUT {
                    info!("Session {} timed out, no frames or pongs", session.id());
                    break;
                }
                if last_activity.elapsed() > WS_HEARTBEAT_INTERVAL / 2
                    && tx.send(Message::Ping(Vec::new())).await.is_err()
                {
                    break;
                }
            }
        }
    }

    drop(tx);
    let _ = send_task.await;
    info!("Analysis session {} ended", session.id());
}

/// Decode and analyze one inbound frame. Transport and detector failures
/// become replies; the session state machine only advances on frames
/// that produced landmarks.
pub(crate) async fn analyze_frame(
    session: &mut Session,
    detector: &dyn LandmarkDetector,
    payload: &str,
) -> FrameReply {
    let image = match decode_frame(payload) {
        Ok(image) => image,
        Err(e) => return FrameReply::bad_image(e.to_string()),
    };
    let (width, height) = image.dimensions();

    let frame = match detector.detect(&image).await {
        Ok(Some(frame)) => frame,
        Ok(None) => return FrameReply::no_face(),
        Err(e) => {
            debug!("Landmark detection failed for session {}: {}", session.id(), e);
            return FrameReply::analysis_error(e.to_string());
        }
    };

    session.process(&frame, width, height, Instant::now())
}

fn reply_kind(reply: &FrameReply) -> &'static str {
    match reply {
        FrameReply::BadImage { .. } => "bad_image",
        FrameReply::Calibrating { .. } => "calibrating",
        FrameReply::NoFace { .. } => "no_face",
        FrameReply::AnalysisError { .. } => "analysis_error",
        FrameReply::Classification(_) => "classification",
    }
}

/// Serialize and queue one reply. Returns false when the socket is gone.
async fn send_reply(tx: &mpsc::Sender<Message>, reply: &FrameReply) -> bool {
    let payload = match serde_json::to_string(reply) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to serialize frame reply: {}", e);
            return true;
        }
    };

    match tx.try_send(Message::Text(payload)) {
        Ok(()) => true,
        Err(TrySendError::Full(msg)) => {
            debug!("WebSocket send buffer full, applying backpressure");
            tx.send(msg).await.is_ok()
        }
        Err(TrySendError::Closed(_)) => false,
    }
}
