use super::state::AppState;
use crate::error::{DeviceError, ProctorError, SessionError};
use crate::session::StatusSnapshot;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Interview length in minutes (default from configuration)
    pub duration_minutes: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SessionActionResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
    pub resume_active: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(e: &ProctorError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        ProctorError::Session(SessionError::NotReady) => StatusCode::SERVICE_UNAVAILABLE,
        ProctorError::Session(_) => StatusCode::CONFLICT,
        ProctorError::Device(DeviceError::PermissionDenied) => StatusCode::FORBIDDEN,
        ProctorError::Transport(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/start
/// Start the interview session
pub async fn start_session(
    State(state): State<AppState>,
    body: Option<Json<StartSessionRequest>>,
) -> impl IntoResponse {
    let duration_minutes = body.and_then(|Json(req)| req.duration_minutes);

    match state.engine.start_session(duration_minutes).await {
        Ok(session_id) => {
            info!("Session started via API: {}", session_id);
            (
                StatusCode::OK,
                Json(StartSessionResponse {
                    session_id: session_id.to_string(),
                    status: "active".to_string(),
                    message: "Interview session started".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to start session: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// POST /session/speak
/// Toggle the candidate's microphone: start recording when idle, stop
/// and send the utterance when recording
pub async fn toggle_speak(State(state): State<AppState>) -> impl IntoResponse {
    match state.engine.toggle_speak().await {
        Ok(()) => (
            StatusCode::OK,
            Json(SessionActionResponse {
                status: "ok".to_string(),
                message: "Speak toggled".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to toggle speak: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// POST /session/end
/// End the interview session (idempotent)
pub async fn end_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.engine.end_session().await {
        Ok(()) => (
            StatusCode::OK,
            Json(SessionActionResponse {
                status: "ended".to_string(),
                message: "Interview session ended".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to end session: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// POST /session/acknowledge
/// Dismiss the end-of-session report
pub async fn acknowledge_report(State(state): State<AppState>) -> impl IntoResponse {
    match state.engine.acknowledge_report().await {
        Ok(()) => (
            StatusCode::OK,
            Json(SessionActionResponse {
                status: "idle".to_string(),
                message: "Report acknowledged".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// GET /session/status
/// Point-in-time view of the engine
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.engine.status().await;

    (
        StatusCode::OK,
        Json(StatusResponse {
            snapshot,
            resume_active: state.resume.is_active(),
        }),
    )
}

/// GET /session/report
/// The frozen report of the last ended session
pub async fn get_report(State(state): State<AppState>) -> impl IntoResponse {
    match state.engine.report().await {
        Some(report) => (StatusCode::OK, Json(report)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No session report available".to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /resume
/// Upload the candidate's resume (multipart field "file")
pub async fn upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }

                let filename = field.file_name().unwrap_or("resume").to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        return match state.resume.store(&filename, &bytes).await {
                            Ok(()) => (
                                StatusCode::OK,
                                Json(SessionActionResponse {
                                    status: "stored".to_string(),
                                    message: format!("Resume {} stored", filename),
                                }),
                            )
                                .into_response(),
                            Err(e) => {
                                error!("Failed to store resume: {}", e);
                                error_response(&e).into_response()
                            }
                        };
                    }
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(ErrorResponse {
                                error: format!("Failed to read upload: {}", e),
                            }),
                        )
                            .into_response();
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Malformed multipart body: {}", e),
                    }),
                )
                    .into_response();
            }
        }
    }

    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "Missing 'file' field".to_string(),
        }),
    )
        .into_response()
}

/// DELETE /resume
/// Remove the stored resume
pub async fn delete_resume(State(state): State<AppState>) -> impl IntoResponse {
    if !state.resume.is_active() {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No resume stored".to_string(),
            }),
        )
            .into_response();
    }

    match state.resume.clear().await {
        Ok(()) => (
            StatusCode::OK,
            Json(SessionActionResponse {
                status: "deleted".to_string(),
                message: "Resume deleted".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to delete resume: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
