use crate::{
    errors::UNEXPECTED_MESSAGE,
    export::{pdf_filename, render_dossier_pdf},
    Dossier, FailureNotice, GenerationStep, MediaHandle, MediaStore, Studio, StudioError,
    GENERIC_TITLE,
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    studio: Arc<Mutex<Studio>>,
    steps: watch::Receiver<GenerationStep>,
    media: MediaStore,
}

impl AppState {
    #[must_use]
    pub fn new(studio: Studio) -> Self {
        let steps = studio.subscribe();
        let media = studio.media().clone();
        Self {
            studio: Arc::new(Mutex::new(studio)),
            steps,
            media,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateBody {
    pub subject: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub step: GenerationStep,
    pub label: &'static str,
    pub ordinal: u8,
}

impl From<GenerationStep> for StepView {
    fn from(step: GenerationStep) -> Self {
        Self {
            step,
            label: step.label(),
            ordinal: step.ordinal(),
        }
    }
}

/// A failure rendered as `{title, message}` JSON.
struct ApiFailure(StatusCode, FailureNotice);

impl From<StudioError> for ApiFailure {
    fn from(error: StudioError) -> Self {
        let status = match &error {
            StudioError::EmptySubject => StatusCode::BAD_REQUEST,
            StudioError::InvalidTransition { .. } => StatusCode::CONFLICT,
            StudioError::Service(_) => StatusCode::BAD_GATEWAY,
            StudioError::Config(_) | StudioError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self(status, FailureNotice::from_error(&error))
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

fn not_found(message: &str) -> ApiFailure {
    ApiFailure(
        StatusCode::NOT_FOUND,
        FailureNotice::new("Não Encontrado", message),
    )
}

fn attachment(disposition: &str, filename: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("{disposition}; filename=\"{filename}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

async fn generate_handler(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<Dossier>, ApiFailure> {
    // Runs detached so a client that disconnects does not cancel the run
    // halfway and leave the studio mid-step.
    let mut studio = Arc::clone(&state.studio).lock_owned().await;
    let run = tokio::spawn(async move {
        let dossier = studio.generate(&body.subject).await?;
        Ok::<_, StudioError>(dossier.clone())
    });
    let dossier = run.await.map_err(|error| {
        tracing::error!(%error, "generation task failed");
        ApiFailure(
            StatusCode::INTERNAL_SERVER_ERROR,
            FailureNotice::new(GENERIC_TITLE, UNEXPECTED_MESSAGE),
        )
    })??;
    Ok(Json(dossier))
}

async fn current_handler(State(state): State<AppState>) -> Result<Json<Dossier>, ApiFailure> {
    let studio = state.studio.lock().await;
    if let Some(notice) = studio.state().notice() {
        return Err(ApiFailure(StatusCode::CONFLICT, notice.clone()));
    }
    studio
        .dossier()
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Nenhum dossiê foi gerado ainda."))
}

async fn reset_handler(State(state): State<AppState>) -> StatusCode {
    state.studio.lock().await.reset();
    StatusCode::NO_CONTENT
}

async fn step_handler(State(state): State<AppState>) -> Json<StepView> {
    let step = *state.steps.borrow();
    Json(step.into())
}

async fn pdf_handler(State(state): State<AppState>) -> Result<Response, ApiFailure> {
    let studio = state.studio.lock().await;
    let dossier = studio
        .dossier()
        .ok_or_else(|| not_found("Nenhum dossiê foi gerado ainda."))?;
    let bytes = render_dossier_pdf(dossier).map_err(StudioError::from)?;
    let filename = pdf_filename(&dossier.subject);

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, attachment("attachment", &filename)),
        ],
        bytes,
    )
        .into_response())
}

async fn media_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiFailure> {
    let entry = MediaHandle::parse(&id)
        .and_then(|handle| state.media.get(&handle))
        .ok_or_else(|| not_found("Este áudio não está mais disponível."))?;
    let content_type = HeaderValue::from_str(&entry.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, attachment("inline", &entry.filename)),
        ],
        entry.bytes,
    )
        .into_response())
}

async fn home_handler() -> &'static str {
    "dossier-studio: POST /api/dossier {\"subject\": \"...\"}"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route(
            "/api/dossier",
            post(generate_handler)
                .get(current_handler)
                .delete(reset_handler),
        )
        .route("/api/dossier/step", get(step_handler))
        .route("/api/dossier/pdf", get(pdf_handler))
        .route("/media/{id}", get(media_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "dossier studio listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutting down");
            }
        })
        .await
}
