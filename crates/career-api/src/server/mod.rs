use std::net::SocketAddr;
use std::path::PathBuf;

use axum::extract::{Path, Query, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use career_core::{CareerEngine, GameError};
use contracts::{ApiError, ErrorCode, SCHEMA_VERSION_V1};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::{GameService, PersistenceError, ServiceError, SqliteProfileStore};

mod error;
mod routes;
mod state;
mod util;

pub use error::ServerError;
pub use util::default_sqlite_path;

use error::HttpApiError;
use routes::{actions::*, ceremony::*, profiles::*, query::*};
use state::AppState;
use util::{apply_cors_headers, now_ms, page_size};

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 500;
const DEFAULT_SQLITE_PATH: &str = "career_profiles.sqlite";

/// Migrate the database, then serve until the listener fails.
pub async fn serve(
    addr: SocketAddr,
    engine: CareerEngine,
    sqlite_path: PathBuf,
) -> Result<(), ServerError> {
    SqliteProfileStore::open(&sqlite_path)?;
    let state = AppState::new(engine, sqlite_path);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(target: "career::service", %addr, "server.listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/profiles", post(create_profile))
        .route("/api/v1/profiles/{profile_id}", get(get_profile))
        .route("/api/v1/profiles/{profile_id}/pause", post(pause_profile))
        .route("/api/v1/profiles/{profile_id}/resume", post(resume_profile))
        .route("/api/v1/profiles/{profile_id}/time_scale", post(set_time_scale))
        .route(
            "/api/v1/profiles/{profile_id}/actions/{action}",
            post(perform_action),
        )
        .route("/api/v1/profiles/{profile_id}/ceremony", get(get_ceremony))
        .route(
            "/api/v1/profiles/{profile_id}/ceremony/complete",
            post(complete_ceremony),
        )
        .route("/api/v1/profiles/{profile_id}/decisions", get(get_decisions))
        .route("/api/v1/profiles/{profile_id}/npcs", get(get_npcs))
        .route("/api/v1/profiles/{profile_id}/npcs/{npc_id}", get(get_npc))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}
