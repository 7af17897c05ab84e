use super::*;

use contracts::{GameSnapshot, NewGame, PauseKind};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub(in crate::server) struct PauseRequest {
    kind: PauseKind,
}

#[derive(Debug, Serialize)]
pub(in crate::server) struct PauseResponse {
    schema_version: String,
    pause_token: Uuid,
    snapshot: GameSnapshot,
}

#[derive(Debug, Deserialize)]
pub(in crate::server) struct ResumeRequest {
    pause_token: Uuid,
}

#[derive(Debug, Deserialize)]
pub(in crate::server) struct TimeScaleRequest {
    time_scale: u32,
}

pub(in crate::server) async fn create_profile(
    State(state): State<AppState>,
    Json(request): Json<NewGame>,
) -> Result<(StatusCode, Json<GameSnapshot>), HttpApiError> {
    let profile_id = request.profile_id.clone();
    let rng_seed = rand::random::<u64>();
    let snapshot = state
        .with_profile(&profile_id, move |service| {
            service.create_profile(&request, now_ms(), rng_seed)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub(in crate::server) async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> Result<Json<GameSnapshot>, HttpApiError> {
    let id = profile_id.clone();
    let snapshot = state
        .with_profile(&profile_id, move |service| service.snapshot(&id, now_ms()))
        .await?;
    Ok(Json(snapshot))
}

pub(in crate::server) async fn pause_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(request): Json<PauseRequest>,
) -> Result<Json<PauseResponse>, HttpApiError> {
    let id = profile_id.clone();
    let outcome = state
        .with_profile(&profile_id, move |service| {
            service.pause(&id, request.kind, now_ms())
        })
        .await?;
    Ok(Json(PauseResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        pause_token: outcome.pause_token,
        snapshot: outcome.snapshot,
    }))
}

pub(in crate::server) async fn resume_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(request): Json<ResumeRequest>,
) -> Result<Json<GameSnapshot>, HttpApiError> {
    let id = profile_id.clone();
    let snapshot = state
        .with_profile(&profile_id, move |service| {
            service.resume(&id, request.pause_token, now_ms())
        })
        .await?;
    Ok(Json(snapshot))
}

pub(in crate::server) async fn set_time_scale(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(request): Json<TimeScaleRequest>,
) -> Result<Json<GameSnapshot>, HttpApiError> {
    let id = profile_id.clone();
    let snapshot = state
        .with_profile(&profile_id, move |service| {
            service.set_time_scale(&id, request.time_scale, now_ms())
        })
        .await?;
    Ok(Json(snapshot))
}
