use super::*;

use contracts::{CeremonyReport, GameSnapshot};

#[derive(Debug, Serialize)]
pub(in crate::server) struct CeremonyPreviewResponse {
    schema_version: String,
    report: CeremonyReport,
}

#[derive(Debug, Serialize)]
pub(in crate::server) struct CeremonyCompleteResponse {
    schema_version: String,
    report: CeremonyReport,
    snapshot: GameSnapshot,
}

pub(in crate::server) async fn get_ceremony(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> Result<Json<CeremonyPreviewResponse>, HttpApiError> {
    let id = profile_id.clone();
    let report = state
        .with_profile(&profile_id, move |service| service.ceremony_preview(&id, now_ms()))
        .await?;
    Ok(Json(CeremonyPreviewResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        report,
    }))
}

pub(in crate::server) async fn complete_ceremony(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> Result<Json<CeremonyCompleteResponse>, HttpApiError> {
    let id = profile_id.clone();
    let outcome = state
        .with_profile(&profile_id, move |service| service.complete_ceremony(&id, now_ms()))
        .await?;
    Ok(Json(CeremonyCompleteResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        report: outcome.report,
        snapshot: outcome.snapshot,
    }))
}
