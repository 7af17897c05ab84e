use super::*;

use contracts::{DecisionLogEntry, NpcRecord};

#[derive(Debug, Deserialize)]
pub(in crate::server) struct DecisionsQuery {
    cursor: Option<i64>,
    page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(in crate::server) struct DecisionsResponse {
    schema_version: String,
    entries: Vec<DecisionLogEntry>,
    next_cursor: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(in crate::server) struct NpcListResponse {
    schema_version: String,
    npcs: Vec<NpcRecord>,
}

#[derive(Debug, Serialize)]
pub(in crate::server) struct NpcResponse {
    schema_version: String,
    npc: NpcRecord,
}

pub(in crate::server) async fn get_decisions(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Query(query): Query<DecisionsQuery>,
) -> Result<Json<DecisionsResponse>, HttpApiError> {
    if query.cursor.is_some_and(|cursor| cursor < 0) {
        return Err(HttpApiError::bad_request(
            "cursor must not be negative",
            Some("cursor"),
        ));
    }
    let page_size = page_size(query.page_size)?;
    let id = profile_id.clone();
    let page = state
        .with_profile(&profile_id, move |service| {
            service.list_decisions(&id, query.cursor, page_size)
        })
        .await?;
    Ok(Json(DecisionsResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        entries: page.entries,
        next_cursor: page.next_cursor,
    }))
}

pub(in crate::server) async fn get_npcs(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> Result<Json<NpcListResponse>, HttpApiError> {
    let id = profile_id.clone();
    let npcs = state
        .with_profile(&profile_id, move |service| service.npcs(&id, now_ms()))
        .await?;
    Ok(Json(NpcListResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        npcs,
    }))
}

pub(in crate::server) async fn get_npc(
    State(state): State<AppState>,
    Path((profile_id, npc_id)): Path<(String, String)>,
) -> Result<Json<NpcResponse>, HttpApiError> {
    let id = profile_id.clone();
    let npc = state
        .with_profile(&profile_id, move |service| service.npc(&id, &npc_id, now_ms()))
        .await?;
    Ok(Json(NpcResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        npc,
    }))
}
