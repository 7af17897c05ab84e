use super::*;

use axum::body::Bytes;
use contracts::{ActionReport, GameSnapshot, PlayerAction};
use serde_json::{Map, Value};

const ACTION_ROUTES: &[(&str, &str)] = &[
    ("training", "training"),
    ("deployment", "deployment"),
    ("career_review", "career_review"),
    ("academy_exam", "academy_exam"),
    ("decision", "decision_choice"),
    ("travel", "travel"),
    ("social", "social"),
    ("command", "command"),
    ("recruitment", "recruitment"),
    ("transfer", "transfer"),
];

#[derive(Debug, Serialize)]
pub(in crate::server) struct ActionResponse {
    schema_version: String,
    report: ActionReport,
    snapshot: GameSnapshot,
}

pub(in crate::server) async fn perform_action(
    State(state): State<AppState>,
    Path((profile_id, action)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let action = parse_action(&action, &body)?;
    let id = profile_id.clone();
    let outcome = state
        .with_profile(&profile_id, move |service| service.act(&id, &action, now_ms()))
        .await?;
    Ok(Json(ActionResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        report: outcome.report,
        snapshot: outcome.snapshot,
    }))
}

/// Route segment picks the action; the body carries its fields. Actions
/// without fields accept an empty body.
pub(in crate::server) fn parse_action(route: &str, body: &[u8]) -> Result<PlayerAction, HttpApiError> {
    let Some((_, tag)) = ACTION_ROUTES.iter().find(|(segment, _)| *segment == route) else {
        return Err(HttpApiError::from_game(GameError::not_found("action", route)));
    };

    let mut fields = if body.iter().all(u8::is_ascii_whitespace) {
        Map::new()
    } else {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => {
                return Err(HttpApiError::bad_request(
                    "action body must be a JSON object",
                    Some("body"),
                ))
            }
            Err(err) => return Err(HttpApiError::bad_request(err.to_string(), Some("body"))),
        }
    };
    fields.insert("action".to_string(), Value::String((*tag).to_string()));

    serde_json::from_value::<PlayerAction>(Value::Object(fields))
        .map_err(|err| HttpApiError::bad_request(err.to_string(), Some(route)))
}
