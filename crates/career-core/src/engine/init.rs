use super::*;
use crate::events::reschedule;

const MAX_PROFILE_ID_LEN: usize = 64;
const MAX_PLAYER_NAME_LEN: usize = 40;

fn validate_new_game(config: &CareerConfig, request: &NewGame) -> GameResult<()> {
    let id = request.profile_id.as_str();
    if id.is_empty()
        || id.len() > MAX_PROFILE_ID_LEN
        || !id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(GameError::validation(
            "profile_id",
            format!("1-{MAX_PROFILE_ID_LEN} characters of [A-Za-z0-9_-]"),
        ));
    }
    let name = request.player_name.trim();
    if name.is_empty() || name.chars().count() > MAX_PLAYER_NAME_LEN {
        return Err(GameError::validation(
            "player_name",
            format!("1-{MAX_PLAYER_NAME_LEN} characters"),
        ));
    }
    let start = &config.start;
    if !(start.min_start_age..=start.max_start_age).contains(&request.start_age) {
        return Err(GameError::validation(
            "start_age",
            format!("must be between {} and {}", start.min_start_age, start.max_start_age),
        ));
    }
    if !config.clock.allowed_time_scales.contains(&request.time_scale) {
        return Err(GameError::validation(
            "time_scale",
            format!("must be one of {:?}", config.clock.allowed_time_scales),
        ));
    }
    Ok(())
}

impl CareerEngine {
    /// Build day zero of a new career, anchored at `now_ms`.
    pub fn new_game(&self, request: &NewGame, now_ms: i64, rng_seed: u64) -> GameResult<CareerWorld> {
        let config = self.config();
        validate_new_game(config, request)?;
        let track = config.track(request.country, request.branch)?;
        let branch = config.branch(request.branch)?;
        config.country(request.country)?;

        let (division, unit) = branch
            .divisions
            .first()
            .and_then(|division| division.units.first().map(|unit| (division, unit)))
            .ok_or_else(|| GameError::not_found("division", request.branch.code()))?;
        let position = track
            .ranks
            .first()
            .map(|tier| tier.position.clone())
            .ok_or_else(|| GameError::not_found("rank", "0"))?;

        let mut state = GameState {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            profile_id: request.profile_id.clone(),
            player_name: request.player_name.trim().to_string(),
            country: request.country,
            branch: request.branch,
            start_age: request.start_age,
            rng_seed,
            action_nonce: 0,
            current_day: 0,
            server_reference_time_ms: now_ms,
            game_time_scale: request.time_scale,
            pause: Default::default(),
            rank_index: 0,
            money_cents: config.start.money_cents,
            morale: config.start.morale,
            health: config.start.health,
            promotion_points: 0,
            days_in_rank: 0,
            player_position: position,
            player_division: division.name.clone(),
            player_unit: unit.clone(),
            player_medals: Vec::new(),
            player_ribbons: Vec::new(),
            next_event_day: 0,
            last_mission_day: None,
            ceremony_completed_day: 0,
            npc_award_history: Default::default(),
            certificates: Vec::new(),
            recruitment_queue: Vec::new(),
        };
        let mut rng = Self::request_rng(&state);
        reschedule(config, &mut state, &mut rng)?;
        state.action_nonce = 1;

        let roster = NpcRoster::initialize(config, state.branch, 0)?;
        Ok(CareerWorld { state, roster })
    }
}
