//! Shared test fixtures for career-core unit tests.

use contracts::{Branch, Country, GameState, PauseState, SCHEMA_VERSION_V1};
use rand_chacha::ChaCha8Rng;

use crate::config::CareerConfig;
use crate::npc::NpcRoster;
use crate::random::action_rng;
use crate::CareerWorld;

pub(crate) fn sample_state() -> GameState {
    GameState {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        profile_id: "test-profile".to_string(),
        player_name: "Tester".to_string(),
        country: Country::Kr,
        branch: Branch::Army,
        start_age: 20,
        rng_seed: 1337,
        action_nonce: 0,
        current_day: 0,
        server_reference_time_ms: 0,
        game_time_scale: 1,
        pause: PauseState::Running,
        rank_index: 0,
        money_cents: 50_000,
        morale: 70,
        health: 90,
        promotion_points: 0,
        days_in_rank: 0,
        player_position: "Rifleman".to_string(),
        player_division: "1st Infantry Division".to_string(),
        player_unit: "Alpha Company".to_string(),
        player_medals: Vec::new(),
        player_ribbons: Vec::new(),
        next_event_day: 3,
        last_mission_day: None,
        ceremony_completed_day: 0,
        npc_award_history: Default::default(),
        certificates: Vec::new(),
        recruitment_queue: Vec::new(),
    }
}

pub(crate) fn sample_world(config: &CareerConfig) -> CareerWorld {
    let state = sample_state();
    let roster = NpcRoster::initialize(config, state.branch, state.current_day).expect("roster");
    CareerWorld { state, roster }
}

pub(crate) fn test_rng(nonce: u64) -> ChaCha8Rng {
    action_rng(1337, nonce)
}
