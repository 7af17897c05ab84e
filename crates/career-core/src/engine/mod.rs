//! `CareerEngine`: the facade the service layer drives once per request.
//!
//! A request loads a `CareerWorld`, calls `sync` to catch the clock up, runs at
//! most one mutation, and persists the result. The engine holds nothing but
//! its configuration, so one instance serves every profile.

mod commands;
mod init;
mod inspect;
mod snapshot;
mod sync;

use std::sync::Arc;

use contracts::{
    CeremonyReport, GameSnapshot, GameState, NewGame, NpcRecord, PauseKind, PauseReason,
    PlayerAction, PromotionStatus, SCHEMA_VERSION_V1,
};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::actions::{resolve_action, ActionContext};
use crate::ceremony::{apply_ceremony, ceremony_day, ceremony_due, next_ceremony_day, run_ceremony};
use crate::clock::{compute_age, to_in_game_date, GameClock};
use crate::config::CareerConfig;
use crate::error::{GameError, GameResult};
use crate::npc::NpcRoster;
use crate::random::action_rng;
use crate::{CareerWorld, CeremonyResolution, Resolution};

pub use sync::SyncReport;

#[derive(Debug, Clone)]
pub struct CareerEngine {
    config: Arc<CareerConfig>,
}

impl CareerEngine {
    pub fn new(config: Arc<CareerConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CareerConfig {
        &self.config
    }

    fn clock(&self) -> GameClock<'_> {
        GameClock::new(&self.config.clock)
    }

    /// Random stream for one request. Callers bump `action_nonce` when the
    /// request commits so the next request draws fresh numbers.
    pub fn request_rng(state: &GameState) -> ChaCha8Rng {
        action_rng(state.rng_seed, state.action_nonce)
    }
}
