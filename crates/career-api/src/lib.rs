//! Request orchestration around the career engine: one SQLite transaction per
//! request, plus the HTTP boundary.

mod persistence;
mod server;

use career_core::{CareerEngine, CareerWorld, GameError};
use contracts::{
    ActionReport, CeremonyReport, DecisionLogPage, GameSnapshot, NewGame, NpcRecord, PauseKind,
    PlayerAction,
};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub use persistence::{PersistenceError, ProfileTx, SqliteProfileStore};
pub use server::{default_sqlite_path, serve, ServerError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PauseOutcome {
    pub pause_token: Uuid,
    pub snapshot: GameSnapshot,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActionOutcome {
    pub report: ActionReport,
    pub snapshot: GameSnapshot,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CeremonyOutcome {
    pub report: CeremonyReport,
    pub snapshot: GameSnapshot,
}

/// Drives the engine against a profile store. Every mutating call loads the
/// world, catches the clock up, applies one operation, and commits; any error
/// drops the transaction so nothing from that request is kept.
#[derive(Debug)]
pub struct GameService {
    engine: CareerEngine,
    store: SqliteProfileStore,
}

impl GameService {
    pub fn new(engine: CareerEngine, store: SqliteProfileStore) -> Self {
        Self { engine, store }
    }

    pub fn engine(&self) -> &CareerEngine {
        &self.engine
    }

    pub fn create_profile(
        &mut self,
        request: &NewGame,
        now_ms: i64,
        rng_seed: u64,
    ) -> ServiceResult<GameSnapshot> {
        let world = self.engine.new_game(request, now_ms, rng_seed)?;
        let tx = self.store.begin()?;
        tx.insert_world(&world, now_ms).map_err(|err| match err {
            PersistenceError::ProfileExists(id) => {
                ServiceError::Game(GameError::conflict(format!("profile {id} already exists")))
            }
            other => ServiceError::Persistence(other),
        })?;
        tx.commit()?;

        tracing::info!(
            target: "career::service",
            profile_id = %world.state.profile_id,
            country = world.state.country.code(),
            branch = world.state.branch.code(),
            "profile.created"
        );
        Ok(self.engine.snapshot(&world.state)?)
    }

    pub fn snapshot(&mut self, profile_id: &str, now_ms: i64) -> ServiceResult<GameSnapshot> {
        self.transact(profile_id, now_ms, |engine, world, _, _| {
            Ok(engine.snapshot(&world.state)?)
        })
    }

    pub fn pause(
        &mut self,
        profile_id: &str,
        kind: PauseKind,
        now_ms: i64,
    ) -> ServiceResult<PauseOutcome> {
        self.transact(profile_id, now_ms, |engine, world, rng, _| {
            let pause_token = engine.pause(world, kind, now_ms, rng)?;
            Ok(PauseOutcome {
                pause_token,
                snapshot: engine.snapshot(&world.state)?,
            })
        })
    }

    pub fn resume(&mut self, profile_id: &str, token: Uuid, now_ms: i64) -> ServiceResult<GameSnapshot> {
        self.transact(profile_id, now_ms, |engine, world, _, _| {
            engine.resume(world, token, now_ms)?;
            Ok(engine.snapshot(&world.state)?)
        })
    }

    pub fn set_time_scale(
        &mut self,
        profile_id: &str,
        scale: u32,
        now_ms: i64,
    ) -> ServiceResult<GameSnapshot> {
        self.transact(profile_id, now_ms, |engine, world, _, _| {
            engine.set_time_scale(world, scale, now_ms)?;
            Ok(engine.snapshot(&world.state)?)
        })
    }

    /// Resolve one player action. Decision choices are also appended to the
    /// decision log inside the same transaction.
    pub fn act(
        &mut self,
        profile_id: &str,
        action: &PlayerAction,
        now_ms: i64,
    ) -> ServiceResult<ActionOutcome> {
        self.transact(profile_id, now_ms, |engine, world, rng, tx| {
            let resolution = engine.perform(world, action, now_ms, rng)?;
            *world = resolution.world;
            if let ActionReport::DecisionChoice { entry, .. } = &resolution.report {
                tx.append_decision(profile_id, entry, now_ms)?;
            }
            Ok(ActionOutcome {
                report: resolution.report,
                snapshot: engine.snapshot(&world.state)?,
            })
        })
    }

    pub fn ceremony_preview(&mut self, profile_id: &str, now_ms: i64) -> ServiceResult<CeremonyReport> {
        self.transact(profile_id, now_ms, |engine, world, _, _| {
            Ok(engine.ceremony_preview(world)?)
        })
    }

    pub fn complete_ceremony(&mut self, profile_id: &str, now_ms: i64) -> ServiceResult<CeremonyOutcome> {
        self.transact(profile_id, now_ms, |engine, world, _, _| {
            let resolution = engine.complete_ceremony(world, now_ms)?;
            *world = resolution.world;
            tracing::info!(
                target: "career::ceremony",
                profile_id,
                ceremony_day = resolution.report.ceremony_day,
                recipients = resolution.report.recipients.len(),
                "ceremony.completed"
            );
            Ok(CeremonyOutcome {
                report: resolution.report,
                snapshot: engine.snapshot(&world.state)?,
            })
        })
    }

    pub fn npcs(&mut self, profile_id: &str, now_ms: i64) -> ServiceResult<Vec<NpcRecord>> {
        self.transact(profile_id, now_ms, |engine, world, _, _| Ok(engine.npcs(world)))
    }

    pub fn npc(&mut self, profile_id: &str, npc_id: &str, now_ms: i64) -> ServiceResult<NpcRecord> {
        self.transact(profile_id, now_ms, |engine, world, _, _| {
            Ok(engine.inspect_npc(world, npc_id)?)
        })
    }

    pub fn list_decisions(
        &self,
        profile_id: &str,
        cursor: Option<i64>,
        page_size: usize,
    ) -> ServiceResult<DecisionLogPage> {
        if !self.store.profile_exists(profile_id)? {
            return Err(GameError::not_found("profile", profile_id).into());
        }
        Ok(self.store.list_decisions(profile_id, cursor, page_size)?)
    }

    fn transact<T>(
        &mut self,
        profile_id: &str,
        now_ms: i64,
        op: impl FnOnce(&CareerEngine, &mut CareerWorld, &mut ChaCha8Rng, &ProfileTx<'_>) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let engine = &self.engine;
        let tx = self.store.begin()?;
        let mut world = tx
            .load_world(profile_id)?
            .ok_or_else(|| GameError::not_found("profile", profile_id))?;

        let mut rng = CareerEngine::request_rng(&world.state);
        world.state.action_nonce = world.state.action_nonce.wrapping_add(1);

        let result = engine
            .sync(&mut world, now_ms, &mut rng)
            .map_err(ServiceError::from)
            .and_then(|report| {
                if report.days_elapsed > 0 || report.decision_issued.is_some() || report.ceremony_forced {
                    tracing::debug!(
                        target: "career::service",
                        profile_id,
                        days_elapsed = report.days_elapsed,
                        ceremony_forced = report.ceremony_forced,
                        decision = report.decision_issued.as_deref().unwrap_or(""),
                        "world.synced"
                    );
                }
                op(engine, &mut world, &mut rng, &tx)
            });

        match result {
            Ok(value) => {
                tx.save_world(&world, now_ms)?;
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(
                    target: "career::service",
                    profile_id,
                    error = %err,
                    "request.rolled_back"
                );
                Err(err)
            }
        }
    }
}
