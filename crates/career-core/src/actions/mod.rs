//! Player action resolvers.
//!
//! Each resolver reads the current world, works on a copy, and returns the
//! successor world plus a structured report. The input world is never touched,
//! so a failed resolver leaves nothing half-applied.

mod academy;
mod career_review;
mod command;
mod decision;
mod deployment;
mod recruitment;
mod social;
mod training;
mod transfer;
mod travel;

use contracts::{GameState, PauseKind, PlayerAction, StatDelta};
use rand_chacha::ChaCha8Rng;

use crate::config::CareerConfig;
use crate::error::{GameError, GameResult};
use crate::random::clamp_stat;
use crate::{CareerWorld, Resolution};

pub use academy::{grade_for_score, freedom_level_for};

/// Inputs every resolver shares for one request.
pub struct ActionContext<'a> {
    pub config: &'a CareerConfig,
    pub now_ms: i64,
    pub rng: &'a mut ChaCha8Rng,
}

/// Reject actions the current pause forbids. User pauses freeze the clock but
/// do not block play; system pauses must be resolved first.
pub fn ensure_actionable(state: &GameState, action: &PlayerAction) -> GameResult<()> {
    match (state.pause.kind(), action) {
        (Some(PauseKind::Decision), PlayerAction::DecisionChoice { .. }) => Ok(()),
        (Some(PauseKind::Decision), _) => Err(GameError::precondition(
            "a decision is pending; choose an option first",
        )),
        (Some(PauseKind::Ceremony), _) => Err(GameError::precondition(
            "a ceremony is in progress; complete it first",
        )),
        _ => Ok(()),
    }
}

pub(crate) fn ensure_funds(state: &GameState, cost_cents: i64) -> GameResult<()> {
    if state.money_cents < cost_cents {
        return Err(GameError::precondition(format!(
            "insufficient funds: need {cost_cents} cents, have {}",
            state.money_cents
        )));
    }
    Ok(())
}

/// Apply a delta with stats clamped to 0..=100, money floored at zero, and
/// points floored at zero. Returns the delta actually applied.
pub(crate) fn apply_stats(state: &mut GameState, delta: StatDelta) -> StatDelta {
    let before = (
        state.money_cents,
        state.morale,
        state.health,
        i64::from(state.promotion_points),
    );

    state.money_cents = state.money_cents.saturating_add(delta.money_cents).max(0);
    state.morale = clamp_stat(i64::from(state.morale) + i64::from(delta.morale));
    state.health = clamp_stat(i64::from(state.health) + i64::from(delta.health));
    let points = (i64::from(state.promotion_points) + i64::from(delta.promotion_points))
        .clamp(0, i64::from(u32::MAX));
    state.promotion_points = points as u32;

    StatDelta {
        money_cents: state.money_cents - before.0,
        morale: state.morale - before.1,
        health: state.health - before.2,
        promotion_points: (points - before.3) as i32,
    }
}

/// Dispatch a validated action to its resolver.
pub fn resolve_action(
    ctx: &mut ActionContext<'_>,
    world: &CareerWorld,
    action: &PlayerAction,
) -> GameResult<Resolution> {
    ensure_actionable(&world.state, action)?;
    match action {
        PlayerAction::Training { intensity } => training::resolve(ctx, world, *intensity),
        PlayerAction::Deployment {
            mission_type,
            duration_days,
        } => deployment::resolve(ctx, world, *mission_type, *duration_days),
        PlayerAction::CareerReview => career_review::resolve(ctx, world),
        PlayerAction::AcademyExam { tier, answers } => academy::resolve(ctx, world, *tier, answers),
        PlayerAction::DecisionChoice {
            decision_id,
            option_id,
        } => decision::resolve(ctx, world, decision_id.as_deref(), option_id),
        PlayerAction::Travel { destination } => travel::resolve(ctx, world, destination),
        PlayerAction::Social { npc_id, kind } => social::resolve(ctx, world, npc_id, *kind),
        PlayerAction::Command { kind } => command::resolve(ctx, world, *kind),
        PlayerAction::Recruitment => recruitment::resolve(ctx, world),
        PlayerAction::Transfer { division } => transfer::resolve(ctx, world, division),
    }
}
