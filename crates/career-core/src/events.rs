//! Random events that interrupt the career with a pending decision.

use contracts::{DecisionOption, GameState, PendingDecision};
use rand::Rng;

use crate::config::{CareerConfig, EventDefinition};
use crate::error::GameResult;
use crate::random::{roll, sample_geometric_gap, sample_weighted, Weighted};

/// Events open to the player's country, branch, and rank, in id order so the
/// weighted draw is stable regardless of config ordering.
pub fn event_pool<'a>(config: &'a CareerConfig, state: &GameState) -> Vec<Weighted<&'a EventDefinition>> {
    let mut pool: Vec<Weighted<&EventDefinition>> = config
        .events
        .iter()
        .filter(|event| event.applies_to(state.country, state.branch, state.rank_index))
        .map(|event| Weighted::new(event, event.base_weight))
        .collect();
    pool.sort_by(|a, b| a.item.id.cmp(&b.item.id));
    pool
}

pub fn is_event_due(state: &GameState) -> bool {
    state.current_day >= state.next_event_day && state.pending_decision().is_none()
}

/// Run the daily event gate. A miss pushes the check to tomorrow; a hit returns
/// the decision to pause on. `next_event_day` is only rescheduled by a choice.
pub fn check_for_event<R: Rng + ?Sized>(
    config: &CareerConfig,
    state: &mut GameState,
    rng: &mut R,
) -> GameResult<Option<PendingDecision>> {
    if !is_event_due(state) {
        return Ok(None);
    }
    let country = config.country(state.country)?;
    if !roll(rng, country.daily_event_probability) {
        state.next_event_day = state.current_day.saturating_add(1);
        return Ok(None);
    }

    let pool = event_pool(config, state);
    let Some(event) = sample_weighted(rng, &pool).copied() else {
        state.next_event_day = state.current_day.saturating_add(1);
        return Ok(None);
    };

    let decision = PendingDecision {
        decision_id: format!("decision:{}:{}", state.current_day, state.action_nonce),
        event_id: event.id.clone(),
        title: event.title.clone(),
        description: event.description.clone(),
        issued_day: state.current_day,
        options: event
            .options
            .iter()
            .map(|option| DecisionOption {
                option_id: option.id.clone(),
                label: option.label.clone(),
                effects: option.effects,
            })
            .collect(),
    };
    tracing::info!(
        target: "career::events",
        profile_id = %state.profile_id,
        event_id = %decision.event_id,
        day = state.current_day,
        "event.issued"
    );
    Ok(Some(decision))
}

/// Schedule the next event check after a decision was resolved.
pub fn reschedule<R: Rng + ?Sized>(
    config: &CareerConfig,
    state: &mut GameState,
    rng: &mut R,
) -> GameResult<u32> {
    let gap = config.country(state.country)?.event_gap;
    let days = sample_geometric_gap(rng, gap.probability, gap.min_days, gap.max_days);
    state.next_event_day = state.current_day.saturating_add(days);
    Ok(state.next_event_day)
}
