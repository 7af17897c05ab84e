//! Translates wall-clock time into in-game days.
//!
//! The persisted anchor (`server_reference_time_ms`) plus the time scale fully
//! determine the current day while running. Pausing freezes the day; resuming
//! shifts the anchor forward by the time spent paused.

use chrono::{Days, NaiveDate};
use contracts::GameState;

use crate::config::ClockConfig;

/// Days elapsed since `reference_ms` at scale 1. Never negative.
pub fn compute_game_day(now_ms: i64, reference_ms: i64, ms_per_day: i64) -> u32 {
    compute_game_day_scaled(now_ms, reference_ms, ms_per_day, 1)
}

pub fn compute_game_day_scaled(now_ms: i64, reference_ms: i64, ms_per_day: i64, scale: u32) -> u32 {
    if ms_per_day <= 0 {
        return 0;
    }
    let elapsed = i128::from(now_ms) - i128::from(reference_ms);
    if elapsed <= 0 {
        return 0;
    }
    let days = elapsed * i128::from(scale.max(1)) / i128::from(ms_per_day);
    u32::try_from(days).unwrap_or(u32::MAX)
}

pub fn to_in_game_date(epoch: NaiveDate, day: u32) -> NaiveDate {
    epoch
        .checked_add_days(Days::new(u64::from(day)))
        .unwrap_or(NaiveDate::MAX)
}

pub fn compute_age(start_age: u32, day: u32) -> u32 {
    start_age + day / 365
}

/// Clock operations bound to the configured day length.
#[derive(Debug, Clone, Copy)]
pub struct GameClock<'a> {
    config: &'a ClockConfig,
}

impl<'a> GameClock<'a> {
    pub fn new(config: &'a ClockConfig) -> Self {
        Self { config }
    }

    pub fn epoch(&self) -> NaiveDate {
        self.config.epoch
    }

    /// Real milliseconds that make up one game day at the state's time scale.
    fn ms_per_scaled_day(&self, scale: u32) -> i64 {
        (self.config.ms_per_day / i64::from(scale.max(1))).max(1)
    }

    /// The day the state should be on at `now_ms`, never behind the persisted day.
    pub fn true_day(&self, state: &GameState, now_ms: i64) -> u32 {
        if state.is_paused() {
            return state.current_day;
        }
        let computed = compute_game_day_scaled(
            now_ms,
            state.server_reference_time_ms,
            self.config.ms_per_day,
            state.game_time_scale,
        );
        computed.max(state.current_day)
    }

    /// Move `current_day` up to the true day; returns how many days elapsed.
    pub fn advance(&self, state: &mut GameState, now_ms: i64) -> u32 {
        let day = self.true_day(state, now_ms);
        let elapsed = day - state.current_day;
        if elapsed > 0 {
            tracing::debug!(
                target: "career::clock",
                profile_id = %state.profile_id,
                from = state.current_day,
                to = day,
                "clock.advanced"
            );
        }
        state.current_day = day;
        elapsed
    }

    /// Exclude a paused interval from the clock.
    pub fn shift_for_pause(&self, state: &mut GameState, paused_at_ms: i64, resumed_at_ms: i64) {
        let paused_for = (resumed_at_ms - paused_at_ms).max(0);
        state.server_reference_time_ms = state.server_reference_time_ms.saturating_add(paused_for);
    }

    /// Jump the clock forward by whole days (deployments), keeping the anchor
    /// consistent with the new day.
    pub fn skip_days(&self, state: &mut GameState, days: u32) {
        let span = self
            .ms_per_scaled_day(state.game_time_scale)
            .saturating_mul(i64::from(days));
        state.server_reference_time_ms = state.server_reference_time_ms.saturating_sub(span);
        state.current_day = state.current_day.saturating_add(days);
    }

    /// Change the time scale without moving the current (fractional) day.
    pub fn rebase_time_scale(&self, state: &mut GameState, new_scale: u32, now_ms: i64) {
        let old_scale = i128::from(state.game_time_scale.max(1));
        let new_scale_wide = i128::from(new_scale.max(1));
        let reference = if state.is_paused() {
            state
                .pause
                .episode()
                .map(|episode| episode.paused_at_ms)
                .unwrap_or(now_ms)
        } else {
            now_ms
        };
        let elapsed_game_ms =
            (i128::from(reference) - i128::from(state.server_reference_time_ms)) * old_scale;
        let rebased = i128::from(reference) - elapsed_game_ms / new_scale_wide;
        state.server_reference_time_ms =
            i64::try_from(rebased).unwrap_or(state.server_reference_time_ms);
        state.game_time_scale = new_scale;
    }
}
