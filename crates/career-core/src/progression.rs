//! Promotion rules over a rank tier table.

use contracts::{GameState, PromotionStatus};

use crate::config::{CarryOverPolicy, RankTier, TrackConfig};

/// Evaluate promotion against the thresholds of the tier above `rank_index`.
pub fn evaluate_promotion(
    ranks: &[RankTier],
    rank_index: u32,
    days_in_rank: u32,
    promotion_points: u32,
) -> PromotionStatus {
    let current_rank_title = ranks
        .get(rank_index as usize)
        .or_else(|| ranks.last())
        .map(|tier| tier.title.clone())
        .unwrap_or_default();

    let Some(next) = ranks.get(rank_index as usize + 1) else {
        return PromotionStatus {
            eligible: false,
            at_max_rank: true,
            current_rank_title,
            next_rank_title: None,
            missing_days: 0,
            missing_points: 0,
        };
    };

    let missing_days = next.min_days_in_rank.saturating_sub(days_in_rank);
    let missing_points = next.min_promotion_points.saturating_sub(promotion_points);
    PromotionStatus {
        eligible: missing_days == 0 && missing_points == 0,
        at_max_rank: false,
        current_rank_title,
        next_rank_title: Some(next.title.clone()),
        missing_days,
        missing_points,
    }
}

pub fn promotion_status(track: &TrackConfig, state: &GameState) -> PromotionStatus {
    evaluate_promotion(
        &track.ranks,
        state.rank_index,
        state.days_in_rank,
        state.promotion_points,
    )
}

/// Promote one tier if eligible. Returns whether a promotion happened.
pub fn apply_promotion(track: &TrackConfig, state: &mut GameState) -> bool {
    let status = promotion_status(track, state);
    if !status.eligible {
        return false;
    }
    let next_index = state.rank_index + 1;
    let Some(next) = track.ranks.get(next_index as usize) else {
        return false;
    };

    state.promotion_points = match track.carry_over {
        CarryOverPolicy::Reset => 0,
        CarryOverPolicy::CarryExcess => state
            .promotion_points
            .saturating_sub(next.min_promotion_points),
    };
    state.rank_index = next_index;
    state.days_in_rank = 0;
    state.player_position = next.position.clone();
    true
}

pub fn daily_pay_cents(track: &TrackConfig, rank_index: u32) -> i64 {
    track
        .ranks
        .get(rank_index as usize)
        .or_else(|| track.ranks.last())
        .map(|tier| tier.daily_pay_cents)
        .unwrap_or(0)
}
