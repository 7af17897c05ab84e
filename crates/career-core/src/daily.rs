use crate::config::CareerConfig;
use crate::error::GameResult;
use crate::progression::daily_pay_cents;
use crate::random::clamp_stat;
use crate::CareerWorld;

/// Apply `days` of passive accrual: tenure, salary, and health recovery for
/// the player and living NPCs.
pub fn accrue_days(config: &CareerConfig, world: &mut CareerWorld, days: u32) -> GameResult<()> {
    if days == 0 {
        return Ok(());
    }
    let state = &mut world.state;
    let track = config.track(state.country, state.branch)?;
    let pay = daily_pay_cents(track, state.rank_index);

    state.days_in_rank = state.days_in_rank.saturating_add(days);
    state.money_cents = state
        .money_cents
        .saturating_add(pay.saturating_mul(i64::from(days)));
    state.health = clamp_stat(
        i64::from(state.health) + i64::from(config.daily.health_recovery) * i64::from(days),
    );

    let day = state.current_day;
    world.roster.recover(&config.daily, days, day);
    Ok(())
}
