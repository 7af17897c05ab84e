use contracts::{ActionReport, StatDelta, TrainingIntensity};

use super::{apply_stats, ensure_funds, ActionContext};
use crate::error::GameResult;
use crate::random::roll;
use crate::{CareerWorld, Resolution};

pub(super) fn resolve(
    ctx: &mut ActionContext<'_>,
    world: &CareerWorld,
    intensity: TrainingIntensity,
) -> GameResult<Resolution> {
    let table = ctx.config.training(intensity)?;
    ensure_funds(&world.state, table.cost_cents)?;

    let injured = roll(ctx.rng, table.injury_chance);
    let mut health = table.health.roll(ctx.rng);
    if injured {
        health -= table.injury_health_loss.roll(ctx.rng);
    }
    let morale = table.morale.roll(ctx.rng);
    let points = if injured {
        0
    } else {
        table.promotion_points.roll(ctx.rng)
    };

    let mut next = world.clone();
    let delta = apply_stats(
        &mut next.state,
        StatDelta {
            money_cents: -table.cost_cents,
            morale: morale as i32,
            health: health as i32,
            promotion_points: points as i32,
        },
    );

    Ok(Resolution {
        world: next,
        report: ActionReport::Training {
            intensity,
            injured,
            delta,
        },
    })
}
