use contracts::{ActionReport, StatDelta};

use super::{apply_stats, ensure_funds, ActionContext};
use crate::error::GameResult;
use crate::{CareerWorld, Resolution};

pub(super) fn resolve(
    ctx: &mut ActionContext<'_>,
    world: &CareerWorld,
    destination: &str,
) -> GameResult<Resolution> {
    let trip = ctx.config.destination(destination)?;
    ensure_funds(&world.state, trip.cost_cents)?;

    let morale = trip.morale.roll(ctx.rng) as i32;
    let health = trip.health.roll(ctx.rng) as i32;
    let mut next = world.clone();
    let delta = apply_stats(
        &mut next.state,
        StatDelta {
            money_cents: -trip.cost_cents,
            morale,
            health,
            promotion_points: 0,
        },
    );

    Ok(Resolution {
        world: next,
        report: ActionReport::Travel {
            destination: trip.id.clone(),
            delta,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CareerConfig;
    use crate::error::GameError;
    use crate::test_support::{sample_world, test_rng};

    #[test]
    fn travel_costs_money_and_lifts_morale() {
        let config = CareerConfig::builtin();
        let world = sample_world(&config);
        let mut rng = test_rng(2);
        let mut ctx = ActionContext {
            config: &config,
            now_ms: 0,
            rng: &mut rng,
        };
        let resolution = resolve(&mut ctx, &world, "hometown").expect("travel");
        assert_eq!(resolution.world.state.money_cents, world.state.money_cents - 15_000);
        assert!(resolution.world.state.morale > world.state.morale);
    }

    #[test]
    fn broke_or_lost_travellers_are_refused() {
        let config = CareerConfig::builtin();
        let mut world = sample_world(&config);
        let mut rng = test_rng(2);
        let mut ctx = ActionContext {
            config: &config,
            now_ms: 0,
            rng: &mut rng,
        };
        assert!(matches!(
            resolve(&mut ctx, &world, "moon"),
            Err(GameError::NotFound { .. })
        ));
        world.state.money_cents = 10;
        assert!(matches!(
            resolve(&mut ctx, &world, "beach"),
            Err(GameError::Precondition(_))
        ));
    }
}
