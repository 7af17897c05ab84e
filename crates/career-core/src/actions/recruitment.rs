use contracts::{ActionReport, StatDelta};

use super::{apply_stats, ensure_funds, ActionContext};
use crate::error::{GameError, GameResult};
use crate::{CareerWorld, Resolution};

/// Fill the oldest open slot now instead of waiting for its ready day.
pub(super) fn resolve(ctx: &mut ActionContext<'_>, world: &CareerWorld) -> GameResult<Resolution> {
    let config = ctx.config;
    if world.state.rank_index < config.command.min_rank {
        return Err(GameError::precondition(format!(
            "recruiting opens at rank index {}",
            config.command.min_rank
        )));
    }
    let Some(oldest) = world
        .state
        .recruitment_queue
        .iter()
        .enumerate()
        .min_by_key(|(_, ticket)| (ticket.requested_day, ticket.slot))
        .map(|(index, _)| index)
    else {
        return Err(GameError::precondition("no vacancies to recruit for"));
    };
    let cost_cents = config.recruitment.cost_cents;
    ensure_funds(&world.state, cost_cents)?;

    let mut next = world.clone();
    let ticket = next.state.recruitment_queue.remove(oldest);
    let recruit = next.roster.recruit_into_slot(
        config,
        next.state.branch,
        ticket.slot,
        next.state.current_day,
    )?;
    apply_stats(
        &mut next.state,
        StatDelta {
            money_cents: -cost_cents,
            ..StatDelta::default()
        },
    );

    Ok(Resolution {
        world: next,
        report: ActionReport::Recruitment {
            recruit,
            cost_cents,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CareerConfig;
    use crate::test_support::{sample_world, test_rng};

    #[test]
    fn recruitment_fills_the_oldest_ticket() {
        let config = CareerConfig::builtin();
        let mut world = sample_world(&config);
        world.state.rank_index = config.command.min_rank;
        world.state.current_day = 30;
        let later = world.roster.mark_kia("npc_010", 20, 14).expect("kia");
        let earlier = world.roster.mark_kia("npc_007", 15, 14).expect("kia");
        world.state.recruitment_queue = vec![later, earlier];

        let mut rng = test_rng(5);
        let mut ctx = ActionContext {
            config: &config,
            now_ms: 0,
            rng: &mut rng,
        };
        let resolution = resolve(&mut ctx, &world).expect("recruit");
        let ActionReport::Recruitment { recruit, .. } = &resolution.report else {
            panic!("unexpected report");
        };
        assert_eq!(recruit.npc_id, "npc_007_g1");
        assert_eq!(resolution.world.state.recruitment_queue.len(), 1);
        assert_eq!(
            resolution.world.state.money_cents,
            world.state.money_cents - config.recruitment.cost_cents
        );
    }

    #[test]
    fn nothing_to_recruit() {
        let config = CareerConfig::builtin();
        let mut world = sample_world(&config);
        world.state.rank_index = config.command.min_rank;
        let mut rng = test_rng(5);
        let mut ctx = ActionContext {
            config: &config,
            now_ms: 0,
            rng: &mut rng,
        };
        assert!(matches!(resolve(&mut ctx, &world), Err(GameError::Precondition(_))));
    }
}
