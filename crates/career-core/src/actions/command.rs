use contracts::{ActionReport, CommandKind, StatDelta};

use super::{apply_stats, ActionContext};
use crate::error::{GameError, GameResult};
use crate::random::clamp_stat;
use crate::{CareerWorld, Resolution};

pub(super) fn resolve(
    ctx: &mut ActionContext<'_>,
    world: &CareerWorld,
    kind: CommandKind,
) -> GameResult<Resolution> {
    let config = ctx.config;
    if world.state.rank_index < config.command.min_rank {
        return Err(GameError::precondition(format!(
            "command duties open at rank index {}",
            config.command.min_rank
        )));
    }
    let table = config.command_action(kind)?;

    let mut next = world.clone();
    let troops = next
        .roster
        .active_in_unit(&next.state.player_division, &next.state.player_unit);
    for npc_id in &troops {
        let morale = table.npc_morale.roll(ctx.rng);
        let health = table.npc_health.roll(ctx.rng);
        let record = next.roster.require_mut(npc_id)?;
        record.morale = clamp_stat(i64::from(record.morale) + morale);
        record.health = clamp_stat(i64::from(record.health) + health);
    }

    let delta = apply_stats(
        &mut next.state,
        StatDelta {
            morale: table.morale.roll(ctx.rng) as i32,
            promotion_points: table.promotion_points.roll(ctx.rng) as i32,
            ..StatDelta::default()
        },
    );

    Ok(Resolution {
        world: next,
        report: ActionReport::Command {
            kind,
            affected_npcs: troops.len() as u32,
            delta,
        },
    })
}
