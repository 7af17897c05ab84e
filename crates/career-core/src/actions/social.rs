use contracts::{ActionReport, SocialKind, StatDelta};

use super::{apply_stats, ensure_funds, ActionContext};
use crate::error::{GameError, GameResult};
use crate::random::{clamp, clamp_stat};
use crate::{CareerWorld, Resolution};

pub(super) fn resolve(
    ctx: &mut ActionContext<'_>,
    world: &CareerWorld,
    npc_id: &str,
    kind: SocialKind,
) -> GameResult<Resolution> {
    let table = ctx.config.social(kind)?;
    let npc = world.roster.require(npc_id)?;
    if !npc.is_alive() {
        return Err(GameError::precondition(format!(
            "{} is no longer with the unit",
            npc.identity.name
        )));
    }
    ensure_funds(&world.state, table.cost_cents)?;

    let morale = table.morale.roll(ctx.rng) as i32;
    let npc_morale = table.npc_morale.roll(ctx.rng);
    let affinity_gain = table.affinity.roll(ctx.rng);

    let mut next = world.clone();
    let delta = apply_stats(
        &mut next.state,
        StatDelta {
            money_cents: -table.cost_cents,
            morale,
            ..StatDelta::default()
        },
    );
    let record = next.roster.require_mut(npc_id)?;
    record.morale = clamp_stat(i64::from(record.morale) + npc_morale);
    record.affinity = clamp(i64::from(record.affinity) + affinity_gain, 0, 100) as i32;
    let affinity = record.affinity;

    Ok(Resolution {
        world: next,
        report: ActionReport::Social {
            npc_id: npc_id.to_string(),
            kind,
            delta,
            affinity,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CareerConfig;
    use crate::test_support::{sample_world, test_rng};

    #[test]
    fn gift_builds_affinity_with_a_comrade() {
        let config = CareerConfig::builtin();
        let world = sample_world(&config);
        let mut rng = test_rng(3);
        let mut ctx = ActionContext {
            config: &config,
            now_ms: 0,
            rng: &mut rng,
        };
        let resolution = resolve(&mut ctx, &world, "npc_001", SocialKind::Gift).expect("gift");
        let npc = resolution.world.roster.get("npc_001").expect("npc");
        assert!(npc.affinity >= 5);
        assert!(resolution.world.state.money_cents < world.state.money_cents);
    }

    #[test]
    fn fallen_or_unknown_npcs_cannot_be_visited() {
        let config = CareerConfig::builtin();
        let mut world = sample_world(&config);
        world.roster.mark_kia("npc_002", 0, 14).expect("kia");
        let mut rng = test_rng(3);
        let mut ctx = ActionContext {
            config: &config,
            now_ms: 0,
            rng: &mut rng,
        };
        assert!(matches!(
            resolve(&mut ctx, &world, "npc_002", SocialKind::Chat),
            Err(GameError::Precondition(_))
        ));
        assert!(matches!(
            resolve(&mut ctx, &world, "npc_999", SocialKind::Chat),
            Err(GameError::NotFound { .. })
        ));
    }
}
