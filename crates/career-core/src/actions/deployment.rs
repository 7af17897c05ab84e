use contracts::{ActionReport, MissionType, StatDelta};
use rand::seq::SliceRandom;

use super::{apply_stats, ActionContext};
use crate::clock::GameClock;
use crate::daily::accrue_days;
use crate::error::{GameError, GameResult};
use crate::random::roll;
use crate::{CareerWorld, Resolution};

pub(super) fn resolve(
    ctx: &mut ActionContext<'_>,
    world: &CareerWorld,
    mission_type: MissionType,
    duration_days: u32,
) -> GameResult<Resolution> {
    let config = ctx.config;
    let branch = config.branch(world.state.branch)?;
    let table = branch
        .deployment(mission_type)
        .ok_or_else(|| GameError::not_found("deployment table", format!("{mission_type:?}")))?;

    if !(table.min_duration_days..=table.max_duration_days).contains(&duration_days) {
        return Err(GameError::validation(
            "duration_days",
            format!(
                "must be between {} and {}",
                table.min_duration_days, table.max_duration_days
            ),
        ));
    }
    if world.state.health < table.min_health {
        return Err(GameError::precondition(format!(
            "health {} is below the {} required for {mission_type:?}",
            world.state.health, table.min_health
        )));
    }

    let success = roll(ctx.rng, table.success_chance);
    let injured = roll(ctx.rng, table.injury_chance);

    let mut delta = StatDelta::default();
    if success {
        let reward = table.reward_cents.roll(ctx.rng) as f64 * branch.reward_scale;
        delta.money_cents = reward.round() as i64;
        delta.promotion_points = table.promotion_points.roll(ctx.rng) as i32;
        delta.morale = table.morale_success.roll(ctx.rng) as i32;
    } else {
        delta.morale = table.morale_failure.roll(ctx.rng) as i32;
    }
    let mut health_loss = table.health_loss.roll(ctx.rng);
    if injured {
        health_loss += table.injury_health_loss.roll(ctx.rng);
    }
    delta.health = -(health_loss as i32);

    let mut next = world.clone();
    let applied = apply_stats(&mut next.state, delta);

    let unit_mates = next
        .roster
        .active_in_unit(&next.state.player_division, &next.state.player_unit);
    let mut casualties = Vec::new();
    let mut wounded = Vec::new();
    if roll(ctx.rng, table.casualty_chance) {
        if let Some(fallen) = unit_mates.choose(ctx.rng) {
            let ticket = next.roster.mark_kia(
                fallen,
                next.state.current_day,
                config.recruitment.replacement_delay_days,
            )?;
            next.state.recruitment_queue.push(ticket);
            casualties.push(fallen.clone());
        }
    } else if roll(ctx.rng, table.injury_chance) {
        if let Some(hurt) = unit_mates.choose(ctx.rng) {
            let loss = table.comrade_wound_health_loss.roll(ctx.rng);
            wounded.push((hurt.clone(), loss));
        }
    }

    GameClock::new(&config.clock).skip_days(&mut next.state, duration_days);
    accrue_days(config, &mut next, duration_days)?;
    next.state.last_mission_day = Some(next.state.current_day);
    // Wounds land on return so the mission's own days do not heal them.
    for (hurt, loss) in &wounded {
        next.roster.mark_injured(hurt, *loss, next.state.current_day)?;
    }
    let wounded: Vec<String> = wounded.into_iter().map(|(hurt, _)| hurt).collect();

    tracing::info!(
        target: "career::service",
        profile_id = %next.state.profile_id,
        mission = ?mission_type,
        success,
        injured,
        casualties = casualties.len(),
        wounded = wounded.len(),
        "deployment.resolved"
    );

    Ok(Resolution {
        world: next,
        report: ActionReport::Deployment {
            mission_type,
            duration_days,
            success,
            injured,
            delta: applied,
            casualties,
            wounded,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CareerConfig;
    use crate::test_support::{sample_world, test_rng};
    use contracts::NpcStatus;

    fn context<'a>(config: &'a CareerConfig, rng: &'a mut rand_chacha::ChaCha8Rng) -> ActionContext<'a> {
        ActionContext {
            config,
            now_ms: 0,
            rng,
        }
    }

    #[test]
    fn deployment_advances_clock_and_records_mission() {
        let config = CareerConfig::builtin();
        let world = sample_world(&config);
        let mut rng = test_rng(1);
        let resolution = resolve(&mut context(&config, &mut rng), &world, MissionType::Support, 5)
            .expect("deploy");
        assert_eq!(resolution.world.state.current_day, 5);
        assert_eq!(resolution.world.state.last_mission_day, Some(5));
        assert_eq!(resolution.world.state.days_in_rank, 5);
        assert!((0..=100).contains(&resolution.world.state.health));
    }

    #[test]
    fn duration_outside_table_is_invalid() {
        let config = CareerConfig::builtin();
        let world = sample_world(&config);
        let mut rng = test_rng(1);
        let result = resolve(&mut context(&config, &mut rng), &world, MissionType::Patrol, 0);
        assert!(matches!(result, Err(GameError::Validation { .. })));
    }

    #[test]
    fn too_weak_to_deploy() {
        let config = CareerConfig::builtin();
        let mut world = sample_world(&config);
        world.state.health = 5;
        let mut rng = test_rng(1);
        let result = resolve(&mut context(&config, &mut rng), &world, MissionType::Patrol, 3);
        assert!(matches!(result, Err(GameError::Precondition(_))));
    }

    #[test]
    fn casualties_open_recruitment_tickets() {
        let config = CareerConfig::builtin();
        let mut world = sample_world(&config);
        let comrade_unit = world
            .roster
            .alive()
            .find(|record| record.identity.division == world.state.player_division)
            .map(|record| record.identity.unit.clone())
            .expect("someone shares the player's division");
        world.state.player_unit = comrade_unit;
        let mut saw_casualty = false;
        for nonce in 0..400 {
            let mut rng = test_rng(nonce);
            let resolution =
                resolve(&mut context(&config, &mut rng), &world, MissionType::Patrol, 1)
                    .expect("deploy");
            let state = &resolution.world.state;
            assert_eq!(state.recruitment_queue.len(), match &resolution.report {
                ActionReport::Deployment { casualties, .. } => casualties.len(),
                _ => unreachable!(),
            });
            if let Some(ticket) = state.recruitment_queue.first() {
                saw_casualty = true;
                assert_eq!(ticket.requested_day, 0);
            }
        }
        assert!(saw_casualty, "a 4% casualty roll should land within 400 tries");
    }

    #[test]
    fn wounded_comrades_are_injured_until_they_recover() {
        let config = CareerConfig::builtin();
        let mut world = sample_world(&config);
        let comrade_unit = world
            .roster
            .alive()
            .find(|record| record.identity.division == world.state.player_division)
            .map(|record| record.identity.unit.clone())
            .expect("someone shares the player's division");
        world.state.player_unit = comrade_unit;

        let (mut next, hurt) = (0..400)
            .find_map(|nonce| {
                let mut rng = test_rng(nonce);
                let resolution =
                    resolve(&mut context(&config, &mut rng), &world, MissionType::Patrol, 1)
                        .expect("deploy");
                match resolution.report {
                    ActionReport::Deployment { wounded, casualties, .. } => {
                        assert!(wounded.len() + casualties.len() <= 1);
                        wounded.first().cloned().map(|id| (resolution.world, id))
                    }
                    _ => unreachable!(),
                }
            })
            .expect("a comrade is wounded within 400 tries");

        let record = next.roster.get(&hurt).expect("wounded npc");
        assert_eq!(record.status, NpcStatus::Injured);
        assert!(record.is_alive());
        assert!(record.health < config.daily.npc_recovered_health);
        assert_eq!(record.status_changed_day, next.state.current_day);

        next.roster.recover(&config.daily, 1, next.state.current_day + 1);
        assert_eq!(next.roster.get(&hurt).expect("npc").status, NpcStatus::Injured);

        next.roster.recover(&config.daily, 365, 366);
        assert_eq!(next.roster.get(&hurt).expect("npc").status, NpcStatus::Active);
    }
}
