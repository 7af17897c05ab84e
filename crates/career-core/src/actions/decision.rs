use contracts::{ActionReport, DecisionLogDraft, PauseKind};

use super::{apply_stats, ActionContext};
use crate::clock::GameClock;
use crate::error::{GameError, GameResult};
use crate::events::reschedule;
use crate::pause::release_system;
use crate::{CareerWorld, Resolution};

/// Apply the chosen option, release the decision pause, and reschedule the
/// next event check, all on the same successor state.
pub(super) fn resolve(
    ctx: &mut ActionContext<'_>,
    world: &CareerWorld,
    decision_id: Option<&str>,
    option_id: &str,
) -> GameResult<Resolution> {
    let pending = world
        .state
        .pending_decision()
        .ok_or_else(|| GameError::not_found("pending decision", decision_id.unwrap_or("none")))?;
    if let Some(requested) = decision_id {
        if requested != pending.decision_id {
            return Err(GameError::conflict(format!(
                "decision {requested} is no longer pending; {} is",
                pending.decision_id
            )));
        }
    }
    let option = pending
        .option(option_id)
        .ok_or_else(|| GameError::not_found("decision option", option_id))?;

    let mut next = world.clone();
    let entry = DecisionLogDraft {
        decision_id: pending.decision_id.clone(),
        event_id: pending.event_id.clone(),
        game_day: world.state.current_day,
        selected_option: option.option_id.clone(),
        consequences: apply_stats(&mut next.state, option.effects),
    };
    release_system(
        &GameClock::new(&ctx.config.clock),
        &mut next.state,
        PauseKind::Decision,
        ctx.now_ms,
    )?;
    let next_event_day = reschedule(ctx.config, &mut next.state, ctx.rng)?;

    tracing::info!(
        target: "career::events",
        profile_id = %next.state.profile_id,
        decision_id = %entry.decision_id,
        option_id = %entry.selected_option,
        next_event_day,
        "decision.resolved"
    );

    Ok(Resolution {
        world: next,
        report: ActionReport::DecisionChoice {
            entry,
            next_event_day,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CareerConfig;
    use crate::test_support::{sample_world, test_rng};
    use contracts::{DecisionOption, PauseEpisode, PauseReason, PauseState, PendingDecision, StatDelta};
    use uuid::Uuid;

    fn pending_world(config: &CareerConfig) -> CareerWorld {
        let mut world = sample_world(config);
        world.state.current_day = 4;
        world.state.pause = PauseState::Paused(PauseEpisode {
            reason: PauseReason::Decision {
                decision: PendingDecision {
                    decision_id: "decision:4:0".to_string(),
                    event_id: "evt_extra_duty".to_string(),
                    title: "Extra duty".to_string(),
                    description: "Someone has to do it.".to_string(),
                    issued_day: 4,
                    options: vec![DecisionOption {
                        option_id: "volunteer".to_string(),
                        label: "Volunteer".to_string(),
                        effects: StatDelta {
                            morale: -200,
                            promotion_points: 2,
                            ..StatDelta::default()
                        },
                    }],
                },
            },
            token: Uuid::from_u128(9),
            paused_at_ms: 1_000,
            expires_at_ms: None,
        });
        world
    }

    fn choose(world: &CareerWorld, decision_id: Option<&str>, option_id: &str) -> GameResult<Resolution> {
        let config = CareerConfig::builtin();
        let mut rng = test_rng(0);
        let mut ctx = ActionContext {
            config: &config,
            now_ms: 5_000,
            rng: &mut rng,
        };
        resolve(&mut ctx, world, decision_id, option_id)
    }

    #[test]
    fn choice_applies_effects_and_releases_pause() {
        let config = CareerConfig::builtin();
        let world = pending_world(&config);
        let resolution = choose(&world, Some("decision:4:0"), "volunteer").expect("choose");
        let state = &resolution.world.state;

        assert!(!state.is_paused());
        assert_eq!(state.morale, 0);
        assert_eq!(state.promotion_points, 2);
        assert_eq!(state.server_reference_time_ms, 4_000);
        assert!(state.next_event_day > 4);
        let ActionReport::DecisionChoice { entry, .. } = &resolution.report else {
            panic!("unexpected report");
        };
        assert_eq!(entry.consequences.morale, -70);
        assert_eq!(entry.game_day, 4);
    }

    #[test]
    fn unknown_option_and_stale_decision_are_rejected() {
        let config = CareerConfig::builtin();
        let world = pending_world(&config);
        assert!(matches!(
            choose(&world, None, "desert"),
            Err(GameError::NotFound { .. })
        ));
        assert!(matches!(
            choose(&world, Some("decision:1:0"), "volunteer"),
            Err(GameError::Conflict(_))
        ));
        assert!(world.state.is_paused());
    }

    #[test]
    fn no_pending_decision_is_not_found() {
        let config = CareerConfig::builtin();
        let world = sample_world(&config);
        assert!(matches!(
            choose(&world, None, "volunteer"),
            Err(GameError::NotFound { .. })
        ));
    }
}
