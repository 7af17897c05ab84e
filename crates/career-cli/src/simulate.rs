//! Headless in-memory playthrough: a scripted player against the real engine.

use std::fmt;

use career_core::{CareerEngine, CareerWorld, GameError, GameResult};
use contracts::{
    Branch, Country, MissionType, NewGame, PauseKind, PlayerAction, TrainingIntensity,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationSummary {
    pub seed: u64,
    pub current_day: u32,
    pub rank_index: u32,
    pub rank_title: String,
    pub money_cents: i64,
    pub morale: i32,
    pub health: i32,
    pub actions: u32,
    pub rejected: u32,
    pub deployments: u32,
    pub promotions: u32,
    pub decisions: u32,
    pub ceremonies: u32,
    pub medals: usize,
    pub fallen_comrades: usize,
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "seed={} day={} rank={} ({}) money={} morale={} health={}",
            self.seed,
            self.current_day,
            self.rank_index,
            self.rank_title,
            self.money_cents,
            self.morale,
            self.health
        )?;
        write!(
            f,
            "actions={} rejected={} deployments={} promotions={} decisions={} ceremonies={} medals={} fallen={}",
            self.actions,
            self.rejected,
            self.deployments,
            self.promotions,
            self.decisions,
            self.ceremonies,
            self.medals,
            self.fallen_comrades
        )
    }
}

pub fn run_simulation(engine: &CareerEngine, seed: u64, days: u32) -> GameResult<SimulationSummary> {
    let request = NewGame {
        profile_id: format!("sim-{seed}"),
        player_name: "Recruit".to_string(),
        country: Country::Kr,
        branch: Branch::Army,
        start_age: 20,
        time_scale: 1,
    };
    let mut world = engine.new_game(&request, 0, seed)?;
    let ms_per_day = engine.config().clock.ms_per_day;
    let mut summary = SimulationSummary {
        seed,
        ..SimulationSummary::default()
    };

    let mut now_ms = 0_i64;
    let max_requests = u64::from(days).saturating_mul(4).saturating_add(64);
    for _ in 0..max_requests {
        if world.state.current_day >= days {
            break;
        }
        now_ms += ms_per_day;

        let mut rng = CareerEngine::request_rng(&world.state);
        world.state.action_nonce = world.state.action_nonce.wrapping_add(1);
        engine.sync(&mut world, now_ms, &mut rng)?;

        if let Some(decision) = world.state.pending_decision() {
            let Some(option) = decision.options.first() else {
                break;
            };
            let choice = PlayerAction::DecisionChoice {
                decision_id: Some(decision.decision_id.clone()),
                option_id: option.option_id.clone(),
            };
            world = engine.perform(&world, &choice, now_ms, &mut rng)?.world;
            summary.decisions += 1;
            continue;
        }

        if world.state.pause.kind() == Some(PauseKind::Ceremony) {
            world = engine.complete_ceremony(&world, now_ms)?.world;
            summary.ceremonies += 1;
            continue;
        }

        let action = next_action(engine, &world)?;
        let previous_rank = world.state.rank_index;
        match engine.perform(&world, &action, now_ms, &mut rng) {
            Ok(resolution) => {
                world = resolution.world;
                summary.actions += 1;
                if matches!(action, PlayerAction::Deployment { .. }) {
                    summary.deployments += 1;
                }
                if world.state.rank_index > previous_rank {
                    summary.promotions += 1;
                }
            }
            Err(err @ (GameError::Precondition(_) | GameError::Validation { .. })) => {
                tracing::debug!(
                    target: "career::service",
                    error = %err,
                    action = action.label(),
                    "simulate.rejected"
                );
                summary.rejected += 1;
            }
            Err(other) => return Err(other),
        }
    }

    let promotion = engine.promotion(&world.state)?;
    summary.current_day = world.state.current_day;
    summary.rank_index = world.state.rank_index;
    summary.rank_title = promotion.current_rank_title;
    summary.money_cents = world.state.money_cents;
    summary.morale = world.state.morale;
    summary.health = world.state.health;
    summary.medals = world.state.player_medals.len();
    summary.fallen_comrades = world.roster.records().filter(|npc| !npc.is_alive()).count();
    Ok(summary)
}

fn next_action(engine: &CareerEngine, world: &CareerWorld) -> GameResult<PlayerAction> {
    let state = &world.state;
    if engine.promotion(state)?.eligible {
        return Ok(PlayerAction::CareerReview);
    }
    if state.morale < 40 {
        return Ok(PlayerAction::Travel {
            destination: "hometown".to_string(),
        });
    }
    if state.health >= 70 && state.current_day % 7 == 6 {
        return Ok(PlayerAction::Deployment {
            mission_type: MissionType::Patrol,
            duration_days: 3,
        });
    }
    let intensity = if state.health >= 60 {
        TrainingIntensity::Medium
    } else {
        TrainingIntensity::Low
    };
    Ok(PlayerAction::Training { intensity })
}
