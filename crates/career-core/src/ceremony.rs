//! Periodic award ceremony.
//!
//! Scores the living roster and the player, names a chief of staff, derives a
//! medal quota, and hands out decorations nobody already holds. The scoring
//! arithmetic is deliberately fixed so a ceremony can be replayed and audited.

use std::collections::BTreeSet;

use contracts::{CeremonyCandidate, CeremonyRecipient, CeremonyReport, GameState};

use crate::config::{CareerConfig, CeremonyConfig};
use crate::npc::NpcRoster;

pub const PLAYER_CANDIDATE_ID: &str = "player";

/// Most recent ceremony boundary at or before `day`; the first one is at `interval`.
pub fn ceremony_day(day: u32, interval: u32) -> u32 {
    let interval = interval.max(1);
    if day < interval {
        interval
    } else {
        day / interval * interval
    }
}

pub fn ceremony_due(state: &GameState, interval: u32) -> bool {
    let boundary = ceremony_day(state.current_day, interval);
    state.current_day >= boundary && state.ceremony_completed_day < boundary
}

pub fn next_ceremony_day(state: &GameState, interval: u32) -> u32 {
    let boundary = ceremony_day(state.current_day, interval);
    if state.ceremony_completed_day >= boundary {
        boundary + interval.max(1)
    } else {
        boundary
    }
}

pub fn competence_score(day: u32, seed: u32, morale: i32, health: i32) -> i64 {
    let day = i64::from(day);
    let seed = i64::from(seed);
    45 + day / 3 + (seed * 17 + day * 7) % 35 + (i64::from(morale) + i64::from(health)) / 12
}

/// Player score: rank and tenure stand in for the roster slot.
pub fn player_score(state: &GameState, day: u32) -> i64 {
    let seed = state.rank_index.saturating_mul(10).saturating_add(state.days_in_rank);
    competence_score(day, seed, state.morale, state.health)
}

#[derive(Debug, Clone)]
struct Candidate {
    id: String,
    name: String,
    score: i64,
    is_player: bool,
    rotation: u32,
    owned_medals: BTreeSet<String>,
    owned_ribbons: BTreeSet<String>,
}

impl Candidate {
    fn summary(&self) -> CeremonyCandidate {
        CeremonyCandidate {
            candidate_id: self.id.clone(),
            name: self.name.clone(),
            score: self.score,
            is_player: self.is_player,
        }
    }
}

fn collect_candidates(state: &GameState, roster: &NpcRoster, day: u32) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = roster
        .alive()
        .map(|record| {
            let history = state.npc_award_history.get(&record.npc_id);
            Candidate {
                id: record.npc_id.clone(),
                name: record.identity.name.clone(),
                score: competence_score(day, record.identity.slot, record.morale, record.health),
                is_player: false,
                rotation: record.identity.slot,
                owned_medals: history.map(|h| h.medals.clone()).unwrap_or_default(),
                owned_ribbons: history.map(|h| h.ribbons.clone()).unwrap_or_default(),
            }
        })
        .collect();
    candidates.push(Candidate {
        id: PLAYER_CANDIDATE_ID.to_string(),
        name: state.player_name.clone(),
        score: player_score(state, day),
        is_player: true,
        rotation: state.rank_index,
        owned_medals: state.player_medals.iter().cloned().collect(),
        owned_ribbons: state.player_ribbons.iter().cloned().collect(),
    });
    candidates
}

fn total_awards(state: &GameState) -> i64 {
    let npc_awards: usize = state.npc_award_history.values().map(|record| record.total()).sum();
    (npc_awards + state.player_medals.len() + state.player_ribbons.len()) as i64
}

fn medal_quota(
    config: &CeremonyConfig,
    chief_score: i64,
    high_performers: i64,
    total_awards: i64,
    player_morale: i32,
) -> u32 {
    let strictness = if player_morale < config.strict_morale_threshold {
        config.strictness_penalty
    } else {
        0
    };
    let raw = (chief_score - config.chief_score_baseline) / config.chief_score_step
        + high_performers / config.high_performers_per_award
        - total_awards / config.saturation_awards_per_penalty
        - strictness;
    let quota = raw.clamp(i64::from(config.quota_min), i64::from(config.quota_max));
    assert!(
        (0..=i64::from(config.quota_max)).contains(&quota),
        "ceremony quota {quota} escaped its bounds"
    );
    quota as u32
}

fn first_free(catalog: &[String], start: usize, owned: &BTreeSet<String>) -> Option<String> {
    (0..catalog.len())
        .map(|offset| &catalog[(start + offset) % catalog.len()])
        .find(|name| !owned.contains(*name))
        .cloned()
}

/// Compute the ceremony for the boundary the state is on. Pure: nothing is
/// recorded until `apply_ceremony`.
pub fn run_ceremony(config: &CareerConfig, state: &GameState, roster: &NpcRoster) -> CeremonyReport {
    let rules = &config.ceremony;
    let day = ceremony_day(state.current_day, rules.interval_days);
    let mut logs = Vec::new();

    let mut ranked = collect_candidates(state, roster, day);
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    let attendance = ranked.len() as u32;
    logs.push(format!("Day {day} ceremony: {attendance} in attendance."));

    let chief_index = ranked.iter().position(|candidate| !candidate.is_player);
    let chief = chief_index.map(|index| ranked[index].clone());
    match &chief {
        Some(chief) => logs.push(format!(
            "{} presides as chief of staff (score {}).",
            chief.name, chief.score
        )),
        None => logs.push("No chief of staff could be named.".to_string()),
    }

    let mission_recent = state
        .last_mission_day
        .map(|last| state.current_day.saturating_sub(last) <= rules.mission_window_days)
        .unwrap_or(false);

    let medal_quota = match (&chief, mission_recent) {
        (Some(chief), true) => {
            let high_performers = ranked
                .iter()
                .enumerate()
                .filter(|(index, candidate)| {
                    Some(*index) != chief_index
                        && candidate.score >= chief.score - rules.high_performer_margin
                })
                .count() as i64;
            let quota = medal_quota(
                rules,
                chief.score,
                high_performers,
                total_awards(state),
                state.morale,
            );
            logs.push(format!(
                "{high_performers} high performers; medal quota set at {quota}."
            ));
            quota
        }
        (_, false) => {
            logs.push(format!(
                "No mission completed in the last {} days; no decorations today.",
                rules.mission_window_days
            ));
            0
        }
        (None, true) => 0,
    };

    let cycle = (day / rules.interval_days.max(1)) as usize;
    let mut recipients = Vec::new();
    for (index, candidate) in ranked.iter().enumerate() {
        if recipients.len() as u32 >= medal_quota {
            break;
        }
        if Some(index) == chief_index {
            continue;
        }
        if candidate.score < rules.award_min_score {
            logs.push(format!("{} falls short of the award threshold.", candidate.name));
            continue;
        }
        let start = cycle + candidate.rotation as usize;
        let medal = first_free(&config.medals, start, &candidate.owned_medals);
        let ribbon = first_free(&config.ribbons, start, &candidate.owned_ribbons);
        let (Some(medal), Some(ribbon)) = (medal, ribbon) else {
            logs.push(format!("{} already holds every available decoration.", candidate.name));
            continue;
        };
        logs.push(format!("{} receives the {medal} and the {ribbon}.", candidate.name));
        recipients.push(CeremonyRecipient {
            candidate_id: candidate.id.clone(),
            name: candidate.name.clone(),
            is_player: candidate.is_player,
            score: candidate.score,
            medal,
            ribbon,
        });
    }

    CeremonyReport {
        ceremony_day: day,
        attendance,
        medal_quota,
        chief_of_staff: chief.map(|candidate| candidate.summary()),
        logs,
        recipients,
    }
}

/// Record a ceremony's awards and mark its day completed.
pub fn apply_ceremony(state: &mut GameState, report: &CeremonyReport) {
    for recipient in &report.recipients {
        if recipient.is_player {
            if !state.player_medals.contains(&recipient.medal) {
                state.player_medals.push(recipient.medal.clone());
            }
            if !state.player_ribbons.contains(&recipient.ribbon) {
                state.player_ribbons.push(recipient.ribbon.clone());
            }
        } else {
            let record = state
                .npc_award_history
                .entry(recipient.candidate_id.clone())
                .or_default();
            record.medals.insert(recipient.medal.clone());
            record.ribbons.insert(recipient.ribbon.clone());
        }
    }
    state.ceremony_completed_day = state.ceremony_completed_day.max(report.ceremony_day);
    tracing::info!(
        target: "career::ceremony",
        profile_id = %state.profile_id,
        ceremony_day = report.ceremony_day,
        recipients = report.recipients.len(),
        quota = report.medal_quota,
        "ceremony.completed"
    );
}
