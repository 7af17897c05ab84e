use super::*;
use crate::daily::accrue_days;
use crate::events::check_for_event;
use crate::pause::{expire_user_pause, force_pause};

/// What a clock catch-up did to the world.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub days_elapsed: u32,
    pub pause_expired: bool,
    pub recruits: Vec<String>,
    pub ceremony_forced: bool,
    pub decision_issued: Option<String>,
}

impl CareerEngine {
    /// Bring the world up to `now_ms`: expire stale user pauses, accrue the
    /// elapsed days, fill ready vacancies, then raise whichever system pause
    /// is owed. A pending decision outranks a due ceremony.
    pub fn sync(
        &self,
        world: &mut CareerWorld,
        now_ms: i64,
        rng: &mut ChaCha8Rng,
    ) -> GameResult<SyncReport> {
        let config = self.config();
        let clock = self.clock();
        let mut report = SyncReport {
            pause_expired: expire_user_pause(&clock, &mut world.state, now_ms),
            ..SyncReport::default()
        };

        report.days_elapsed = clock.advance(&mut world.state, now_ms);
        accrue_days(config, world, report.days_elapsed)?;
        report.recruits = self.fill_ready_vacancies(world)?;

        if world.state.pending_decision().is_some() {
            return Ok(report);
        }

        if ceremony_due(&world.state, config.ceremony.interval_days) {
            let ceremony_day = ceremony_day(world.state.current_day, config.ceremony.interval_days);
            if world.state.pause.kind() != Some(PauseKind::Ceremony) {
                force_pause(
                    &mut world.state,
                    PauseReason::Ceremony { ceremony_day },
                    now_ms,
                    rng,
                )?;
                report.ceremony_forced = true;
                tracing::info!(
                    target: "career::ceremony",
                    profile_id = %world.state.profile_id,
                    ceremony_day,
                    "ceremony.due"
                );
            }
            return Ok(report);
        }

        if let Some(decision) = check_for_event(config, &mut world.state, rng)? {
            report.decision_issued = Some(decision.decision_id.clone());
            force_pause(&mut world.state, PauseReason::Decision { decision }, now_ms, rng)?;
        }
        Ok(report)
    }

    fn fill_ready_vacancies(&self, world: &mut CareerWorld) -> GameResult<Vec<String>> {
        let day = world.state.current_day;
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut world.state.recruitment_queue)
            .into_iter()
            .partition(|ticket| ticket.ready_day <= day);
        world.state.recruitment_queue = waiting;

        let mut recruits = Vec::with_capacity(ready.len());
        for ticket in ready {
            let record =
                world
                    .roster
                    .recruit_into_slot(self.config(), world.state.branch, ticket.slot, day)?;
            recruits.push(record.npc_id);
        }
        Ok(recruits)
    }
}
