use super::*;
use crate::pause::{release_system, request_pause, resume};

impl CareerEngine {
    pub fn pause(
        &self,
        world: &mut CareerWorld,
        kind: PauseKind,
        now_ms: i64,
        rng: &mut ChaCha8Rng,
    ) -> GameResult<Uuid> {
        request_pause(
            &mut world.state,
            kind,
            now_ms,
            self.config().clock.user_pause_ttl_ms,
            rng,
        )
    }

    pub fn resume(&self, world: &mut CareerWorld, token: Uuid, now_ms: i64) -> GameResult<()> {
        resume(&self.clock(), &mut world.state, token, now_ms)
    }

    pub fn set_time_scale(&self, world: &mut CareerWorld, scale: u32, now_ms: i64) -> GameResult<()> {
        if let Some(kind) = world.state.pause.kind().filter(|kind| kind.is_system()) {
            return Err(GameError::precondition(format!(
                "time scale is locked while a {kind} pause is active"
            )));
        }
        let allowed = &self.config().clock.allowed_time_scales;
        if !allowed.contains(&scale) {
            return Err(GameError::validation(
                "time_scale",
                format!("must be one of {allowed:?}"),
            ));
        }
        if scale != world.state.game_time_scale {
            self.clock().rebase_time_scale(&mut world.state, scale, now_ms);
        }
        Ok(())
    }

    /// Resolve one player action against a synced world.
    pub fn perform(
        &self,
        world: &CareerWorld,
        action: &PlayerAction,
        now_ms: i64,
        rng: &mut ChaCha8Rng,
    ) -> GameResult<Resolution> {
        let mut ctx = ActionContext {
            config: self.config(),
            now_ms,
            rng,
        };
        let resolution = resolve_action(&mut ctx, world, action)?;
        tracing::debug!(
            target: "career::service",
            profile_id = %world.state.profile_id,
            action = action.label(),
            "action.resolved"
        );
        Ok(resolution)
    }

    fn due_ceremony(&self, state: &GameState) -> GameResult<()> {
        if !ceremony_due(state, self.config().ceremony.interval_days) {
            return Err(GameError::precondition("no ceremony is due"));
        }
        if state.pending_decision().is_some() {
            return Err(GameError::precondition(
                "a decision is pending; choose an option first",
            ));
        }
        Ok(())
    }

    pub fn ceremony_preview(&self, world: &CareerWorld) -> GameResult<CeremonyReport> {
        self.due_ceremony(&world.state)?;
        Ok(run_ceremony(self.config(), &world.state, &world.roster))
    }

    /// Hand out the due ceremony's awards and release its pause.
    pub fn complete_ceremony(&self, world: &CareerWorld, now_ms: i64) -> GameResult<CeremonyResolution> {
        self.due_ceremony(&world.state)?;
        let report = run_ceremony(self.config(), &world.state, &world.roster);

        let mut next = world.clone();
        apply_ceremony(&mut next.state, &report);
        if next.state.pause.kind() == Some(PauseKind::Ceremony) {
            release_system(&self.clock(), &mut next.state, PauseKind::Ceremony, now_ms)?;
        }
        Ok(CeremonyResolution { world: next, report })
    }
}
