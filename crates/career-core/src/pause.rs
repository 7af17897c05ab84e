//! Pause/resume coordinator.
//!
//! `RUNNING -> PAUSED[reason, token] -> RUNNING`. User pauses (MODAL, SUBPAGE)
//! are requested by clients, expire after a TTL, and resume with their token.
//! System pauses (DECISION, CEREMONY) are forced by the engine, preempt user
//! pauses, and are only released by resolving what raised them.

use contracts::{GameState, PauseEpisode, PauseKind, PauseReason, PauseState};
use rand::Rng;
use uuid::Uuid;

use crate::clock::GameClock;
use crate::error::{GameError, GameResult};
use crate::random::random_token;

fn user_reason(kind: PauseKind) -> GameResult<PauseReason> {
    match kind {
        PauseKind::Modal => Ok(PauseReason::Modal),
        PauseKind::Subpage => Ok(PauseReason::Subpage),
        PauseKind::Decision | PauseKind::Ceremony => Err(GameError::validation(
            "kind",
            format!("{kind} pauses are raised by the engine"),
        )),
    }
}

/// Client pause. Same kind twice returns the existing token.
pub fn request_pause<R: Rng + ?Sized>(
    state: &mut GameState,
    kind: PauseKind,
    now_ms: i64,
    ttl_ms: i64,
    rng: &mut R,
) -> GameResult<Uuid> {
    let reason = user_reason(kind)?;
    let expires_at_ms = Some(now_ms.saturating_add(ttl_ms));

    match &mut state.pause {
        PauseState::Paused(episode) if episode.reason.kind() == kind => {
            episode.expires_at_ms = expires_at_ms;
            Ok(episode.token)
        }
        PauseState::Paused(episode) => Err(GameError::conflict(format!(
            "already paused for {}",
            episode.reason.kind()
        ))),
        PauseState::Running => {
            let token = random_token(rng);
            state.pause = PauseState::Paused(PauseEpisode {
                reason,
                token,
                paused_at_ms: now_ms,
                expires_at_ms,
            });
            tracing::info!(
                target: "career::pause",
                profile_id = %state.profile_id,
                kind = %kind,
                "pause.requested"
            );
            Ok(token)
        }
    }
}

/// Engine-raised pause. Replaces a user pause (its token stops working) but
/// keeps the original freeze instant so the frozen interval stays contiguous.
pub fn force_pause<R: Rng + ?Sized>(
    state: &mut GameState,
    reason: PauseReason,
    now_ms: i64,
    rng: &mut R,
) -> GameResult<Uuid> {
    let kind = reason.kind();
    let paused_at_ms = match &state.pause {
        PauseState::Running => now_ms,
        PauseState::Paused(episode) if episode.reason == reason => return Ok(episode.token),
        PauseState::Paused(episode) if episode.reason.kind().is_system() => {
            return Err(GameError::conflict(format!(
                "cannot raise {kind} while paused for {}",
                episode.reason.kind()
            )));
        }
        PauseState::Paused(episode) => episode.paused_at_ms,
    };

    let token = random_token(rng);
    if let PauseState::Paused(previous) = &state.pause {
        tracing::info!(
            target: "career::pause",
            profile_id = %state.profile_id,
            preempted = %previous.reason.kind(),
            kind = %kind,
            "pause.preempted"
        );
    }
    state.pause = PauseState::Paused(PauseEpisode {
        reason,
        token,
        paused_at_ms,
        expires_at_ms: None,
    });
    Ok(token)
}

fn release(clock: &GameClock<'_>, state: &mut GameState, resumed_at_ms: i64) {
    if let PauseState::Paused(episode) = std::mem::take(&mut state.pause) {
        clock.shift_for_pause(state, episode.paused_at_ms, resumed_at_ms);
    }
}

/// Client resume. Exact token match only.
pub fn resume(
    clock: &GameClock<'_>,
    state: &mut GameState,
    token: Uuid,
    now_ms: i64,
) -> GameResult<()> {
    let episode = match &state.pause {
        PauseState::Running => return Err(GameError::conflict("game is not paused")),
        PauseState::Paused(episode) => episode,
    };
    if episode.token != token {
        return Err(GameError::conflict("pause token is stale or unknown"));
    }
    let kind = episode.reason.kind();
    if kind.is_system() {
        return Err(GameError::precondition(format!(
            "{kind} pause is released by resolving it"
        )));
    }

    release(clock, state, now_ms);
    tracing::info!(
        target: "career::pause",
        profile_id = %state.profile_id,
        kind = %kind,
        "pause.resumed"
    );
    Ok(())
}

/// Release a system pause of `kind` after its cause was resolved.
pub fn release_system(
    clock: &GameClock<'_>,
    state: &mut GameState,
    kind: PauseKind,
    now_ms: i64,
) -> GameResult<()> {
    if state.pause.kind() != Some(kind) {
        return Err(GameError::precondition(format!("not paused for {kind}")));
    }
    release(clock, state, now_ms);
    Ok(())
}

/// Auto-resume a user pause whose TTL elapsed. The clock restarts at the
/// expiry instant, not at `now_ms`.
pub fn expire_user_pause(clock: &GameClock<'_>, state: &mut GameState, now_ms: i64) -> bool {
    let expires_at_ms = match &state.pause {
        PauseState::Paused(episode) if !episode.reason.kind().is_system() => episode.expires_at_ms,
        _ => None,
    };
    match expires_at_ms {
        Some(expires_at_ms) if expires_at_ms <= now_ms => {
            release(clock, state, expires_at_ms);
            tracing::info!(
                target: "career::pause",
                profile_id = %state.profile_id,
                "pause.expired"
            );
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CareerConfig;
    use crate::test_support::{sample_state, test_rng};

    const TTL: i64 = 600_000;

    #[test]
    fn same_kind_pause_is_idempotent() {
        let mut state = sample_state();
        let mut rng = test_rng(0);
        let first = request_pause(&mut state, PauseKind::Subpage, 1_000, TTL, &mut rng).expect("pause");
        let second = request_pause(&mut state, PauseKind::Subpage, 2_000, TTL, &mut rng).expect("pause again");
        assert_eq!(first, second);
        assert_eq!(
            state.pause.episode().and_then(|episode| episode.expires_at_ms),
            Some(2_000 + TTL)
        );
    }

    #[test]
    fn different_kind_conflicts() {
        let mut state = sample_state();
        let mut rng = test_rng(0);
        request_pause(&mut state, PauseKind::Modal, 0, TTL, &mut rng).expect("pause");
        assert!(matches!(
            request_pause(&mut state, PauseKind::Subpage, 0, TTL, &mut rng),
            Err(GameError::Conflict(_))
        ));
    }

    #[test]
    fn system_kinds_cannot_be_requested() {
        let mut state = sample_state();
        let mut rng = test_rng(0);
        assert!(matches!(
            request_pause(&mut state, PauseKind::Ceremony, 0, TTL, &mut rng),
            Err(GameError::Validation { .. })
        ));
        assert!(!state.is_paused());
    }

    #[test]
    fn wrong_token_conflicts_and_stays_paused() {
        let config = CareerConfig::builtin();
        let clock = GameClock::new(&config.clock);
        let mut state = sample_state();
        let mut rng = test_rng(0);
        let token = request_pause(&mut state, PauseKind::Subpage, 0, TTL, &mut rng).expect("pause");

        let wrong = Uuid::from_u128(token.as_u128() ^ 1);
        assert!(matches!(
            resume(&clock, &mut state, wrong, 10),
            Err(GameError::Conflict(_))
        ));
        assert!(state.is_paused());
        assert_eq!(state.pause.token(), Some(token));

        resume(&clock, &mut state, token, 10).expect("resume");
        assert!(!state.is_paused());
        assert!(matches!(
            resume(&clock, &mut state, token, 11),
            Err(GameError::Conflict(_))
        ));
    }

    #[test]
    fn forced_ceremony_invalidates_user_token() {
        let config = CareerConfig::builtin();
        let clock = GameClock::new(&config.clock);
        let mut state = sample_state();
        let mut rng = test_rng(0);
        let user_token =
            request_pause(&mut state, PauseKind::Modal, 500, TTL, &mut rng).expect("pause");

        force_pause(&mut state, PauseReason::Ceremony { ceremony_day: 12 }, 900, &mut rng)
            .expect("force");
        assert_eq!(state.pause.kind(), Some(PauseKind::Ceremony));
        assert_eq!(state.pause.episode().map(|episode| episode.paused_at_ms), Some(500));
        assert!(matches!(
            resume(&clock, &mut state, user_token, 1_000),
            Err(GameError::Conflict(_))
        ));

        let ceremony_token = state.pause.token().expect("token");
        assert!(matches!(
            resume(&clock, &mut state, ceremony_token, 1_000),
            Err(GameError::Precondition(_))
        ));
        assert!(matches!(
            request_pause(&mut state, PauseKind::Modal, 1_000, TTL, &mut rng),
            Err(GameError::Conflict(_))
        ));

        release_system(&clock, &mut state, PauseKind::Ceremony, 1_500).expect("release");
        assert_eq!(state.server_reference_time_ms, 1_000);
    }

    #[test]
    fn expired_user_pause_resumes_at_expiry() {
        let config = CareerConfig::builtin();
        let clock = GameClock::new(&config.clock);
        let mut state = sample_state();
        let mut rng = test_rng(0);
        request_pause(&mut state, PauseKind::Subpage, 1_000, TTL, &mut rng).expect("pause");

        assert!(!expire_user_pause(&clock, &mut state, 1_000 + TTL - 1));
        assert!(expire_user_pause(&clock, &mut state, 1_000 + TTL * 5));
        assert!(!state.is_paused());
        assert_eq!(state.server_reference_time_ms, TTL);
    }
}
