use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::StatDelta;

/// Discriminant of a pause reason, without payload. Used by pause requests
/// and for logging.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PauseKind {
    Decision,
    Modal,
    Subpage,
    Ceremony,
}

impl PauseKind {
    /// System pauses are raised by the engine and cannot be resumed with a
    /// bare token.
    pub fn is_system(self) -> bool {
        matches!(self, Self::Decision | Self::Ceremony)
    }
}

impl fmt::Display for PauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Decision => "DECISION",
            Self::Modal => "MODAL",
            Self::Subpage => "SUBPAGE",
            Self::Ceremony => "CEREMONY",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionOption {
    pub option_id: String,
    pub label: String,
    pub effects: StatDelta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingDecision {
    pub decision_id: String,
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub issued_day: u32,
    pub options: Vec<DecisionOption>,
}

impl PendingDecision {
    pub fn option(&self, option_id: &str) -> Option<&DecisionOption> {
        self.options.iter().find(|option| option.option_id == option_id)
    }
}

/// Why the clock is frozen. A pending decision only exists inside the
/// `Decision` variant, so "decision pending" can never drift from "paused".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PauseReason {
    Decision { decision: PendingDecision },
    Modal,
    Subpage,
    Ceremony { ceremony_day: u32 },
}

impl PauseReason {
    pub fn kind(&self) -> PauseKind {
        match self {
            Self::Decision { .. } => PauseKind::Decision,
            Self::Modal => PauseKind::Modal,
            Self::Subpage => PauseKind::Subpage,
            Self::Ceremony { .. } => PauseKind::Ceremony,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PauseEpisode {
    pub reason: PauseReason,
    pub token: Uuid,
    pub paused_at_ms: i64,
    pub expires_at_ms: Option<i64>,
}

/// Token presence is tied to the paused variant: there is no way to hold a
/// token while running.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PauseState {
    #[default]
    Running,
    Paused(PauseEpisode),
}

impl PauseState {
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused(_))
    }

    pub fn episode(&self) -> Option<&PauseEpisode> {
        match self {
            Self::Running => None,
            Self::Paused(episode) => Some(episode),
        }
    }

    pub fn kind(&self) -> Option<PauseKind> {
        self.episode().map(|episode| episode.reason.kind())
    }

    pub fn token(&self) -> Option<Uuid> {
        self.episode().map(|episode| episode.token)
    }

    pub fn pending_decision(&self) -> Option<&PendingDecision> {
        match self.episode().map(|episode| &episode.reason) {
            Some(PauseReason::Decision { decision }) => Some(decision),
            _ => None,
        }
    }
}

impl fmt::Display for PauseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("RUNNING"),
            Self::Paused(episode) => write!(f, "PAUSED[{}]", episode.reason.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_state_round_trips_with_decision_payload() {
        let state = PauseState::Paused(PauseEpisode {
            reason: PauseReason::Decision {
                decision: PendingDecision {
                    decision_id: "decision:3:7".to_string(),
                    event_id: "evt_card_game".to_string(),
                    title: "Card game".to_string(),
                    description: "The barracks are running a game.".to_string(),
                    issued_day: 3,
                    options: vec![DecisionOption {
                        option_id: "join".to_string(),
                        label: "Join in".to_string(),
                        effects: StatDelta {
                            morale: 4,
                            ..StatDelta::default()
                        },
                    }],
                },
            },
            token: Uuid::from_u128(7),
            paused_at_ms: 1_000,
            expires_at_ms: None,
        });

        let raw = serde_json::to_string(&state).expect("serialize");
        let decoded: PauseState = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(decoded, state);
        assert_eq!(decoded.kind(), Some(PauseKind::Decision));
        assert!(decoded.pending_decision().is_some());
    }

    #[test]
    fn running_has_no_token() {
        let state = PauseState::Running;
        assert_eq!(state.token(), None);
        assert_eq!(
            serde_json::to_string(&state).expect("serialize"),
            r#"{"mode":"running"}"#
        );
    }
}
