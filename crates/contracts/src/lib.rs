//! v1 cross-boundary contracts for the career engine, persistence gateway, and HTTP API.

pub mod pause;
pub mod report;
pub mod serde_string_number;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use pause::{DecisionOption, PauseEpisode, PauseKind, PauseReason, PauseState, PendingDecision};
pub use report::{
    ActionReport, CeremonyCandidate, CeremonyRecipient, CeremonyReport, DecisionLogDraft,
    DecisionLogEntry, DecisionLogPage,
};

pub const SCHEMA_VERSION_V1: &str = "1.0";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    Us,
    Kr,
}

impl Country {
    pub fn code(self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Kr => "kr",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Army,
    Navy,
    AirForce,
}

impl Branch {
    pub fn code(self) -> &'static str {
        match self {
            Self::Army => "army",
            Self::Navy => "navy",
            Self::AirForce => "air_force",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionType {
    Patrol,
    Support,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingIntensity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocialKind {
    Chat,
    Meal,
    Gift,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    Drill,
    Inspection,
    Briefing,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

/// Signed adjustments to the player's core stats. Used for event option
/// previews, decision log consequences, and action reports alike.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatDelta {
    #[serde(default)]
    pub money_cents: i64,
    #[serde(default)]
    pub morale: i32,
    #[serde(default)]
    pub health: i32,
    #[serde(default)]
    pub promotion_points: i32,
}

impl StatDelta {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AwardRecord {
    pub medals: BTreeSet<String>,
    pub ribbons: BTreeSet<String>,
}

impl AwardRecord {
    pub fn total(&self) -> usize {
        self.medals.len() + self.ribbons.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Certificate {
    pub tier: u32,
    pub score: u32,
    pub grade: Grade,
    pub freedom_level: u8,
    pub issued_day: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecruitmentTicket {
    pub slot: u32,
    pub requested_day: u32,
    pub ready_day: u32,
}

/// Authoritative per-profile game record. One row per profile in the
/// persistence gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub schema_version: String,
    pub profile_id: String,
    pub player_name: String,
    pub country: Country,
    pub branch: Branch,
    pub start_age: u32,
    #[serde(with = "serde_string_number")]
    pub rng_seed: u64,
    pub action_nonce: u64,

    pub current_day: u32,
    pub server_reference_time_ms: i64,
    pub game_time_scale: u32,
    pub pause: PauseState,

    pub rank_index: u32,
    pub money_cents: i64,
    pub morale: i32,
    pub health: i32,
    pub promotion_points: u32,
    pub days_in_rank: u32,

    pub player_position: String,
    pub player_division: String,
    pub player_unit: String,
    pub player_medals: Vec<String>,
    pub player_ribbons: Vec<String>,

    pub next_event_day: u32,
    pub last_mission_day: Option<u32>,
    pub ceremony_completed_day: u32,
    #[serde(default)]
    pub npc_award_history: BTreeMap<String, AwardRecord>,
    #[serde(default)]
    pub certificates: Vec<Certificate>,
    #[serde(default)]
    pub recruitment_queue: Vec<RecruitmentTicket>,
}

impl GameState {
    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn pending_decision(&self) -> Option<&PendingDecision> {
        self.pause.pending_decision()
    }

    pub fn best_freedom_level(&self) -> u8 {
        self.certificates
            .iter()
            .map(|certificate| certificate.freedom_level)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "profile={} day={} rank={} money={} morale={} health={} points={} pause={}",
            self.profile_id,
            self.current_day,
            self.rank_index,
            self.money_cents,
            self.morale,
            self.health,
            self.promotion_points,
            self.pause
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NpcIdentity {
    pub slot: u32,
    pub generation: u32,
    pub name: String,
    pub division: String,
    pub unit: String,
    pub position: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NpcStatus {
    Active,
    Injured,
    Kia,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NpcRecord {
    pub npc_id: String,
    pub identity: NpcIdentity,
    pub status: NpcStatus,
    pub morale: i32,
    pub health: i32,
    pub affinity: i32,
    pub created_day: u32,
    pub status_changed_day: u32,
}

impl NpcRecord {
    pub fn is_alive(&self) -> bool {
        self.status != NpcStatus::Kia
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromotionStatus {
    pub eligible: bool,
    pub at_max_rank: bool,
    pub current_rank_title: String,
    pub next_rank_title: Option<String>,
    pub missing_days: u32,
    pub missing_points: u32,
}

/// Serialized view returned to clients after every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub schema_version: String,
    pub state: GameState,
    pub in_game_date: String,
    pub age: u32,
    pub ceremony_due: bool,
    pub next_ceremony_day: u32,
    pub promotion: PromotionStatus,
}

/// Request payload for creating a profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewGame {
    pub profile_id: String,
    pub player_name: String,
    pub country: Country,
    pub branch: Branch,
    pub start_age: u32,
    #[serde(default = "default_time_scale")]
    pub time_scale: u32,
}

fn default_time_scale() -> u32 {
    1
}

/// Every player-initiated mutation the engine resolves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    Training {
        intensity: TrainingIntensity,
    },
    Deployment {
        mission_type: MissionType,
        duration_days: u32,
    },
    CareerReview,
    AcademyExam {
        tier: u32,
        answers: Vec<u8>,
    },
    DecisionChoice {
        #[serde(default)]
        decision_id: Option<String>,
        option_id: String,
    },
    Travel {
        destination: String,
    },
    Social {
        npc_id: String,
        kind: SocialKind,
    },
    Command {
        kind: CommandKind,
    },
    Recruitment,
    Transfer {
        division: String,
    },
}

impl PlayerAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Training { .. } => "training",
            Self::Deployment { .. } => "deployment",
            Self::CareerReview => "career_review",
            Self::AcademyExam { .. } => "academy_exam",
            Self::DecisionChoice { .. } => "decision_choice",
            Self::Travel { .. } => "travel",
            Self::Social { .. } => "social",
            Self::Command { .. } => "command",
            Self::Recruitment => "recruitment",
            Self::Transfer { .. } => "transfer",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    PreconditionFailed,
    NotFound,
    Conflict,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub field: Option<String>,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            field: None,
            details,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}
