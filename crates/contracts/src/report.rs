use serde::{Deserialize, Serialize};

use crate::{
    Certificate, CommandKind, MissionType, NpcRecord, SocialKind, StatDelta, TrainingIntensity,
};

/// Structured outcome of one resolved player action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionReport {
    Training {
        intensity: TrainingIntensity,
        injured: bool,
        delta: StatDelta,
    },
    Deployment {
        mission_type: MissionType,
        duration_days: u32,
        success: bool,
        injured: bool,
        delta: StatDelta,
        casualties: Vec<String>,
        #[serde(default)]
        wounded: Vec<String>,
    },
    CareerReview {
        promoted: bool,
        previous_rank: u32,
        rank_index: u32,
        rank_title: String,
        missing_days: u32,
        missing_points: u32,
    },
    AcademyExam {
        certificate: Certificate,
        correct_answers: u32,
        fee_cents: i64,
    },
    DecisionChoice {
        entry: DecisionLogDraft,
        next_event_day: u32,
    },
    Travel {
        destination: String,
        delta: StatDelta,
    },
    Social {
        npc_id: String,
        kind: SocialKind,
        delta: StatDelta,
        affinity: i32,
    },
    Command {
        kind: CommandKind,
        affected_npcs: u32,
        delta: StatDelta,
    },
    Recruitment {
        recruit: NpcRecord,
        cost_cents: i64,
    },
    Transfer {
        from_division: String,
        to_division: String,
        unit: String,
    },
}

/// A decision log row before the gateway assigns its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionLogDraft {
    pub decision_id: String,
    pub event_id: String,
    pub game_day: u32,
    pub selected_option: String,
    pub consequences: StatDelta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionLogEntry {
    pub id: i64,
    pub decision_id: String,
    pub event_id: String,
    pub game_day: u32,
    pub selected_option: String,
    pub consequences: StatDelta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionLogPage {
    pub entries: Vec<DecisionLogEntry>,
    pub next_cursor: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CeremonyCandidate {
    pub candidate_id: String,
    pub name: String,
    pub score: i64,
    pub is_player: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CeremonyRecipient {
    pub candidate_id: String,
    pub name: String,
    pub is_player: bool,
    pub score: i64,
    pub medal: String,
    pub ribbon: String,
}

/// Computed on demand; never persisted as a row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CeremonyReport {
    pub ceremony_day: u32,
    pub attendance: u32,
    pub medal_quota: u32,
    pub chief_of_staff: Option<CeremonyCandidate>,
    pub logs: Vec<String>,
    pub recipients: Vec<CeremonyRecipient>,
}
