//! Tuning tables for the engine. Everything here is pure data, loaded once per
//! process and shared behind an `Arc`; the engine never reaches for globals.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use contracts::{
    Branch, CommandKind, Country, MissionType, SocialKind, StatDelta, TrainingIntensity,
};
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::error::{GameError, GameResult};

const BUILTIN_CONFIG: &str = include_str!("data/career_config.json");
pub const CONFIG_PATH_ENV: &str = "CAREER_CONFIG_PATH";

/// Inclusive integer range rolled uniformly.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub const fn fixed(value: i64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        if lo == hi {
            return lo;
        }
        rng.gen_range(lo..=hi)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    /// Real milliseconds per in-game day at time scale 1.
    pub ms_per_day: i64,
    pub epoch: NaiveDate,
    pub allowed_time_scales: Vec<u32>,
    /// Lifetime of MODAL and SUBPAGE pauses before the clock resumes on its own.
    pub user_pause_ttl_ms: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartConfig {
    pub money_cents: i64,
    pub morale: i32,
    pub health: i32,
    pub min_start_age: u32,
    pub max_start_age: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GapConfig {
    pub probability: f64,
    pub min_days: u32,
    pub max_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryConfig {
    pub country: Country,
    pub daily_event_probability: f64,
    pub event_gap: GapConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CarryOverPolicy {
    Reset,
    CarryExcess,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankTier {
    pub title: String,
    pub min_days_in_rank: u32,
    pub min_promotion_points: u32,
    pub daily_pay_cents: i64,
    pub position: String,
}

/// Promotion ladder for a country; `branches` empty means every branch.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackConfig {
    pub country: Country,
    #[serde(default)]
    pub branches: Vec<Branch>,
    pub carry_over: CarryOverPolicy,
    pub ranks: Vec<RankTier>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentTable {
    pub mission_type: MissionType,
    pub success_chance: f64,
    pub injury_chance: f64,
    pub casualty_chance: f64,
    pub min_health: i32,
    pub min_duration_days: u32,
    pub max_duration_days: u32,
    pub reward_cents: IntRange,
    pub promotion_points: IntRange,
    pub morale_success: IntRange,
    pub morale_failure: IntRange,
    pub health_loss: IntRange,
    pub injury_health_loss: IntRange,
    /// Health a unit mate loses when wounded on the mission.
    pub comrade_wound_health_loss: IntRange,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DivisionConfig {
    pub name: String,
    pub required_freedom: u8,
    pub units: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchConfig {
    pub branch: Branch,
    pub reward_scale: f64,
    pub deployments: Vec<DeploymentTable>,
    pub divisions: Vec<DivisionConfig>,
    pub npc_positions: Vec<String>,
}

impl BranchConfig {
    pub fn deployment(&self, mission_type: MissionType) -> Option<&DeploymentTable> {
        self.deployments
            .iter()
            .find(|table| table.mission_type == mission_type)
    }

    pub fn division(&self, name: &str) -> Option<&DivisionConfig> {
        self.divisions.iter().find(|division| division.name == name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainingTable {
    pub intensity: TrainingIntensity,
    pub injury_chance: f64,
    pub cost_cents: i64,
    pub morale: IntRange,
    pub health: IntRange,
    pub injury_health_loss: IntRange,
    pub promotion_points: IntRange,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyConfig {
    pub health_recovery: i32,
    pub npc_health_recovery: i32,
    pub npc_recovered_health: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcademyTier {
    pub tier: u32,
    pub min_rank: u32,
    pub fee_cents: i64,
    pub answer_key: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcademyConfig {
    pub tiers: Vec<AcademyTier>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TravelDestination {
    pub id: String,
    pub label: String,
    pub cost_cents: i64,
    pub morale: IntRange,
    pub health: IntRange,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialTable {
    pub kind: SocialKind,
    pub cost_cents: i64,
    pub morale: IntRange,
    pub npc_morale: IntRange,
    pub affinity: IntRange,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandTable {
    pub kind: CommandKind,
    pub morale: IntRange,
    pub promotion_points: IntRange,
    pub npc_morale: IntRange,
    pub npc_health: IntRange,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    pub min_rank: u32,
    pub actions: Vec<CommandTable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecruitmentConfig {
    pub cost_cents: i64,
    pub replacement_delay_days: u32,
    pub recruit_morale: i32,
    pub recruit_health: i32,
}

/// Ceremony cadence and quota shape. Only the algorithm is fixed; every
/// constant here is tunable.
#[derive(Debug, Clone, Deserialize)]
pub struct CeremonyConfig {
    pub interval_days: u32,
    pub mission_window_days: u32,
    pub quota_min: u32,
    pub quota_max: u32,
    pub chief_score_baseline: i64,
    pub chief_score_step: i64,
    pub high_performer_margin: i64,
    pub high_performers_per_award: i64,
    pub saturation_awards_per_penalty: i64,
    pub strict_morale_threshold: i32,
    pub strictness_penalty: i64,
    pub award_min_score: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    pub roster_size: u32,
    pub given_names: Vec<String>,
    pub family_names: Vec<String>,
}

impl RosterConfig {
    pub fn name_pool_size(&self) -> usize {
        self.given_names.len() * self.family_names.len()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventOptionDefinition {
    pub id: String,
    pub label: String,
    pub effects: StatDelta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub countries: Vec<Country>,
    #[serde(default)]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub min_rank: u32,
    pub base_weight: f64,
    pub options: Vec<EventOptionDefinition>,
}

impl EventDefinition {
    pub fn applies_to(&self, country: Country, branch: Branch, rank_index: u32) -> bool {
        (self.countries.is_empty() || self.countries.contains(&country))
            && (self.branches.is_empty() || self.branches.contains(&branch))
            && rank_index >= self.min_rank
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CareerConfig {
    pub clock: ClockConfig,
    pub start: StartConfig,
    pub daily: DailyConfig,
    pub countries: Vec<CountryConfig>,
    pub tracks: Vec<TrackConfig>,
    pub branches: Vec<BranchConfig>,
    pub training: Vec<TrainingTable>,
    pub academy: AcademyConfig,
    pub travel: Vec<TravelDestination>,
    pub social: Vec<SocialTable>,
    pub command: CommandConfig,
    pub recruitment: RecruitmentConfig,
    pub ceremony: CeremonyConfig,
    pub roster: RosterConfig,
    pub medals: Vec<String>,
    pub ribbons: Vec<String>,
    pub events: Vec<EventDefinition>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse career config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read career config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid career config: {0}")]
    Invalid(String),
}

impl CareerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// The embedded tables shipped with the crate.
    pub fn builtin() -> Arc<Self> {
        match Self::from_json_str(BUILTIN_CONFIG) {
            Ok(config) => Arc::new(config),
            Err(err) => panic!("embedded career config is invalid: {err}"),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid(message));

        if self.clock.ms_per_day <= 0 {
            return invalid("clock.ms_per_day must be positive".to_string());
        }
        if self.clock.allowed_time_scales.is_empty()
            || self.clock.allowed_time_scales.contains(&0)
        {
            return invalid("clock.allowed_time_scales must be non-empty and non-zero".to_string());
        }
        if self.ceremony.interval_days == 0 {
            return invalid("ceremony.interval_days must be positive".to_string());
        }
        if self.ceremony.quota_min > self.ceremony.quota_max {
            return invalid(format!(
                "ceremony quota bounds reversed: min={} max={}",
                self.ceremony.quota_min, self.ceremony.quota_max
            ));
        }
        if self.ceremony.chief_score_step <= 0
            || self.ceremony.high_performers_per_award <= 0
            || self.ceremony.saturation_awards_per_penalty <= 0
        {
            return invalid("ceremony divisors must be positive".to_string());
        }
        if self.medals.is_empty() || self.ribbons.is_empty() {
            return invalid("medal and ribbon catalogs must be non-empty".to_string());
        }
        if self.roster.roster_size == 0 {
            return invalid("roster.roster_size must be positive".to_string());
        }
        if self.roster.name_pool_size() < self.roster.roster_size as usize {
            return invalid(format!(
                "name pool of {} cannot give {} NPCs distinct names",
                self.roster.name_pool_size(),
                self.roster.roster_size
            ));
        }

        for country in &self.countries {
            for branch in &self.branches {
                let Some(track) = self.find_track(country.country, branch.branch) else {
                    return invalid(format!(
                        "missing rank track for {}/{}",
                        country.country.code(),
                        branch.branch.code()
                    ));
                };
                if track.ranks.is_empty() {
                    return invalid(format!(
                        "rank track for {} is empty",
                        country.country.code()
                    ));
                }
            }
        }

        for branch in &self.branches {
            if branch.divisions.is_empty() || branch.npc_positions.is_empty() {
                return invalid(format!(
                    "branch {} needs divisions and npc positions",
                    branch.branch.code()
                ));
            }
            if let Some(division) = branch.divisions.iter().find(|d| d.units.is_empty()) {
                return invalid(format!("division {} has no units", division.name));
            }
        }

        for tier in &self.academy.tiers {
            if tier.answer_key.is_empty() {
                return invalid(format!("academy tier {} has no answer key", tier.tier));
            }
        }

        for event in &self.events {
            if event.options.is_empty() {
                return invalid(format!("event {} has no options", event.id));
            }
        }

        Ok(())
    }

    fn find_track(&self, country: Country, branch: Branch) -> Option<&TrackConfig> {
        self.tracks.iter().find(|track| {
            track.country == country
                && (track.branches.is_empty() || track.branches.contains(&branch))
        })
    }

    pub fn track(&self, country: Country, branch: Branch) -> GameResult<&TrackConfig> {
        self.find_track(country, branch)
            .ok_or_else(|| GameError::not_found("rank track", format!("{}/{}", country.code(), branch.code())))
    }

    pub fn country(&self, country: Country) -> GameResult<&CountryConfig> {
        self.countries
            .iter()
            .find(|entry| entry.country == country)
            .ok_or_else(|| GameError::not_found("country", country.code()))
    }

    pub fn branch(&self, branch: Branch) -> GameResult<&BranchConfig> {
        self.branches
            .iter()
            .find(|entry| entry.branch == branch)
            .ok_or_else(|| GameError::not_found("branch", branch.code()))
    }

    pub fn training(&self, intensity: TrainingIntensity) -> GameResult<&TrainingTable> {
        self.training
            .iter()
            .find(|table| table.intensity == intensity)
            .ok_or_else(|| GameError::not_found("training table", format!("{intensity:?}")))
    }

    pub fn academy_tier(&self, tier: u32) -> GameResult<&AcademyTier> {
        self.academy
            .tiers
            .iter()
            .find(|entry| entry.tier == tier)
            .ok_or_else(|| GameError::not_found("academy tier", tier.to_string()))
    }

    pub fn destination(&self, id: &str) -> GameResult<&TravelDestination> {
        self.travel
            .iter()
            .find(|destination| destination.id == id)
            .ok_or_else(|| GameError::not_found("destination", id))
    }

    pub fn social(&self, kind: SocialKind) -> GameResult<&SocialTable> {
        self.social
            .iter()
            .find(|table| table.kind == kind)
            .ok_or_else(|| GameError::not_found("social table", format!("{kind:?}")))
    }

    pub fn command_action(&self, kind: CommandKind) -> GameResult<&CommandTable> {
        self.command
            .actions
            .iter()
            .find(|table| table.kind == kind)
            .ok_or_else(|| GameError::not_found("command table", format!("{kind:?}")))
    }
}

/// Load configuration from `CAREER_CONFIG_PATH`, falling back to the builtin
/// tables when the variable is unset or the file is unusable.
pub fn load_config_from_env() -> Arc<CareerConfig> {
    if let Some(path) = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from) {
        match CareerConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "career::config",
                    path = %path.display(),
                    "career_config.loaded=file"
                );
                return Arc::new(config);
            }
            Err(err) => {
                tracing::warn!(
                    target: "career::config",
                    path = %path.display(),
                    error = %err,
                    "career_config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "career::config", "career_config.loaded=builtin");
    CareerConfig::builtin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_validates() {
        let config = CareerConfig::builtin();
        assert_eq!(config.ceremony.interval_days, 12);
        assert!(config.track(Country::Kr, Branch::Navy).is_ok());
        assert!(config.branch(Branch::AirForce).is_ok());
    }

    #[test]
    fn reversed_quota_bounds_are_rejected() {
        let mut raw: serde_json::Value =
            serde_json::from_str(BUILTIN_CONFIG).expect("builtin json parses");
        raw["ceremony"]["quota_min"] = serde_json::json!(9);
        raw["ceremony"]["quota_max"] = serde_json::json!(2);

        let result = CareerConfig::from_json_str(&raw.to_string());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn undersized_name_pool_is_rejected() {
        let mut raw: serde_json::Value =
            serde_json::from_str(BUILTIN_CONFIG).expect("builtin json parses");
        raw["roster"]["roster_size"] = serde_json::json!(10_000);

        assert!(CareerConfig::from_json_str(&raw.to_string()).is_err());
    }

    #[test]
    fn fixed_range_always_rolls_its_value() {
        let mut rng = rand::thread_rng();
        assert_eq!(IntRange::fixed(-4).roll(&mut rng), -4);
        let reversed = IntRange { min: 5, max: 1 };
        let value = reversed.roll(&mut rng);
        assert!((1..=5).contains(&value));
    }
}
