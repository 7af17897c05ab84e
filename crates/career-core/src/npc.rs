//! Deterministic NPC identities and the per-profile roster of runtime records.
//!
//! An identity is a pure function of `(branch, slot, generation)`. Names are
//! drawn through a bijective permutation of the name pool so that the slots of
//! a single roster never share a name, whatever generation each slot is on.

use std::collections::BTreeMap;

use contracts::{Branch, NpcIdentity, NpcRecord, NpcStatus, RecruitmentTicket};

use crate::config::{BranchConfig, CareerConfig, DailyConfig};
use crate::error::{GameError, GameResult};
use crate::random::{clamp_stat, mix_seed};

const NAME_STRIDE_CANDIDATES: [usize; 6] = [37, 41, 43, 47, 53, 59];

fn branch_seed(branch: Branch) -> u64 {
    branch
        .code()
        .bytes()
        .fold(0xC0FF_EE00_D15E_A5E5, |acc, byte| mix_seed(acc, u64::from(byte)))
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

fn name_stride(pool: usize) -> usize {
    NAME_STRIDE_CANDIDATES
        .iter()
        .copied()
        .find(|stride| gcd(*stride, pool) == 1)
        .unwrap_or(1)
}

pub fn npc_id(slot: u32, generation: u32) -> String {
    if generation == 0 {
        format!("npc_{slot:03}")
    } else {
        format!("npc_{slot:03}_g{generation}")
    }
}

/// Identity for the occupant of `slot` after `generation` replacements.
pub fn npc_identity(
    config: &CareerConfig,
    branch_config: &BranchConfig,
    slot: u32,
    generation: u32,
) -> NpcIdentity {
    let roster = &config.roster;
    let pool = roster.name_pool_size().max(1);
    let roster_size = (roster.roster_size as usize).max(1);
    let cycles = (pool / roster_size).max(1);

    let seed = branch_seed(branch_config.branch);
    let raw_index = slot as usize + roster_size * (generation as usize % cycles);
    let offset = (seed % pool as u64) as usize;
    let permuted = (raw_index * name_stride(pool) + offset) % pool;
    let given = &roster.given_names[permuted % roster.given_names.len()];
    let family = &roster.family_names[permuted / roster.given_names.len()];

    let division = &branch_config.divisions[slot as usize % branch_config.divisions.len()];
    let slot_seed = mix_seed(seed, (u64::from(generation) << 32) | u64::from(slot));
    let unit = &division.units[(slot_seed % division.units.len() as u64) as usize];
    let position_seed = mix_seed(slot_seed, 0x5053);
    let position =
        &branch_config.npc_positions[(position_seed % branch_config.npc_positions.len() as u64) as usize];

    NpcIdentity {
        slot,
        generation,
        name: format!("{given} {family}"),
        division: division.name.clone(),
        unit: unit.clone(),
        position: position.clone(),
    }
}

/// Runtime records for every NPC a profile has ever had. KIA records stay in
/// place; the slot's live occupant is the highest generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NpcRoster {
    records: BTreeMap<String, NpcRecord>,
}

impl NpcRoster {
    pub fn from_records(records: impl IntoIterator<Item = NpcRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.npc_id.clone(), record))
                .collect(),
        }
    }

    pub fn initialize(config: &CareerConfig, branch: Branch, day: u32) -> GameResult<Self> {
        let branch_config = config.branch(branch)?;
        let roster = Self::from_records((0..config.roster.roster_size).map(|slot| {
            new_record(
                npc_identity(config, branch_config, slot, 0),
                day,
                config.start.morale,
                config.start.health,
            )
        }));

        let mut names: Vec<&str> = roster
            .records
            .values()
            .map(|record| record.identity.name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(
            names.len(),
            roster.records.len(),
            "npc identity collision in branch {}",
            branch.code()
        );
        Ok(roster)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &NpcRecord> {
        self.records.values()
    }

    pub fn get(&self, npc_id: &str) -> Option<&NpcRecord> {
        self.records.get(npc_id)
    }

    pub fn require(&self, npc_id: &str) -> GameResult<&NpcRecord> {
        self.get(npc_id)
            .ok_or_else(|| GameError::not_found("npc", npc_id))
    }

    pub fn require_mut(&mut self, npc_id: &str) -> GameResult<&mut NpcRecord> {
        self.records
            .get_mut(npc_id)
            .ok_or_else(|| GameError::not_found("npc", npc_id))
    }

    pub fn alive(&self) -> impl Iterator<Item = &NpcRecord> {
        self.records.values().filter(|record| record.is_alive())
    }

    /// Ids of living NPCs serving alongside the player, in id order.
    pub fn active_in_unit(&self, division: &str, unit: &str) -> Vec<String> {
        self.alive()
            .filter(|record| record.identity.division == division && record.identity.unit == unit)
            .map(|record| record.npc_id.clone())
            .collect()
    }

    fn next_generation(&self, slot: u32) -> u32 {
        self.records
            .values()
            .filter(|record| record.identity.slot == slot)
            .map(|record| record.identity.generation + 1)
            .max()
            .unwrap_or(0)
    }

    /// Soft-delete an NPC and open a replacement ticket for its slot.
    pub fn mark_kia(
        &mut self,
        npc_id: &str,
        day: u32,
        replacement_delay_days: u32,
    ) -> GameResult<RecruitmentTicket> {
        let record = self.require_mut(npc_id)?;
        if !record.is_alive() {
            return Err(GameError::precondition(format!("{npc_id} is already KIA")));
        }
        record.status = NpcStatus::Kia;
        record.health = 0;
        record.status_changed_day = day;
        Ok(RecruitmentTicket {
            slot: record.identity.slot,
            requested_day: day,
            ready_day: day.saturating_add(replacement_delay_days),
        })
    }

    /// Wound a living NPC. Daily recovery returns it to `Active`.
    pub fn mark_injured(&mut self, npc_id: &str, health_loss: i64, day: u32) -> GameResult<()> {
        let record = self.require_mut(npc_id)?;
        if !record.is_alive() {
            return Err(GameError::precondition(format!("{npc_id} is KIA")));
        }
        record.health = clamp_stat(i64::from(record.health) - health_loss.max(0));
        record.status = NpcStatus::Injured;
        record.status_changed_day = day;
        Ok(())
    }

    /// Place a new-generation NPC into `slot`.
    pub fn recruit_into_slot(
        &mut self,
        config: &CareerConfig,
        branch: Branch,
        slot: u32,
        day: u32,
    ) -> GameResult<NpcRecord> {
        if self.alive().any(|record| record.identity.slot == slot) {
            return Err(GameError::conflict(format!("slot {slot} is already occupied")));
        }
        let branch_config = config.branch(branch)?;
        let generation = self.next_generation(slot);
        let record = new_record(
            npc_identity(config, branch_config, slot, generation),
            day,
            config.recruitment.recruit_morale,
            config.recruitment.recruit_health,
        );
        self.records.insert(record.npc_id.clone(), record.clone());
        Ok(record)
    }

    /// Per-day health recovery for injured NPCs.
    pub fn recover(&mut self, daily: &DailyConfig, days: u32, day: u32) {
        if days == 0 {
            return;
        }
        let gain = i64::from(daily.npc_health_recovery) * i64::from(days);
        for record in self.records.values_mut().filter(|record| record.is_alive()) {
            record.health = clamp_stat(i64::from(record.health) + gain);
            if record.status == NpcStatus::Injured && record.health >= daily.npc_recovered_health {
                record.status = NpcStatus::Active;
                record.status_changed_day = day;
            }
        }
    }
}

fn new_record(identity: NpcIdentity, day: u32, morale: i32, health: i32) -> NpcRecord {
    NpcRecord {
        npc_id: npc_id(identity.slot, identity.generation),
        identity,
        status: NpcStatus::Active,
        morale,
        health,
        affinity: 0,
        created_day: day,
        status_changed_day: day,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn identity_is_deterministic() {
        let config = CareerConfig::builtin();
        let branch = config.branch(Branch::Navy).expect("navy tables");
        for slot in 0..config.roster.roster_size {
            assert_eq!(
                npc_identity(&config, branch, slot, 0),
                npc_identity(&config, branch, slot, 0)
            );
        }
    }

    #[test]
    fn names_stay_unique_across_generations() {
        let config = CareerConfig::builtin();
        let branch = config.branch(Branch::Army).expect("army tables");
        let size = config.roster.roster_size;
        for generation_shift in 0..4 {
            let names: BTreeSet<String> = (0..size)
                .map(|slot| {
                    let generation = if slot % 3 == 0 { generation_shift } else { 0 };
                    npc_identity(&config, branch, slot, generation).name
                })
                .collect();
            assert_eq!(names.len(), size as usize);
        }
    }

    #[test]
    fn kia_opens_ticket_and_recruit_takes_next_generation() {
        let config = CareerConfig::builtin();
        let mut roster = NpcRoster::initialize(&config, Branch::Army, 0).expect("roster");
        assert_eq!(roster.len(), config.roster.roster_size as usize);

        let ticket = roster
            .mark_kia("npc_004", 10, config.recruitment.replacement_delay_days)
            .expect("mark kia");
        assert_eq!(ticket.slot, 4);
        assert_eq!(ticket.ready_day, 10 + config.recruitment.replacement_delay_days);
        assert!(roster.mark_kia("npc_004", 11, 0).is_err());
        assert!(!roster.get("npc_004").expect("soft deleted").is_alive());

        let recruit = roster
            .recruit_into_slot(&config, Branch::Army, 4, 24)
            .expect("recruit");
        assert_eq!(recruit.npc_id, "npc_004_g1");
        assert_eq!(recruit.identity.generation, 1);
        assert_eq!(roster.alive().count(), config.roster.roster_size as usize);
        assert!(matches!(
            roster.recruit_into_slot(&config, Branch::Army, 4, 25),
            Err(GameError::Conflict(_))
        ));
    }

    #[test]
    fn roster_for_a_missing_branch_is_an_error() {
        let mut config = (*CareerConfig::builtin()).clone();
        config.branches.retain(|tables| tables.branch != Branch::Navy);
        assert!(matches!(
            NpcRoster::initialize(&config, Branch::Navy, 0),
            Err(GameError::NotFound { .. })
        ));
        assert!(NpcRoster::initialize(&config, Branch::Army, 0).is_ok());
    }

    #[test]
    fn injured_npcs_recover_over_days() {
        let config = CareerConfig::builtin();
        let mut roster = NpcRoster::initialize(&config, Branch::Army, 0).expect("roster");
        let before = roster.get("npc_000").expect("npc").health;
        roster.mark_injured("npc_000", 500, 3).expect("wound");
        {
            let record = roster.get("npc_000").expect("npc");
            assert_eq!(record.status, NpcStatus::Injured);
            assert_eq!(record.health, 0);
            assert_eq!(record.status_changed_day, 3);
            assert!(before > 0);
        }
        roster.mark_kia("npc_001", 3, 14).expect("kia");
        assert!(matches!(
            roster.mark_injured("npc_001", 5, 3),
            Err(GameError::Precondition(_))
        ));
        roster.recover(&config.daily, 200, 200);
        let record = roster.get("npc_000").expect("npc");
        assert_eq!(record.status, NpcStatus::Active);
        assert!(record.health <= 100);
    }
}
