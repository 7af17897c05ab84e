use super::*;

impl CareerEngine {
    /// Every NPC the profile has had, fallen ones included.
    pub fn npcs(&self, world: &CareerWorld) -> Vec<NpcRecord> {
        world.roster.records().cloned().collect()
    }

    pub fn inspect_npc(&self, world: &CareerWorld, npc_id: &str) -> GameResult<NpcRecord> {
        world.roster.require(npc_id).cloned()
    }
}
