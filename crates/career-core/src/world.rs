use contracts::{ActionReport, CeremonyReport, GameState};

use crate::npc::NpcRoster;

/// Everything the engine reads and writes for one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareerWorld {
    pub state: GameState,
    pub roster: NpcRoster,
}

/// Output of a player action: the successor world plus what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub world: CareerWorld,
    pub report: ActionReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CeremonyResolution {
    pub world: CareerWorld,
    pub report: CeremonyReport,
}
