use super::*;
use crate::progression::promotion_status;

impl CareerEngine {
    pub fn promotion(&self, state: &GameState) -> GameResult<PromotionStatus> {
        let track = self.config().track(state.country, state.branch)?;
        Ok(promotion_status(track, state))
    }

    pub fn snapshot(&self, state: &GameState) -> GameResult<GameSnapshot> {
        let interval = self.config().ceremony.interval_days;
        Ok(GameSnapshot {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            state: state.clone(),
            in_game_date: to_in_game_date(self.clock().epoch(), state.current_day).to_string(),
            age: compute_age(state.start_age, state.current_day),
            ceremony_due: ceremony_due(state, interval),
            next_ceremony_day: next_ceremony_day(state, interval),
            promotion: self.promotion(state)?,
        })
    }
}
