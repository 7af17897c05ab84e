use contracts::ActionReport;
use rand::seq::SliceRandom;

use super::ActionContext;
use crate::error::{GameError, GameResult};
use crate::{CareerWorld, Resolution};

/// Move to another division. Elite divisions only take players whose best
/// academy certificate grants enough freedom.
pub(super) fn resolve(
    ctx: &mut ActionContext<'_>,
    world: &CareerWorld,
    division: &str,
) -> GameResult<Resolution> {
    let branch = ctx.config.branch(world.state.branch)?;
    let target = branch
        .division(division)
        .ok_or_else(|| GameError::not_found("division", division))?;
    if target.name == world.state.player_division {
        return Err(GameError::precondition(format!("already serving in {division}")));
    }
    let freedom = world.state.best_freedom_level();
    if freedom < target.required_freedom {
        return Err(GameError::precondition(format!(
            "{division} requires freedom level {}, best certificate grants {freedom}",
            target.required_freedom
        )));
    }
    let Some(unit) = target.units.choose(ctx.rng).cloned() else {
        return Err(GameError::not_found("unit", division));
    };

    let mut next = world.clone();
    let from_division = std::mem::replace(&mut next.state.player_division, target.name.clone());
    next.state.player_unit = unit.clone();

    Ok(Resolution {
        world: next,
        report: ActionReport::Transfer {
            from_division,
            to_division: target.name.clone(),
            unit,
        },
    })
}
