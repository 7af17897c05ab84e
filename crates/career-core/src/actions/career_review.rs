use contracts::ActionReport;

use super::ActionContext;
use crate::error::GameResult;
use crate::progression::{apply_promotion, promotion_status};
use crate::{CareerWorld, Resolution};

pub(super) fn resolve(ctx: &mut ActionContext<'_>, world: &CareerWorld) -> GameResult<Resolution> {
    let track = ctx.config.track(world.state.country, world.state.branch)?;
    let mut next = world.clone();
    let previous_rank = next.state.rank_index;
    let before = promotion_status(track, &next.state);
    let promoted = apply_promotion(track, &mut next.state);

    let rank_title = track
        .ranks
        .get(next.state.rank_index as usize)
        .map(|tier| tier.title.clone())
        .unwrap_or(before.current_rank_title);

    if promoted {
        tracing::info!(
            target: "career::service",
            profile_id = %next.state.profile_id,
            rank = %rank_title,
            "career_review.promoted"
        );
    }

    Ok(Resolution {
        world: next,
        report: ActionReport::CareerReview {
            promoted,
            previous_rank,
            rank_index: previous_rank + u32::from(promoted),
            rank_title,
            missing_days: before.missing_days,
            missing_points: before.missing_points,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CareerConfig;
    use crate::test_support::{sample_world, test_rng};

    #[test]
    fn review_promotes_once_thresholds_are_met() {
        let config = CareerConfig::builtin();
        let mut world = sample_world(&config);
        world.state.rank_index = 0;
        world.state.days_in_rank = 31;
        world.state.promotion_points = 9;
        let mut rng = test_rng(0);
        let mut ctx = ActionContext {
            config: &config,
            now_ms: 0,
            rng: &mut rng,
        };

        let resolution = resolve(&mut ctx, &world).expect("review");
        assert_eq!(resolution.world.state.rank_index, 1);
        assert_eq!(resolution.world.state.days_in_rank, 0);
        assert!(matches!(
            resolution.report,
            ActionReport::CareerReview { promoted: true, rank_index: 1, .. }
        ));
    }

    #[test]
    fn review_without_merit_reports_the_gap() {
        let config = CareerConfig::builtin();
        let mut world = sample_world(&config);
        world.state.days_in_rank = 10;
        world.state.promotion_points = 2;
        let mut rng = test_rng(0);
        let mut ctx = ActionContext {
            config: &config,
            now_ms: 0,
            rng: &mut rng,
        };

        let resolution = resolve(&mut ctx, &world).expect("review");
        assert_eq!(resolution.world, world);
        assert!(matches!(
            resolution.report,
            ActionReport::CareerReview {
                promoted: false,
                missing_days: 20,
                missing_points: 6,
                ..
            }
        ));
    }
}
