use contracts::{ActionReport, Certificate, Grade, StatDelta};

use super::{apply_stats, ensure_funds, ActionContext};
use crate::error::{GameError, GameResult};
use crate::{CareerWorld, Resolution};

const MAX_ANSWER: u8 = 3;

pub fn grade_for_score(score: u32) -> Grade {
    match score {
        90.. => Grade::A,
        80..=89 => Grade::B,
        70..=79 => Grade::C,
        60..=69 => Grade::D,
        _ => Grade::F,
    }
}

pub fn freedom_level_for(grade: Grade) -> u8 {
    match grade {
        Grade::A => 3,
        Grade::B => 2,
        Grade::C => 1,
        Grade::D | Grade::F => 0,
    }
}

pub(super) fn resolve(
    ctx: &mut ActionContext<'_>,
    world: &CareerWorld,
    tier: u32,
    answers: &[u8],
) -> GameResult<Resolution> {
    let exam = ctx.config.academy_tier(tier)?;
    if answers.len() != exam.answer_key.len() {
        return Err(GameError::validation(
            "answers",
            format!("expected {} answers, got {}", exam.answer_key.len(), answers.len()),
        ));
    }
    if let Some(bad) = answers.iter().find(|answer| **answer > MAX_ANSWER) {
        return Err(GameError::validation(
            "answers",
            format!("answer {bad} is outside 0..={MAX_ANSWER}"),
        ));
    }
    if world.state.rank_index < exam.min_rank {
        return Err(GameError::precondition(format!(
            "tier {tier} requires rank index {}",
            exam.min_rank
        )));
    }
    ensure_funds(&world.state, exam.fee_cents)?;

    let correct = answers
        .iter()
        .zip(&exam.answer_key)
        .filter(|(given, expected)| given == expected)
        .count() as u32;
    let score = correct * 100 / exam.answer_key.len() as u32;
    let grade = grade_for_score(score);

    let mut next = world.clone();
    apply_stats(
        &mut next.state,
        StatDelta {
            money_cents: -exam.fee_cents,
            ..StatDelta::default()
        },
    );
    let certificate = Certificate {
        tier,
        score,
        grade,
        freedom_level: freedom_level_for(grade),
        issued_day: next.state.current_day,
    };
    next.state.certificates.push(certificate.clone());

    Ok(Resolution {
        world: next,
        report: ActionReport::AcademyExam {
            certificate,
            correct_answers: correct,
            fee_cents: exam.fee_cents,
        },
    })
}
