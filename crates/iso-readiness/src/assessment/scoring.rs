//! Weighted scoring of answers into chapter and overall results.
//!
//! Every function here is pure: results are recomputed from the answer sheet
//! and the catalog on each call and never cached.

use super::catalog::{Chapter, QuestionCatalog};
use super::domain::{AnswerSheet, AnswerValue, ChapterResult, OverallResult};

/// Points awarded for an answer.
///
/// `Na` earns the full weight while contributing nothing to the maximum
/// (see [`max_points_for_answer`]), so a chapter made up solely of `Na`
/// answers reports a score above its zero maximum. That asymmetry is kept
/// as-is; callers rely on [`percentage`] to guard the zero denominator.
pub fn score_answer(value: AnswerValue, weight: u8) -> u32 {
    let weight = u32::from(weight);
    match value {
        AnswerValue::Yes => weight,
        // round(weight * 0.5) with halves rounded up
        AnswerValue::Partial => (weight + 1) / 2,
        AnswerValue::No => 0,
        AnswerValue::Na => weight,
    }
}

pub fn max_points_for_answer(value: AnswerValue, weight: u8) -> u32 {
    match value {
        AnswerValue::Yes | AnswerValue::Partial | AnswerValue::No => u32::from(weight),
        AnswerValue::Na => 0,
    }
}

/// `round(100 * score / max_score)` with halves rounded up, or 0 when the
/// maximum is zero. Clamped to 100 for `Na`-heavy sheets.
pub fn percentage(score: u32, max_score: u32) -> u8 {
    if max_score == 0 {
        return 0;
    }
    let score = u64::from(score);
    let max_score = u64::from(max_score);
    let rounded = (200 * score + max_score) / (2 * max_score);
    rounded.min(100) as u8
}

/// Scores one chapter. Unanswered questions count toward the maximum only.
pub fn score_chapter(chapter: &Chapter, answers: &AnswerSheet) -> ChapterResult {
    let mut score = 0;
    let mut max_score = 0;
    let mut completed_questions = 0;

    for question in &chapter.questions {
        match answers.value_of(question.id) {
            Some(value) => {
                completed_questions += 1;
                score += score_answer(value, question.weight);
                max_score += max_points_for_answer(value, question.weight);
            }
            None => max_score += u32::from(question.weight),
        }
    }

    ChapterResult {
        chapter_id: chapter.id.to_string(),
        score,
        max_score,
        percentage: percentage(score, max_score),
        completed_questions,
        total_questions: chapter.questions.len(),
    }
}

/// Scores the chapter with the given id, or returns a zeroed result when the
/// catalog has no such chapter.
pub fn aggregate_chapter(
    catalog: &QuestionCatalog,
    chapter_id: &str,
    answers: &AnswerSheet,
) -> ChapterResult {
    match catalog.chapter(chapter_id) {
        Some(chapter) => score_chapter(chapter, answers),
        None => ChapterResult::zeroed(chapter_id),
    }
}

/// Chapter results in catalog order.
pub fn aggregate_all(chapters: &[Chapter], answers: &AnswerSheet) -> Vec<ChapterResult> {
    chapters
        .iter()
        .map(|chapter| score_chapter(chapter, answers))
        .collect()
}

/// Sums raw points across chapters before dividing. This is the figure the
/// readiness classifiers consume.
pub fn overall(results: &[ChapterResult]) -> OverallResult {
    let score = results.iter().map(|result| result.score).sum();
    let max_score = results.iter().map(|result| result.max_score).sum();
    OverallResult {
        score,
        max_score,
        percentage: percentage(score, max_score),
        completed_questions: results.iter().map(|r| r.completed_questions).sum(),
        total_questions: results.iter().map(|r| r.total_questions).sum(),
    }
}

/// Unrounded `score / max_score * 100`, or `None` for a chapter with nothing
/// scorable. Not clamped: `na` answers can push it past 100.
pub fn exact_percentage(result: &ChapterResult) -> Option<f64> {
    if result.max_score == 0 {
        return None;
    }
    Some(f64::from(result.score) / f64::from(result.max_score) * 100.0)
}

/// Mean of the unrounded per-chapter percentages over chapters with a
/// non-zero maximum. Only the report commentary uses this; it is not
/// interchangeable with [`overall`].
pub fn average_percentage(results: &[ChapterResult]) -> f64 {
    let scored: Vec<f64> = results.iter().filter_map(exact_percentage).collect();
    if scored.is_empty() {
        return 0.0;
    }
    scored.iter().sum::<f64>() / scored.len() as f64
}

/// Share of answered questions as a whole percentage, used for progress bars
/// and the persisted progress field.
pub fn progress_percentage(answered: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * answered + total) / (2 * total);
    rounded.min(100) as u8
}
