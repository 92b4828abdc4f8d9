use super::ReportChapter;
use crate::assessment::scoring::{average_percentage, exact_percentage};
use crate::assessment::domain::ChapterResult;
use serde::Serialize;

/// Chapters scoring below this percentage are recommended for improvement.
pub const RECOMMENDATION_THRESHOLD: u8 = 80;
pub const MAX_RECOMMENDATIONS: usize = 5;
/// Overall-comment cut points (excellent, good, fair). They only pick the
/// commentary sentence and never change a readiness label.
pub const OVERALL_COMMENT_THRESHOLDS: [u8; 3] = [85, 70, 55];
/// Chapters below this unrounded percentage count as priority items.
pub const PRIORITY_THRESHOLD: f64 = 70.0;
/// A chapter trailing the chapter average by more than this many points is
/// called out in the compliance overview.
pub const UNDERPERFORMANCE_MARGIN: f64 = 20.0;

pub const ALL_STRONG_MESSAGE: &str = "Excellent work! Your organization shows strong ISO 9001 readiness across all areas. Consider scheduling a formal assessment.";

pub const NEXT_STEPS: [&str; 4] = [
    "Review detailed requirements for areas scoring below 80%",
    "Develop implementation plans for missing processes",
    "Consider professional ISO 9001 consultation",
    "Schedule regular progress reviews",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub chapter_id: String,
    pub title: String,
    pub percentage: u8,
    pub action: String,
}

/// Chapters under [`RECOMMENDATION_THRESHOLD`], at most
/// [`MAX_RECOMMENDATIONS`], in the order given (catalog order, not severity).
pub fn recommendations(chapters: &[ReportChapter]) -> Vec<Recommendation> {
    chapters
        .iter()
        .filter(|chapter| chapter.result.percentage < RECOMMENDATION_THRESHOLD)
        .take(MAX_RECOMMENDATIONS)
        .map(|chapter| Recommendation {
            chapter_id: chapter.result.chapter_id.clone(),
            title: chapter.title.clone(),
            percentage: chapter.result.percentage,
            action: chapter.recommendation.clone(),
        })
        .collect()
}

/// True when no chapter falls below the recommendation threshold, including
/// the degenerate case of no chapters at all.
pub fn all_chapters_strong(results: &[ChapterResult]) -> bool {
    results
        .iter()
        .all(|result| result.percentage >= RECOMMENDATION_THRESHOLD)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportCommentary {
    pub overall: &'static str,
    pub compliance_overview: String,
    pub chapter_breakdown: String,
    pub priority_items: String,
    /// Mean of unrounded chapter percentages, distinct from the overall percentage.
    pub average_chapter_percentage: f64,
}

pub fn commentary(chapters: &[ReportChapter], overall_percentage: u8) -> ReportCommentary {
    let results: Vec<ChapterResult> = chapters.iter().map(|c| c.result.clone()).collect();
    let average = average_percentage(&results);

    ReportCommentary {
        overall: overall_comment(overall_percentage),
        compliance_overview: compliance_overview(chapters, average),
        chapter_breakdown: chapter_breakdown(chapters),
        priority_items: priority_items(priority_chapters(chapters)),
        average_chapter_percentage: average,
    }
}

fn overall_comment(percentage: u8) -> &'static str {
    let [excellent, good, fair] = OVERALL_COMMENT_THRESHOLDS;
    if percentage >= excellent {
        "Excellent work! Your organization shows strong ISO 9001 compliance. Focus now on preparing comprehensive evidence and documentation for the audit. Ensure all processes are well-documented with clear records and proof of implementation."
    } else if percentage >= good {
        "Good progress on ISO 9001 implementation. Address the identified gaps and strengthen your documentation. Remember, having processes in place is just the first step - you'll need to demonstrate evidence and proof of consistent implementation to the auditor."
    } else if percentage >= fair {
        "Your organization has made a fair start but significant work remains. Focus on the priority areas identified below and ensure you have robust evidence collection processes. The auditor will require proof of implementation, not just documented procedures."
    } else {
        "Substantial improvements needed before audit readiness. Prioritize the fundamental gaps identified and establish strong documentation practices. Consider postponing the audit until critical requirements are met and you have sufficient evidence to demonstrate compliance."
    }
}

/// Chapters paired with their unrounded percentage; unscorable chapters are left out.
fn scored(chapters: &[ReportChapter]) -> impl Iterator<Item = (&ReportChapter, f64)> {
    chapters
        .iter()
        .filter_map(|chapter| exact_percentage(&chapter.result).map(|exact| (chapter, exact)))
}

fn compliance_overview(chapters: &[ReportChapter], average: f64) -> String {
    let weak: Vec<&str> = scored(chapters)
        .filter(|(_, exact)| *exact < average - UNDERPERFORMANCE_MARGIN)
        .map(|(chapter, _)| chapter.title.as_str())
        .collect();

    if weak.is_empty() {
        return "Compliance is relatively balanced across all chapters. Continue strengthening weaker areas while maintaining current performance levels.".to_string();
    }

    format!(
        "Attention needed: {} significantly underperform compared to other areas. These chapters require immediate focus to achieve balanced compliance across all ISO 9001 requirements.",
        weak.join(", ")
    )
}

fn chapter_breakdown(chapters: &[ReportChapter]) -> String {
    let lowest = scored(chapters).reduce(|min, current| if current.1 < min.1 { current } else { min });

    match lowest {
        Some((chapter, exact)) if exact < 50.0 => format!(
            "Critical attention needed for {} ({}%). This fundamental area requires immediate improvement before proceeding with audit preparations.",
            chapter.title,
            exact.round()
        ),
        Some((chapter, exact)) if exact < 70.0 => format!(
            "{} ({}%) needs focused attention. While other areas show good progress, this chapter could impact overall audit success.",
            chapter.title,
            exact.round()
        ),
        _ => "All chapters show acceptable performance levels. Continue systematic improvement while preparing comprehensive evidence for audit verification.".to_string(),
    }
}

/// Chapters below [`PRIORITY_THRESHOLD`], capped like the recommendation list.
fn priority_chapters(chapters: &[ReportChapter]) -> usize {
    scored(chapters)
        .filter(|(_, exact)| *exact < PRIORITY_THRESHOLD)
        .take(MAX_RECOMMENDATIONS)
        .count()
}

fn priority_items(count: usize) -> String {
    match count {
        0 => "Excellent! All chapters meet acceptable standards. Focus on fine-tuning processes and gathering comprehensive evidence for audit day. Ensure all documentation is current and accessible.".to_string(),
        1 => "Limited priority areas identified. Address the 1 chapter below and you'll be well-positioned for audit success.".to_string(),
        2 => "Limited priority areas identified. Address the 2 chapters below and you'll be well-positioned for audit success.".to_string(),
        _ => "Multiple chapters require attention. Focus on the top 3 priority areas first, as improvements here will have the greatest impact on your overall audit readiness.".to_string(),
    }
}
