pub mod charts;
pub mod insights;
mod markup;
mod render;

use super::catalog::QuestionCatalog;
use super::domain::{ChapterResult, UserInfo};
use super::readiness::{ReadinessTier, REPORT_READINESS_POLICY};
use chrono::NaiveDate;
use charts::{BarChart, ChartEntry, RadarChart};
use insights::{Recommendation, ReportCommentary};
use serde::{Deserialize, Serialize};

pub use markup::escape_html;

/// A chapter result paired with the display data the report needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportChapter {
    #[serde(flatten)]
    pub result: ChapterResult,
    pub title: String,
    pub recommendation: String,
}

impl ReportChapter {
    pub fn from_catalog(catalog: &QuestionCatalog, result: ChapterResult) -> Self {
        Self {
            title: catalog.chapter_title(&result.chapter_id),
            recommendation: catalog.recommendation_for(&result.chapter_id).to_string(),
            result,
        }
    }

    pub fn chart_entry(&self) -> ChartEntry {
        ChartEntry {
            label: self.title.clone(),
            percentage: self.result.percentage,
        }
    }
}

pub fn report_chapters(catalog: &QuestionCatalog, results: &[ChapterResult]) -> Vec<ReportChapter> {
    results
        .iter()
        .cloned()
        .map(|result| ReportChapter::from_catalog(catalog, result))
        .collect()
}

/// Fields that vary between otherwise identical renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    pub generated_on: NaiveDate,
}

/// Everything the HTML renderer draws, computed up front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub user: UserInfo,
    pub context: ReportContext,
    pub chapters: Vec<ReportChapter>,
    pub overall_score: u32,
    pub overall_max_score: u32,
    pub overall_percentage: u8,
    pub readiness: ReadinessTier,
    pub recommendations: Vec<Recommendation>,
    pub all_chapters_strong: bool,
    pub strong_chapters: usize,
    pub commentary: ReportCommentary,
    pub radar: RadarChart,
    pub bars: BarChart,
}

impl ReportDocument {
    pub fn build(
        user: &UserInfo,
        chapters: &[ReportChapter],
        overall_score: u32,
        overall_percentage: u8,
        context: &ReportContext,
    ) -> Self {
        let readiness = REPORT_READINESS_POLICY.classify(overall_percentage);
        let recommendations = insights::recommendations(chapters);
        let results: Vec<ChapterResult> = chapters.iter().map(|c| c.result.clone()).collect();
        let commentary = insights::commentary(chapters, overall_percentage);
        let entries: Vec<ChartEntry> = chapters.iter().map(ReportChapter::chart_entry).collect();

        Self {
            user: user.clone(),
            context: context.clone(),
            chapters: chapters.to_vec(),
            overall_score,
            overall_max_score: results.iter().map(|r| r.max_score).sum(),
            overall_percentage,
            readiness,
            all_chapters_strong: insights::all_chapters_strong(&results),
            strong_chapters: results
                .iter()
                .filter(|r| r.percentage >= insights::RECOMMENDATION_THRESHOLD)
                .count(),
            recommendations,
            commentary,
            radar: charts::radar_chart(&entries),
            bars: charts::bar_chart(&entries),
        }
    }

    pub fn to_html(&self) -> String {
        render::render_html(self)
    }
}

/// Renders the self-contained HTML report. Identical inputs always produce
/// identical output; the only time-dependent field is `context.generated_on`.
pub fn render_report(
    user: &UserInfo,
    chapters: &[ReportChapter],
    overall_score: u32,
    overall_percentage: u8,
    context: &ReportContext,
) -> String {
    ReportDocument::build(user, chapters, overall_score, overall_percentage, context).to_html()
}
