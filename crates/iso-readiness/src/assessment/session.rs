//! Assessment session state and its reducer.
//!
//! A session is a plain value. [`AssessmentSession::apply`] consumes an event
//! and returns the next session without touching the previous one, so the
//! caller decides when (and whether) to commit the new state.

use serde::{Deserialize, Serialize};

use super::catalog::{Chapter, QuestionCatalog};
use super::domain::{Answer, AnswerSheet, AssessmentId, ChapterResult, OverallResult, UserInfo};
use super::intake::ValidatedContact;
use super::readiness::{ReadinessTier, SeverityBand, APP_READINESS_POLICY};
use super::scoring;

/// Screen the user is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Assessment,
    Summary,
    EmailCollection,
    Results,
}

impl ViewMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Assessment => "assessment",
            Self::Summary => "summary",
            Self::EmailCollection => "email_collection",
            Self::Results => "results",
        }
    }
}

/// Navigation requests a client may issue directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationAction {
    NextChapter,
    PreviousChapter,
    ViewSummary,
    BackToAssessment,
    RequestReport,
}

impl From<NavigationAction> for SessionEvent {
    fn from(action: NavigationAction) -> Self {
        match action {
            NavigationAction::NextChapter => Self::NextChapter,
            NavigationAction::PreviousChapter => Self::PreviousChapter,
            NavigationAction::ViewSummary => Self::ViewSummary,
            NavigationAction::BackToAssessment => Self::BackToAssessment,
            NavigationAction::RequestReport => Self::RequestReport,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    RecordAnswer(Answer),
    NextChapter,
    PreviousChapter,
    ViewSummary,
    BackToAssessment,
    RequestReport,
    /// Raised once contact details passed validation and the report was rendered.
    ReportDelivered(ValidatedContact),
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RecordAnswer(_) => "record_answer",
            Self::NextChapter => "next_chapter",
            Self::PreviousChapter => "previous_chapter",
            Self::ViewSummary => "view_summary",
            Self::BackToAssessment => "back_to_assessment",
            Self::RequestReport => "request_report",
            Self::ReportDelivered(_) => "report_delivered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("question {0} is not part of the assessment catalog")]
    UnknownQuestion(String),
    #[error("cannot {event} while on the {} view", from.label())]
    InvalidTransition { from: ViewMode, event: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentSession {
    pub id: AssessmentId,
    chapter_index: usize,
    answers: AnswerSheet,
    view: ViewMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<UserInfo>,
}

impl AssessmentSession {
    pub fn new(id: AssessmentId) -> Self {
        Self {
            id,
            chapter_index: 0,
            answers: AnswerSheet::new(),
            view: ViewMode::Assessment,
            user: None,
        }
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn chapter_index(&self) -> usize {
        self.chapter_index
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    pub fn current_chapter<'c>(&self, catalog: &'c QuestionCatalog) -> Option<&'c Chapter> {
        catalog.chapter_at(self.chapter_index)
    }

    /// Computes the state that follows `event`. `self` is left untouched.
    pub fn apply(
        &self,
        catalog: &QuestionCatalog,
        event: SessionEvent,
    ) -> Result<Self, SessionError> {
        let mut next = self.clone();
        let last_chapter = catalog.chapters().len().saturating_sub(1);

        match (self.view, event) {
            // answers stay editable from every view
            (_, SessionEvent::RecordAnswer(answer)) => {
                if catalog.locate(&answer.question_id).is_none() {
                    return Err(SessionError::UnknownQuestion(answer.question_id));
                }
                next.answers.record(answer);
            }
            (ViewMode::Assessment, SessionEvent::NextChapter) => {
                if self.chapter_index >= last_chapter {
                    next.view = ViewMode::Summary;
                } else {
                    next.chapter_index += 1;
                }
            }
            (ViewMode::Assessment, SessionEvent::PreviousChapter) => {
                next.chapter_index = self.chapter_index.saturating_sub(1);
            }
            (ViewMode::Assessment, SessionEvent::ViewSummary) => {
                next.view = ViewMode::Summary;
            }
            (ViewMode::Summary, SessionEvent::BackToAssessment) => {
                next.view = ViewMode::Assessment;
            }
            (ViewMode::Summary, SessionEvent::RequestReport) => {
                next.view = ViewMode::EmailCollection;
            }
            (ViewMode::EmailCollection, SessionEvent::ReportDelivered(contact)) => {
                next.user = Some(contact.into_user());
                next.view = ViewMode::Results;
            }
            (from, event) => {
                return Err(SessionError::InvalidTransition {
                    from,
                    event: event.name(),
                })
            }
        }

        Ok(next)
    }

    pub fn chapter_results(&self, catalog: &QuestionCatalog) -> Vec<ChapterResult> {
        scoring::aggregate_all(catalog.chapters(), &self.answers)
    }

    pub fn overall(&self, catalog: &QuestionCatalog) -> OverallResult {
        scoring::overall(&self.chapter_results(catalog))
    }

    /// Answered share of the whole catalog. Answers are only accepted for
    /// catalog questions, so the count never exceeds the total.
    pub fn progress(&self, catalog: &QuestionCatalog) -> Progress {
        let total = catalog.total_questions();
        let answered = self.answers.len().min(total);
        Progress {
            answered,
            total,
            percentage: scoring::progress_percentage(answered, total),
        }
    }

    /// Per-chapter summary rows shown before the report is requested.
    pub fn chapter_summaries(&self, catalog: &QuestionCatalog) -> Vec<ChapterSummary> {
        catalog
            .chapters()
            .iter()
            .map(|chapter| {
                let result = scoring::score_chapter(chapter, &self.answers);
                let band = SeverityBand::for_percentage(result.percentage);
                ChapterSummary {
                    title: chapter.title.to_string(),
                    progress: scoring::progress_percentage(
                        result.completed_questions,
                        result.total_questions,
                    ),
                    complete: result.is_complete(),
                    status: band.label(),
                    band,
                    result,
                }
            })
            .collect()
    }

    /// In-app readiness tier. The emailed report uses a different table.
    pub fn app_readiness(&self, catalog: &QuestionCatalog) -> ReadinessTier {
        APP_READINESS_POLICY.classify(self.overall(catalog).percentage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    pub percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterSummary {
    #[serde(flatten)]
    pub result: ChapterResult,
    pub title: String,
    pub progress: u8,
    pub complete: bool,
    pub band: SeverityBand,
    pub status: &'static str,
}
