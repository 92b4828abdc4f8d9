//! ISO 9001:2015 readiness assessment: catalog, scoring, readiness tiers,
//! report rendering, and the session lifecycle that ties them together.
//!
//! Scoring, classification, chart geometry and rendering are pure functions
//! of the answer sheet. Only [`service::AssessmentService`] holds state, and
//! only it talks to the outbound collaborators in [`delivery`].

pub mod catalog;
pub mod delivery;
pub mod domain;
pub mod intake;
pub mod readiness;
pub mod report;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use catalog::{Chapter, Question, QuestionCatalog, CATALOG_VERSION};
pub use delivery::{
    AnswerRecord, AssessmentRecord, AssessmentStore, ContactPayload, CrmRelay, DisabledCrmRelay,
    HttpCrmRelay, MailReceipt, MailerError, RelayError, ReportEmail, ReportMailer, StoreError,
};
pub use domain::{
    Answer, AnswerSheet, AnswerValue, AssessmentId, AssessmentStatus, ChapterResult,
    OverallResult, RecordTimestamps, UserInfo,
};
pub use intake::{ContactGuard, IntakeError, ValidatedContact};
pub use readiness::{
    ReadinessPolicy, ReadinessTier, SeverityBand, APP_READINESS_POLICY, REPORT_READINESS_POLICY,
};
pub use report::{render_report, report_chapters, ReportChapter, ReportContext, ReportDocument};
pub use router::assessment_router;
pub use service::{
    AssessmentService, AssessmentServiceError, Collaborator, CompletedAssessment, DeliveryNotice,
    SessionSnapshot, WithNotices,
};
pub use session::{
    AssessmentSession, ChapterSummary, NavigationAction, Progress, SessionError, SessionEvent,
    ViewMode,
};
