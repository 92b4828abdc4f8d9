use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::catalog::QuestionCatalog;
use super::delivery::{
    AnswerRecord, AssessmentRecord, AssessmentStore, CrmRelay, MailReceipt, ReportEmail,
    ReportMailer,
};
use super::domain::{
    Answer, AssessmentId, AssessmentStatus, ChapterResult, OverallResult, RecordTimestamps,
    UserInfo,
};
use super::intake::{ContactGuard, IntakeError};
use super::readiness::ReadinessTier;
use super::report::{report_chapters, ReportContext, ReportDocument};
use super::scoring;
use super::session::{
    AssessmentSession, ChapterSummary, NavigationAction, Progress, SessionError, SessionEvent,
    ViewMode,
};
use crate::config::{DeliveryConfig, SessionLimits};

/// Recipient name used when the participant left the first name blank.
const FALLBACK_RECIPIENT_NAME: &str = "there";

/// Drives assessment sessions and hands results to the outbound collaborators.
///
/// Sessions live in memory until they sit idle past [`SessionLimits::idle_ttl`]
/// or are pushed out by [`SessionLimits::max_sessions`]. Collaborator failures
/// never undo a session change; they surface as [`DeliveryNotice`]s.
pub struct AssessmentService<S, M, C> {
    catalog: &'static QuestionCatalog,
    guard: ContactGuard,
    store: Arc<S>,
    mailer: Arc<M>,
    relay: Arc<C>,
    delivery: DeliveryConfig,
    limits: SessionLimits,
    sessions: Mutex<HashMap<AssessmentId, TrackedSession>>,
}

struct TrackedSession {
    session: AssessmentSession,
    touched_at: DateTime<Utc>,
}

impl TrackedSession {
    fn new(session: AssessmentSession) -> Self {
        Self {
            session,
            touched_at: Utc::now(),
        }
    }

    fn idle_past(&self, ttl: std::time::Duration, now: DateTime<Utc>) -> bool {
        (now - self.touched_at)
            .to_std()
            .is_ok_and(|idle| idle > ttl)
    }
}

impl<S, M, C> AssessmentService<S, M, C>
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
    C: CrmRelay + 'static,
{
    pub fn new(store: Arc<S>, mailer: Arc<M>, relay: Arc<C>, delivery: DeliveryConfig) -> Self {
        Self {
            catalog: QuestionCatalog::iso9001(),
            guard: ContactGuard::new(),
            store,
            mailer,
            relay,
            delivery,
            limits: SessionLimits::default(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_session_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn catalog(&self) -> &'static QuestionCatalog {
        self.catalog
    }

    /// Opens a new session and registers an in-progress record.
    pub fn start(&self) -> Result<WithNotices<SessionSnapshot>, AssessmentServiceError> {
        let id = AssessmentId::generate();
        let session = AssessmentSession::new(id.clone());
        let snapshot = SessionSnapshot::capture(self.catalog, &session);
        {
            let mut sessions = self.sessions()?;
            self.evict(&mut sessions, Utc::now(), 1);
            sessions.insert(id.clone(), TrackedSession::new(session));
        }
        info!(assessment_id = %id, "assessment started");

        let mut notices = Vec::new();
        if let Err(error) = self.store.create_assessment(AssessmentRecord::pending(id.clone())) {
            warn!(assessment_id = %id, %error, "failed to create assessment record");
            notices.push(DeliveryNotice::new(Collaborator::Store, error.to_string()));
        }

        Ok(WithNotices::new(snapshot, notices))
    }

    pub fn snapshot(&self, id: &AssessmentId) -> Result<SessionSnapshot, AssessmentServiceError> {
        let sessions = self.sessions()?;
        let tracked = sessions
            .get(id)
            .ok_or_else(|| AssessmentServiceError::NotFound(id.clone()))?;
        Ok(SessionSnapshot::capture(self.catalog, &tracked.session))
    }

    /// Drops sessions idle past the configured TTL as of `now`; returns how
    /// many were removed. Starting a session runs this as well.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> Result<usize, AssessmentServiceError> {
        let mut sessions = self.sessions()?;
        Ok(self.evict(&mut sessions, now, 0))
    }

    pub fn active_sessions(&self) -> Result<usize, AssessmentServiceError> {
        Ok(self.sessions()?.len())
    }

    /// Records an answer, then upserts the scored answer row.
    pub fn record_answer(
        &self,
        id: &AssessmentId,
        answer: Answer,
    ) -> Result<WithNotices<SessionSnapshot>, AssessmentServiceError> {
        let (chapter, question) = self
            .catalog
            .locate(&answer.question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(answer.question_id.clone()))?;

        let record = AnswerRecord {
            assessment_id: id.clone(),
            question_id: question.id.to_string(),
            chapter_id: chapter.id.to_string(),
            answer_value: answer.value,
            score: scoring::score_answer(answer.value, question.weight),
            max_score: scoring::max_points_for_answer(answer.value, question.weight),
            weight: question.weight,
            timestamps: RecordTimestamps::now(),
        };

        let snapshot = self.transition(id, SessionEvent::RecordAnswer(answer))?;

        let mut notices = Vec::new();
        if let Err(error) = self.store.upsert_answer(record) {
            warn!(assessment_id = %id, %error, "failed to persist answer");
            notices.push(DeliveryNotice::new(Collaborator::Store, error.to_string()));
        }

        Ok(WithNotices::new(snapshot, notices))
    }

    pub fn navigate(
        &self,
        id: &AssessmentId,
        action: NavigationAction,
    ) -> Result<SessionSnapshot, AssessmentServiceError> {
        self.transition(id, action.into())
    }

    /// Validates contact details, renders the report, moves the session to
    /// results, then persists, relays, mails and exports best-effort.
    ///
    /// Invalid contact details are rejected before any collaborator is called.
    pub fn complete(
        &self,
        id: &AssessmentId,
        user: UserInfo,
    ) -> Result<CompletedAssessment, AssessmentServiceError> {
        let contact = self.guard.validate(user)?;

        let (session, rendered) = {
            let mut sessions = self.sessions()?;
            let current = &sessions
                .get(id)
                .ok_or_else(|| AssessmentServiceError::NotFound(id.clone()))?
                .session;

            if current.view() != ViewMode::EmailCollection {
                return Err(SessionError::InvalidTransition {
                    from: current.view(),
                    event: "complete the assessment",
                }
                .into());
            }

            let rendered = self.render(current, contact.user());
            let next = current.apply(self.catalog, SessionEvent::ReportDelivered(contact.clone()))?;
            sessions.insert(id.clone(), TrackedSession::new(next.clone()));
            (next, rendered)
        };

        info!(
            assessment_id = %id,
            overall_percentage = rendered.overall.percentage,
            readiness = rendered.readiness.level,
            "assessment completed"
        );

        let mut notices = Vec::new();
        let user = contact.user();

        let completion = AssessmentRecord {
            assessment_id: id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            company: user.company.clone(),
            progress: session.progress(self.catalog).percentage,
            status: AssessmentStatus::Completed,
        };
        if let Err(error) = self.store.complete_assessment(completion) {
            warn!(assessment_id = %id, %error, "failed to mark assessment completed");
            notices.push(DeliveryNotice::new(Collaborator::Store, error.to_string()));
        }

        if let Err(error) = self.relay.relay(contact.relay_payload()) {
            warn!(assessment_id = %id, %error, "failed to relay contact to CRM");
            notices.push(DeliveryNotice::new(Collaborator::Crm, error.to_string()));
        }

        let email = ReportEmail {
            recipient_email: user.email.clone(),
            recipient_name: user
                .first_name
                .clone()
                .unwrap_or_else(|| FALLBACK_RECIPIENT_NAME.to_string()),
            cc_email: self.delivery.cc_email.clone(),
            report_html: rendered.html.clone(),
            overall_percentage: rendered.overall.percentage,
        };
        let receipt = match self.mailer.send(email) {
            Ok(receipt) if receipt.success => Some(receipt),
            Ok(receipt) => {
                warn!(assessment_id = %id, message_id = %receipt.message_id, "mailer reported failure");
                notices.push(DeliveryNotice::new(
                    Collaborator::Mailer,
                    "report email was not accepted".to_string(),
                ));
                None
            }
            Err(error) => {
                warn!(assessment_id = %id, %error, "failed to send report email");
                notices.push(DeliveryNotice::new(Collaborator::Mailer, error.to_string()));
                None
            }
        };

        let report_path = match self.export(id, &rendered.html) {
            Ok(path) => path,
            Err(error) => {
                warn!(assessment_id = %id, %error, "failed to write report file");
                notices.push(DeliveryNotice::new(Collaborator::Export, error.to_string()));
                None
            }
        };

        Ok(CompletedAssessment {
            snapshot: SessionSnapshot::capture(self.catalog, &session),
            overall: rendered.overall,
            readiness: rendered.readiness,
            report_html: rendered.html,
            receipt,
            report_path,
            notices,
        })
    }

    fn transition(
        &self,
        id: &AssessmentId,
        event: SessionEvent,
    ) -> Result<SessionSnapshot, AssessmentServiceError> {
        let mut sessions = self.sessions()?;
        let current = sessions
            .get(id)
            .ok_or_else(|| AssessmentServiceError::NotFound(id.clone()))?;
        let next = current.session.apply(self.catalog, event)?;
        let snapshot = SessionSnapshot::capture(self.catalog, &next);
        sessions.insert(id.clone(), TrackedSession::new(next));
        Ok(snapshot)
    }

    /// Removes idle sessions, then the least recently touched ones until
    /// `incoming` more fit under the cap.
    fn evict(
        &self,
        sessions: &mut HashMap<AssessmentId, TrackedSession>,
        now: DateTime<Utc>,
        incoming: usize,
    ) -> usize {
        let before = sessions.len();
        sessions.retain(|_, tracked| !tracked.idle_past(self.limits.idle_ttl, now));

        while sessions.len() + incoming > self.limits.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, tracked)| tracked.touched_at)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "evicted assessment sessions");
        }
        evicted
    }

    fn render(&self, session: &AssessmentSession, user: &UserInfo) -> RenderedReport {
        let results = session.chapter_results(self.catalog);
        let overall = scoring::overall(&results);
        let chapters = report_chapters(self.catalog, &results);
        let context = ReportContext {
            report_id: Some(session.id.to_string()),
            generated_on: Utc::now().date_naive(),
        };
        let document =
            ReportDocument::build(user, &chapters, overall.score, overall.percentage, &context);

        RenderedReport {
            readiness: document.readiness,
            html: document.to_html(),
            overall,
        }
    }

    fn export(&self, id: &AssessmentId, html: &str) -> std::io::Result<Option<PathBuf>> {
        let Some(dir) = &self.delivery.report_dir else {
            return Ok(None);
        };
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{id}.html"));
        std::fs::write(&path, html)?;
        Ok(Some(path))
    }

    fn sessions(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<AssessmentId, TrackedSession>>, AssessmentServiceError>
    {
        self.sessions
            .lock()
            .map_err(|_| AssessmentServiceError::SessionsUnavailable)
    }
}

struct RenderedReport {
    overall: OverallResult,
    readiness: ReadinessTier,
    html: String,
}

/// Read model of a session for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub assessment_id: AssessmentId,
    pub view: ViewMode,
    pub chapter_index: usize,
    pub chapter_id: Option<String>,
    pub progress: Progress,
    pub chapters: Vec<ChapterSummary>,
    pub overall: OverallResult,
    /// In-app readiness tier, not the one printed on the report.
    pub readiness: ReadinessTier,
    pub answers: Vec<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

impl SessionSnapshot {
    pub fn capture(catalog: &QuestionCatalog, session: &AssessmentSession) -> Self {
        let chapters = session.chapter_summaries(catalog);
        let results: Vec<ChapterResult> = chapters.iter().map(|c| c.result.clone()).collect();
        Self {
            assessment_id: session.id.clone(),
            view: session.view(),
            chapter_index: session.chapter_index(),
            chapter_id: session
                .current_chapter(catalog)
                .map(|chapter| chapter.id.to_string()),
            progress: session.progress(catalog),
            overall: scoring::overall(&results),
            readiness: session.app_readiness(catalog),
            answers: session.answers().iter().cloned().collect(),
            user: session.user().cloned(),
            chapters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collaborator {
    Store,
    Mailer,
    Crm,
    Export,
}

/// Non-fatal collaborator failure surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryNotice {
    pub collaborator: Collaborator,
    pub message: String,
}

impl DeliveryNotice {
    pub fn new(collaborator: Collaborator, message: String) -> Self {
        Self {
            collaborator,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithNotices<T> {
    #[serde(flatten)]
    pub value: T,
    pub notices: Vec<DeliveryNotice>,
}

impl<T> WithNotices<T> {
    pub fn new(value: T, notices: Vec<DeliveryNotice>) -> Self {
        Self { value, notices }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedAssessment {
    pub snapshot: SessionSnapshot,
    pub overall: OverallResult,
    /// Tier from the report threshold table.
    pub readiness: ReadinessTier,
    pub report_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<MailReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
    pub notices: Vec<DeliveryNotice>,
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("assessment {0} not found")]
    NotFound(AssessmentId),
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("session storage is unavailable")]
    SessionsUnavailable,
}
