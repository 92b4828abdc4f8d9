use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::assessment::catalog::{Chapter, Question, QuestionCatalog};
use crate::assessment::delivery::{
    AnswerRecord, AssessmentRecord, AssessmentStore, ContactPayload, CrmRelay, MailReceipt,
    MailerError, RelayError, ReportEmail, ReportMailer, StoreError,
};
use crate::assessment::domain::{Answer, AnswerValue, AssessmentId, ChapterResult, UserInfo};
use crate::assessment::service::AssessmentService;
use crate::assessment::session::NavigationAction;
use crate::config::DeliveryConfig;

pub(super) fn catalog() -> &'static QuestionCatalog {
    QuestionCatalog::iso9001()
}

pub(super) fn answer(question_id: &str, value: AnswerValue) -> Answer {
    Answer {
        question_id: question_id.to_string(),
        value,
        note: None,
    }
}

/// Chapter outside the bundled catalog with the given question weights.
pub(super) fn weighted_chapter(weights: &[u8]) -> Chapter {
    const IDS: [&str; 5] = ["t.1", "t.2", "t.3", "t.4", "t.5"];
    Chapter {
        id: "t",
        title: "Test Chapter",
        description: "Synthetic chapter",
        questions: weights
            .iter()
            .zip(IDS)
            .map(|(weight, id)| Question {
                id,
                text: "Synthetic question",
                weight: *weight,
            })
            .collect(),
        recommendation: "Tighten the synthetic process",
    }
}

pub(super) fn result(chapter_id: &str, score: u32, max_score: u32, percentage: u8) -> ChapterResult {
    ChapterResult {
        chapter_id: chapter_id.to_string(),
        score,
        max_score,
        percentage,
        completed_questions: 1,
        total_questions: 1,
    }
}

/// One result per catalog chapter, all at the same percentage.
pub(super) fn uniform_results(percentage: u8) -> Vec<ChapterResult> {
    catalog()
        .chapters()
        .iter()
        .map(|chapter| result(chapter.id, u32::from(percentage), 100, percentage))
        .collect()
}

pub(super) fn user_info() -> UserInfo {
    UserInfo {
        email: "Quality.Lead@Example.com".to_string(),
        first_name: Some("Dana".to_string()),
        company: Some("Acme Fabrication".to_string()),
    }
}

pub(super) fn delivery_config() -> DeliveryConfig {
    DeliveryConfig::default()
}

pub(super) type MemoryService = AssessmentService<MemoryStore, MemoryMailer, MemoryRelay>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<MemoryStore>,
    Arc<MemoryMailer>,
    Arc<MemoryRelay>,
) {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(MemoryMailer::default());
    let relay = Arc::new(MemoryRelay::default());
    let service = AssessmentService::new(
        store.clone(),
        mailer.clone(),
        relay.clone(),
        delivery_config(),
    );
    (service, store, mailer, relay)
}

/// Moves a fresh session to the email collection view.
pub(super) fn ready_for_contact<S, M, C>(service: &AssessmentService<S, M, C>) -> AssessmentId
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
    C: CrmRelay + 'static,
{
    let started = service.start().expect("session starts");
    let id = started.value.assessment_id;
    service
        .navigate(&id, NavigationAction::ViewSummary)
        .expect("summary reachable");
    service
        .navigate(&id, NavigationAction::RequestReport)
        .expect("email collection reachable");
    id
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    assessments: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
    answers: Arc<Mutex<HashMap<(AssessmentId, String), AnswerRecord>>>,
}

impl MemoryStore {
    pub(super) fn assessment(&self, id: &AssessmentId) -> Option<AssessmentRecord> {
        self.assessments
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn answer(&self, id: &AssessmentId, question_id: &str) -> Option<AnswerRecord> {
        self.answers
            .lock()
            .expect("store mutex poisoned")
            .get(&(id.clone(), question_id.to_string()))
            .cloned()
    }

    pub(super) fn answer_count(&self) -> usize {
        self.answers.lock().expect("store mutex poisoned").len()
    }
}

impl AssessmentStore for MemoryStore {
    fn create_assessment(&self, record: AssessmentRecord) -> Result<(), StoreError> {
        self.assessments
            .lock()
            .expect("store mutex poisoned")
            .insert(record.assessment_id.clone(), record);
        Ok(())
    }

    fn upsert_answer(&self, record: AnswerRecord) -> Result<(), StoreError> {
        let key = (record.assessment_id.clone(), record.question_id.clone());
        self.answers
            .lock()
            .expect("store mutex poisoned")
            .insert(key, record);
        Ok(())
    }

    fn complete_assessment(&self, record: AssessmentRecord) -> Result<(), StoreError> {
        let mut guard = self.assessments.lock().expect("store mutex poisoned");
        if !guard.contains_key(&record.assessment_id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(record.assessment_id.clone(), record);
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl AssessmentStore for UnavailableStore {
    fn create_assessment(&self, _record: AssessmentRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn upsert_answer(&self, _record: AnswerRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn complete_assessment(&self, _record: AssessmentRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryMailer {
    sent: Arc<Mutex<Vec<ReportEmail>>>,
}

impl MemoryMailer {
    pub(super) fn sent(&self) -> Vec<ReportEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

impl ReportMailer for MemoryMailer {
    fn send(&self, email: ReportEmail) -> Result<MailReceipt, MailerError> {
        let mut guard = self.sent.lock().expect("mailer mutex poisoned");
        guard.push(email);
        Ok(MailReceipt {
            success: true,
            message_id: format!("memory_{}", guard.len()),
        })
    }
}

pub(super) struct FailingMailer;

impl ReportMailer for FailingMailer {
    fn send(&self, _email: ReportEmail) -> Result<MailReceipt, MailerError> {
        Err(MailerError::Transport("smtp relay down".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRelay {
    contacts: Arc<Mutex<Vec<ContactPayload>>>,
}

impl MemoryRelay {
    pub(super) fn contacts(&self) -> Vec<ContactPayload> {
        self.contacts.lock().expect("relay mutex poisoned").clone()
    }
}

impl CrmRelay for MemoryRelay {
    fn relay(&self, contact: ContactPayload) -> Result<(), RelayError> {
        self.contacts
            .lock()
            .expect("relay mutex poisoned")
            .push(contact);
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
