use chrono::NaiveDate;
use iso_readiness::assessment::{
    render_report, report_chapters, scoring, Answer, AnswerRecord, AnswerSheet, AnswerValue,
    AssessmentId, AssessmentRecord, AssessmentService, AssessmentStatus, AssessmentStore,
    ContactPayload, CrmRelay, MailReceipt, MailerError, NavigationAction, QuestionCatalog,
    RelayError, ReportContext, ReportEmail, ReportMailer, StoreError, UserInfo, ViewMode,
};
use iso_readiness::assessment::report::insights::ALL_STRONG_MESSAGE;
use iso_readiness::config::DeliveryConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingStore {
    records: Mutex<HashMap<AssessmentId, AssessmentRecord>>,
    answers: Mutex<Vec<AnswerRecord>>,
}

impl AssessmentStore for RecordingStore {
    fn create_assessment(&self, record: AssessmentRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .insert(record.assessment_id.clone(), record);
        Ok(())
    }

    fn upsert_answer(&self, record: AnswerRecord) -> Result<(), StoreError> {
        let mut answers = self.answers.lock().expect("answers mutex poisoned");
        answers.retain(|existing| {
            existing.assessment_id != record.assessment_id
                || existing.question_id != record.question_id
        });
        answers.push(record);
        Ok(())
    }

    fn complete_assessment(&self, record: AssessmentRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .insert(record.assessment_id.clone(), record);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<ReportEmail>>,
}

impl ReportMailer for RecordingMailer {
    fn send(&self, email: ReportEmail) -> Result<MailReceipt, MailerError> {
        self.sent.lock().expect("mailer mutex poisoned").push(email);
        Ok(MailReceipt {
            success: true,
            message_id: "workflow-1".to_string(),
        })
    }
}

#[derive(Default)]
struct RecordingRelay {
    contacts: Mutex<Vec<ContactPayload>>,
}

impl CrmRelay for RecordingRelay {
    fn relay(&self, contact: ContactPayload) -> Result<(), RelayError> {
        self.contacts
            .lock()
            .expect("relay mutex poisoned")
            .push(contact);
        Ok(())
    }
}

fn answer(question_id: &str, value: AnswerValue) -> Answer {
    Answer {
        question_id: question_id.to_string(),
        value,
        note: None,
    }
}

#[test]
fn full_assessment_reaches_results_and_delivers_report() {
    let store = Arc::new(RecordingStore::default());
    let mailer = Arc::new(RecordingMailer::default());
    let relay = Arc::new(RecordingRelay::default());
    let service = AssessmentService::new(
        store.clone(),
        mailer.clone(),
        relay.clone(),
        DeliveryConfig::default(),
    );
    let catalog = service.catalog();

    let id = service.start().expect("session starts").value.assessment_id;

    for (index, chapter) in catalog.chapters().iter().enumerate() {
        for question in &chapter.questions {
            service
                .record_answer(&id, answer(question.id, AnswerValue::Yes))
                .expect("answer recorded");
        }
        let snapshot = service
            .navigate(&id, NavigationAction::NextChapter)
            .expect("navigation allowed");
        let expected = if index + 1 == catalog.chapters().len() {
            ViewMode::Summary
        } else {
            ViewMode::Assessment
        };
        assert_eq!(snapshot.view, expected);
    }

    let summary = service.snapshot(&id).expect("snapshot");
    assert_eq!(summary.progress.percentage, 100);
    assert_eq!(summary.overall.percentage, 100);
    assert_eq!(summary.readiness.level, "Audit Ready");
    assert!(summary.chapters.iter().all(|chapter| chapter.complete));

    service
        .navigate(&id, NavigationAction::RequestReport)
        .expect("email collection");
    let completed = service
        .complete(
            &id,
            UserInfo {
                email: "  auditor@example.com ".to_string(),
                first_name: Some("   ".to_string()),
                company: Some("O'Brien & Sons".to_string()),
            },
        )
        .expect("completes");

    assert_eq!(completed.snapshot.view, ViewMode::Results);
    assert_eq!(completed.readiness.level, "High Readiness");
    assert!(completed.notices.is_empty());
    assert!(completed.report_html.contains(ALL_STRONG_MESSAGE));

    let sent = mailer.sent.lock().expect("mailer mutex poisoned");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient_email, "auditor@example.com");
    assert_eq!(sent[0].recipient_name, "there");
    assert_eq!(sent[0].overall_percentage, 100);

    let contacts = relay.contacts.lock().expect("relay mutex poisoned");
    assert_eq!(contacts[0].company.as_deref(), Some("OBrien  Sons"));
    assert_eq!(contacts[0].first_name, None);

    let records = store.records.lock().expect("records mutex poisoned");
    let record = records.get(&id).expect("record stored");
    assert_eq!(record.status, AssessmentStatus::Completed);
    assert_eq!(record.progress, 100);
    assert_eq!(
        store.answers.lock().expect("answers mutex poisoned").len(),
        catalog.total_questions()
    );
}

#[test]
fn session_can_revisit_chapters_before_requesting_report() {
    let service = AssessmentService::new(
        Arc::new(RecordingStore::default()),
        Arc::new(RecordingMailer::default()),
        Arc::new(RecordingRelay::default()),
        DeliveryConfig::default(),
    );
    let id = service.start().expect("session starts").value.assessment_id;

    let first = service
        .navigate(&id, NavigationAction::PreviousChapter)
        .expect("previous at first chapter stays put");
    assert_eq!(first.chapter_index, 0);

    service
        .navigate(&id, NavigationAction::ViewSummary)
        .expect("summary");
    let back = service
        .navigate(&id, NavigationAction::BackToAssessment)
        .expect("back to assessment");
    assert_eq!(back.view, ViewMode::Assessment);

    service
        .record_answer(&id, answer("5.1.1", AnswerValue::No))
        .expect("answers from any chapter");
    let snapshot = service.snapshot(&id).expect("snapshot");
    let leadership = &snapshot.chapters[1];
    assert_eq!(leadership.result.completed_questions, 1);
    assert_eq!(leadership.result.score, 0);
}

#[test]
fn stateless_render_matches_catalog_titles() {
    let catalog = QuestionCatalog::iso9001();
    let mut sheet = AnswerSheet::new();
    sheet.record(answer("9.1.1", AnswerValue::Partial));
    let results = scoring::aggregate_all(catalog.chapters(), &sheet);
    let overall = scoring::overall(&results);
    let chapters = report_chapters(catalog, &results);
    let context = ReportContext {
        report_id: None,
        generated_on: NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date"),
    };
    let user = UserInfo::default();

    let first = render_report(&user, &chapters, overall.score, overall.percentage, &context);
    let second = render_report(&user, &chapters, overall.score, overall.percentage, &context);

    assert_eq!(first, second);
    assert!(first.contains("January 5, 2026"));
    for chapter in catalog.chapters() {
        assert!(first.contains(chapter.title), "missing {}", chapter.title);
    }
    assert!(first.contains("Anonymous"));
}
