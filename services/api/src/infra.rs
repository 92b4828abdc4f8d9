use chrono::{NaiveDate, Utc};
use iso_readiness::assessment::{
    AnswerRecord, AssessmentId, AssessmentRecord, AssessmentService, AssessmentStore,
    ContactPayload, CrmRelay, DisabledCrmRelay, HttpCrmRelay, MailReceipt, MailerError,
    RelayError, ReportEmail, ReportMailer, StoreError,
};
use iso_readiness::config::{DeliveryConfig, SessionLimits};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

pub(crate) type ApiService =
    AssessmentService<InMemoryAssessmentStore, LoggingMailer, ConfiguredRelay>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_service(delivery: DeliveryConfig, limits: SessionLimits) -> Arc<ApiService> {
    let relay = ConfiguredRelay::from_config(&delivery);
    let service = AssessmentService::new(
        Arc::new(InMemoryAssessmentStore::default()),
        Arc::new(LoggingMailer),
        Arc::new(relay),
        delivery,
    )
    .with_session_limits(limits);
    Arc::new(service)
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentStore {
    assessments: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
    answers: Arc<Mutex<HashMap<(AssessmentId, String), AnswerRecord>>>,
}

impl InMemoryAssessmentStore {
    #[cfg(test)]
    pub(crate) fn assessment(&self, id: &AssessmentId) -> Option<AssessmentRecord> {
        self.assessments
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned()
    }

    #[cfg(test)]
    pub(crate) fn answers_for(&self, id: &AssessmentId) -> usize {
        self.answers
            .lock()
            .expect("store mutex poisoned")
            .keys()
            .filter(|(assessment_id, _)| assessment_id == id)
            .count()
    }
}

impl AssessmentStore for InMemoryAssessmentStore {
    fn create_assessment(&self, record: AssessmentRecord) -> Result<(), StoreError> {
        let mut guard = self.assessments.lock().expect("store mutex poisoned");
        guard.insert(record.assessment_id.clone(), record);
        Ok(())
    }

    fn upsert_answer(&self, record: AnswerRecord) -> Result<(), StoreError> {
        let mut guard = self.answers.lock().expect("store mutex poisoned");
        let key = (record.assessment_id.clone(), record.question_id.clone());
        match guard.get_mut(&key) {
            Some(existing) => {
                let created_at = existing.timestamps.created_at;
                *existing = record;
                existing.timestamps.created_at = created_at;
            }
            None => {
                guard.insert(key, record);
            }
        }
        Ok(())
    }

    fn complete_assessment(&self, record: AssessmentRecord) -> Result<(), StoreError> {
        let mut guard = self.assessments.lock().expect("store mutex poisoned");
        if guard.contains_key(&record.assessment_id) {
            guard.insert(record.assessment_id.clone(), record);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}

/// Stands in for a mail transport: logs the delivery and hands back a
/// synthetic message id.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingMailer;

impl ReportMailer for LoggingMailer {
    fn send(&self, email: ReportEmail) -> Result<MailReceipt, MailerError> {
        if email.report_html.is_empty() {
            return Err(MailerError::Rejected("report body is empty".to_string()));
        }

        let message_id = format!("mock_{}", Utc::now().timestamp_millis());
        info!(
            %message_id,
            recipient_name = %email.recipient_name,
            cc = %email.cc_email,
            overall_percentage = email.overall_percentage,
            report_bytes = email.report_html.len(),
            "report email queued"
        );
        Ok(MailReceipt {
            success: true,
            message_id,
        })
    }
}

/// CRM relay chosen from configuration at startup.
#[derive(Debug, Clone)]
pub(crate) enum ConfiguredRelay {
    Http(HttpCrmRelay),
    Disabled(DisabledCrmRelay),
}

impl ConfiguredRelay {
    pub(crate) fn from_config(delivery: &DeliveryConfig) -> Self {
        match &delivery.crm_webhook_url {
            Some(url) => {
                info!(endpoint = %url, "CRM relay enabled");
                Self::Http(HttpCrmRelay::new(url.clone()))
            }
            None => {
                info!("ISO_CRM_WEBHOOK_URL not set; CRM relay disabled");
                Self::Disabled(DisabledCrmRelay)
            }
        }
    }
}

impl CrmRelay for ConfiguredRelay {
    fn relay(&self, contact: ContactPayload) -> Result<(), RelayError> {
        match self {
            Self::Http(relay) => relay.relay(contact),
            Self::Disabled(relay) => relay.relay(contact),
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
