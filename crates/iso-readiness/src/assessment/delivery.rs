//! Outbound collaborators: persistence, report mail, and CRM relay.
//!
//! The service treats every one of these as best-effort. Implementations
//! should report failures through their error type rather than retrying.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{AnswerValue, AssessmentId, AssessmentStatus, RecordTimestamps};

/// Stored before the participant has given an address.
pub const PENDING_EMAIL: &str = "pending@assessment.invalid";

/// Assessment row as created at session start and updated on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub assessment_id: AssessmentId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub progress: u8,
    pub status: AssessmentStatus,
}

impl AssessmentRecord {
    pub fn pending(assessment_id: AssessmentId) -> Self {
        Self {
            assessment_id,
            email: PENDING_EMAIL.to_string(),
            first_name: None,
            company: None,
            progress: 0,
            status: AssessmentStatus::InProgress,
        }
    }
}

/// One answer row, upserted on (assessment_id, question_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub assessment_id: AssessmentId,
    pub question_id: String,
    pub chapter_id: String,
    pub answer_value: AnswerValue,
    pub score: u32,
    pub max_score: u32,
    pub weight: u8,
    pub timestamps: RecordTimestamps,
}

pub trait AssessmentStore: Send + Sync {
    fn create_assessment(&self, record: AssessmentRecord) -> Result<(), StoreError>;
    fn upsert_answer(&self, record: AnswerRecord) -> Result<(), StoreError>;
    fn complete_assessment(&self, record: AssessmentRecord) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("assessment record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEmail {
    pub recipient_email: String,
    pub recipient_name: String,
    pub cc_email: String,
    pub report_html: String,
    pub overall_percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailReceipt {
    pub success: bool,
    pub message_id: String,
}

pub trait ReportMailer: Send + Sync {
    fn send(&self, email: ReportEmail) -> Result<MailReceipt, MailerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
    #[error("mail rejected: {0}")]
    Rejected(String),
}

/// Sanitized contact fields as posted to the CRM webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPayload {
    pub email: String,
    #[serde(
        rename = "firstName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

pub trait CrmRelay: Send + Sync {
    fn relay(&self, contact: ContactPayload) -> Result<(), RelayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("CRM webhook is not configured")]
    NotConfigured,
    #[error("CRM webhook request failed: {0}")]
    Transport(String),
    #[error("CRM webhook responded with status {0}")]
    Status(u16),
}

/// Posts contact details to a CRM webhook as `application/x-www-form-urlencoded`.
///
/// The request is spawned onto the current tokio runtime and not awaited;
/// failures past that point are only logged.
#[derive(Debug, Clone)]
pub struct HttpCrmRelay {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpCrmRelay {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CrmRelay for HttpCrmRelay {
    fn relay(&self, contact: ContactPayload) -> Result<(), RelayError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| RelayError::Transport(err.to_string()))?;

        debug!(
            has_first_name = contact.first_name.is_some(),
            has_company = contact.company.is_some(),
            "relaying contact to CRM webhook"
        );
        let request = self.client.post(&self.endpoint).form(&contact);
        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(status = %response.status(), "CRM webhook accepted contact");
                }
                Ok(response) => {
                    let error = RelayError::Status(response.status().as_u16());
                    warn!(%error, "CRM webhook rejected contact");
                }
                Err(err) => {
                    let error = RelayError::Transport(err.to_string());
                    warn!(%error, "CRM webhook unreachable");
                }
            }
        });
        Ok(())
    }
}

/// Relay used when no webhook URL is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCrmRelay;

impl CrmRelay for DisabledCrmRelay {
    fn relay(&self, _contact: ContactPayload) -> Result<(), RelayError> {
        Err(RelayError::NotConfigured)
    }
}
