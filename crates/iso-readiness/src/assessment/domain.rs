use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Response recorded against a single catalog question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerValue {
    Yes,
    Partial,
    No,
    Na,
}

impl AnswerValue {
    pub const fn ordered() -> [Self; 4] {
        [Self::Yes, Self::Partial, Self::No, Self::Na]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::Partial => "Partial",
            Self::No => "No",
            Self::Na => "N/A",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::Partial => "partial",
            Self::No => "no",
            Self::Na => "na",
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub value: AnswerValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Answers for one assessment, keyed by question id.
///
/// Recording an answer for a question that already has one replaces it
/// wholesale; notes from the previous answer are not carried over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSheet {
    answers: BTreeMap<String, Answer>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the answer and returns the one it superseded, if any.
    pub fn record(&mut self, answer: Answer) -> Option<Answer> {
        self.answers.insert(answer.question_id.clone(), answer)
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn value_of(&self, question_id: &str) -> Option<AnswerValue> {
        self.answers.get(question_id).map(|answer| answer.value)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.answers.values()
    }
}

impl FromIterator<Answer> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = Answer>>(iter: T) -> Self {
        let mut sheet = Self::new();
        for answer in iter {
            sheet.record(answer);
        }
        sheet
    }
}

/// Derived scoring summary for one chapter. Always recomputed from answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterResult {
    pub chapter_id: String,
    pub score: u32,
    pub max_score: u32,
    pub percentage: u8,
    pub completed_questions: usize,
    pub total_questions: usize,
}

impl ChapterResult {
    pub fn zeroed(chapter_id: impl Into<String>) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            score: 0,
            max_score: 0,
            percentage: 0,
            completed_questions: 0,
            total_questions: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total_questions > 0 && self.completed_questions == self.total_questions
    }
}

/// Aggregate across every chapter, computed from raw points rather than
/// from the chapter percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallResult {
    pub score: u32,
    pub max_score: u32,
    pub percentage: u8,
    pub completed_questions: usize,
    pub total_questions: usize,
}

/// Contact details captured before the report is generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(pub String);

impl AssessmentId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

/// Timestamp pair carried on persisted answer rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTimestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordTimestamps {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}
