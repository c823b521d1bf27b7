// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Lifecycle of an exam session. Transitions are monotonic:
/// NotStarted -> InProgress -> {Completed | Expired | Abandoned};
/// nothing ever moves back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Completed,
    Expired,
    Abandoned,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::NotStarted => "not_started",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Expired => "expired",
            SessionStatus::Abandoned => "abandoned",
        }
    }

    /// Falls back to the closest safe reading for an unknown column value:
    /// a row we cannot classify must never look mutable.
    pub fn parse(value: &str) -> SessionStatus {
        match value {
            "not_started" => SessionStatus::NotStarted,
            "in_progress" => SessionStatus::InProgress,
            "completed" => SessionStatus::Completed,
            "expired" => SessionStatus::Expired,
            _ => SessionStatus::Abandoned,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Expired | SessionStatus::Abandoned
        )
    }

    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        match (self, next) {
            (SessionStatus::NotStarted, SessionStatus::InProgress) => true,
            (SessionStatus::InProgress, n) if n.is_terminal() => true,
            _ => false,
        }
    }
}

/// Question disclosure mode, orthogonal to the session source. Controls only
/// what the initial payload renders; storage and grading are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisclosureMode {
    /// Practice: correct indices and explanations are shown up front.
    Visible,
    /// Exam simulation: nothing is disclosed until the session is terminal.
    Secure,
}

impl DisclosureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisclosureMode::Visible => "visible",
            DisclosureMode::Secure => "secure",
        }
    }

    pub fn parse(value: &str) -> DisclosureMode {
        match value {
            "visible" => DisclosureMode::Visible,
            _ => DisclosureMode::Secure,
        }
    }
}

/// Represents the 'exam_sessions' table: one exam attempt.
/// Rows are never deleted; terminal rows feed statistics.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExamSession {
    pub id: i64,
    pub user_id: i64,

    /// 'package', 'marathon' or 'ticket'. Immutable after creation.
    pub source: String,
    pub package_id: Option<i64>,
    pub ticket_id: Option<i64>,

    pub status: String,
    pub mode: String,

    /// Display language captured at start time. Rendering only.
    pub language: String,

    pub total_questions: i64,
    pub duration_minutes: i64,
    pub passing_score: f64,

    // All null until the single grading event.
    pub answered_count: Option<i64>,
    pub correct_count: Option<i64>,
    pub wrong_count: Option<i64>,
    pub score: Option<i64>,
    pub percentage: Option<f64>,
    pub is_passed: Option<bool>,

    pub started_at: DateTime<Utc>,
    /// started_at + duration_minutes, computed once and never recomputed.
    pub expires_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ExamSession {
    pub fn status(&self) -> SessionStatus {
        SessionStatus::parse(&self.status)
    }

    pub fn mode(&self) -> DisclosureMode {
        DisclosureMode::parse(&self.mode)
    }

    /// Pure deadline check. An in-progress session observed past its
    /// deadline must be treated exactly like a terminal one by every
    /// mutation path, whether or not the sweeper has caught up.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Represents the 'answer_records' table: one question slot in a session.
/// The full set is created atomically with the session and its length always
/// equals total_questions.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnswerRecord {
    pub id: i64,
    pub session_id: i64,
    pub question_id: i64,

    /// 1..total_questions; defines display and grading order.
    pub question_order: i64,

    /// Snapshotted from the pool when the session was created. Write-once:
    /// later edits or deletion of the source question never reach it.
    pub correct_option_index: i64,

    /// Null means unanswered.
    pub selected_option_index: Option<i64>,

    /// Null until the grading event.
    pub is_correct: Option<bool>,

    pub answered_at: Option<DateTime<Utc>>,
    pub time_spent_seconds: Option<i64>,
}

/// Outcome of grading a full record set.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    /// is_correct per record, index-aligned with the input slice.
    pub per_record: Vec<bool>,
    pub answered_count: i64,
    pub correct_count: i64,
    pub wrong_count: i64,
    pub score: i64,
    pub percentage: f64,
    pub is_passed: bool,
}

/// Grades a session's records against the snapshot indices.
///
/// An unanswered question is neither correct nor wrong; it lowers the
/// percentage only through the fixed total_questions denominator.
pub fn grade(records: &[AnswerRecord], passing_score: f64) -> GradeOutcome {
    let total_questions = records.len() as i64;

    let per_record: Vec<bool> = records
        .iter()
        .map(|r| r.selected_option_index == Some(r.correct_option_index))
        .collect();

    let answered_count = records
        .iter()
        .filter(|r| r.selected_option_index.is_some())
        .count() as i64;
    let correct_count = per_record.iter().filter(|c| **c).count() as i64;
    let wrong_count = answered_count - correct_count;

    let percentage = if total_questions == 0 {
        0.0
    } else {
        correct_count as f64 / total_questions as f64 * 100.0
    };

    GradeOutcome {
        per_record,
        answered_count,
        correct_count,
        wrong_count,
        score: correct_count,
        percentage,
        is_passed: percentage >= passing_score,
    }
}

/// One auto-save/submit entry addressing a question slot by question id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question_id: i64,
    /// Null clears the slot back to unanswered (last-write-wins, no merge).
    pub selected_option_index: Option<i64>,
    pub time_spent_seconds: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AutoSaveRequest {
    #[validate(length(min = 1, message = "At least one answer entry is required."))]
    pub answers: Vec<AnswerEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    /// Optional final batch, applied before grading with auto-save semantics.
    #[serde(default)]
    pub answers: Vec<AnswerEntry>,
}

/// One question as rendered into a running session.
/// correct_option_index/explanation stay None unless the session mode is
/// 'visible'.
#[derive(Debug, Serialize)]
pub struct SessionQuestionView {
    pub question_id: i64,
    pub question_order: i64,
    pub content: String,
    pub options: Vec<String>,
    pub image_url: Option<String>,
    pub selected_option_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A running (or resumable) session with its localized question payloads.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: i64,
    pub source: String,
    pub package_id: Option<i64>,
    pub ticket_id: Option<i64>,
    pub status: String,
    pub mode: String,
    pub language: String,
    pub total_questions: i64,
    pub duration_minutes: i64,
    pub passing_score: f64,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub questions: Vec<SessionQuestionView>,
}

/// Per-question breakdown of a terminal session. Always fully disclosed.
#[derive(Debug, Serialize)]
pub struct ResultQuestionView {
    pub question_id: i64,
    pub question_order: i64,
    pub content: String,
    pub options: Vec<String>,
    pub image_url: Option<String>,
    pub selected_option_index: Option<i64>,
    pub correct_option_index: i64,
    pub is_correct: Option<bool>,
    pub explanation: Option<String>,
}

/// Graded outcome of a terminal session.
#[derive(Debug, Serialize)]
pub struct ResultView {
    pub session_id: i64,
    pub source: String,
    pub status: String,
    pub total_questions: i64,
    pub answered_count: Option<i64>,
    pub correct_count: Option<i64>,
    pub wrong_count: Option<i64>,
    pub score: Option<i64>,
    pub percentage: Option<f64>,
    pub is_passed: Option<bool>,
    pub passing_score: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// finished_at - started_at, in whole seconds.
    pub duration_seconds: Option<i64>,
    pub questions: Vec<ResultQuestionView>,
}
