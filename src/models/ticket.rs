// src/models/ticket.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'tickets' table: a fixed-form numbered question bundle
/// assembled at authoring time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    /// Global ticket number shown to learners.
    pub number: i64,
    pub duration_minutes: i64,
    pub passing_score: f64,
    pub is_active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Ticket payload for listing endpoints (nothing to localize).
#[derive(Debug, Serialize)]
pub struct TicketView {
    pub id: i64,
    pub number: i64,
    pub duration_minutes: i64,
    pub passing_score: f64,
    pub question_count: i64,
}

/// DTO for creating a ticket with its ordered question list.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(range(min = 1))]
    pub number: i64,
    #[validate(range(min = 1, max = 120))]
    pub duration_minutes: Option<i64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub passing_score: Option<f64>,
    pub question_ids: Vec<i64>,
}
