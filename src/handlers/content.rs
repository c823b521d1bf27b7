// src/handlers/content.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        package::{Package, PackageView},
        ticket::{Ticket, TicketView},
        topic::{Topic, TopicView},
    },
    utils::i18n::Lang,
};

/// Query parameters for the listing endpoints.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub lang: Option<String>,
}

/// Lists active topics, localized. Rendering only; the engine never reads
/// topic names.
pub async fn list_topics(
    State(pool): State<SqlitePool>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let lang = Lang::parse(params.lang.as_deref().unwrap_or("uzl"));

    let topics = sqlx::query_as::<_, Topic>(
        "SELECT * FROM topics WHERE is_active = 1 AND is_deleted = 0 ORDER BY position, id",
    )
    .fetch_all(&pool)
    .await?;

    let views: Vec<TopicView> = topics.iter().map(|t| t.localize(lang)).collect();
    Ok(Json(views))
}

/// Lists active packages, localized.
pub async fn list_packages(
    State(pool): State<SqlitePool>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let lang = Lang::parse(params.lang.as_deref().unwrap_or("uzl"));

    let packages = sqlx::query_as::<_, Package>(
        "SELECT * FROM packages WHERE is_active = 1 AND is_deleted = 0 ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    let views: Vec<PackageView> = packages.iter().map(|p| p.localize(lang)).collect();
    Ok(Json(views))
}

/// Lists active tickets with their live question counts.
pub async fn list_tickets(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let tickets =
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE is_active = 1 ORDER BY number")
            .fetch_all(&pool)
            .await?;

    let mut views = Vec::with_capacity(tickets.len());
    for ticket in &tickets {
        let question_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ticket_questions WHERE ticket_id = ?",
        )
        .bind(ticket.id)
        .fetch_one(&pool)
        .await?;

        views.push(TicketView {
            id: ticket.id,
            number: ticket.number,
            duration_minutes: ticket.duration_minutes,
            passing_score: ticket.passing_score,
            question_count,
        });
    }

    Ok(Json(views))
}
