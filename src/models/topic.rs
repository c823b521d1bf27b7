// src/models/topic.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::i18n::{self, Lang};

/// Represents the 'topics' table: a thematic group of questions.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub name_uzl: String,
    pub name_uzc: Option<String>,
    pub name_ru: Option<String>,
    pub position: i64,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Localized topic payload for listing endpoints.
#[derive(Debug, Serialize)]
pub struct TopicView {
    pub id: i64,
    pub name: String,
    pub position: i64,
}

impl Topic {
    pub fn localize(&self, lang: Lang) -> TopicView {
        TopicView {
            id: self.id,
            name: i18n::pick(
                lang,
                &self.name_uzl,
                self.name_uzc.as_deref(),
                self.name_ru.as_deref(),
            )
            .to_string(),
            position: self.position,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTopicRequest {
    #[validate(length(min = 1, max = 200))]
    pub name_uzl: String,
    #[validate(length(max = 200))]
    pub name_uzc: Option<String>,
    #[validate(length(max = 200))]
    pub name_ru: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTopicRequest {
    pub name_uzl: Option<String>,
    pub name_uzc: Option<String>,
    pub name_ru: Option<String>,
    pub position: Option<i64>,
    pub is_active: Option<bool>,
}
