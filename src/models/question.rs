// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::utils::i18n::{self, Lang};

/// Represents the 'questions' table in the database.
/// Text exists in the base language (UZL) with optional UZC/RU translations;
/// the option lists are index-aligned across languages so the correct index
/// is language-independent.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub topic_id: i64,

    pub content_uzl: String,
    pub content_uzc: Option<String>,
    pub content_ru: Option<String>,

    /// List of option texts (e.g., ["Option A", "Option B"]).
    /// Stored as a JSON array in the database.
    pub options_uzl: Json<Vec<String>>,
    pub options_uzc: Option<Json<Vec<String>>>,
    pub options_ru: Option<Json<Vec<String>>>,

    /// Index of the currently-correct option. The engine snapshots this at
    /// session creation and never reads it again for a running session.
    pub correct_option_index: i64,

    /// Explanation shown in visible mode and in every result view.
    pub explanation_uzl: Option<String>,
    pub explanation_uzc: Option<String>,
    pub explanation_ru: Option<String>,

    pub image_url: Option<String>,

    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Question {
    pub fn content(&self, lang: Lang) -> &str {
        i18n::pick(
            lang,
            &self.content_uzl,
            self.content_uzc.as_deref(),
            self.content_ru.as_deref(),
        )
    }

    /// Localized option list; a language whose translation is missing or
    /// length-mismatched falls back to the base list wholesale.
    pub fn options(&self, lang: Lang) -> &[String] {
        let base = &self.options_uzl.0;
        let localized = match lang {
            Lang::Uzl => None,
            Lang::Uzc => self.options_uzc.as_ref(),
            Lang::Ru => self.options_ru.as_ref(),
        };
        match localized {
            Some(list) if list.0.len() == base.len() => &list.0,
            _ => base,
        }
    }

    pub fn explanation(&self, lang: Lang) -> Option<&str> {
        i18n::pick_opt(
            lang,
            self.explanation_uzl.as_deref(),
            self.explanation_uzc.as_deref(),
            self.explanation_ru.as_deref(),
        )
    }
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    pub topic_id: i64,
    #[validate(length(min = 1, max = 2000))]
    pub content_uzl: String,
    #[validate(length(max = 2000))]
    pub content_uzc: Option<String>,
    #[validate(length(max = 2000))]
    pub content_ru: Option<String>,
    #[validate(custom(function = validate_options))]
    pub options_uzl: Vec<String>,
    pub options_uzc: Option<Vec<String>>,
    pub options_ru: Option<Vec<String>>,
    pub correct_option_index: i64,
    #[validate(length(max = 4000))]
    pub explanation_uzl: Option<String>,
    #[validate(length(max = 4000))]
    pub explanation_uzc: Option<String>,
    #[validate(length(max = 4000))]
    pub explanation_ru: Option<String>,
    pub image_url: Option<String>,
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub topic_id: Option<i64>,
    pub content_uzl: Option<String>,
    pub content_uzc: Option<String>,
    pub content_ru: Option<String>,
    pub options_uzl: Option<Vec<String>>,
    pub options_uzc: Option<Vec<String>>,
    pub options_ru: Option<Vec<String>>,
    pub correct_option_index: Option<i64>,
    pub explanation_uzl: Option<String>,
    pub explanation_uzc: Option<String>,
    pub explanation_ru: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() < 2 {
        return Err(validator::ValidationError::new("at_least_two_options"));
    }
    for opt in options {
        if opt.is_empty() || opt.len() > 500 {
            return Err(validator::ValidationError::new("option_length"));
        }
    }
    Ok(())
}
