// src/models/package.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::i18n::{self, Lang};

/// Represents the 'packages' table: an admin-curated question set with a
/// fixed duration and passing threshold.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Package {
    pub id: i64,
    pub title_uzl: String,
    pub title_uzc: Option<String>,
    pub title_ru: Option<String>,
    pub duration_minutes: i64,
    /// Percentage threshold at or above which an attempt passes.
    pub passing_score: f64,
    /// Declared size of the set; a session start fails fast when the live
    /// association holds fewer questions.
    pub question_count: i64,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Localized package payload for listing endpoints.
#[derive(Debug, Serialize)]
pub struct PackageView {
    pub id: i64,
    pub title: String,
    pub duration_minutes: i64,
    pub passing_score: f64,
    pub question_count: i64,
}

impl Package {
    pub fn localize(&self, lang: Lang) -> PackageView {
        PackageView {
            id: self.id,
            title: i18n::pick(
                lang,
                &self.title_uzl,
                self.title_uzc.as_deref(),
                self.title_ru.as_deref(),
            )
            .to_string(),
            duration_minutes: self.duration_minutes,
            passing_score: self.passing_score,
            question_count: self.question_count,
        }
    }
}

/// DTO for creating a package together with its ordered question list.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePackageRequest {
    #[validate(length(min = 1, max = 200))]
    pub title_uzl: String,
    #[validate(length(max = 200))]
    pub title_uzc: Option<String>,
    #[validate(length(max = 200))]
    pub title_ru: Option<String>,
    #[validate(range(min = 1, max = 480))]
    pub duration_minutes: i64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub passing_score: Option<f64>,
    #[validate(length(min = 1, message = "A package needs at least one question."))]
    pub question_ids: Vec<i64>,
}

/// DTO for updating package metadata. Fields are optional; the question
/// association is replaced only when question_ids is present.
#[derive(Debug, Deserialize)]
pub struct UpdatePackageRequest {
    pub title_uzl: Option<String>,
    pub title_uzc: Option<String>,
    pub title_ru: Option<String>,
    pub duration_minutes: Option<i64>,
    pub passing_score: Option<f64>,
    pub question_ids: Option<Vec<i64>>,
    pub is_active: Option<bool>,
}
