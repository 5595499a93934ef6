//! Book model and request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book record as persisted in the books collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i32,
    /// Id of the user who created the book; only the owner may mutate it
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    /// Absent until the first update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "Genre is required"))]
    pub genre: String,
    pub published_year: i32,
}

/// Partial update request.
///
/// Unset fields leave the stored value untouched; this is the explicit
/// counterpart of a merge by field presence, so `publishedYear: 0` is a
/// real update, not a no-op.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
}

impl UpdateBook {
    /// Merge the provided fields into an existing record and stamp `updated_at`
    pub fn apply_to(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(genre) = self.genre {
            book.genre = genre;
        }
        if let Some(year) = self.published_year {
            book.published_year = year;
        }
        book.updated_at = Some(Utc::now());
    }
}

/// Book list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Case-insensitive substring filter on genre
    pub genre: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
