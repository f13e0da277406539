//! Book model and related types.
//!
//! A book is either on the shelf (`person_id` and `taken_at` both NULL) or on
//! loan (both set). The overdue flag is never stored; it is recomputed from
//! `taken_at` on every read path that exposes a book.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::person::PersonRef;

/// Loan period after which a loan counts as overdue: 14 days in milliseconds.
pub const LOAN_PERIOD_MS: i64 = 1_209_600_000;

/// True iff a loan started at `taken_at` is overdue at `now`.
pub fn loan_overdue(taken_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    (now - taken_at).num_milliseconds().abs() > LOAN_PERIOD_MS
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub year_of_production: i32,
    pub person_id: Option<i32>,
    pub taken_at: Option<DateTime<Utc>>,
}

impl Book {
    /// A book with no borrower is never overdue.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.taken_at {
            Some(taken_at) => loan_overdue(taken_at, now),
            None => false,
        }
    }
}

/// Book with loan state resolved for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub year_of_production: i32,
    pub taken_at: Option<DateTime<Utc>>,
    pub is_overdue: bool,
    pub borrower: Option<PersonRef>,
}

impl BookDetails {
    pub fn new(book: Book, borrower: Option<PersonRef>, now: DateTime<Utc>) -> Self {
        let is_overdue = book.is_overdue_at(now);
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            year_of_production: book.year_of_production,
            taken_at: book.taken_at,
            is_overdue,
            borrower,
        }
    }
}

/// Create/update book request. Loan state is not writable through this
/// payload; assign/release/extend are the only operations that touch it.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookPayload {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "A book must have an author"))]
    pub author: String,
    #[validate(range(min = 1950, max = 2024, message = "Year of production must be between 1950 and 2024"))]
    pub year_of_production: i32,
}

/// Book listing query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub sort_by_year: Option<bool>,
}

/// Book search query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookSearchQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
}

/// Which search fields were supplied, resolved to exactly one predicate.
/// Title and author match by prefix, year by equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    None,
    Title(String),
    Author(String),
    Year(i32),
    TitleAuthor(String, String),
    TitleYear(String, i32),
    AuthorYear(String, i32),
    TitleAuthorYear(String, String, i32),
}

impl BookFilter {
    pub fn from_query(
        title: Option<String>,
        author: Option<String>,
        year: Option<i32>,
    ) -> Self {
        match (title, author, year) {
            (None, None, None) => BookFilter::None,
            (Some(t), None, None) => BookFilter::Title(t),
            (None, Some(a), None) => BookFilter::Author(a),
            (None, None, Some(y)) => BookFilter::Year(y),
            (Some(t), Some(a), None) => BookFilter::TitleAuthor(t, a),
            (Some(t), None, Some(y)) => BookFilter::TitleYear(t, y),
            (None, Some(a), Some(y)) => BookFilter::AuthorYear(a, y),
            (Some(t), Some(a), Some(y)) => BookFilter::TitleAuthorYear(t, a, y),
        }
    }
}
