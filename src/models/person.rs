//! Person (library patron) model and related types.
//!
//! A person's borrowed books are never stored on the person row; they are
//! recomputed by querying books whose `person_id` matches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Person model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Person {
    pub id: i32,
    pub full_name: String,
    pub year_of_birth: i32,
}

/// Minimal person reference embedded in book read models
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PersonRef {
    pub id: i32,
    pub full_name: String,
}

/// Person list row with loan counts
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PersonSummary {
    pub id: i32,
    pub full_name: String,
    pub year_of_birth: i32,
    pub nb_books: i64,
    pub nb_overdue: i64,
}

/// A book as seen from its borrower's page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanedBook {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub year_of_production: i32,
    pub taken_at: DateTime<Utc>,
    pub is_overdue: bool,
}

/// Person with their current loans resolved
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PersonDetails {
    pub id: i32,
    pub full_name: String,
    pub year_of_birth: i32,
    pub books: Vec<LoanedBook>,
}

/// Create/update person request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PersonPayload {
    #[validate(length(min = 5, max = 150, message = "Full name must be between 5 and 150 characters"))]
    pub full_name: String,
    #[validate(range(min = 1943, max = 2016, message = "Year of birth must be between 1943 and 2016"))]
    pub year_of_birth: i32,
}

/// Person listing query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct PersonQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub sort_by_name: Option<bool>,
}

/// Person search query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct PersonSearchQuery {
    pub name: Option<String>,
    pub year: Option<i32>,
}

/// Which search fields were supplied, resolved to exactly one predicate.
/// Name matches by containment (unlike book title/author prefix matching),
/// year of birth by equality. Returns `None` when no field is given; the
/// caller answers with an empty result without touching the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonFilter {
    Name(String),
    Year(i32),
    NameYear(String, i32),
}

impl PersonFilter {
    pub fn from_query(name: Option<String>, year: Option<i32>) -> Option<Self> {
        match (name, year) {
            (None, None) => None,
            (Some(n), None) => Some(PersonFilter::Name(n)),
            (None, Some(y)) => Some(PersonFilter::Year(y)),
            (Some(n), Some(y)) => Some(PersonFilter::NameYear(n, y)),
        }
    }
}
