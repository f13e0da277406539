//! People repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::loan_overdue,
        person::{LoanedBook, Person, PersonFilter, PersonPayload, PersonSummary},
    },
};

fn containing(s: &str) -> String {
    format!("%{}%", s)
}

#[derive(Clone)]
pub struct PeopleRepository {
    pool: Pool<Postgres>,
}

impl PeopleRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get person by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Person> {
        sqlx::query_as::<_, Person>("SELECT * FROM people WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Person with id {} not found", id)))
    }

    /// Find a person by exact full name (the uniqueness pre-check)
    pub async fn find_by_full_name(&self, full_name: &str) -> AppResult<Option<Person>> {
        let person = sqlx::query_as::<_, Person>("SELECT * FROM people WHERE full_name = $1")
            .bind(full_name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(person)
    }

    /// List people with pagination and loan counts, optionally sorted by name
    pub async fn list(
        &self,
        page: i64,
        per_page: i64,
        sort_by_name: bool,
    ) -> AppResult<(Vec<PersonSummary>, i64)> {
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM people")
            .fetch_one(&self.pool)
            .await?;

        let order = if sort_by_name { "p.full_name, p.id" } else { "p.id" };

        let select_query = format!(
            r#"
            SELECT p.id, p.full_name, p.year_of_birth,
                   (SELECT COUNT(*) FROM books b WHERE b.person_id = p.id) AS nb_books,
                   (SELECT COUNT(*) FROM books b WHERE b.person_id = p.id
                      AND b.taken_at < NOW() - INTERVAL '14 days') AS nb_overdue
            FROM people p
            ORDER BY {}
            LIMIT {} OFFSET {}
            "#,
            order, per_page, offset
        );

        let people = sqlx::query_as::<_, PersonSummary>(&select_query)
            .fetch_all(&self.pool)
            .await?;

        Ok((people, total))
    }

    /// Create a new person. The unique index on full_name is the
    /// authoritative duplicate check; a violation maps to the same
    /// field error the service pre-check produces.
    pub async fn create(&self, person: &PersonPayload) -> AppResult<Person> {
        let id = match sqlx::query_scalar::<_, i32>(
            "INSERT INTO people (full_name, year_of_birth) VALUES ($1, $2) RETURNING id",
        )
        .bind(&person.full_name)
        .bind(person.year_of_birth)
        .fetch_one(&self.pool)
        .await
        {
            Ok(id) => id,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(AppError::duplicate_full_name())
            }
            Err(e) => return Err(e.into()),
        };

        self.get_by_id(id).await
    }

    /// Update an existing person
    pub async fn update(&self, id: i32, person: &PersonPayload) -> AppResult<Person> {
        let result = match sqlx::query(
            "UPDATE people SET full_name = $1, year_of_birth = $2 WHERE id = $3",
        )
        .bind(&person.full_name)
        .bind(person.year_of_birth)
        .bind(id)
        .execute(&self.pool)
        .await
        {
            Ok(result) => result,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(AppError::duplicate_full_name())
            }
            Err(e) => return Err(e.into()),
        };

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Person with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a person, releasing their borrowed books in the same
    /// transaction so no book is left pointing at a missing borrower.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE books SET person_id = NULL, taken_at = NULL WHERE person_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM people WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Person with id {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Books currently on loan to a person, overdue flags recomputed
    pub async fn borrowed_books(&self, person_id: i32) -> AppResult<Vec<LoanedBook>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, author, year_of_production, taken_at
            FROM books
            WHERE person_id = $1 AND taken_at IS NOT NULL
            ORDER BY taken_at
            "#,
        )
        .bind(person_id)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();

        Ok(rows
            .iter()
            .map(|row| {
                let taken_at: DateTime<Utc> = row.get("taken_at");
                LoanedBook {
                    id: row.get("id"),
                    title: row.get("title"),
                    author: row.get("author"),
                    year_of_production: row.get("year_of_production"),
                    taken_at,
                    is_overdue: loan_overdue(taken_at, now),
                }
            })
            .collect())
    }

    /// Run exactly one of the search predicates picked by the filter.
    /// Name matching is by containment, not prefix.
    pub async fn search(&self, filter: &PersonFilter) -> AppResult<Vec<Person>> {
        let people = match filter {
            PersonFilter::Name(name) => {
                sqlx::query_as::<_, Person>(
                    "SELECT * FROM people WHERE full_name LIKE $1 ORDER BY id",
                )
                .bind(containing(name))
                .fetch_all(&self.pool)
                .await?
            }
            PersonFilter::Year(year) => {
                sqlx::query_as::<_, Person>(
                    "SELECT * FROM people WHERE year_of_birth = $1 ORDER BY id",
                )
                .bind(year)
                .fetch_all(&self.pool)
                .await?
            }
            PersonFilter::NameYear(name, year) => {
                sqlx::query_as::<_, Person>(
                    "SELECT * FROM people WHERE full_name LIKE $1 AND year_of_birth = $2 ORDER BY id",
                )
                .bind(containing(name))
                .bind(year)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(people)
    }
}
