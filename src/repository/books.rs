//! Books repository for database operations.
//!
//! Loan state lives on the book row (`person_id`, `taken_at`); every write
//! path changes both columns in a single statement so the pair stays
//! consistent. Overdue flags are computed here at read time, never stored.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookDetails, BookFilter, BookPayload},
        person::PersonRef,
    },
};

const SELECT_WITH_BORROWER: &str = r#"
    SELECT b.id, b.title, b.author, b.year_of_production, b.person_id, b.taken_at,
           p.full_name AS borrower_name
    FROM books b
    LEFT JOIN people p ON p.id = b.person_id
"#;

fn row_to_details(row: &PgRow, now: DateTime<Utc>) -> BookDetails {
    let book = Book {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        year_of_production: row.get("year_of_production"),
        person_id: row.get("person_id"),
        taken_at: row.get("taken_at"),
    };
    let borrower = match (book.person_id, row.get::<Option<String>, _>("borrower_name")) {
        (Some(id), Some(full_name)) => Some(PersonRef { id, full_name }),
        _ => None,
    };
    BookDetails::new(book, borrower, now)
}

fn prefix(s: &str) -> String {
    format!("{}%", s)
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID with borrower resolved
    pub async fn get_by_id(&self, id: i32) -> AppResult<BookDetails> {
        let row = sqlx::query(&format!("{SELECT_WITH_BORROWER} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(row_to_details(&row, Utc::now()))
    }

    /// List books with pagination, optionally sorted by year of production
    pub async fn list(
        &self,
        page: i64,
        per_page: i64,
        sort_by_year: bool,
    ) -> AppResult<(Vec<BookDetails>, i64)> {
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let order = if sort_by_year {
            "b.year_of_production, b.id"
        } else {
            "b.id"
        };

        let select_query = format!(
            "{SELECT_WITH_BORROWER} ORDER BY {} LIMIT {} OFFSET {}",
            order, per_page, offset
        );

        let rows = sqlx::query(&select_query).fetch_all(&self.pool).await?;

        let now = Utc::now();
        Ok((rows.iter().map(|r| row_to_details(r, now)).collect(), total))
    }

    /// Create a new book (on the shelf, no borrower)
    pub async fn create(&self, book: &BookPayload) -> AppResult<BookDetails> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (title, author, year_of_production)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.year_of_production)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update a book's bibliographic fields. The loan columns are not named
    /// in the statement, so an active loan survives the update untouched.
    pub async fn update(&self, id: i32, book: &BookPayload) -> AppResult<BookDetails> {
        let result = sqlx::query(
            "UPDATE books SET title = $1, author = $2, year_of_production = $3 WHERE id = $4",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.year_of_production)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a book. The borrower person record, if any, is left alone.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Assign a book to a person, starting a loan now. The borrowed check and
    /// the write are one conditional statement; a book already on loan is
    /// rejected rather than silently re-assigned.
    pub async fn assign(&self, book_id: i32, person_id: i32) -> AppResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE books SET person_id = $1, taken_at = $2 WHERE id = $3 AND person_id IS NULL",
        )
        .bind(person_id)
        .bind(now)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current: Option<Option<i32>> =
                sqlx::query_scalar("SELECT person_id FROM books WHERE id = $1")
                    .bind(book_id)
                    .fetch_optional(&self.pool)
                    .await?;

            return match current {
                None => Err(AppError::NotFound(format!(
                    "Book with id {} not found",
                    book_id
                ))),
                Some(_) => Err(AppError::Conflict(
                    "Book is already on loan; release it first".to_string(),
                )),
            };
        }

        Ok(())
    }

    /// Release a book: clear borrower and loan start together. Releasing a
    /// book that is already on the shelf is an idempotent no-op.
    pub async fn release(&self, book_id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE books SET person_id = NULL, taken_at = NULL WHERE id = $1",
        )
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }

        Ok(())
    }

    /// Extend a loan: reset the loan start to now, borrower unchanged.
    pub async fn extend(&self, book_id: i32) -> AppResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE books SET taken_at = $1 WHERE id = $2 AND person_id IS NOT NULL",
        )
        .bind(now)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                    .bind(book_id)
                    .fetch_one(&self.pool)
                    .await?;

            return if exists {
                Err(AppError::BusinessRule(
                    "Book is not on loan; nothing to extend".to_string(),
                ))
            } else {
                Err(AppError::NotFound(format!(
                    "Book with id {} not found",
                    book_id
                )))
            };
        }

        Ok(())
    }

    /// Run exactly one of the search predicates picked by the filter.
    pub async fn search(&self, filter: &BookFilter) -> AppResult<Vec<BookDetails>> {
        let rows = match filter {
            BookFilter::None => Vec::new(),
            BookFilter::Title(title) => {
                sqlx::query(&format!(
                    "{SELECT_WITH_BORROWER} WHERE b.title LIKE $1 ORDER BY b.id"
                ))
                .bind(prefix(title))
                .fetch_all(&self.pool)
                .await?
            }
            BookFilter::Author(author) => {
                sqlx::query(&format!(
                    "{SELECT_WITH_BORROWER} WHERE b.author LIKE $1 ORDER BY b.id"
                ))
                .bind(prefix(author))
                .fetch_all(&self.pool)
                .await?
            }
            BookFilter::Year(year) => {
                sqlx::query(&format!(
                    "{SELECT_WITH_BORROWER} WHERE b.year_of_production = $1 ORDER BY b.id"
                ))
                .bind(year)
                .fetch_all(&self.pool)
                .await?
            }
            BookFilter::TitleAuthor(title, author) => {
                sqlx::query(&format!(
                    "{SELECT_WITH_BORROWER} WHERE b.title LIKE $1 AND b.author LIKE $2 ORDER BY b.id"
                ))
                .bind(prefix(title))
                .bind(prefix(author))
                .fetch_all(&self.pool)
                .await?
            }
            BookFilter::TitleYear(title, year) => {
                sqlx::query(&format!(
                    "{SELECT_WITH_BORROWER} WHERE b.title LIKE $1 AND b.year_of_production = $2 ORDER BY b.id"
                ))
                .bind(prefix(title))
                .bind(year)
                .fetch_all(&self.pool)
                .await?
            }
            BookFilter::AuthorYear(author, year) => {
                sqlx::query(&format!(
                    "{SELECT_WITH_BORROWER} WHERE b.author LIKE $1 AND b.year_of_production = $2 ORDER BY b.id"
                ))
                .bind(prefix(author))
                .bind(year)
                .fetch_all(&self.pool)
                .await?
            }
            BookFilter::TitleAuthorYear(title, author, year) => {
                sqlx::query(&format!(
                    "{SELECT_WITH_BORROWER} WHERE b.title LIKE $1 AND b.author LIKE $2 AND b.year_of_production = $3 ORDER BY b.id"
                ))
                .bind(prefix(title))
                .bind(prefix(author))
                .bind(year)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let now = Utc::now();
        Ok(rows.iter().map(|r| row_to_details(r, now)).collect())
    }
}
