//! Book catalog and loan lifecycle service

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{BookDetails, BookFilter, BookPayload, BookSearchQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books with pagination, optionally sorted by year of production
    pub async fn list_books(
        &self,
        page: i64,
        per_page: i64,
        sort_by_year: bool,
    ) -> AppResult<(Vec<BookDetails>, i64)> {
        self.repository.books.list(page, per_page, sort_by_year).await
    }

    /// Get a single book with its borrower and overdue state
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book
    pub async fn create_book(&self, book: BookPayload) -> AppResult<BookDetails> {
        book.validate()?;

        let created = self.repository.books.create(&book).await?;
        tracing::info!("Book '{}' created with id {}", created.title, created.id);
        Ok(created)
    }

    /// Update a book's bibliographic fields. An active loan on the stored
    /// record survives the update; the payload cannot touch it.
    pub async fn update_book(&self, id: i32, book: BookPayload) -> AppResult<BookDetails> {
        book.validate()?;

        let updated = self.repository.books.update(id, &book).await?;
        tracing::info!("Book with id {} updated", id);
        Ok(updated)
    }

    /// Delete a book. Its borrower, if any, is untouched.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Book with id {} deleted", id);
        Ok(())
    }

    /// Assign a book to a person, starting a loan now
    pub async fn assign_book(&self, book_id: i32, person_id: i32) -> AppResult<BookDetails> {
        // Verify person exists
        self.repository.people.get_by_id(person_id).await?;
        self.repository.books.assign(book_id, person_id).await?;

        tracing::info!("Book with id {} assigned to person with id {}", book_id, person_id);
        self.repository.books.get_by_id(book_id).await
    }

    /// Release a book back to the shelf
    pub async fn release_book(&self, book_id: i32) -> AppResult<BookDetails> {
        self.repository.books.release(book_id).await?;

        tracing::info!("Book with id {} released", book_id);
        self.repository.books.get_by_id(book_id).await
    }

    /// Extend a loan: the loan start is reset to now, borrower unchanged
    pub async fn extend_loan(&self, book_id: i32) -> AppResult<BookDetails> {
        self.repository.books.extend(book_id).await?;

        tracing::info!("Loan extended for book with id {}", book_id);
        self.repository.books.get_by_id(book_id).await
    }

    /// Search books by any combination of title, author and year.
    /// All fields absent resolves to an empty result, not an error.
    pub async fn search_books(&self, query: BookSearchQuery) -> AppResult<Vec<BookDetails>> {
        let filter = BookFilter::from_query(query.title, query.author, query.year);
        self.repository.books.search(&filter).await
    }
}
