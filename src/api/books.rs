//! Book catalog and loan endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{BookDetails, BookPayload, BookQuery, BookSearchQuery},
};

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of records
    pub total: i64,
    /// Total number of pages at the current page size
    pub total_pages: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, total: i64, page: i64, per_page: i64) -> Self {
        Self {
            items,
            total,
            total_pages: (total + per_page - 1) / per_page,
            page,
            per_page,
        }
    }
}

/// Assign request body
#[derive(Deserialize, ToSchema)]
pub struct AssignBookRequest {
    /// Person borrowing the book
    pub person_id: i32,
}

/// List books with pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("sort_by_year" = Option<bool>, Query, description = "Sort by year of production")
    ),
    responses(
        (status = 200, description = "List of books", body = PaginatedResponse<BookDetails>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<BookDetails>>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(state.config.pagination.default_per_page)
        .max(1);

    let (items, total) = state
        .services
        .books
        .list_books(page, per_page, query.sort_by_year.unwrap_or(false))
        .await?;

    Ok(Json(PaginatedResponse::new(items, total, page, per_page)))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookDetails),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(book): Json<BookPayload>,
) -> AppResult<(StatusCode, Json<BookDetails>)> {
    let created = state.services.books.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing book. A loan on the stored record survives the update.
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = BookDetails),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(book): Json<BookPayload>,
) -> AppResult<Json<BookDetails>> {
    let updated = state.services.books.update_book(id, book).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.books.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assign a book to a person (start a loan)
#[utoipa::path(
    post,
    path = "/books/{id}/assign",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = AssignBookRequest,
    responses(
        (status = 200, description = "Book assigned", body = BookDetails),
        (status = 404, description = "Book or person not found"),
        (status = 409, description = "Book is already on loan")
    )
)]
pub async fn assign_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AssignBookRequest>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.assign_book(id, request.person_id).await?;
    Ok(Json(book))
}

/// Release a book back to the shelf
#[utoipa::path(
    post,
    path = "/books/{id}/release",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book released", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn release_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.release_book(id).await?;
    Ok(Json(book))
}

/// Extend a loan: reset the loan start date to now
#[utoipa::path(
    post,
    path = "/books/{id}/extend",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Loan extended", body = BookDetails),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book is not on loan")
    )
)]
pub async fn extend_loan(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.extend_loan(id).await?;
    Ok(Json(book))
}

/// Search books by title prefix, author prefix and/or exact year
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(
        ("title" = Option<String>, Query, description = "Title prefix"),
        ("author" = Option<String>, Query, description = "Author prefix"),
        ("year" = Option<i32>, Query, description = "Exact year of production")
    ),
    responses(
        (status = 200, description = "Matching books", body = Vec<BookDetails>)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookSearchQuery>,
) -> AppResult<Json<Vec<BookDetails>>> {
    let books = state.services.books.search_books(query).await?;
    Ok(Json(books))
}
