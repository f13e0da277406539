//! People management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::person::{
        LoanedBook, Person, PersonDetails, PersonPayload, PersonQuery, PersonSearchQuery,
        PersonSummary,
    },
};

use super::books::PaginatedResponse;

/// List people with pagination and loan counts
#[utoipa::path(
    get,
    path = "/people",
    tag = "people",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("sort_by_name" = Option<bool>, Query, description = "Sort by full name")
    ),
    responses(
        (status = 200, description = "List of people", body = PaginatedResponse<PersonSummary>)
    )
)]
pub async fn list_people(
    State(state): State<crate::AppState>,
    Query(query): Query<PersonQuery>,
) -> AppResult<Json<PaginatedResponse<PersonSummary>>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(state.config.pagination.default_per_page)
        .max(1);

    let (items, total) = state
        .services
        .people
        .list_people(page, per_page, query.sort_by_name.unwrap_or(false))
        .await?;

    Ok(Json(PaginatedResponse::new(items, total, page, per_page)))
}

/// Get person details with their current loans
#[utoipa::path(
    get,
    path = "/people/{id}",
    tag = "people",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 200, description = "Person details", body = PersonDetails),
        (status = 404, description = "Person not found")
    )
)]
pub async fn get_person(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<PersonDetails>> {
    let person = state.services.people.get_person(id).await?;
    Ok(Json(person))
}

/// Books currently on loan to a person
#[utoipa::path(
    get,
    path = "/people/{id}/books",
    tag = "people",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 200, description = "Person's borrowed books", body = Vec<LoanedBook>),
        (status = 404, description = "Person not found")
    )
)]
pub async fn get_person_books(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<LoanedBook>>> {
    let books = state.services.people.person_books(id).await?;
    Ok(Json(books))
}

/// Create a new person
#[utoipa::path(
    post,
    path = "/people",
    tag = "people",
    request_body = PersonPayload,
    responses(
        (status = 201, description = "Person created", body = Person),
        (status = 400, description = "Invalid input or duplicate full name")
    )
)]
pub async fn create_person(
    State(state): State<crate::AppState>,
    Json(person): Json<PersonPayload>,
) -> AppResult<(StatusCode, Json<Person>)> {
    let created = state.services.people.create_person(person).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing person
#[utoipa::path(
    put,
    path = "/people/{id}",
    tag = "people",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    request_body = PersonPayload,
    responses(
        (status = 200, description = "Person updated", body = Person),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Person not found")
    )
)]
pub async fn update_person(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(person): Json<PersonPayload>,
) -> AppResult<Json<Person>> {
    let updated = state.services.people.update_person(id, person).await?;
    Ok(Json(updated))
}

/// Delete a person; their borrowed books return to the shelf
#[utoipa::path(
    delete,
    path = "/people/{id}",
    tag = "people",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 204, description = "Person deleted"),
        (status = 404, description = "Person not found")
    )
)]
pub async fn delete_person(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.people.delete_person(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Search people by name containment and/or exact year of birth
#[utoipa::path(
    get,
    path = "/people/search",
    tag = "people",
    params(
        ("name" = Option<String>, Query, description = "Name substring"),
        ("year" = Option<i32>, Query, description = "Exact year of birth")
    ),
    responses(
        (status = 200, description = "Matching people", body = Vec<Person>)
    )
)]
pub async fn search_people(
    State(state): State<crate::AppState>,
    Query(query): Query<PersonSearchQuery>,
) -> AppResult<Json<Vec<Person>>> {
    let people = state.services.people.search_people(query).await?;
    Ok(Json(people))
}
