//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, people};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblioteka API",
        version = "0.1.0",
        description = "Library Catalog Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::assign_book,
        books::release_book,
        books::extend_loan,
        books::search_books,
        // People
        people::list_people,
        people::get_person,
        people::get_person_books,
        people::create_person,
        people::update_person,
        people::delete_person,
        people::search_people,
    ),
    components(
        schemas(
            // Books
            crate::models::book::BookDetails,
            crate::models::book::BookPayload,
            books::AssignBookRequest,
            // People
            crate::models::person::Person,
            crate::models::person::PersonRef,
            crate::models::person::PersonSummary,
            crate::models::person::PersonDetails,
            crate::models::person::PersonPayload,
            crate::models::person::LoanedBook,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog and loan lifecycle"),
        (name = "people", description = "Library patron management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
