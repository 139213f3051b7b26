use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{AppState, create_book, get_book, list_books, remove_book, update_book};

/// Creates the API router with all book endpoints
///
/// - GET /books - List books
/// - POST /books - Create a book
/// - GET /books/:id - Get a book
/// - PUT /books/:id, PATCH /books/:id - Update a book
/// - DELETE /books/:id - Remove a book
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book)
                .put(update_book)
                .patch(update_book)
                .delete(remove_book),
        )
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
