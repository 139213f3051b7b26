mod book_service;
mod errors;

pub use book_service::{
    ServiceDependencies, create_book, get_book, list_books, remove_book, update_book,
};
pub use errors::{BookApplicationError, Result};
