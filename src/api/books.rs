//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

use super::AuthenticatedUser;

/// Pagination metadata, present only when `page` and `limit` are both given
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_books: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Serialize, ToSchema)]
pub struct BookListResponse {
    pub books: Vec<Book>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Serialize, ToSchema)]
pub struct BookResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub book: Book,
}

/// List books, optionally filtered by genre and paginated
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = BookListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<BookListResponse>> {
    let books = state.services.books.list(query.genre.as_deref()).await?;

    if let (Some(page), Some(limit)) = (query.page, query.limit) {
        return Ok(Json(paginate(books, page, limit)));
    }

    Ok(Json(BookListResponse { books, pagination: None }))
}

/// Slice a full result set into one page with metadata.
///
/// `page` and `limit` come straight from the query string, so the
/// arithmetic saturates: a page past the end degrades to an empty page
/// rather than overflowing.
fn paginate(books: Vec<Book>, page: i64, limit: i64) -> BookListResponse {
    let page = page.max(1);
    let limit = limit.max(1);
    let total_books = books.len() as i64;
    let total_pages = if total_books == 0 {
        0
    } else {
        (total_books - 1) / limit + 1
    };

    let start = usize::try_from((page - 1).saturating_mul(limit)).unwrap_or(usize::MAX);
    let per_page = usize::try_from(limit).unwrap_or(usize::MAX);
    let slice = if start < books.len() {
        let end = start.saturating_add(per_page).min(books.len());
        books[start..end].to_vec()
    } else {
        Vec::new()
    };

    BookListResponse {
        books: slice,
        pagination: Some(Pagination {
            current_page: page,
            total_pages,
            total_books,
            has_next: page.saturating_mul(limit) < total_books,
            has_prev: page > 1,
        }),
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    pub genre: Option<String>,
}

/// Search books by genre substring
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching books", body = BookListResponse),
        (status = 400, description = "Genre parameter missing"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<BookListResponse>> {
    let genre = query
        .genre
        .ok_or_else(|| AppError::Validation("Genre is required".to_string()))?;

    let books = state.services.books.list(Some(&genre)).await?;
    Ok(Json(BookListResponse { books, pagination: None }))
}

/// Get a book by id
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.books.get(&id).await?;
    Ok(Json(BookResponse { message: None, book }))
}

/// Create a book owned by the authenticated user
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid book data"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let book = state.services.books.create(&user.id, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookResponse {
            message: Some("Book created".to_string()),
            book,
        }),
    ))
}

/// Update a book (owner only); unset fields keep their stored values
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateBook>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.books.update(&user.id, &id, body).await?;
    Ok(Json(BookResponse {
        message: Some("Book updated".to_string()),
        book,
    }))
}

/// Delete a book (owner only), returning the deleted record
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = BookResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.books.delete(&user.id, &id).await?;
    Ok(Json(BookResponse {
        message: Some("Book deleted".to_string()),
        book,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_books(n: usize) -> Vec<Book> {
        (0..n)
            .map(|i| Book {
                id: format!("b{}", i),
                title: format!("Title {}", i),
                author: "Au".to_string(),
                genre: "Fiction".to_string(),
                published_year: 2020,
                owner_id: "user-a".to_string(),
                created_at: Utc::now(),
                updated_at: None,
            })
            .collect()
    }

    #[test]
    fn paginate_splits_pages_and_reports_metadata() {
        let first = paginate(sample_books(3), 1, 2);
        assert_eq!(first.books.len(), 2);
        let meta = first.pagination.unwrap();
        assert_eq!(meta.current_page, 1);
        assert_eq!(meta.total_pages, 2);
        assert_eq!(meta.total_books, 3);
        assert!(meta.has_next);
        assert!(!meta.has_prev);

        let second = paginate(sample_books(3), 2, 2);
        assert_eq!(second.books.len(), 1);
        let meta = second.pagination.unwrap();
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn paginate_clamps_non_positive_page_and_limit() {
        let result = paginate(sample_books(2), 0, -5);
        assert_eq!(result.books.len(), 1);
        let meta = result.pagination.unwrap();
        assert_eq!(meta.current_page, 1);
        assert_eq!(meta.total_pages, 2);
    }

    #[test]
    fn paginate_saturates_on_huge_page_and_limit() {
        // i64::MAX * 2 would overflow; an out-of-range page must come back empty
        let result = paginate(sample_books(3), i64::MAX, 2);
        assert!(result.books.is_empty());
        let meta = result.pagination.unwrap();
        assert_eq!(meta.total_books, 3);
        assert!(!meta.has_next);
        assert!(meta.has_prev);

        let result = paginate(sample_books(3), 1, i64::MAX);
        assert_eq!(result.books.len(), 3);
        let meta = result.pagination.unwrap();
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_next);
    }

    #[test]
    fn paginate_handles_empty_collection() {
        let result = paginate(Vec::new(), 1, 10);
        assert!(result.books.is_empty());
        let meta = result.pagination.unwrap();
        assert_eq!(meta.total_pages, 0);
        assert_eq!(meta.total_books, 0);
        assert!(!meta.has_next);
    }
}
