//! Book catalog service with ownership enforcement

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    store::Store,
};

/// Ownership gate for mutations: only the creating user may update or
/// delete a book. Reads and creation are not gated.
pub fn ensure_owner(user_id: &str, book: &Book) -> AppResult<()> {
    if book.owner_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the owner may modify this book".to_string(),
        ))
    }
}

#[derive(Clone)]
pub struct BooksService {
    store: Store,
}

impl BooksService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// List books, optionally filtered by a case-insensitive genre substring
    pub async fn list(&self, genre: Option<&str>) -> AppResult<Vec<Book>> {
        let mut books = self.store.books.load_all().await?;

        if let Some(genre) = genre {
            let needle = genre.to_lowercase();
            books.retain(|b| b.genre.to_lowercase().contains(&needle));
        }

        Ok(books)
    }

    /// Get a book by id
    pub async fn get(&self, id: &str) -> AppResult<Book> {
        let books = self.store.books.load_all().await?;
        books
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Create a book owned by the authenticated user
    pub async fn create(&self, owner_id: &str, fields: CreateBook) -> AppResult<Book> {
        fields
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let book = Book {
            id: Uuid::new_v4().to_string(),
            title: fields.title,
            author: fields.author,
            genre: fields.genre,
            published_year: fields.published_year,
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };

        let _guard = self.store.books.lock_exclusive().await;
        let mut books = self.store.books.load_all().await?;
        books.push(book.clone());
        self.store.books.save_all(&books).await?;

        tracing::info!("Created book {} for user {}", book.id, owner_id);
        Ok(book)
    }

    /// Apply a partial update to a book owned by `user_id`
    pub async fn update(&self, user_id: &str, id: &str, changes: UpdateBook) -> AppResult<Book> {
        let _guard = self.store.books.lock_exclusive().await;
        let mut books = self.store.books.load_all().await?;

        let book = books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        ensure_owner(user_id, book)?;

        changes.apply_to(book);
        let updated = book.clone();
        self.store.books.save_all(&books).await?;

        Ok(updated)
    }

    /// Delete a book owned by `user_id`, returning the deleted record
    pub async fn delete(&self, user_id: &str, id: &str) -> AppResult<Book> {
        let _guard = self.store.books.lock_exclusive().await;
        let mut books = self.store.books.load_all().await?;

        let index = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        ensure_owner(user_id, &books[index])?;

        let deleted = books.remove(index);
        self.store.books.save_all(&books).await?;

        tracing::info!("Deleted book {} for user {}", deleted.id, user_id);
        Ok(deleted)
    }
}
