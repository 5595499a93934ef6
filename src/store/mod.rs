//! File-backed record store.
//!
//! Each logical collection ("users", "books") is one JSON array file under
//! the configured data directory. There is no indexing and no cache: every
//! operation re-reads the whole file, and every mutation rewrites it. This
//! is deliberate and only acceptable for small collections; do not reuse
//! this store at any larger scale.

mod collection;

pub use collection::Collection;

use crate::{
    config::StorageConfig,
    error::AppResult,
    models::{Book, User},
};

pub const USERS_COLLECTION: &str = "users";
pub const BOOKS_COLLECTION: &str = "books";

/// The two persistent collections of the service.
///
/// They are independent resources: there is no cross-collection locking
/// and no transactional coupling between them.
#[derive(Clone)]
pub struct Store {
    pub users: Collection<User>,
    pub books: Collection<Book>,
}

impl Store {
    /// Create a store rooted at the configured data directory
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            users: Collection::new(&config.data_dir, USERS_COLLECTION),
            books: Collection::new(&config.data_dir, BOOKS_COLLECTION),
        }
    }

    /// Ensure the data directory and both collection files exist.
    ///
    /// Called once at startup before any request is served; the server
    /// must not come up if this fails.
    pub async fn initialize(&self) -> AppResult<()> {
        self.users.initialize().await?;
        self.books.initialize().await?;
        Ok(())
    }
}
