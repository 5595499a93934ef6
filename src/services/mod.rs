//! Business logic services

pub mod auth;
pub mod books;

use crate::{config::AuthConfig, store::Store};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub books: books::BooksService,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Store, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(store.clone(), auth_config),
            books: books::BooksService::new(store),
        }
    }
}
