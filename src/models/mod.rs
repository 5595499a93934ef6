//! Data models for Bookvault entities

pub mod book;
pub mod user;

pub use book::{Book, CreateBook, UpdateBook};
pub use user::{PublicUser, User, UserClaims};
