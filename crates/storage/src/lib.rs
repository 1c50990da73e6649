#![forbid(unsafe_code)]

pub mod document;
pub mod quiz_store;
pub mod records;
pub mod repository;
pub mod seed;
pub mod sqlite;

pub use quiz_store::QuizStore;
pub use repository::{DocumentStore, InMemoryDocumentStore, Storage, StorageError};
