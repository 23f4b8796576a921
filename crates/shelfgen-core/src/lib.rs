//! Core contracts for Shelfgen.
//!
//! This crate defines the catalog entity shapes, the opaque document
//! identifier, the store boundary, and the typed pipeline stage model shared
//! by the seeding engine and the query layer.

pub mod document;
pub mod entities;
pub mod error;
pub mod id;
pub mod pipeline;
pub mod store;

pub use document::{Document, ID_FIELD, from_document, to_document};
pub use entities::{
    Author, Book, BookAuthorLink, BookFormat, BookItem, Genre, ItemCondition, ItemStatus,
    LocationInLibrary, Restoration, collections,
};
pub use error::{Error, Result};
pub use id::DocumentId;
pub use pipeline::{Accumulator, Filter, GroupKey, SortOrder, Stage};
pub use store::{DocumentStore, InsertedDocument};
