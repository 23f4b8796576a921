//! Persisted shapes for the seven catalog record kinds.
//!
//! These are insertion shapes: none of them carries an identifier field. The
//! store stamps `_id` on insert and hands it back. Field names follow the
//! persisted camelCase convention of the catalog collections.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::id::DocumentId;

/// Collection names as persisted in the store.
pub mod collections {
    pub const AUTHORS: &str = "authors";
    pub const GENRES: &str = "genres";
    pub const BOOKS: &str = "books";
    pub const BOOK_AUTHOR: &str = "bookAuthor";
    pub const BOOK_ITEMS: &str = "bookItems";
    pub const RESTORATIONS: &str = "restorations";
    pub const LOCATIONS_IN_LIBRARY: &str = "locationsInLibrary";

    /// All collections in dependency order: parents strictly before children.
    pub const SEED_ORDER: [&str; 7] = [
        AUTHORS,
        GENRES,
        BOOKS,
        BOOK_AUTHOR,
        BOOK_ITEMS,
        RESTORATIONS,
        LOCATIONS_IN_LIBRARY,
    ];
}

/// A book author. Referenced by [`BookAuthorLink`] records.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub biography: String,
    pub country: String,
}

/// A genre. Referenced by [`Book::genre_ids`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub name: String,
    pub description: String,
}

/// A catalog book. Owns its items by foreign key; genres are embedded as an
/// identifier list (0 to 3 distinct references).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "ISBN")]
    pub isbn: u64,
    pub title: String,
    pub subject: String,
    pub language: String,
    pub page_count: u32,
    pub publish_date: DateTime<Utc>,
    pub genre_ids: Vec<DocumentId>,
}

/// Join record between [`Book`] and [`Author`].
///
/// `author_no` is the 1-based slot position on that book, not unique across
/// links. The same author may fill several slots of one book.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookAuthorLink {
    pub author_no: u32,
    pub book_id: DocumentId,
    pub author_id: DocumentId,
}

/// Physical or digital format of a book copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookFormat {
    Pdf,
    Docx,
    Physical,
}

impl BookFormat {
    pub const ALL: [BookFormat; 3] = [BookFormat::Pdf, BookFormat::Docx, BookFormat::Physical];
}

/// Acquisition status of a book copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Purchased,
    Reserved,
    Pending,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [
        ItemStatus::Purchased,
        ItemStatus::Reserved,
        ItemStatus::Pending,
    ];
}

/// Physical condition of a book copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemCondition {
    Good,
    Bad,
    Moderate,
}

impl ItemCondition {
    pub const ALL: [ItemCondition; 3] = [
        ItemCondition::Good,
        ItemCondition::Bad,
        ItemCondition::Moderate,
    ];
}

/// One copy of a book.
///
/// Invariant: `available_to_borrow` is the negation of "has a purchase
/// date". The two fields are always produced together from a single draw.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookItem {
    pub barcode: u64,
    pub format: BookFormat,
    pub price: f64,
    pub date_of_purchase: Option<DateTime<Utc>>,
    pub status: ItemStatus,
    pub condition: ItemCondition,
    pub available_to_borrow: bool,
    pub book_id: DocumentId,
}

/// A restoration performed on one book copy.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Restoration {
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: String,
    pub cost: f64,
    pub restoration_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub book_item_id: DocumentId,
}

/// Shelf placement of a borrowable copy.
///
/// Exists exactly for items with `available_to_borrow == true`, at most one
/// per item.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationInLibrary {
    pub room: u8,
    pub rack: u8,
    pub book_item_id: DocumentId,
}
