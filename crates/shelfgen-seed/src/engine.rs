use std::time::Instant;

use serde::Serialize;
use tracing::info;

use shelfgen_core::{
    Author, Book, BookAuthorLink, BookFormat, BookItem, DocumentId, DocumentStore, Error, Genre,
    InsertedDocument, ItemCondition, ItemStatus, LocationInLibrary, Restoration, collections,
    to_document,
};

use crate::errors::SeedError;
use crate::provider::FakeProvider;
use crate::report::SeedReport;
use crate::reset::reset_collection;

const AUTHOR_COUNT: usize = 11;
const GENRE_COUNT: usize = 11;
const BOOK_COUNT: usize = 31;
/// Upper bound of distinct genre references per book.
const MAX_GENRES_PER_BOOK: i64 = 3;

/// Languages drawn for generated books.
const LANGUAGES: [&str; 8] = ["en", "de", "fr", "es", "pt", "it", "nl", "ja"];

/// Populates a catalog store with a referentially-consistent random catalog.
///
/// Collections are seeded strictly in dependency order; every batch insert
/// is a synchronization barrier whose captured identifiers feed the next
/// stage. Each collection is wiped before regeneration, so re-running `seed`
/// repopulates from scratch instead of accumulating.
#[derive(Debug)]
pub struct CatalogSeeder<P> {
    provider: P,
}

impl<P: FakeProvider> CatalogSeeder<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Run one full seeding pass. The first failed insert aborts the run;
    /// collections committed before it stay as committed.
    pub async fn seed<S: DocumentStore>(&mut self, store: &S) -> Result<SeedReport, SeedError> {
        let start = Instant::now();
        info!("catalog seeding started");

        reset_collection(store, collections::AUTHORS).await?;
        let authors: Vec<Author> = (0..AUTHOR_COUNT).map(|_| self.fake_author()).collect();
        let author_ids = ids_of(insert_entities(store, collections::AUTHORS, &authors).await?);
        info!(
            collection = collections::AUTHORS,
            inserted = author_ids.len(),
            "collection seeded"
        );

        reset_collection(store, collections::GENRES).await?;
        let genres: Vec<Genre> = (0..GENRE_COUNT).map(|_| self.fake_genre()).collect();
        let genre_ids = ids_of(insert_entities(store, collections::GENRES, &genres).await?);
        info!(
            collection = collections::GENRES,
            inserted = genre_ids.len(),
            "collection seeded"
        );

        reset_collection(store, collections::BOOKS).await?;
        let books: Vec<Book> = (0..BOOK_COUNT).map(|_| self.fake_book(&genre_ids)).collect();
        let book_ids = ids_of(insert_entities(store, collections::BOOKS, &books).await?);
        info!(
            collection = collections::BOOKS,
            inserted = book_ids.len(),
            "collection seeded"
        );

        // Per-book fan-out: author slots and copies. Both batches are built
        // in one pass over the captured book ids, then inserted in one
        // round-trip each.
        reset_collection(store, collections::BOOK_AUTHOR).await?;
        reset_collection(store, collections::BOOK_ITEMS).await?;
        let mut links: Vec<BookAuthorLink> = Vec::new();
        let mut items: Vec<BookItem> = Vec::new();
        for book_id in &book_ids {
            let slots = self.provider.int_in(1, 3) + 1;
            for slot in 1..=slots {
                links.push(BookAuthorLink {
                    author_no: slot as u32,
                    book_id: *book_id,
                    author_id: *self.provider.pick(&author_ids),
                });
            }
            let copies = self.provider.int_in(5, 10) + 1;
            for _ in 0..copies {
                items.push(self.fake_book_item(*book_id));
            }
        }
        let link_count = insert_entities(store, collections::BOOK_AUTHOR, &links)
            .await?
            .len();
        info!(
            collection = collections::BOOK_AUTHOR,
            inserted = link_count,
            "collection seeded"
        );
        let inserted_items = insert_entities(store, collections::BOOK_ITEMS, &items).await?;
        info!(
            collection = collections::BOOK_ITEMS,
            inserted = inserted_items.len(),
            "collection seeded"
        );

        // Per-item fan-out. The availability flag is read back from the
        // insert result rather than from the outgoing batch.
        reset_collection(store, collections::RESTORATIONS).await?;
        reset_collection(store, collections::LOCATIONS_IN_LIBRARY).await?;
        let mut restorations: Vec<Restoration> = Vec::new();
        let mut locations: Vec<LocationInLibrary> = Vec::new();
        for item in &inserted_items {
            let rounds = self.provider.int_in(0, 3) + 1;
            for _ in 0..rounds {
                restorations.push(self.fake_restoration(item.id));
            }
            if available_to_borrow(item)? {
                locations.push(self.fake_location(item.id));
            }
        }
        let restoration_count = insert_entities(store, collections::RESTORATIONS, &restorations)
            .await?
            .len();
        info!(
            collection = collections::RESTORATIONS,
            inserted = restoration_count,
            "collection seeded"
        );
        let location_count =
            insert_entities(store, collections::LOCATIONS_IN_LIBRARY, &locations)
                .await?
                .len();
        info!(
            collection = collections::LOCATIONS_IN_LIBRARY,
            inserted = location_count,
            "collection seeded"
        );

        let report = SeedReport {
            authors: author_ids.len(),
            genres: genre_ids.len(),
            books: book_ids.len(),
            book_authors: link_count,
            book_items: inserted_items.len(),
            restorations: restoration_count,
            locations_in_library: location_count,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            total = report.total(),
            duration_ms = report.duration_ms,
            "catalog seeding completed"
        );
        Ok(report)
    }

    fn fake_author(&mut self) -> Author {
        Author {
            name: self.provider.person_name(),
            biography: self.provider.paragraph(),
            country: self.provider.country(),
        }
    }

    fn fake_genre(&mut self) -> Genre {
        Genre {
            name: self.provider.word(),
            description: self.provider.sentence(),
        }
    }

    fn fake_book(&mut self, genre_ids: &[DocumentId]) -> Book {
        // shuffle-then-truncate keeps the references distinct by construction
        let count = self.provider.int_in(0, MAX_GENRES_PER_BOOK) as usize;
        let mut pool = genre_ids.to_vec();
        self.provider.shuffle(&mut pool);
        pool.truncate(count);

        Book {
            isbn: self.provider.int_in(9_780_000_000_000, 9_799_999_999_999) as u64,
            title: self.provider.sentence(),
            subject: self.provider.sentence(),
            language: (*self.provider.pick(&LANGUAGES)).to_string(),
            page_count: self.provider.int_in(48, 1200) as u32,
            publish_date: self.provider.date_in_past(20),
            genre_ids: pool,
        }
    }

    fn fake_book_item(&mut self, book_id: DocumentId) -> BookItem {
        // one draw decides both fields; they must never diverge
        let date_of_purchase = if self.provider.boolean() {
            Some(self.provider.date_in_past(1))
        } else {
            None
        };
        let available_to_borrow = date_of_purchase.is_none();

        BookItem {
            barcode: self.provider.int_in(100_000_000, 999_999_999) as u64,
            format: *self.provider.pick(&BookFormat::ALL),
            price: cents(self.provider.int_in(10_000, 14_999)),
            date_of_purchase,
            status: *self.provider.pick(&ItemStatus::ALL),
            condition: *self.provider.pick(&ItemCondition::ALL),
            available_to_borrow,
            book_id,
        }
    }

    fn fake_restoration(&mut self, book_item_id: DocumentId) -> Restoration {
        Restoration {
            kind: self.provider.word(),
            reason: self.provider.sentence(),
            cost: cents(self.provider.int_in(1_000, 1_499)),
            restoration_date: self.provider.date_in_past(1),
            return_date: self.provider.date_in_past(1),
            book_item_id,
        }
    }

    fn fake_location(&mut self, book_item_id: DocumentId) -> LocationInLibrary {
        LocationInLibrary {
            room: self.provider.int_in(1, 5) as u8,
            rack: self.provider.int_in(1, 10) as u8,
            book_item_id,
        }
    }
}

async fn insert_entities<S: DocumentStore, T: Serialize>(
    store: &S,
    collection: &str,
    entities: &[T],
) -> Result<Vec<InsertedDocument>, SeedError> {
    let mut documents = Vec::with_capacity(entities.len());
    for entity in entities {
        documents.push(to_document(entity)?);
    }
    Ok(store.insert_many(collection, documents).await?)
}

fn available_to_borrow(item: &InsertedDocument) -> Result<bool, SeedError> {
    item.bool_field("availableToBorrow").ok_or_else(|| {
        SeedError::Store(Error::MalformedDocument(
            "inserted book item misses availableToBorrow".to_string(),
        ))
    })
}

fn ids_of(inserted: Vec<InsertedDocument>) -> Vec<DocumentId> {
    inserted.into_iter().map(|record| record.id).collect()
}

fn cents(raw: i64) -> f64 {
    raw as f64 / 100.0
}
