use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;

use shelfgen_core::{
    Document, DocumentStore, Error, InsertedDocument, Result as CoreResult, Stage, collections,
};
use shelfgen_seed::{CatalogFaker, CatalogSeeder, SeedError, SeedReport, reset_collection};
use shelfgen_store::MemoryStore;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn id_str(doc: &Document) -> &str {
    doc.get("_id").and_then(Value::as_str).expect("document id")
}

fn str_field<'a>(doc: &'a Document, field: &str) -> &'a str {
    doc.get(field).and_then(Value::as_str).expect("string field")
}

async fn seeded_store(seed: u64) -> (MemoryStore, SeedReport) {
    let store = MemoryStore::new();
    let mut seeder = CatalogSeeder::new(CatalogFaker::seeded(seed));
    let report = seeder.seed(&store).await.expect("seeding succeeds");
    (store, report)
}

#[tokio::test]
async fn seeding_meets_collection_cardinalities() {
    init_tracing();
    let (store, report) = seeded_store(1).await;

    assert_eq!(report.authors, 11);
    assert_eq!(report.genres, 11);
    assert_eq!(report.books, 31);
    let reported = [
        report.authors,
        report.genres,
        report.books,
        report.book_authors,
        report.book_items,
        report.restorations,
        report.locations_in_library,
    ];
    for (collection, expected) in collections::SEED_ORDER.iter().zip(reported) {
        assert_eq!(store.count(collection).expect("count"), expected);
    }

    // item fan-out is 6 to 11 copies per book
    let items = store.documents(collections::BOOK_ITEMS).expect("items");
    let mut per_book: HashMap<String, usize> = HashMap::new();
    for item in &items {
        *per_book.entry(str_field(item, "bookId").to_string()).or_default() += 1;
    }
    assert_eq!(per_book.len(), 31, "every book has copies");
    for count in per_book.values() {
        assert!((6..=11).contains(count), "copies per book: {count}");
    }
}

#[tokio::test]
async fn genre_references_are_distinct_and_resolvable() {
    let (store, _) = seeded_store(2).await;

    let genre_ids: HashSet<String> = store
        .documents(collections::GENRES)
        .expect("genres")
        .iter()
        .map(|doc| id_str(doc).to_string())
        .collect();

    for book in store.documents(collections::BOOKS).expect("books") {
        let refs: Vec<&str> = book
            .get("genreIds")
            .and_then(Value::as_array)
            .expect("genreIds array")
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(refs.len() <= 3, "at most 3 genres per book");
        let distinct: HashSet<&str> = refs.iter().copied().collect();
        assert_eq!(distinct.len(), refs.len(), "no duplicate genre refs");
        for genre_ref in refs {
            assert!(genre_ids.contains(genre_ref), "dangling genre ref");
        }
    }
}

#[tokio::test]
async fn availability_mirrors_purchase_date_and_shelf_locations() {
    let (store, _) = seeded_store(3).await;

    let mut available: HashMap<String, bool> = HashMap::new();
    for item in store.documents(collections::BOOK_ITEMS).expect("items") {
        let purchased = !item
            .get("dateOfPurchase")
            .expect("purchase date field present")
            .is_null();
        let flag = item
            .get("availableToBorrow")
            .and_then(Value::as_bool)
            .expect("availability flag");
        assert_eq!(flag, !purchased, "flag is the negation of purchase");
        available.insert(id_str(&item).to_string(), flag);
    }

    let mut locations_per_item: HashMap<String, usize> = HashMap::new();
    for location in store
        .documents(collections::LOCATIONS_IN_LIBRARY)
        .expect("locations")
    {
        let item_ref = str_field(&location, "bookItemId").to_string();
        assert!(available.contains_key(&item_ref), "dangling item ref");
        *locations_per_item.entry(item_ref).or_default() += 1;

        let room = location.get("room").and_then(Value::as_i64).expect("room");
        let rack = location.get("rack").and_then(Value::as_i64).expect("rack");
        assert!((1..=5).contains(&room));
        assert!((1..=10).contains(&rack));
    }

    for (item_id, flag) in &available {
        let expected = if *flag { 1 } else { 0 };
        assert_eq!(
            locations_per_item.get(item_id).copied().unwrap_or(0),
            expected,
            "location exists exactly for borrowable items"
        );
    }
}

#[tokio::test]
async fn author_links_form_contiguous_slots_per_book() {
    let (store, _) = seeded_store(4).await;

    let author_ids: HashSet<String> = store
        .documents(collections::AUTHORS)
        .expect("authors")
        .iter()
        .map(|doc| id_str(doc).to_string())
        .collect();

    let mut slots_per_book: HashMap<String, Vec<i64>> = HashMap::new();
    for link in store.documents(collections::BOOK_AUTHOR).expect("links") {
        assert!(
            author_ids.contains(str_field(&link, "authorId")),
            "dangling author ref"
        );
        let slot = link
            .get("authorNo")
            .and_then(Value::as_i64)
            .expect("authorNo");
        slots_per_book
            .entry(str_field(&link, "bookId").to_string())
            .or_default()
            .push(slot);
    }

    assert_eq!(slots_per_book.len(), 31, "every book has author links");
    for slots in slots_per_book.values_mut() {
        slots.sort_unstable();
        assert!((2..=4).contains(&slots.len()), "2 to 4 authors per book");
        let expected: Vec<i64> = (1..=slots.len() as i64).collect();
        assert_eq!(*slots, expected, "slots are contiguous from 1");
    }
}

#[tokio::test]
async fn restorations_reference_items_with_bounded_fanout() {
    let (store, _) = seeded_store(5).await;

    let item_ids: HashSet<String> = store
        .documents(collections::BOOK_ITEMS)
        .expect("items")
        .iter()
        .map(|doc| id_str(doc).to_string())
        .collect();

    let mut per_item: HashMap<String, usize> = HashMap::new();
    for restoration in store
        .documents(collections::RESTORATIONS)
        .expect("restorations")
    {
        let item_ref = str_field(&restoration, "bookItemId").to_string();
        assert!(item_ids.contains(&item_ref), "dangling item ref");
        *per_item.entry(item_ref).or_default() += 1;
    }

    assert_eq!(per_item.len(), item_ids.len(), "every item was restored");
    for count in per_item.values() {
        assert!((1..=4).contains(count), "restorations per item: {count}");
    }
}

#[tokio::test]
async fn reseeding_wipes_and_rebinds_foreign_keys() {
    init_tracing();
    let store = MemoryStore::new();

    let mut first = CatalogSeeder::new(CatalogFaker::seeded(11));
    let first_report = first.seed(&store).await.expect("first run");
    let first_books: HashSet<String> = store
        .documents(collections::BOOKS)
        .expect("books")
        .iter()
        .map(|doc| id_str(doc).to_string())
        .collect();

    let mut second = CatalogSeeder::new(CatalogFaker::seeded(11));
    let second_report = second.seed(&store).await.expect("second run");

    // the same seed replays the same cardinalities, and nothing accumulates
    assert_eq!(first_report.authors, second_report.authors);
    assert_eq!(first_report.genres, second_report.genres);
    assert_eq!(first_report.books, second_report.books);
    assert_eq!(first_report.book_authors, second_report.book_authors);
    assert_eq!(first_report.book_items, second_report.book_items);
    assert_eq!(first_report.restorations, second_report.restorations);
    assert_eq!(
        first_report.locations_in_library,
        second_report.locations_in_library
    );
    assert_eq!(store.count(collections::BOOKS).expect("count"), 31);
    assert_eq!(
        store.count(collections::BOOK_ITEMS).expect("count"),
        second_report.book_items
    );

    let second_books: HashSet<String> = store
        .documents(collections::BOOKS)
        .expect("books")
        .iter()
        .map(|doc| id_str(doc).to_string())
        .collect();
    assert!(
        first_books.is_disjoint(&second_books),
        "first-run identifiers are gone"
    );
    for item in store.documents(collections::BOOK_ITEMS).expect("items") {
        assert!(
            second_books.contains(str_field(&item, "bookId")),
            "foreign keys resolve only against the current run"
        );
    }
}

#[tokio::test]
async fn reset_collection_is_idempotent() {
    let store = MemoryStore::new();
    reset_collection(&store, "authors").await.expect("first");
    store
        .insert_many("authors", vec![Document::new()])
        .await
        .expect("insert");
    reset_collection(&store, "authors").await.expect("second");
    reset_collection(&store, "authors").await.expect("third");
    assert_eq!(store.count("authors").expect("count"), 0);
}

struct FailingStore {
    inner: MemoryStore,
    refuse: &'static str,
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn create_collection(&self, name: &str) -> CoreResult<()> {
        self.inner.create_collection(name).await
    }

    async fn delete_all(&self, name: &str) -> CoreResult<()> {
        self.inner.delete_all(name).await
    }

    async fn insert_many(
        &self,
        name: &str,
        documents: Vec<Document>,
    ) -> CoreResult<Vec<InsertedDocument>> {
        if name == self.refuse {
            return Err(Error::Store("write refused".to_string()));
        }
        self.inner.insert_many(name, documents).await
    }

    async fn aggregate(&self, name: &str, pipeline: &[Stage]) -> CoreResult<Vec<Document>> {
        self.inner.aggregate(name, pipeline).await
    }
}

#[tokio::test]
async fn insert_failure_aborts_without_touching_committed_collections() {
    let store = FailingStore {
        inner: MemoryStore::new(),
        refuse: collections::RESTORATIONS,
    };
    let mut seeder = CatalogSeeder::new(CatalogFaker::seeded(21));

    let result = seeder.seed(&store).await;
    assert!(matches!(result, Err(SeedError::Store(Error::Store(_)))));

    // everything inserted before the failure stays committed
    assert_eq!(store.inner.count(collections::BOOKS).expect("count"), 31);
    assert!(store.inner.count(collections::BOOK_ITEMS).expect("count") > 0);
    // nothing after the failing barrier was written
    assert_eq!(store.inner.count(collections::RESTORATIONS).expect("count"), 0);
    assert_eq!(
        store
            .inner
            .count(collections::LOCATIONS_IN_LIBRARY)
            .expect("count"),
        0
    );
}
