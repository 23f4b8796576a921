use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use shelfgen_core::{
    Book, BookFormat, BookItem, DocumentId, ItemCondition, ItemStatus, Restoration, from_document,
    to_document,
};

#[test]
fn book_item_serializes_with_persisted_field_names() {
    let item = BookItem {
        barcode: 482_117_233,
        format: BookFormat::Physical,
        price: 123.45,
        date_of_purchase: None,
        status: ItemStatus::Pending,
        condition: ItemCondition::Moderate,
        available_to_borrow: true,
        book_id: DocumentId::generate(),
    };

    let doc = to_document(&item).expect("serialize item");
    assert_eq!(doc.get("format"), Some(&json!("physical")));
    assert_eq!(doc.get("status"), Some(&json!("pending")));
    assert_eq!(doc.get("condition"), Some(&json!("moderate")));
    assert_eq!(doc.get("availableToBorrow"), Some(&json!(true)));
    // absent purchase date persists as an explicit null
    assert_eq!(doc.get("dateOfPurchase"), Some(&Value::Null));
    assert_eq!(
        doc.get("bookId"),
        Some(&json!(item.book_id.to_string())),
        "foreign keys persist as plain identifier strings"
    );
}

#[test]
fn book_keeps_isbn_uppercase() {
    let genre = DocumentId::generate();
    let book = Book {
        isbn: 9_783_161_484_100,
        title: "Voluptas dolores".to_string(),
        subject: "Aut facere quia".to_string(),
        language: "en".to_string(),
        page_count: 312,
        publish_date: Utc.with_ymd_and_hms(2017, 4, 12, 0, 0, 0).unwrap(),
        genre_ids: vec![genre],
    };

    let doc = to_document(&book).expect("serialize book");
    assert_eq!(doc.get("ISBN"), Some(&json!(9_783_161_484_100_u64)));
    assert!(doc.get("isbn").is_none());
    assert_eq!(doc.get("pageCount"), Some(&json!(312)));
    assert_eq!(doc.get("genreIds"), Some(&json!([genre.to_string()])));
}

#[test]
fn restoration_type_field_keeps_reserved_name() {
    let restoration = Restoration {
        kind: "rebinding".to_string(),
        reason: "Spine split along the hinge".to_string(),
        cost: 12.5,
        restoration_date: Utc.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap(),
        return_date: Utc.with_ymd_and_hms(2024, 2, 20, 9, 30, 0).unwrap(),
        book_item_id: DocumentId::generate(),
    };

    let doc = to_document(&restoration).expect("serialize restoration");
    assert_eq!(doc.get("type"), Some(&json!("rebinding")));
    assert!(doc.get("kind").is_none());
    assert!(doc.get("bookItemId").and_then(Value::as_str).is_some());

    let back: Restoration = from_document(&doc).expect("decode restoration");
    assert_eq!(back.kind, restoration.kind);
    assert_eq!(back.book_item_id, restoration.book_item_id);
}
