use serde::Deserialize;
use tracing::debug;

use shelfgen_core::{
    Accumulator, Document, DocumentId, DocumentStore, Filter, GroupKey, ID_FIELD, SortOrder,
    Stage, collections, from_document,
};

use crate::errors::QueryError;

/// Revenue aggregate for one book.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookRevenue {
    #[serde(rename = "_id")]
    pub book_id: DocumentId,
    pub total: f64,
}

/// Read-only analytical queries over a populated catalog store.
///
/// Each operation executes one fixed pipeline in a single round-trip and is
/// cancellable at that granularity.
pub struct CatalogQueries<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> CatalogQueries<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Books whose joined genre-name set contains every requested name
    /// (extras allowed), ascending by title, with the joined genre array
    /// attached under `genres`.
    pub async fn books_by_genre_names(&self, names: &[&str]) -> Result<Vec<Document>, QueryError> {
        let pipeline = books_by_genre_names_pipeline(names);
        debug!(query = "books_by_genre_names", requested = names.len(), "running pipeline");
        Ok(self.store.aggregate(collections::BOOKS, &pipeline).await?)
    }

    /// Books with at least one sold copy, ascending by title, with the
    /// joined items array attached under `items`.
    ///
    /// Despite the name, this matches "has any sold item", not a strict
    /// "all sold": the established query shape filters the joined array
    /// that way and callers depend on the literal behavior.
    pub async fn books_with_all_items_sold(&self) -> Result<Vec<Document>, QueryError> {
        let pipeline = books_with_sold_items_pipeline();
        debug!(query = "books_with_all_items_sold", "running pipeline");
        Ok(self.store.aggregate(collections::BOOKS, &pipeline).await?)
    }

    /// The five best-selling books by summed copy price, descending.
    pub async fn top5_book_sales_by_revenue(&self) -> Result<Vec<BookRevenue>, QueryError> {
        let pipeline = top5_book_sales_pipeline();
        debug!(query = "top5_book_sales_by_revenue", "running pipeline");
        let rows = self
            .store
            .aggregate(collections::BOOK_ITEMS, &pipeline)
            .await?;
        rows.iter()
            .map(|row| from_document(row).map_err(QueryError::from))
            .collect()
    }

    /// Identifiers of items whose summed restoration cost strictly exceeds
    /// the threshold.
    pub async fn items_with_restoration_cost_over(
        &self,
        threshold: f64,
    ) -> Result<Vec<DocumentId>, QueryError> {
        let pipeline = items_with_restoration_cost_over_pipeline(threshold);
        debug!(
            query = "items_with_restoration_cost_over",
            threshold, "running pipeline"
        );
        let rows = self
            .store
            .aggregate(collections::BOOK_ITEMS, &pipeline)
            .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in &rows {
            let value = row
                .get(ID_FIELD)
                .and_then(|key| key.get("itemId"))
                .cloned()
                .ok_or_else(|| {
                    QueryError::ResultShape("grouped row misses _id.itemId".to_string())
                })?;
            let id = serde_json::from_value(value).map_err(shelfgen_core::Error::from)?;
            ids.push(id);
        }
        Ok(ids)
    }
}

/// Join genres, superset-match on the joined names, order by title.
pub fn books_by_genre_names_pipeline(names: &[&str]) -> Vec<Stage> {
    vec![
        Stage::lookup(collections::GENRES, "genreIds", ID_FIELD, "genres"),
        Stage::Match(Filter::ContainsAll {
            path: "genres.name".to_string(),
            values: names.iter().map(|name| name.to_string()).collect(),
        }),
        Stage::sort("title", SortOrder::Ascending),
    ]
}

/// Join items, keep books with any non-null purchase date, order by title.
pub fn books_with_sold_items_pipeline() -> Vec<Stage> {
    vec![
        Stage::lookup(collections::BOOK_ITEMS, ID_FIELD, "bookId", "items"),
        Stage::Match(Filter::AnyNotNull {
            path: "items.dateOfPurchase".to_string(),
        }),
        Stage::sort("title", SortOrder::Ascending),
    ]
}

/// Group copies by book, sum prices, keep the five largest totals.
pub fn top5_book_sales_pipeline() -> Vec<Stage> {
    vec![
        Stage::group(
            GroupKey::field("bookId"),
            vec![Accumulator::sum("price", "total")],
        ),
        Stage::sort("total", SortOrder::Descending),
        Stage::limit(5),
    ]
}

/// Join restorations per item, flatten the pairs, sum cost per item, keep
/// totals strictly above the threshold.
pub fn items_with_restoration_cost_over_pipeline(threshold: f64) -> Vec<Stage> {
    vec![
        Stage::lookup(collections::RESTORATIONS, ID_FIELD, "bookItemId", "restorations"),
        Stage::unwind("restorations"),
        Stage::group(
            GroupKey::compound([("itemId", ID_FIELD), ("price", "price")]),
            vec![Accumulator::sum("restorations.cost", "totalCost")],
        ),
        Stage::Match(Filter::Gt {
            path: "totalCost".to_string(),
            threshold,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_pipeline_joins_before_filtering() {
        let stages = books_by_genre_names_pipeline(&["Fiction"]);
        assert!(matches!(stages[0], Stage::Lookup { .. }));
        assert!(matches!(stages[1], Stage::Match(Filter::ContainsAll { .. })));
        assert!(matches!(
            stages[2],
            Stage::Sort {
                order: SortOrder::Ascending,
                ..
            }
        ));
    }

    #[test]
    fn revenue_pipeline_limits_after_sorting() {
        let stages = top5_book_sales_pipeline();
        assert!(matches!(stages[0], Stage::Group { .. }));
        assert!(matches!(
            stages[1],
            Stage::Sort {
                order: SortOrder::Descending,
                ..
            }
        ));
        assert_eq!(stages[2], Stage::Limit(5));
    }

    #[test]
    fn restoration_pipeline_unwinds_before_grouping() {
        let stages = items_with_restoration_cost_over_pipeline(10.0);
        assert!(matches!(stages[0], Stage::Lookup { .. }));
        assert!(matches!(stages[1], Stage::Unwind { .. }));
        assert!(matches!(stages[2], Stage::Group { .. }));
        assert!(matches!(stages[3], Stage::Match(Filter::Gt { .. })));
    }
}
