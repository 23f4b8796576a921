use serde::{Deserialize, Serialize};

/// Outcome of one seeding run: documents inserted per collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedReport {
    pub authors: usize,
    pub genres: usize,
    pub books: usize,
    pub book_authors: usize,
    pub book_items: usize,
    pub restorations: usize,
    pub locations_in_library: usize,
    pub duration_ms: u64,
}

impl SeedReport {
    /// Total documents inserted across all collections.
    pub fn total(&self) -> usize {
        self.authors
            + self.genres
            + self.books
            + self.book_authors
            + self.book_items
            + self.restorations
            + self.locations_in_library
    }
}
