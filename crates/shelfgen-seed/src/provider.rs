//! Fake value boundary.
//!
//! All randomness consumed by the engine flows through this trait, so a
//! scripted implementation can drive generation deterministically in tests.

use chrono::{DateTime, Duration, Utc};
use fake::Fake;
use fake::faker::address::en::CountryName;
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::Name;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of randomized scalars for the seeding engine.
pub trait FakeProvider {
    fn person_name(&mut self) -> String;
    fn country(&mut self) -> String;
    fn paragraph(&mut self) -> String;
    fn sentence(&mut self) -> String;
    fn word(&mut self) -> String;
    /// Uniform integer draw, both bounds inclusive.
    fn int_in(&mut self, lo: i64, hi: i64) -> i64;
    fn boolean(&mut self) -> bool;
    /// Uniform pick. `items` must not be empty.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T;
    /// A timestamp at most `years` years in the past.
    fn date_in_past(&mut self, years: u32) -> DateTime<Utc>;
    /// Uniform in-place shuffle.
    fn shuffle<T>(&mut self, items: &mut [T]);
}

/// [`FakeProvider`] backed by the `fake` crate over a seeded RNG.
#[derive(Debug, Clone)]
pub struct CatalogFaker {
    rng: ChaCha8Rng,
}

impl CatalogFaker {
    /// Deterministic provider; the same seed replays the same draws.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Provider seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self {
            rng: ChaCha8Rng::from_os_rng(),
        }
    }
}

impl FakeProvider for CatalogFaker {
    fn person_name(&mut self) -> String {
        Name().fake_with_rng(&mut self.rng)
    }

    fn country(&mut self) -> String {
        CountryName().fake_with_rng(&mut self.rng)
    }

    fn paragraph(&mut self) -> String {
        Paragraph(1..4).fake_with_rng(&mut self.rng)
    }

    fn sentence(&mut self) -> String {
        Sentence(3..9).fake_with_rng(&mut self.rng)
    }

    fn word(&mut self) -> String {
        Word().fake_with_rng(&mut self.rng)
    }

    fn int_in(&mut self, lo: i64, hi: i64) -> i64 {
        self.rng.random_range(lo..=hi)
    }

    fn boolean(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.random_range(0..items.len())]
    }

    fn date_in_past(&mut self, years: u32) -> DateTime<Utc> {
        let span_seconds = i64::from(years.max(1)) * 365 * 86_400;
        let offset = self.rng.random_range(1..=span_seconds);
        Utc::now() - Duration::seconds(offset)
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}
