//! Token price book
//!
//! USD prices keyed by token address. Lookups for unknown tokens return 0,
//! which renders every USD amount as `0$`.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct PriceBook {
    prices: RwLock<HashMap<String, f64>>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_prices<I, K>(prices: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let book = Self::new();
        book.upsert_many(prices);
        book
    }

    /// Price of `token_address`, 0 when unknown.
    pub fn price_of(&self, token_address: &str) -> f64 {
        self.prices
            .read()
            .get(&normalize(token_address))
            .copied()
            .unwrap_or(0.0)
    }

    /// Insert or replace prices. Negative and non-finite prices are skipped.
    /// Returns how many prices were stored.
    pub fn upsert_many<I, K>(&self, prices: I) -> usize
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut book = self.prices.write();
        let mut stored = 0;
        for (address, price) in prices {
            let address = address.as_ref();
            if !price.is_finite() || price < 0.0 {
                warn!("Skipping invalid price {} for {}", price, address);
                continue;
            }
            book.insert(normalize(address), price);
            stored += 1;
        }
        debug!("Stored {} token prices", stored);
        stored
    }

    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.prices.read().clone()
    }

    pub fn len(&self) -> usize {
        self.prices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.read().is_empty()
    }
}

fn normalize(address: &str) -> String {
    address.trim().to_lowercase()
}
