use chrono::DateTime;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Arithmetic mean, or `None` for an empty sample.
pub fn mean(samples: &[i64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<i64>() as f64 / samples.len() as f64)
}

/// Whole hours between two RFC 3339 timestamps, truncated toward zero.
pub fn elapsed_hours(start: &str, end: &str) -> Result<i64, chrono::ParseError> {
    let start = DateTime::parse_from_rfc3339(start)?;
    let end = DateTime::parse_from_rfc3339(end)?;
    Ok((end - start).num_hours())
}

/// Keeps the `n` items with the largest key. Equal keys keep their input order.
pub fn top_n_by<T, K, F>(mut items: Vec<T>, n: usize, key: F) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.sort_by_key(|item| Reverse(key(item)));
    items.truncate(n);
    items
}

/// Occurrence counter that remembers the order keys were first seen in.
#[derive(Debug, Default)]
pub struct FrequencyCounter {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
    total: usize,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &str) {
        self.total += 1;
        match self.index.get(key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    /// Number of increments across all keys.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn into_entries(self) -> Vec<(String, usize)> {
        self.entries
    }

    /// The `n` most frequent keys, ties in first-seen order.
    pub fn top(self, n: usize) -> Vec<(String, usize)> {
        top_n_by(self.entries, n, |(_, count)| *count)
    }
}
