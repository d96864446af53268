use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::Serialize;

use super::model::{Month, Reservation};

// ---------------------------------------------------------------------------
// Generic grouping helpers
// ---------------------------------------------------------------------------

/// Count rows per key, keys in first-appearance order.
pub fn count_by<'a, I, K, F>(records: I, mut key: F) -> Vec<(K, usize)>
where
    I: IntoIterator<Item = &'a Reservation>,
    K: Eq + Hash + Clone,
    F: FnMut(&'a Reservation) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for r in records {
        let k = key(r);
        match slots.get(&k) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(k.clone(), counts.len());
                counts.push((k, 1));
            }
        }
    }
    counts
}

/// Stable sort by count, largest first. Equal counts keep their input order.
pub fn sort_descending<K>(mut counts: Vec<(K, usize)>) -> Vec<(K, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// ---------------------------------------------------------------------------
// Chart series for the filtered dashboard
// ---------------------------------------------------------------------------

/// Reservations per arrival month, always twelve entries January first.
pub fn monthly_counts<'a, I>(records: I) -> Vec<(Month, usize)>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let mut counts = [0usize; 12];
    for r in records {
        counts[r.arrival_month.index()] += 1;
    }
    Month::ALL.into_iter().zip(counts).collect()
}

/// Pie slices for the cancellation chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CancellationDistribution {
    #[serde(rename = "Yes")]
    pub yes: usize,
    #[serde(rename = "No")]
    pub no: usize,
}

impl CancellationDistribution {
    pub fn total(&self) -> usize {
        self.yes + self.no
    }

    /// `("Yes", n)` then `("No", m)`.
    pub fn labelled(&self) -> [(&'static str, usize); 2] {
        [("Yes", self.yes), ("No", self.no)]
    }
}

pub fn cancellation_distribution<'a, I>(records: I) -> CancellationDistribution
where
    I: IntoIterator<Item = &'a Reservation>,
{
    records
        .into_iter()
        .fold(CancellationDistribution::default(), |mut acc, r| {
            if r.is_canceled {
                acc.yes += 1;
            } else {
                acc.no += 1;
            }
            acc
        })
}

/// Reservations per country, most frequent first.
pub fn guests_by_country<'a, I>(records: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    sort_descending(count_by(records, |r| r.country.clone()))
}

/// ADR observations grouped by family size, in input order per group.
pub fn adr_by_family_size<'a, I>(records: I) -> BTreeMap<u32, Vec<f64>>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for r in records {
        groups.entry(r.family_size()).or_default().push(r.adr);
    }
    groups
}

/// Summed nights for the weekend / week-night bar chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StayTotals {
    pub weekend_nights: u64,
    pub week_nights: u64,
}

pub fn stay_totals<'a, I>(records: I) -> StayTotals
where
    I: IntoIterator<Item = &'a Reservation>,
{
    records
        .into_iter()
        .fold(StayTotals::default(), |mut acc, r| {
            acc.weekend_nights += u64::from(r.stays_in_weekend_nights);
            acc.week_nights += u64::from(r.stays_in_week_nights);
            acc
        })
}
