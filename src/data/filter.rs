use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{BookingDataset, CustomerType, Hotel, Reservation};

/// Countries the sidebar pre-selects on first load.
pub const DEFAULT_COUNTRIES: [&str; 3] = ["TUR", "ITA", "RUS"];

// ---------------------------------------------------------------------------
// Filter predicate: one hotel plus three multi-select columns
// ---------------------------------------------------------------------------

/// Sidebar selection. A reservation passes when all four predicates hold;
/// an empty set selects nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub hotel: Hotel,
    pub years: BTreeSet<i32>,
    pub countries: BTreeSet<String>,
    pub customer_types: BTreeSet<CustomerType>,
}

impl FilterSpec {
    /// The selection a freshly opened dashboard shows: first hotel in data
    /// order, every year, three default countries and every customer type.
    pub fn defaults(dataset: &BookingDataset) -> Self {
        FilterSpec {
            hotel: dataset.hotels.first().copied().unwrap_or_default(),
            years: dataset.years.iter().copied().collect(),
            countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            customer_types: CustomerType::ALL.into_iter().collect(),
        }
    }

    /// Whether a single reservation passes every predicate.
    pub fn matches(&self, r: &Reservation) -> bool {
        r.hotel == self.hotel
            && self.years.contains(&r.arrival_year)
            && self.countries.contains(&r.country)
            && self.customer_types.contains(&r.customer_type)
    }
}

/// Keep the reservations that pass `spec`, preserving input order.
///
/// Accepts any iterator of borrowed rows so the result can be fed straight
/// back in (`apply_filter(filtered.iter().copied(), spec)`).
pub fn apply_filter<'a, I>(records: I, spec: &FilterSpec) -> Vec<&'a Reservation>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    records.into_iter().filter(|r| spec.matches(r)).collect()
}

/// Return indices of reservations that pass `spec`.
pub fn filtered_indices(dataset: &BookingDataset, spec: &FilterSpec) -> Vec<usize> {
    dataset
        .reservations
        .iter()
        .enumerate()
        .filter(|(_, r)| spec.matches(r))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(hotel: Hotel, year: i32, country: &str, customer_type: CustomerType) -> Reservation {
        Reservation {
            hotel,
            arrival_year: year,
            country: country.to_string(),
            customer_type,
            ..Default::default()
        }
    }

    fn spec(years: &[i32], countries: &[&str]) -> FilterSpec {
        FilterSpec {
            hotel: Hotel::ResortHotel,
            years: years.iter().copied().collect(),
            countries: countries.iter().map(|c| c.to_string()).collect(),
            customer_types: CustomerType::ALL.into_iter().collect(),
        }
    }

    #[test]
    fn keeps_only_rows_matching_every_predicate() {
        let rows = vec![
            Reservation {
                adr: 100.0,
                ..row(Hotel::ResortHotel, 2015, "TUR", CustomerType::Transient)
            },
            Reservation {
                adr: 200.0,
                ..row(Hotel::ResortHotel, 2016, "ITA", CustomerType::Transient)
            },
        ];
        let out = apply_filter(&rows, &spec(&[2015], &["TUR", "ITA"]));
        assert_eq!(out, vec![&rows[0]]);
    }

    #[test]
    fn each_predicate_can_reject() {
        let s = spec(&[2015], &["TUR"]);
        assert!(s.matches(&row(Hotel::ResortHotel, 2015, "TUR", CustomerType::Group)));
        assert!(!s.matches(&row(Hotel::CityHotel, 2015, "TUR", CustomerType::Group)));
        assert!(!s.matches(&row(Hotel::ResortHotel, 2017, "TUR", CustomerType::Group)));
        assert!(!s.matches(&row(Hotel::ResortHotel, 2015, "PRT", CustomerType::Group)));

        let mut only_contract = s.clone();
        only_contract.customer_types = [CustomerType::Contract].into_iter().collect();
        assert!(!only_contract.matches(&row(Hotel::ResortHotel, 2015, "TUR", CustomerType::Group)));
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let rows = vec![row(Hotel::ResortHotel, 2015, "TUR", CustomerType::Transient)];
        assert!(apply_filter(&rows, &spec(&[], &["TUR"])).is_empty());
        assert!(apply_filter(&rows, &spec(&[2015], &[])).is_empty());

        let mut no_customer_types = spec(&[2015], &["TUR"]);
        assert_eq!(apply_filter(&rows, &no_customer_types).len(), 1);
        no_customer_types.customer_types.clear();
        assert!(apply_filter(&rows, &no_customer_types).is_empty());
    }

    #[test]
    fn unknown_values_yield_empty_result() {
        let rows = vec![row(Hotel::ResortHotel, 2015, "TUR", CustomerType::Transient)];
        assert!(apply_filter(&rows, &spec(&[1999], &["XXX"])).is_empty());
    }

    #[test]
    fn filter_is_idempotent_and_order_preserving() {
        let rows = vec![
            row(Hotel::ResortHotel, 2016, "ITA", CustomerType::Transient),
            row(Hotel::CityHotel, 2016, "ITA", CustomerType::Transient),
            row(Hotel::ResortHotel, 2015, "TUR", CustomerType::Contract),
            row(Hotel::ResortHotel, 2016, "RUS", CustomerType::Group),
            row(Hotel::ResortHotel, 2015, "ITA", CustomerType::TransientParty),
        ];
        let s = spec(&[2015, 2016], &["ITA", "TUR"]);
        let once = apply_filter(&rows, &s);
        let twice = apply_filter(once.iter().copied(), &s);
        assert_eq!(once, twice);
        assert_eq!(once, vec![&rows[0], &rows[2], &rows[4]]);
    }

    #[test]
    fn indices_agree_with_apply_filter() {
        let ds = BookingDataset::from_reservations(vec![
            row(Hotel::CityHotel, 2015, "TUR", CustomerType::Transient),
            row(Hotel::ResortHotel, 2015, "TUR", CustomerType::Transient),
        ]);
        let s = spec(&[2015], &["TUR"]);
        assert_eq!(filtered_indices(&ds, &s), vec![1]);
    }

    #[test]
    fn defaults_follow_dataset() {
        let ds = BookingDataset::from_reservations(vec![
            row(Hotel::CityHotel, 2017, "PRT", CustomerType::Transient),
            row(Hotel::ResortHotel, 2015, "TUR", CustomerType::Group),
        ]);
        let d = FilterSpec::defaults(&ds);
        assert_eq!(d.hotel, Hotel::CityHotel);
        assert_eq!(d.years, BTreeSet::from([2015, 2017]));
        assert_eq!(d.countries.len(), 3);
        assert!(d.countries.contains("RUS"));
        assert_eq!(d.customer_types.len(), 4);
    }
}
