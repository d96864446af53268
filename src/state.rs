use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::data::aggregate::{
    CancellationDistribution, StayTotals, adr_by_family_size, cancellation_distribution,
    guests_by_country, monthly_counts, stay_totals,
};
use crate::data::filter::{FilterSpec, filtered_indices};
use crate::data::model::{BookingDataset, CustomerType, Hotel, Month, Reservation};
use crate::data::overview::{self, ChannelAdr, RepeatedGuestShare, RoomTypeColumn};

// ---------------------------------------------------------------------------
// Reports handed to the rendering side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCount {
    pub month: Month,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount<K> {
    pub label: K,
    pub count: usize,
}

impl<K> From<(K, usize)> for LabelCount<K> {
    fn from((label, count): (K, usize)) -> Self {
        LabelCount { label, count }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelCount<K> {
    #[serde(flatten)]
    pub key: K,
    pub hotel: Hotel,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearKey {
    pub year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthKey {
    pub month: Month,
}

/// Everything the first dashboard tab draws for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub total_reservations: usize,
    pub monthly_counts: Vec<MonthCount>,
    pub cancellations: CancellationDistribution,
    pub guests_by_country: Vec<LabelCount<String>>,
    pub adr_by_family_size: BTreeMap<u32, Vec<f64>>,
    pub stay_totals: StayTotals,
}

impl DashboardReport {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Reservation>,
        I::IntoIter: Clone,
    {
        let records = records.into_iter();
        DashboardReport {
            total_reservations: records.clone().count(),
            monthly_counts: monthly_counts(records.clone())
                .into_iter()
                .map(|(month, count)| MonthCount { month, count })
                .collect(),
            cancellations: cancellation_distribution(records.clone()),
            guests_by_country: guests_by_country(records.clone())
                .into_iter()
                .map(LabelCount::from)
                .collect(),
            adr_by_family_size: adr_by_family_size(records.clone()),
            stay_totals: stay_totals(records),
        }
    }
}

/// The second tab: whole-dataset breakdowns independent of the filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewReport {
    pub total_reservations: usize,
    pub hotel_counts: Vec<LabelCount<Hotel>>,
    pub cancellations: CancellationDistribution,
    pub bookings_by_year: Vec<HotelCount<YearKey>>,
    pub bookings_by_month: Vec<HotelCount<MonthKey>>,
    pub reserved_room_types: Vec<LabelCount<String>>,
    pub assigned_room_types: Vec<LabelCount<String>>,
    pub repeated_guests: RepeatedGuestShare,
    pub customer_types: Vec<LabelCount<CustomerType>>,
    pub repeated_guests_by_hotel: BTreeMap<Hotel, usize>,
    pub mean_adr_by_channel: Vec<ChannelAdr>,
    pub adr_records_by_hotel: BTreeMap<Hotel, usize>,
}

fn labelled<K>(counts: Vec<(K, usize)>) -> Vec<LabelCount<K>> {
    counts.into_iter().map(LabelCount::from).collect()
}

pub fn overview_report(dataset: &BookingDataset) -> OverviewReport {
    let rows = &dataset.reservations;
    OverviewReport {
        total_reservations: rows.len(),
        hotel_counts: labelled(overview::hotel_counts(rows)),
        cancellations: cancellation_distribution(rows),
        bookings_by_year: overview::bookings_by_year_and_hotel(rows)
            .into_iter()
            .map(|((year, hotel), count)| HotelCount {
                key: YearKey { year },
                hotel,
                count,
            })
            .collect(),
        bookings_by_month: overview::bookings_by_month_and_hotel(rows)
            .into_iter()
            .map(|((month, hotel), count)| HotelCount {
                key: MonthKey { month },
                hotel,
                count,
            })
            .collect(),
        reserved_room_types: labelled(overview::room_type_counts(rows, RoomTypeColumn::Reserved)),
        assigned_room_types: labelled(overview::room_type_counts(rows, RoomTypeColumn::Assigned)),
        repeated_guests: overview::repeated_guest_share(rows),
        customer_types: labelled(overview::customer_type_counts(rows)),
        repeated_guests_by_hotel: overview::repeated_guests_by_hotel(rows),
        mean_adr_by_channel: overview::mean_adr_by_channel_and_hotel(rows),
        adr_records_by_hotel: overview::adr_records_by_hotel(rows),
    }
}

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The filter selection over the shared dataset, independent of rendering.
pub struct DashboardState {
    /// Loaded dataset, shared read-only.
    pub dataset: Arc<BookingDataset>,

    /// Current sidebar selection.
    pub filter: FilterSpec,

    /// Indices of reservations passing the current filter (cached).
    pub visible_indices: Vec<usize>,
}

impl DashboardState {
    /// Start from the default sidebar selection.
    pub fn new(dataset: Arc<BookingDataset>) -> Self {
        let filter = FilterSpec::defaults(&dataset);
        Self::with_filter(dataset, filter)
    }

    pub fn with_filter(dataset: Arc<BookingDataset>, filter: FilterSpec) -> Self {
        let mut state = DashboardState {
            dataset,
            filter,
            visible_indices: Vec::new(),
        };
        state.refilter();
        state
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.dataset, &self.filter);
        log::debug!(
            "filter {:?} keeps {} of {} reservations",
            self.filter,
            self.visible_indices.len(),
            self.dataset.len()
        );
    }

    /// Replace the whole selection.
    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
        self.refilter();
    }

    pub fn select_hotel(&mut self, hotel: Hotel) {
        self.filter.hotel = hotel;
        self.refilter();
    }

    pub fn toggle_year(&mut self, year: i32) {
        if !self.filter.years.remove(&year) {
            self.filter.years.insert(year);
        }
        self.refilter();
    }

    pub fn toggle_country(&mut self, country: &str) {
        if !self.filter.countries.remove(country) {
            self.filter.countries.insert(country.to_string());
        }
        self.refilter();
    }

    pub fn toggle_customer_type(&mut self, customer_type: CustomerType) {
        if !self.filter.customer_types.remove(&customer_type) {
            self.filter.customer_types.insert(customer_type);
        }
        self.refilter();
    }

    /// Reservations passing the current filter, in dataset order.
    pub fn visible(&self) -> impl Iterator<Item = &Reservation> + Clone + '_ {
        self.visible_indices
            .iter()
            .map(move |&i| &self.dataset.reservations[i])
    }

    pub fn dashboard_report(&self) -> DashboardReport {
        DashboardReport::from_records(self.visible())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Arc<BookingDataset> {
        let row = |hotel, year, country: &str, month| Reservation {
            hotel,
            arrival_year: year,
            arrival_month: month,
            country: country.to_string(),
            stays_in_weekend_nights: 1,
            stays_in_week_nights: 2,
            ..Default::default()
        };
        Arc::new(BookingDataset::from_reservations(vec![
            row(Hotel::ResortHotel, 2015, "TUR", Month::July),
            row(Hotel::ResortHotel, 2016, "ITA", Month::July),
            row(Hotel::CityHotel, 2016, "TUR", Month::May),
            row(Hotel::ResortHotel, 2016, "PRT", Month::May),
        ]))
    }

    #[test]
    fn default_state_uses_sidebar_defaults() {
        let state = DashboardState::new(dataset());
        assert_eq!(state.filter.hotel, Hotel::ResortHotel);
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn toggles_refilter() {
        let mut state = DashboardState::new(dataset());
        state.toggle_year(2015);
        assert_eq!(state.visible_indices, vec![1]);
        state.toggle_country("PRT");
        assert_eq!(state.visible_indices, vec![1, 3]);
        state.select_hotel(Hotel::CityHotel);
        assert_eq!(state.visible_indices, vec![2]);
        state.toggle_customer_type(CustomerType::Transient);
        assert!(state.visible_indices.is_empty());
    }

    #[test]
    fn dashboard_report_summarises_visible_rows() {
        let state = DashboardState::new(dataset());
        let report = state.dashboard_report();
        assert_eq!(report.total_reservations, 2);
        assert_eq!(report.monthly_counts.len(), 12);
        assert_eq!(report.monthly_counts[6].count, 2);
        assert_eq!(report.cancellations.total(), 2);
        assert_eq!(report.stay_totals.weekend_nights, 2);
        assert_eq!(report.stay_totals.week_nights, 4);
        assert_eq!(report.guests_by_country.len(), 2);
    }

    #[test]
    fn overview_ignores_filter() {
        let ds = dataset();
        let report = overview_report(&ds);
        assert_eq!(report.total_reservations, 4);
        assert_eq!(report.hotel_counts[0], LabelCount::from((Hotel::ResortHotel, 3)));
        assert_eq!(report.bookings_by_year.len(), 3);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["bookings_by_year"][0]["year"], 2015);
        assert_eq!(json["bookings_by_year"][0]["hotel"], "Resort Hotel");
        assert_eq!(json["bookings_by_month"][0]["month"], "May");
    }
}
