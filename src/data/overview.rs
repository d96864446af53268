//! Whole-dataset breakdowns shown on the dashboard's second tab. These
//! ignore the sidebar filter.

use std::collections::BTreeMap;

use serde::Serialize;

use super::aggregate::{count_by, sort_descending};
use super::model::{CustomerType, Hotel, Month, Reservation};

/// Which room-type column to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomTypeColumn {
    Reserved,
    Assigned,
}

pub fn hotel_counts<'a, I>(records: I) -> Vec<(Hotel, usize)>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    sort_descending(count_by(records, |r| r.hotel))
}

/// Bookings per (year, hotel), years ascending then hotel.
pub fn bookings_by_year_and_hotel<'a, I>(records: I) -> BTreeMap<(i32, Hotel), usize>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let mut out = BTreeMap::new();
    for r in records {
        *out.entry((r.arrival_year, r.hotel)).or_insert(0) += 1;
    }
    out
}

/// Bookings per (month, hotel), months in canonical order.
pub fn bookings_by_month_and_hotel<'a, I>(records: I) -> BTreeMap<(Month, Hotel), usize>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let mut out = BTreeMap::new();
    for r in records {
        *out.entry((r.arrival_month, r.hotel)).or_insert(0) += 1;
    }
    out
}

pub fn room_type_counts<'a, I>(records: I, column: RoomTypeColumn) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    sort_descending(count_by(records, |r| match column {
        RoomTypeColumn::Reserved => r.reserved_room_type.clone(),
        RoomTypeColumn::Assigned => r.assigned_room_type.clone(),
    }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepeatedGuestShare {
    pub repeated: usize,
    pub first_time: usize,
}

pub fn repeated_guest_share<'a, I>(records: I) -> RepeatedGuestShare
where
    I: IntoIterator<Item = &'a Reservation>,
{
    records
        .into_iter()
        .fold(RepeatedGuestShare::default(), |mut acc, r| {
            if r.is_repeated_guest {
                acc.repeated += 1;
            } else {
                acc.first_time += 1;
            }
            acc
        })
}

pub fn customer_type_counts<'a, I>(records: I) -> Vec<(CustomerType, usize)>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    sort_descending(count_by(records, |r| r.customer_type))
}

/// Repeated guests per hotel; hotels without any are omitted.
pub fn repeated_guests_by_hotel<'a, I>(records: I) -> BTreeMap<Hotel, usize>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let mut out = BTreeMap::new();
    for r in records.into_iter().filter(|r| r.is_repeated_guest) {
        *out.entry(r.hotel).or_insert(0) += 1;
    }
    out
}

/// One bar of the ADR-per-channel chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAdr {
    pub distribution_channel: String,
    pub hotel: Hotel,
    pub mean_adr: f64,
}

/// Mean ADR per (distribution channel, hotel). Channels appear in
/// first-seen order, hotels in their declared order within a channel.
/// Rows with a missing (NaN) ADR are skipped.
pub fn mean_adr_by_channel_and_hotel<'a, I>(records: I) -> Vec<ChannelAdr>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let mut channels: Vec<&'a str> = Vec::new();
    let mut sums: BTreeMap<(usize, Hotel), (f64, usize)> = BTreeMap::new();
    for r in records.into_iter().filter(|r| !r.adr.is_nan()) {
        let slot = match channels.iter().position(|c| *c == r.distribution_channel) {
            Some(i) => i,
            None => {
                channels.push(&r.distribution_channel);
                channels.len() - 1
            }
        };
        let acc = sums.entry((slot, r.hotel)).or_insert((0.0, 0));
        acc.0 += r.adr;
        acc.1 += 1;
    }
    sums.into_iter()
        .map(|((slot, hotel), (sum, n))| ChannelAdr {
            distribution_channel: channels[slot].to_string(),
            hotel,
            mean_adr: sum / n as f64,
        })
        .collect()
}

/// Number of ADR observations per hotel.
pub fn adr_records_by_hotel<'a, I>(records: I) -> BTreeMap<Hotel, usize>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let mut out = BTreeMap::new();
    for r in records.into_iter().filter(|r| !r.adr.is_nan()) {
        *out.entry(r.hotel).or_insert(0) += 1;
    }
    out
}
