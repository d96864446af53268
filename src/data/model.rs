use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DataError;

// ---------------------------------------------------------------------------
// Hotel
// ---------------------------------------------------------------------------

/// The two properties the booking table covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Hotel {
    #[default]
    ResortHotel,
    CityHotel,
}

impl Hotel {
    pub const ALL: [Hotel; 2] = [Hotel::ResortHotel, Hotel::CityHotel];

    pub fn as_str(self) -> &'static str {
        match self {
            Hotel::ResortHotel => "Resort Hotel",
            Hotel::CityHotel => "City Hotel",
        }
    }
}

impl FromStr for Hotel {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Hotel::ALL
            .into_iter()
            .find(|h| h.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DataError::UnknownHotel(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Month – canonical January → December order
// ---------------------------------------------------------------------------

/// Arrival month. The declaration order is the canonical chart order, so the
/// derived `Ord` sorts January first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Month {
    #[default]
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Zero-based position in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Month {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Month::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DataError::UnknownMonth(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CustomerType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum CustomerType {
    #[default]
    Transient,
    Contract,
    TransientParty,
    Group,
}

impl CustomerType {
    /// Listed in the order the sidebar pre-selects them.
    pub const ALL: [CustomerType; 4] = [
        CustomerType::Transient,
        CustomerType::Contract,
        CustomerType::TransientParty,
        CustomerType::Group,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CustomerType::Transient => "Transient",
            CustomerType::Contract => "Contract",
            CustomerType::TransientParty => "Transient-Party",
            CustomerType::Group => "Group",
        }
    }
}

impl FromStr for CustomerType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        CustomerType::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DataError::UnknownCustomerType(s.to_string()))
    }
}

// -- Shared string conversions for the categorical enums --

macro_rules! label_impls {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<String> for $ty {
            type Error = DataError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    )*};
}

label_impls!(Hotel, Month, CustomerType);

// ---------------------------------------------------------------------------
// Reservation – one row of the booking table
// ---------------------------------------------------------------------------

/// A single reservation. Field names follow the `Hotel Bookings.csv`
/// header; columns not listed here are ignored on load.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Reservation {
    pub hotel: Hotel,
    #[serde(rename = "arrival_date_year")]
    pub arrival_year: i32,
    #[serde(rename = "arrival_date_month")]
    pub arrival_month: Month,
    /// Empty when the cell is blank or null.
    #[serde(deserialize_with = "deserialize_text")]
    pub country: String,
    pub customer_type: CustomerType,
    #[serde(deserialize_with = "deserialize_flag")]
    pub is_canceled: bool,
    #[serde(deserialize_with = "deserialize_count")]
    pub adults: u32,
    /// Missing in a handful of rows of the public dataset; read as zero.
    #[serde(deserialize_with = "deserialize_count")]
    pub children: u32,
    #[serde(deserialize_with = "deserialize_count")]
    pub babies: u32,
    /// NaN when the cell is blank, `NA` or null.
    #[serde(deserialize_with = "deserialize_rate")]
    pub adr: f64,
    #[serde(deserialize_with = "deserialize_count")]
    pub stays_in_weekend_nights: u32,
    #[serde(deserialize_with = "deserialize_count")]
    pub stays_in_week_nights: u32,
    #[serde(deserialize_with = "deserialize_flag")]
    pub is_repeated_guest: bool,
    pub reserved_room_type: String,
    pub assigned_room_type: String,
    pub distribution_channel: String,
}

impl Reservation {
    /// adults + children + babies
    pub fn family_size(&self) -> u32 {
        self.adults + self.children + self.babies
    }
}

// -- Lenient cell decoding --

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

/// Interpret a 0/1 (or true/false) cell as a boolean.
pub(crate) fn parse_flag(raw: &str) -> Result<bool, DataError> {
    match raw.trim() {
        "1" | "true" | "True" => Ok(true),
        "0" | "false" | "False" => Ok(false),
        other => Err(DataError::InvalidFlag(other.to_string())),
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match RawCell::deserialize(deserializer)? {
        RawCell::Bool(b) => Ok(b),
        RawCell::Int(i) => Ok(i != 0),
        RawCell::Float(f) => Ok(f != 0.0),
        RawCell::Text(s) => parse_flag(&s).map_err(serde::de::Error::custom),
        RawCell::Missing => Ok(false),
    }
}

/// Counts are stored as floats by some exporters and as `NA` when missing.
fn deserialize_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match RawCell::deserialize(deserializer)? {
        RawCell::Bool(b) => Ok(u32::from(b)),
        RawCell::Int(i) => u32::try_from(i).map_err(serde::de::Error::custom),
        RawCell::Float(f) if f.is_nan() => Ok(0),
        RawCell::Float(f) if f >= 0.0 => Ok(f as u32),
        RawCell::Float(f) => Err(serde::de::Error::custom(format!("negative count {f}"))),
        RawCell::Text(s) => match s.trim() {
            "" | "NA" | "NaN" | "null" => Ok(0),
            other => other.parse::<u32>().map_err(serde::de::Error::custom),
        },
        RawCell::Missing => Ok(0),
    }
}

fn deserialize_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_rate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match RawCell::deserialize(deserializer)? {
        RawCell::Int(i) => Ok(i as f64),
        RawCell::Float(f) => Ok(f),
        RawCell::Text(s) => match s.trim() {
            "" | "NA" | "NaN" | "null" => Ok(f64::NAN),
            other => other.parse::<f64>().map_err(serde::de::Error::custom),
        },
        RawCell::Missing => Ok(f64::NAN),
        RawCell::Bool(b) => Err(serde::de::Error::custom(format!("'{b}' is not a rate"))),
    }
}

// ---------------------------------------------------------------------------
// BookingDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table plus the option lists the filter sidebar offers.
/// Options keep first-appearance order, like a column's `unique()`.
#[derive(Debug, Clone, Default)]
pub struct BookingDataset {
    pub reservations: Vec<Reservation>,
    pub hotels: Vec<Hotel>,
    pub years: Vec<i32>,
    pub countries: Vec<String>,
    pub customer_types: Vec<CustomerType>,
}

impl BookingDataset {
    /// Build the option lists from the loaded reservations.
    pub fn from_reservations(reservations: Vec<Reservation>) -> Self {
        let mut hotels = Vec::new();
        let mut years = Vec::new();
        let mut countries = Vec::new();
        let mut customer_types = Vec::new();

        let mut seen_countries: HashSet<&str> = HashSet::new();
        for r in &reservations {
            if !hotels.contains(&r.hotel) {
                hotels.push(r.hotel);
            }
            if !years.contains(&r.arrival_year) {
                years.push(r.arrival_year);
            }
            if seen_countries.insert(r.country.as_str()) {
                countries.push(r.country.clone());
            }
            if !customer_types.contains(&r.customer_type) {
                customer_types.push(r.customer_type);
            }
        }

        BookingDataset {
            reservations,
            hotels,
            years,
            countries,
            customer_types,
        }
    }

    /// Number of reservations.
    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }
}
