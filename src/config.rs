use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, Environment, Map};
use serde::{Deserialize, Deserializer};

use crate::data::filter::FilterSpec;
use crate::data::model::{BookingDataset, CustomerType, Hotel};
use crate::error::{DataError, SettingsError};

pub const ENV_PREFIX: &str = "HOTEL_DASHBOARD";

pub const DATA_PATH_VAR: &str = "HOTEL_DASHBOARD_DATA";
pub const HOTEL_VAR: &str = "HOTEL_DASHBOARD_HOTEL";
pub const YEARS_VAR: &str = "HOTEL_DASHBOARD_YEARS";
pub const COUNTRIES_VAR: &str = "HOTEL_DASHBOARD_COUNTRIES";
pub const CUSTOMER_TYPES_VAR: &str = "HOTEL_DASHBOARD_CUSTOMER_TYPES";
pub const PRETTY_VAR: &str = "HOTEL_DASHBOARD_PRETTY";

pub const DEFAULT_DATA_PATH: &str = "Hotel Bookings.csv";

/// Keys split on `,` into lists.
const LIST_KEYS: [&str; 3] = ["years", "countries", "customer_types"];

/// Settings as the `config` crate deserialises them, before the values are
/// checked against the domain types.
#[derive(Debug, Deserialize)]
struct RawSettings {
    data: PathBuf,
    hotel: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    years: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many")]
    countries: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many")]
    customer_types: Option<Vec<String>>,
    pretty: bool,
}

/// Process settings. Every field left `None` falls back to the sidebar
/// default for the loaded dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_path: PathBuf,
    pub hotel: Option<Hotel>,
    pub years: Option<BTreeSet<i32>>,
    pub countries: Option<BTreeSet<String>>,
    pub customer_types: Option<BTreeSet<CustomerType>>,
    pub pretty: bool,
}

impl Config {
    /// Read `HOTEL_DASHBOARD_*` from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_vars(None)
    }

    /// Read from `vars` instead of the process environment when given.
    pub fn from_vars(vars: Option<Map<String, String>>) -> Result<Self, SettingsError> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .ignore_empty(true)
            .list_separator(",");
        let env = LIST_KEYS
            .iter()
            .fold(env, |env, key| env.with_list_parse_key(key))
            .source(vars);

        let raw: RawSettings = ConfigBuilder::<DefaultState>::default()
            .set_default("data", DEFAULT_DATA_PATH)?
            .set_default("pretty", false)?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        Ok(Config {
            data_path: raw.data,
            hotel: raw
                .hotel
                .map(|v| parse_value(HOTEL_VAR, &v))
                .transpose()?,
            years: raw.years.map(|v| parse_set(YEARS_VAR, &v)).transpose()?,
            countries: raw.countries.map(|v| {
                v.iter()
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
            customer_types: raw
                .customer_types
                .map(|v| parse_set(CUSTOMER_TYPES_VAR, &v))
                .transpose()?,
            pretty: raw.pretty,
        })
    }

    /// The sidebar defaults for `dataset`, overridden by whatever is set.
    pub fn filter_spec(&self, dataset: &BookingDataset) -> FilterSpec {
        let mut spec = FilterSpec::defaults(dataset);
        if let Some(hotel) = self.hotel {
            spec.hotel = hotel;
        }
        if let Some(years) = &self.years {
            spec.years = years.clone();
        }
        if let Some(countries) = &self.countries {
            spec.countries = countries.clone();
        }
        if let Some(customer_types) = &self.customer_types {
            spec.customer_types = customer_types.clone();
        }
        spec
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, DataError> {
    raw.trim().parse().map_err(|_| DataError::InvalidConfig {
        key: key.to_string(),
        value: raw.trim().to_string(),
    })
}

fn parse_set<T: FromStr + Ord>(key: &str, raw: &[String]) -> Result<BTreeSet<T>, DataError> {
    raw.iter()
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_value(key, v))
        .collect()
}

// -- List values --

/// A single list element. `try_parsing` turns numeric-looking values into
/// numbers before they reach us.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListItem {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListItem::Int(i) => write!(f, "{i}"),
            ListItem::Float(v) => write!(f, "{v}"),
            ListItem::Bool(b) => write!(f, "{b}"),
            ListItem::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<ListItem>),
    One(ListItem),
}

/// A value without a separator (`HOTEL_DASHBOARD_YEARS=2016`) is parsed as a
/// scalar rather than a list; accept both.
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
    let items = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    };
    Ok(Some(items.iter().map(ListItem::to_string).collect()))
}
