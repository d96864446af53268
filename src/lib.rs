//! Filter and aggregate pipeline behind the hotel booking dashboard.
//!
//! The table is loaded once ([`data::shared`]), narrowed by a
//! [`data::filter::FilterSpec`], and summarised into chart-ready series
//! ([`state::DashboardReport`], [`state::OverviewReport`]). Drawing those
//! series is left to whatever front end consumes the JSON.

pub mod config;
pub mod data;
pub mod error;
pub mod state;

pub use crate::config::Config;
pub use data::filter::{FilterSpec, apply_filter};
pub use data::model::{BookingDataset, CustomerType, Hotel, Month, Reservation};
pub use error::{DataError, SettingsError};
pub use state::{DashboardReport, DashboardState, OverviewReport, overview_report};
