use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;

use hotel_dashboard::data::shared;
use hotel_dashboard::{
    Config, DashboardReport, DashboardState, FilterSpec, OverviewReport, overview_report,
};

#[derive(Serialize)]
struct Output<'a> {
    /// The selection the dashboard report was computed for.
    filter: &'a FilterSpec,
    dashboard: DashboardReport,
    overview: OverviewReport,
}

fn run() -> Result<()> {
    let config = Config::from_env().context("reading configuration")?;
    log::debug!("configuration: {config:?}");

    let dataset = shared::init(&config.data_path)?;
    let state = DashboardState::with_filter(dataset.clone(), config.filter_spec(&dataset));

    let output = Output {
        filter: &state.filter,
        dashboard: state.dashboard_report(),
        overview: overview_report(&dataset),
    };
    log::info!(
        "Total reservations: {} of {}",
        output.dashboard.total_reservations,
        dataset.len()
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if config.pretty {
        serde_json::to_writer_pretty(&mut out, &output)?;
    } else {
        serde_json::to_writer(&mut out, &output)?;
    }
    writeln!(out)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
