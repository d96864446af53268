use std::path::Path;
use std::sync::{Arc, OnceLock};

use anyhow::{Result, bail};

use super::loader::load_file;
use super::model::BookingDataset;

static DATASET: OnceLock<Arc<BookingDataset>> = OnceLock::new();

/// Load the process-wide dataset. Exactly one call succeeds; the table is
/// immutable afterwards.
pub fn init(path: &Path) -> Result<Arc<BookingDataset>> {
    if let Some(ds) = DATASET.get() {
        bail!(
            "dataset already loaded ({} reservations); refusing to load {}",
            ds.len(),
            path.display()
        );
    }
    install(&DATASET, load_file(path)?)
        .map_err(|e| e.context(format!("refusing to load {}", path.display())))
}

/// Store `dataset` in `cell`, failing if another caller got there first.
fn install(
    cell: &OnceLock<Arc<BookingDataset>>,
    dataset: BookingDataset,
) -> Result<Arc<BookingDataset>> {
    let dataset = Arc::new(dataset);
    if cell.set(dataset.clone()).is_err() {
        bail!("dataset already loaded");
    }
    Ok(dataset)
}

/// The shared dataset, if [`init`] has run.
pub fn get() -> Option<Arc<BookingDataset>> {
    DATASET.get().cloned()
}
