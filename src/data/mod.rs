//! Input loading for trigger cells and neighbor maps

pub mod json;
pub mod parquet;

use anyhow::Result;
use std::path::Path;
use crate::cell::TriggerCell;

/// Load the trigger cells of one bunch crossing, choosing the reader by file extension
pub fn load_trigger_cells(path: impl AsRef<Path>) -> Result<Vec<TriggerCell>> {
    let path = path.as_ref();
    let is_parquet = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("parquet"));

    if is_parquet {
        parquet::load_trigger_cells(path)
    } else {
        json::load_trigger_cells(path)
    }
}
