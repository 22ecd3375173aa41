//! Parquet file handling for trigger cell data

use anyhow::{anyhow, Context, Result};
use polars::prelude::*;
use std::path::Path;
use crate::cell::{Position, Side, Subdetector, TriggerCell};

/// Fetch a column converted to the requested type
fn typed_column(df: &DataFrame, name: &str, dtype: DataType) -> Result<Column> {
    let column = df
        .column(name)
        .with_context(|| format!("missing column `{}`", name))?;
    Ok(column.cast(&dtype)?)
}

fn parse_subdetector(value: &str) -> Result<Subdetector> {
    match value {
        "silicon" => Ok(Subdetector::Silicon),
        "scintillator" => Ok(Subdetector::Scintillator),
        other => Err(anyhow!("unknown subdetector `{}`", other)),
    }
}

/// Load trigger cells from a Parquet file with columns
/// `id, x, y, z, mip_pt, pt, subdet, layer, side`, keeping row order
pub fn load_trigger_cells(path: &Path) -> Result<Vec<TriggerCell>> {
    log::info!("Reading parquet file: {}", path.display());

    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }

    let df = LazyFrame::scan_parquet(path, Default::default())?.collect()?;
    log::info!("File schema: {:?}", df.schema());

    let id_col = typed_column(&df, "id", DataType::UInt32)?;
    let x_col = typed_column(&df, "x", DataType::Float64)?;
    let y_col = typed_column(&df, "y", DataType::Float64)?;
    let z_col = typed_column(&df, "z", DataType::Float64)?;
    let mip_col = typed_column(&df, "mip_pt", DataType::Float64)?;
    let pt_col = typed_column(&df, "pt", DataType::Float64)?;
    let layer_col = typed_column(&df, "layer", DataType::UInt32)?;
    let side_col = typed_column(&df, "side", DataType::Int8)?;
    let subdet_col = typed_column(&df, "subdet", DataType::String)?;

    let ids = id_col.u32()?;
    let xs = x_col.f64()?;
    let ys = y_col.f64()?;
    let zs = z_col.f64()?;
    let mips = mip_col.f64()?;
    let layers = layer_col.u32()?;
    let sides = side_col.i8()?;
    let subdets = subdet_col.str()?;
    let pts = pt_col.f64()?;

    let row_count = df.height();
    let mut cells = Vec::with_capacity(row_count);

    for i in 0..row_count {
        let missing = || anyhow!("row {} of {} has a missing value", i, path.display());

        let side = sides.get(i).ok_or_else(missing)?;
        let subdet = subdets.get(i).ok_or_else(missing)?;

        cells.push(TriggerCell {
            id: ids.get(i).ok_or_else(missing)?,
            position: Position::new(
                xs.get(i).ok_or_else(missing)?,
                ys.get(i).ok_or_else(missing)?,
                zs.get(i).ok_or_else(missing)?,
            ),
            mip_pt: mips.get(i).ok_or_else(missing)?,
            pt: pts.get(i).ok_or_else(missing)?,
            subdet: parse_subdetector(subdet)?,
            layer: layers.get(i).ok_or_else(missing)?,
            side: Side::try_from(side).map_err(|e| anyhow!("row {}: {}", i, e))?,
        });
    }

    log::info!("Loaded {} trigger cells", cells.len());

    Ok(cells)
}
