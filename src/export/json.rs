use super::model::ReservationExport;
use crate::errors::AppResult;
use std::path::Path;

/// Pretty-printed JSON array.
pub fn write_json(path: &Path, rows: &[ReservationExport]) -> AppResult<()> {
    let json = serde_json::to_string_pretty(rows)?;
    std::fs::write(path, json)?;
    Ok(())
}
