use super::model::ReservationExport;
use crate::errors::AppResult;
use csv::Writer;
use std::path::Path;

pub fn write_csv(path: &Path, rows: &[ReservationExport]) -> AppResult<()> {
    let mut wtr = Writer::from_path(path)?;

    wtr.write_record(ReservationExport::HEADERS)?;
    for row in rows {
        wtr.write_record(row.record())?;
    }

    wtr.flush()?;
    Ok(())
}
