use csv::Writer;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::RosterResult;
use crate::model::{Assignment, Availability};

/// Writes rows to `csv_path` with a header row, replacing the file only once everything is written
fn write_rows<T: Serialize>(csv_path: &Path, rows: &[T]) -> RosterResult<()> {
    let tmp_path = csv_path.with_extension("csv.tmp");

    let mut wtr = Writer::from_path(&tmp_path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    drop(wtr);

    fs::rename(&tmp_path, csv_path)?;
    Ok(())
}

/// Exports assignments in the same `id,volunteer_id,shift_id,status` layout the parser reads
pub fn write_assignments(csv_path: &Path, assignments: &[Assignment]) -> RosterResult<()> {
    write_rows(csv_path, assignments)
}

pub fn write_availabilities(csv_path: &Path, availabilities: &[Availability]) -> RosterResult<()> {
    write_rows(csv_path, availabilities)
}
