use csv::{Reader, StringRecord};
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::error::{RosterError, RosterResult};
use crate::model::{
    Assignment, AssignmentStatus, Availability, Role, Shift, SlotPreference, Volunteer, YearMonth,
};

/// One CSV file being read, for column lookup and row-level error context
struct Table {
    file: String,
    headers: StringRecord,
}

impl Table {
    fn open<P: AsRef<Path>>(path: P) -> RosterResult<(Self, Reader<std::fs::File>)> {
        let file = path
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut reader = Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        Ok((Self { file, headers }, reader))
    }

    /// Finds a column by (trimmed, case-insensitive) header name
    fn column(&self, name: &str) -> RosterResult<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| RosterError::Parse {
                file: self.file.clone(),
                row: 1,
                message: format!("missing column '{}'", name),
            })
    }

    fn error(&self, row: usize, message: String) -> RosterError {
        RosterError::Parse {
            file: self.file.clone(),
            row,
            message,
        }
    }
}

fn field(record: &StringRecord, col: usize) -> &str {
    record.get(col).unwrap_or("").trim()
}

/// Parses a boolean value from various string representations
fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "yes" || lower == "true" || lower == "1"
}

/// Parses `HH:MM` (seconds optional)
fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

fn parse_role(value: &str) -> Option<Role> {
    match value.to_lowercase().as_str() {
        "coordinator" => Some(Role::Coordinator),
        "volunteer" | "standard" => Some(Role::Volunteer),
        _ => None,
    }
}

fn parse_slot(value: &str) -> Option<SlotPreference> {
    match value.trim().to_lowercase().as_str() {
        "morning" => Some(SlotPreference::Morning),
        "afternoon" => Some(SlotPreference::Afternoon),
        "both" => Some(SlotPreference::Both),
        "none" | "" => Some(SlotPreference::None),
        _ => None,
    }
}

fn parse_status(value: &str) -> Option<AssignmentStatus> {
    match value.to_lowercase().as_str() {
        "pending" => Some(AssignmentStatus::Pending),
        "confirmed" => Some(AssignmentStatus::Confirmed),
        "declined" => Some(AssignmentStatus::Declined),
        "reassigned" => Some(AssignmentStatus::Reassigned),
        _ => None,
    }
}

/// Loads the volunteer roster (`id,name,role`)
pub fn load_volunteers<P: AsRef<Path>>(csv_path: P) -> RosterResult<Vec<Volunteer>> {
    let (table, mut reader) = Table::open(csv_path)?;
    let id_col = table.column("id")?;
    let name_col = table.column("name")?;
    let role_col = table.column("role")?;

    let mut volunteers = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 2;

        let id = field(&record, id_col);
        if id.is_empty() {
            tracing::warn!(file = %table.file, row, "skipping volunteer without id");
            continue;
        }
        let role = parse_role(field(&record, role_col))
            .ok_or_else(|| table.error(row, format!("unknown role '{}'", field(&record, role_col))))?;

        volunteers.push(Volunteer {
            id: id.to_string(),
            name: field(&record, name_col).to_string(),
            role,
        });
    }

    Ok(volunteers)
}

/// Loads shifts (`id,date,start_time,end_time,location_id,max_people`), keeping file order
pub fn load_shifts<P: AsRef<Path>>(csv_path: P) -> RosterResult<Vec<Shift>> {
    let (table, mut reader) = Table::open(csv_path)?;
    let id_col = table.column("id")?;
    let date_col = table.column("date")?;
    let start_col = table.column("start_time")?;
    let end_col = table.column("end_time")?;
    let location_col = table.column("location_id")?;
    let max_col = table.column("max_people")?;

    let mut shifts = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 2;

        let id = field(&record, id_col);
        if id.is_empty() {
            tracing::warn!(file = %table.file, row, "skipping shift without id");
            continue;
        }

        let date = NaiveDate::parse_from_str(field(&record, date_col), "%Y-%m-%d")
            .map_err(|e| table.error(row, format!("bad date: {}", e)))?;
        let start_time = parse_time(field(&record, start_col))
            .ok_or_else(|| table.error(row, "bad start_time".to_string()))?;
        let end_time = parse_time(field(&record, end_col))
            .ok_or_else(|| table.error(row, "bad end_time".to_string()))?;
        let max_people: u32 = field(&record, max_col)
            .parse()
            .map_err(|_| table.error(row, "max_people must be a number".to_string()))?;

        shifts.push(Shift {
            id: id.to_string(),
            date,
            start_time,
            end_time,
            location_id: field(&record, location_col).to_string(),
            max_people,
        });
    }

    Ok(shifts)
}

/// Loads assignments (`id,volunteer_id,shift_id,status`)
pub fn load_assignments<P: AsRef<Path>>(csv_path: P) -> RosterResult<Vec<Assignment>> {
    let (table, mut reader) = Table::open(csv_path)?;
    let id_col = table.column("id")?;
    let volunteer_col = table.column("volunteer_id")?;
    let shift_col = table.column("shift_id")?;
    let status_col = table.column("status")?;

    let mut assignments = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 2;

        let id = field(&record, id_col)
            .parse::<Uuid>()
            .map_err(|_| table.error(row, "id must be a UUID".to_string()))?;
        let status = parse_status(field(&record, status_col))
            .ok_or_else(|| table.error(row, format!("unknown status '{}'", field(&record, status_col))))?;

        assignments.push(Assignment {
            id,
            volunteer_id: field(&record, volunteer_col).to_string(),
            shift_id: field(&record, shift_col).to_string(),
            status,
        });
    }

    Ok(assignments)
}

/// Loads availability (`volunteer_id,month,week,slot,saturday_available`)
pub fn load_availabilities<P: AsRef<Path>>(csv_path: P) -> RosterResult<Vec<Availability>> {
    let (table, mut reader) = Table::open(csv_path)?;
    let volunteer_col = table.column("volunteer_id")?;
    let month_col = table.column("month")?;
    let week_col = table.column("week")?;
    let slot_col = table.column("slot")?;
    let saturday_col = table.column("saturday_available")?;

    let mut availabilities = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 2;

        let month = field(&record, month_col)
            .parse::<YearMonth>()
            .map_err(|e| table.error(row, e.to_string()))?;
        let week: u8 = field(&record, week_col)
            .parse()
            .ok()
            .filter(|w| (1..=5).contains(w))
            .ok_or_else(|| table.error(row, "week must be 1-5".to_string()))?;
        let slot = parse_slot(field(&record, slot_col))
            .ok_or_else(|| table.error(row, format!("unknown slot '{}'", field(&record, slot_col))))?;

        availabilities.push(Availability {
            volunteer_id: field(&record, volunteer_col).to_string(),
            month,
            week,
            slot,
            saturday_available: parse_bool(field(&record, saturday_col)),
        });
    }

    Ok(availabilities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_volunteers_in_any_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "volunteers_order.csv",
            "role,id,name\ncoordinator,c1,Cole\nvolunteer,v1,Ana\nvolunteer,,Nobody\n",
        );
        let volunteers = load_volunteers(&path).unwrap();
        assert_eq!(volunteers.len(), 2);
        assert_eq!(volunteers[0].role, Role::Coordinator);
        assert_eq!(volunteers[1].id, "v1");
        assert_eq!(volunteers[1].name, "Ana");
    }

    #[test]
    fn rejects_unknown_role() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "volunteers_bad.csv", "id,name,role\nv1,Ana,captain\n");
        let err = load_volunteers(&path).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn loads_shifts_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "shifts.csv",
            "id,date,start_time,end_time,location_id,max_people\n\
             s2,2024-03-09,09:00,12:00,pantry,2\n\
             s1,2024-03-05,14:30,17:00,kitchen,1\n",
        );
        let shifts = load_shifts(&path).unwrap();
        assert_eq!(shifts.len(), 2);
        assert_eq!(shifts[0].id, "s2");
        assert_eq!(shifts[0].max_people, 2);
        assert_eq!(shifts[1].start_time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(shifts[1].location_id, "kitchen");
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "shifts_missing.csv", "id,date,start_time,end_time,location_id\n");
        let err = load_shifts(&path).unwrap_err();
        assert!(err.to_string().contains("max_people"));
    }

    #[test]
    fn loads_assignments_and_availability() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let path = write_fixture(
            &dir,
            "assignments.csv",
            &format!("id,volunteer_id,shift_id,status\n{},v1,s1,confirmed\n", id),
        );
        let assignments = load_assignments(&path).unwrap();
        assert_eq!(assignments[0].id, id);
        assert_eq!(assignments[0].status, AssignmentStatus::Confirmed);

        let path = write_fixture(
            &dir,
            "availability.csv",
            "volunteer_id,month,week,slot,saturday_available\n\
             v1,2024-03,2,Both,yes\n\
             v2,2024-03,5,none,false\n",
        );
        let availabilities = load_availabilities(&path).unwrap();
        assert_eq!(availabilities.len(), 2);
        assert_eq!(availabilities[0].slot, SlotPreference::Both);
        assert!(availabilities[0].saturday_available);
        assert_eq!(availabilities[1].week, 5);
        assert!(!availabilities[1].saturday_available);
    }

    #[test]
    fn rejects_week_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "availability_bad.csv",
            "volunteer_id,month,week,slot,saturday_available\nv1,2024-03,6,both,yes\n",
        );
        assert!(load_availabilities(&path).is_err());
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("Yes"));
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("no"));
        assert!(!parse_bool(""));
    }
}
