use std::path::{Path, PathBuf};

use crate::error::{RosterError, RosterResult};
use crate::export::{write_assignments, write_availabilities};
use crate::model::{Assignment, Availability, Shift, Volunteer, YearMonth};
use crate::parser::{load_assignments, load_availabilities, load_shifts, load_volunteers};
use crate::schedule::{assign_manually, run_auto_plan};

pub const VOLUNTEERS_FILE: &str = "volunteers.csv";
pub const SHIFTS_FILE: &str = "shifts.csv";
pub const ASSIGNMENTS_FILE: &str = "assignments.csv";
pub const AVAILABILITY_FILE: &str = "availability.csv";

/// In-memory roster backed by a directory of CSV files.
///
/// Volunteers and shifts are read-only here. Assignments and availability are written back
/// on every change and only kept in memory once the write succeeds, so a later plan run
/// always sees exactly what earlier runs saved.
#[derive(Debug)]
pub struct RosterStore {
    data_dir: Option<PathBuf>,
    volunteers: Vec<Volunteer>,
    shifts: Vec<Shift>,
    assignments: Vec<Assignment>,
    availabilities: Vec<Availability>,
}

impl RosterStore {
    /// Loads all four collections. Missing assignment/availability files start empty.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> RosterResult<Self> {
        let dir = data_dir.as_ref();

        let volunteers = load_volunteers(dir.join(VOLUNTEERS_FILE))?;
        let shifts = load_shifts(dir.join(SHIFTS_FILE))?;

        let assignments_path = dir.join(ASSIGNMENTS_FILE);
        let assignments = if assignments_path.exists() {
            load_assignments(assignments_path)?
        } else {
            Vec::new()
        };

        let availability_path = dir.join(AVAILABILITY_FILE);
        let availabilities = if availability_path.exists() {
            load_availabilities(availability_path)?
        } else {
            Vec::new()
        };

        tracing::info!(
            dir = %dir.display(),
            volunteers = volunteers.len(),
            shifts = shifts.len(),
            assignments = assignments.len(),
            availabilities = availabilities.len(),
            "roster loaded"
        );

        Ok(Self {
            data_dir: Some(dir.to_path_buf()),
            volunteers,
            shifts,
            assignments,
            availabilities,
        })
    }

    /// A store that never touches disk
    #[cfg(test)]
    pub fn in_memory(
        volunteers: Vec<Volunteer>,
        shifts: Vec<Shift>,
        assignments: Vec<Assignment>,
        availabilities: Vec<Availability>,
    ) -> Self {
        Self {
            data_dir: None,
            volunteers,
            shifts,
            assignments,
            availabilities,
        }
    }

    pub fn volunteers(&self) -> &[Volunteer] {
        &self.volunteers
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn availabilities(&self) -> &[Availability] {
        &self.availabilities
    }

    pub fn shifts_in(&self, month: YearMonth) -> Vec<&Shift> {
        self.shifts.iter().filter(|s| month.contains(s.date)).collect()
    }

    pub fn assignments_in(&self, month: YearMonth) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| {
                self.shifts
                    .iter()
                    .any(|s| s.id == a.shift_id && month.contains(s.date))
            })
            .collect()
    }

    /// Runs the planner over the current snapshot without changing anything
    pub fn preview_plan(&self, month: YearMonth) -> Vec<Assignment> {
        run_auto_plan(
            month,
            &self.shifts,
            &self.volunteers,
            &self.assignments,
            &self.availabilities,
        )
    }

    /// Merges planner output into the roster and persists it
    pub fn apply_plan(&mut self, planned: &[Assignment]) -> RosterResult<()> {
        if planned.is_empty() {
            return Ok(());
        }
        let mut next = self.assignments.clone();
        next.extend_from_slice(planned);
        self.persist_assignments(&next)?;
        self.assignments = next;
        Ok(())
    }

    /// Plans `month`, merges and persists the result, and returns the new assignments
    pub fn plan_month(&mut self, month: YearMonth) -> RosterResult<Vec<Assignment>> {
        let planned = self.preview_plan(month);
        self.apply_plan(&planned)?;
        Ok(planned)
    }

    /// Coordinator assignment; confirmed immediately
    pub fn assign(&mut self, volunteer_id: &str, shift_id: &str) -> RosterResult<Assignment> {
        let assignment = assign_manually(
            volunteer_id,
            shift_id,
            &self.shifts,
            &self.volunteers,
            &self.assignments,
        )?;
        let mut next = self.assignments.clone();
        next.push(assignment.clone());
        self.persist_assignments(&next)?;
        self.assignments = next;

        tracing::info!(volunteer = volunteer_id, shift = shift_id, "manual assignment recorded");
        Ok(assignment)
    }

    /// Creates or overwrites the volunteer's record for that month and week
    pub fn submit_availability(&mut self, availability: Availability) -> RosterResult<()> {
        if !(1..=5).contains(&availability.week) {
            return Err(RosterError::InvalidAvailability(format!(
                "week {} is outside 1-5",
                availability.week
            )));
        }
        if !self.volunteers.iter().any(|v| v.id == availability.volunteer_id) {
            return Err(RosterError::UnknownVolunteer(availability.volunteer_id));
        }

        let mut next: Vec<Availability> = self
            .availabilities
            .iter()
            .filter(|a| {
                !(a.volunteer_id == availability.volunteer_id
                    && a.month == availability.month
                    && a.week == availability.week)
            })
            .cloned()
            .collect();
        next.push(availability);

        if let Some(dir) = &self.data_dir {
            write_availabilities(&dir.join(AVAILABILITY_FILE), &next)?;
        }
        self.availabilities = next;
        Ok(())
    }

    // Callers swap `next` in only after this succeeds, so memory never runs ahead of disk
    fn persist_assignments(&self, next: &[Assignment]) -> RosterResult<()> {
        if let Some(dir) = &self.data_dir {
            write_assignments(&dir.join(ASSIGNMENTS_FILE), next)?;
        }
        Ok(())
    }
}
