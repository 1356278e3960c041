use crate::error::{RosterError, RosterResult};
use crate::model::{Assignment, AssignmentStatus, Shift, Volunteer};

/// Coordinator assignment: confirmed immediately, bypassing availability and role checks.
/// Still refuses to overfill a shift or to put the same volunteer on it twice.
pub fn assign_manually(
    volunteer_id: &str,
    shift_id: &str,
    shifts: &[Shift],
    volunteers: &[Volunteer],
    existing_assignments: &[Assignment],
) -> RosterResult<Assignment> {
    if !volunteers.iter().any(|v| v.id == volunteer_id) {
        return Err(RosterError::UnknownVolunteer(volunteer_id.to_string()));
    }
    let shift = shifts
        .iter()
        .find(|s| s.id == shift_id)
        .ok_or_else(|| RosterError::UnknownShift(shift_id.to_string()))?;

    let on_shift: Vec<&Assignment> = existing_assignments
        .iter()
        .filter(|a| a.shift_id == shift_id)
        .collect();

    if on_shift.iter().any(|a| a.volunteer_id == volunteer_id) {
        return Err(RosterError::AlreadyAssigned {
            volunteer_id: volunteer_id.to_string(),
            shift_id: shift_id.to_string(),
        });
    }
    if on_shift.len() >= shift.max_people as usize {
        return Err(RosterError::ShiftFull(shift_id.to_string()));
    }

    Ok(Assignment::new(volunteer_id, shift_id, AssignmentStatus::Confirmed))
}
