use std::collections::{HashMap, HashSet};

use crate::model::{Assignment, AssignmentStatus, Availability, Shift, Volunteer, YearMonth};

use super::calendar::classify;
use super::eligibility::AvailabilityPolicy;

/// Fills open capacity on every shift in `target_month` with eligible, least-loaded volunteers.
///
/// Shifts are visited in the order given, so reordering the input can change who lands where.
/// Running load starts from each volunteer's existing assignments across all months and grows
/// as the run hands out new shifts. Returns only the newly created `pending` assignments; the
/// caller merges and persists them.
pub fn run_auto_plan(
    target_month: YearMonth,
    shifts: &[Shift],
    volunteers: &[Volunteer],
    existing_assignments: &[Assignment],
    availabilities: &[Availability],
) -> Vec<Assignment> {
    let month_shifts: Vec<&Shift> = shifts
        .iter()
        .filter(|s| target_month.contains(s.date))
        .collect();

    let mut load: HashMap<&str, usize> = HashMap::new();
    for assignment in existing_assignments {
        *load.entry(assignment.volunteer_id.as_str()).or_insert(0) += 1;
    }

    // (volunteer, shift) pairs already taken, existing or added this run
    let mut taken: HashSet<(String, String)> = existing_assignments
        .iter()
        .map(|a| (a.volunteer_id.clone(), a.shift_id.clone()))
        .collect();

    let mut fill: HashMap<&str, usize> = HashMap::new();
    for assignment in existing_assignments {
        *fill.entry(assignment.shift_id.as_str()).or_insert(0) += 1;
    }

    let mut added = Vec::new();

    for shift in month_shifts {
        let filled = fill.get(shift.id.as_str()).copied().unwrap_or(0);
        let max_people = shift.max_people as usize;
        if filled >= max_people {
            tracing::debug!(shift = %shift.id, filled, max_people, "shift already full");
            continue;
        }

        let class = classify(shift);

        let mut candidates: Vec<&Volunteer> = volunteers
            .iter()
            .filter(|v| v.is_standard())
            .filter(|v| !taken.contains(&(v.id.clone(), shift.id.clone())))
            .filter(|v| AvailabilityPolicy::lookup(availabilities, &v.id, &class).allows(&class))
            .collect();

        // Stable, so equal loads keep roster order
        candidates.sort_by_key(|v| load.get(v.id.as_str()).copied().unwrap_or(0));

        let remaining = max_people - filled;
        let mut placed = 0;
        for volunteer in candidates.into_iter().take(remaining) {
            added.push(Assignment::new(&volunteer.id, &shift.id, AssignmentStatus::Pending));
            *load.entry(volunteer.id.as_str()).or_insert(0) += 1;
            taken.insert((volunteer.id.clone(), shift.id.clone()));
            placed += 1;
        }
        *fill.entry(shift.id.as_str()).or_insert(0) += placed;

        tracing::debug!(shift = %shift.id, placed, open = remaining - placed, "shift planned");
    }

    tracing::info!(month = %target_month, generated = added.len(), "auto-plan finished");
    added
}
