use crate::model::{Assignment, Shift, Volunteer, YearMonth};
use crate::notify::plan_summary;

/// Formats a volunteer name with their id, falling back to the bare id for unknown volunteers
pub fn format_volunteer_name(volunteers: &[Volunteer], volunteer_id: &str) -> String {
    match volunteers.iter().find(|v| v.id == volunteer_id) {
        Some(v) if !v.name.is_empty() => format!("{} ({})", v.name, v.id),
        _ => volunteer_id.to_string(),
    }
}

/// One line per shift of the month: time window, location, fill and who was newly added
pub fn format_plan(
    month: YearMonth,
    planned: &[Assignment],
    shifts: &[Shift],
    volunteers: &[Volunteer],
    existing: &[Assignment],
) -> Vec<String> {
    let mut lines = Vec::new();
    for shift in shifts.iter().filter(|s| month.contains(s.date)) {
        let before = existing.iter().filter(|a| a.shift_id == shift.id).count();
        let added: Vec<String> = planned
            .iter()
            .filter(|a| a.shift_id == shift.id)
            .map(|a| format_volunteer_name(volunteers, &a.volunteer_id))
            .collect();

        let mut line = format!(
            "{} {}-{} @ {} [{}/{}]",
            shift.date.format("%a %Y-%m-%d"),
            shift.start_time.format("%H:%M"),
            shift.end_time.format("%H:%M"),
            shift.location_id,
            before + added.len(),
            shift.max_people,
        );
        if !added.is_empty() {
            line.push_str(" + ");
            line.push_str(&added.join(", "));
        }
        lines.push(line);
    }
    lines
}

/// Prints the result of a plan run in a readable format
pub fn print_plan(
    month: YearMonth,
    planned: &[Assignment],
    shifts: &[Shift],
    volunteers: &[Volunteer],
    existing: &[Assignment],
) {
    println!("\n=== Auto-Plan {} ===", month);
    println!("{}", plan_summary(month, planned.len()));

    println!("\nShifts:");
    for line in format_plan(month, planned, shifts, volunteers, existing) {
        println!("  {}", line);
    }

    let still_open: u32 = shifts
        .iter()
        .filter(|s| month.contains(s.date))
        .map(|s| {
            let taken = existing
                .iter()
                .chain(planned.iter())
                .filter(|a| a.shift_id == s.id)
                .count() as u32;
            s.max_people.saturating_sub(taken)
        })
        .sum();
    if still_open > 0 {
        println!("\n⚠️  {} place(s) still open after planning", still_open);
    }
}
