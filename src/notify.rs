use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Assignment, Shift, Volunteer, YearMonth};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    pub fn new(recipient_id: &str, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id: recipient_id.to_string(),
            message,
            created_at: Utc::now(),
            read: false,
        }
    }
}

/// The line a coordinator sees after pressing "Run Auto-Plan"
pub fn plan_summary(month: YearMonth, generated: usize) -> String {
    match generated {
        0 => format!("No assignments generated for {}", month),
        1 => format!("1 assignment generated for {}", month),
        n => format!("{} assignments generated for {}", n, month),
    }
}

/// One notice per volunteer who received new shifts, plus the summary for every coordinator
pub fn plan_notifications(
    month: YearMonth,
    planned: &[Assignment],
    shifts: &[Shift],
    volunteers: &[Volunteer],
) -> Vec<Notification> {
    let mut per_volunteer: BTreeMap<&str, Vec<&Shift>> = BTreeMap::new();
    for assignment in planned {
        if let Some(shift) = shifts.iter().find(|s| s.id == assignment.shift_id) {
            per_volunteer
                .entry(assignment.volunteer_id.as_str())
                .or_default()
                .push(shift);
        }
    }

    let mut notifications: Vec<Notification> = per_volunteer
        .into_iter()
        .map(|(volunteer_id, mut assigned)| {
            assigned.sort_by_key(|s| (s.date, s.start_time));
            let when: Vec<String> = assigned
                .iter()
                .map(|s| format!("{} {}", s.date.format("%a %d %b"), s.start_time.format("%H:%M")))
                .collect();
            let noun = if assigned.len() == 1 { "shift" } else { "shifts" };
            Notification::new(
                volunteer_id,
                format!(
                    "You have {} new {} pending confirmation: {}",
                    assigned.len(),
                    noun,
                    when.join(", ")
                ),
            )
        })
        .collect();

    let summary = plan_summary(month, planned.len());
    notifications.extend(
        volunteers
            .iter()
            .filter(|v| !v.is_standard())
            .map(|v| Notification::new(&v.id, summary.clone())),
    );

    notifications
}
