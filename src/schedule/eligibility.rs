use crate::model::{Availability, SlotPreference};

use super::calendar::ShiftClass;

/// Availability that applies to one volunteer for one shift's week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityPolicy {
    Recorded {
        slot: SlotPreference,
        saturday_available: bool,
    },
    /// Nothing was submitted for the week: weekdays yes, Saturdays no
    NoRecord,
}

impl AvailabilityPolicy {
    /// Finds the first record for this volunteer in the shift's month and week
    pub fn lookup(availabilities: &[Availability], volunteer_id: &str, class: &ShiftClass) -> Self {
        availabilities
            .iter()
            .find(|a| a.volunteer_id == volunteer_id && a.month == class.month && a.week == class.week)
            .map(|a| AvailabilityPolicy::Recorded {
                slot: a.slot,
                saturday_available: a.saturday_available,
            })
            .unwrap_or(AvailabilityPolicy::NoRecord)
    }

    pub fn allows(&self, class: &ShiftClass) -> bool {
        match *self {
            AvailabilityPolicy::Recorded {
                slot,
                saturday_available,
            } => {
                if class.saturday && !saturday_available {
                    return false;
                }
                class.day_part.matches(slot)
            }
            AvailabilityPolicy::NoRecord => !class.saturday,
        }
    }
}
