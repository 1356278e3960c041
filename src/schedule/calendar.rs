use chrono::{Datelike, NaiveDate, Timelike, Weekday};

use crate::model::{Shift, SlotPreference, YearMonth};

/// Shifts starting at or after this hour count as afternoon shifts
pub const AFTERNOON_START_HOUR: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Afternoon,
}

impl DayPart {
    /// `both` covers either part, `none` covers neither
    pub fn matches(self, slot: SlotPreference) -> bool {
        match slot {
            SlotPreference::Both => true,
            SlotPreference::Morning => self == DayPart::Morning,
            SlotPreference::Afternoon => self == DayPart::Afternoon,
            SlotPreference::None => false,
        }
    }
}

/// Everything the availability check needs to know about a shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftClass {
    pub month: YearMonth,
    pub week: u8,
    pub saturday: bool,
    pub day_part: DayPart,
}

/// Week index within the month: days 1-7 are week 1, 8-14 week 2, and so on
pub fn week_of_month(date: NaiveDate) -> u8 {
    date.day().div_ceil(7) as u8
}

pub fn is_saturday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sat
}

pub fn classify(shift: &Shift) -> ShiftClass {
    let day_part = if shift.start_time.hour() < AFTERNOON_START_HOUR {
        DayPart::Morning
    } else {
        DayPart::Afternoon
    };

    ShiftClass {
        month: YearMonth::of(shift.date),
        week: week_of_month(shift.date),
        saturday: is_saturday(shift.date),
        day_part,
    }
}
