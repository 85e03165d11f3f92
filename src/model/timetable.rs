use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Day names exactly as the timetable table stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl From<NaiveDate> for DayOfWeek {
    fn from(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

/// Portion of a day covered by a leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveWindow {
    FullDay,
    HalfMorning,
    HalfAfternoon,
}

impl LeaveWindow {
    /// Whether a lecture starting at `start_time` falls inside this window.
    /// Morning is strictly before `boundary`, afternoon is at or after it.
    pub fn covers(self, start_time: NaiveTime, boundary: NaiveTime) -> bool {
        match self {
            LeaveWindow::FullDay => true,
            LeaveWindow::HalfMorning => start_time < boundary,
            LeaveWindow::HalfAfternoon => start_time >= boundary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableSlot {
    pub id: u64,
    pub faculty_id: u64,
    pub class_id: u64,
    pub subject_id: u64,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub room_no: Option<String>,
    pub batch_id: Option<u64>,
}

impl TimetableSlot {
    /// Inclusive on both ends.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_to
    }

    /// True when this slot is a commitment at `day`/`start_time` on `date`.
    pub fn occupies(&self, day: DayOfWeek, start_time: NaiveTime, date: NaiveDate) -> bool {
        self.day_of_week == day && self.start_time == start_time && self.is_valid_on(date)
    }
}

/// A slot joined with the labels needed for activity-log text.
#[derive(Debug, Clone)]
pub struct SlotDetail {
    pub slot: TimetableSlot,
    pub class_name: String,
    pub subject_name: String,
}
