//! Calendar features derived from the inference timestamp

use chrono::{Datelike, NaiveDateTime, Timelike};

use super::layout::CALENDAR_FEATURES;
use crate::constants::{BUSINESS_HOURS_END, BUSINESS_HOURS_START};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    pub hour: u32,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    pub month: u32,
    pub is_weekend: bool,
    pub is_business_hours: bool,
}

impl CalendarFeatures {
    pub fn from_timestamp(timestamp: &NaiveDateTime) -> Self {
        let hour = timestamp.hour();
        let day_of_week = timestamp.weekday().num_days_from_monday();

        Self {
            hour,
            day_of_week,
            month: timestamp.month(),
            is_weekend: day_of_week >= 5,
            is_business_hours: (BUSINESS_HOURS_START..=BUSINESS_HOURS_END).contains(&hour),
        }
    }

    /// Values in `CALENDAR_FEATURES` order
    pub fn to_array(&self) -> [f64; CALENDAR_FEATURES.len()] {
        [
            self.hour as f64,
            self.day_of_week as f64,
            self.month as f64,
            if self.is_weekend { 1.0 } else { 0.0 },
            if self.is_business_hours { 1.0 } else { 0.0 },
        ]
    }
}
