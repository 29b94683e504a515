//! Day-dependent pricing and slot selection for the venue detail page.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;
use thiserror::Error;

use crate::models::{TimeSlot, VenueDetail};

/// Number of days offered by the date picker, today included.
pub const BOOKING_WINDOW_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Weekday,
    Weekend,
}

impl DayKind {
    /// Saturday and Sunday are weekend days.
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayKind::Weekend,
            _ => DayKind::Weekday,
        }
    }
}

/// Price tier and slot sequence that apply to one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySchedule<'a> {
    pub date: NaiveDate,
    pub kind: DayKind,
    pub price: u32,
    pub slots: &'a [TimeSlot],
    pub available_count: usize,
    pub booked_count: usize,
}

impl<'a> DaySchedule<'a> {
    pub fn for_date(venue: &'a VenueDetail, date: NaiveDate) -> Self {
        let kind = DayKind::of(date);
        let (price, slots) = match kind {
            DayKind::Weekday => (venue.weekday_price, venue.available_slots.weekday.as_slice()),
            DayKind::Weekend => (venue.weekend_price, venue.available_slots.weekend.as_slice()),
        };
        let available_count = slots.iter().filter(|s| s.available).count();

        Self {
            date,
            kind,
            price,
            slots,
            available_count,
            booked_count: slots.len() - available_count,
        }
    }

    pub fn slot(&self, label: &str) -> Option<&'a TimeSlot> {
        self.slots.iter().find(|s| s.time == label)
    }
}

/// `days` consecutive dates starting at `start`.
pub fn upcoming_dates(start: NaiveDate, days: usize) -> Vec<NaiveDate> {
    (0..days as u64)
        .map_while(|offset| start.checked_add_days(Days::new(offset)))
        .collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("slot {0} is not offered on this day")]
    UnknownSlot(String),

    #[error("slot {0} is already booked")]
    SlotBooked(String),
}

/// What the user has picked on the detail page. Only a selected open slot
/// makes the booking action available; nothing is committed anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSelection {
    date: NaiveDate,
    slot: Option<String>,
}

impl SlotSelection {
    pub fn new(date: NaiveDate) -> Self {
        Self { date, slot: None }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn slot(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    /// Switching dates always clears the chosen slot.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.slot = None;
    }

    pub fn select_slot(&mut self, venue: &VenueDetail, label: &str) -> Result<(), SelectionError> {
        let schedule = DaySchedule::for_date(venue, self.date);
        match schedule.slot(label) {
            None => Err(SelectionError::UnknownSlot(label.to_string())),
            Some(slot) if !slot.available => Err(SelectionError::SlotBooked(label.to_string())),
            Some(slot) => {
                self.slot = Some(slot.time.clone());
                Ok(())
            }
        }
    }

    pub fn can_book(&self) -> bool {
        self.slot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn venue_one() -> VenueDetail {
        Catalog::builtin()
            .expect("fixtures parse")
            .detail("1")
            .cloned()
            .expect("venue 1")
    }

    #[test]
    fn weekend_days() {
        assert_eq!(DayKind::of(date(2026, 10, 17)), DayKind::Weekend); // Saturday
        assert_eq!(DayKind::of(date(2026, 10, 18)), DayKind::Weekend); // Sunday
        assert_eq!(DayKind::of(date(2026, 10, 19)), DayKind::Weekday); // Monday
        assert_eq!(DayKind::of(date(2026, 10, 23)), DayKind::Weekday); // Friday
    }

    #[test]
    fn saturday_uses_weekend_tier() {
        let venue = venue_one();
        let schedule = DaySchedule::for_date(&venue, date(2026, 10, 17));
        assert_eq!(schedule.kind, DayKind::Weekend);
        assert_eq!(schedule.price, 2500);
        assert_eq!(schedule.slot("8-9").map(|s| s.available), Some(true));
    }

    #[test]
    fn weekday_uses_weekday_tier() {
        let venue = venue_one();
        let schedule = DaySchedule::for_date(&venue, date(2026, 10, 20));
        assert_eq!(schedule.price, 2000);
        assert_eq!(schedule.slots, venue.available_slots.weekday.as_slice());
    }

    #[test]
    fn counts_add_up() {
        let venue = venue_one();
        let schedule = DaySchedule::for_date(&venue, date(2026, 10, 20));
        assert_eq!(schedule.available_count, 9);
        assert_eq!(schedule.booked_count, 7);
        assert_eq!(schedule.available_count + schedule.booked_count, schedule.slots.len());
    }

    #[test]
    fn upcoming_dates_cover_a_week() {
        let dates = upcoming_dates(date(2026, 12, 29), BOOKING_WINDOW_DAYS);
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], date(2026, 12, 29));
        assert_eq!(dates[6], date(2027, 1, 4));
    }

    #[test]
    fn only_open_slots_can_be_selected() {
        let venue = venue_one();
        let mut selection = SlotSelection::new(date(2026, 10, 17));

        assert_eq!(
            selection.select_slot(&venue, "6-7"),
            Err(SelectionError::SlotBooked("6-7".to_string()))
        );
        assert!(!selection.can_book());

        selection.select_slot(&venue, "8-9").expect("open slot");
        assert_eq!(selection.slot(), Some("8-9"));
        assert!(selection.can_book());
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let venue = venue_one();
        let mut selection = SlotSelection::new(date(2026, 10, 17));
        assert_eq!(
            selection.select_slot(&venue, "11-12 PM"),
            Err(SelectionError::UnknownSlot("11-12 PM".to_string()))
        );
    }

    #[test]
    fn changing_date_resets_slot() {
        let venue = venue_one();
        let mut selection = SlotSelection::new(date(2026, 10, 17));
        selection.select_slot(&venue, "8-9").expect("open slot");

        selection.select_date(date(2026, 10, 19));
        assert_eq!(selection.slot(), None);
        assert!(!selection.can_book());
        assert_eq!(selection.date(), date(2026, 10, 19));
    }
}
