#![allow(missing_docs)]

//! Validation for the create-trip and add-activity forms.
//!
//! The forms hold raw strings exactly as typed. Validation parses and
//! checks every field at once, so the UI can render a message under
//! each violating field instead of stopping at the first problem.

use chrono::{NaiveDate, NaiveTime};

use crate::models::{ActivityDraft, DateRange, TripDraft, PLACEHOLDER_COVER};

/// Raw input backing the create-trip modal.
#[derive(Debug, Clone, Default)]
pub struct TripForm {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub image: String,
}

/// Per-field messages for [`TripForm`]. `None` means the field is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripFormErrors {
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TripFormErrors {
    pub fn is_empty(&self) -> bool {
        self.destination.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }
}

impl TripForm {
    /// Validate the form, producing a draft or the full set of errors.
    pub fn validate(&self) -> Result<TripDraft, TripFormErrors> {
        let mut errors = TripFormErrors::default();

        if self.destination.trim().is_empty() {
            errors.destination = Some("Destination is required".to_string());
        }

        let start = parse_date_field(&self.start_date, "Start date", &mut errors.start_date);
        let end = parse_date_field(&self.end_date, "End date", &mut errors.end_date);

        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.end_date = Some("End date must be after start date".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let image = match self.image.trim() {
            "" => PLACEHOLDER_COVER.to_string(),
            url => url.to_string(),
        };

        match (start, end) {
            (Some(start), Some(end)) => Ok(TripDraft {
                destination: self.destination.trim().to_string(),
                date_range: DateRange { start, end },
                image,
            }),
            _ => Err(errors),
        }
    }
}

/// Raw input backing the add-activity modal.
#[derive(Debug, Clone, Default)]
pub struct ActivityForm {
    pub name: String,
    pub date: String,
    pub time: String,
    pub notes: String,
}

/// Per-field messages for [`ActivityForm`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFormErrors {
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl ActivityFormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.date.is_none() && self.time.is_none()
    }
}

impl ActivityForm {
    /// Validate against the owning trip's dates.
    pub fn validate(&self, range: &DateRange) -> Result<ActivityDraft, ActivityFormErrors> {
        let mut errors = ActivityFormErrors::default();

        if self.name.trim().is_empty() {
            errors.name = Some("Activity name is required".to_string());
        }

        let date = if self.date.trim().is_empty() {
            errors.date = Some("Date is required".to_string());
            None
        } else {
            match parse_date(&self.date) {
                Some(date) if range.contains(date) => Some(date),
                Some(_) => {
                    errors.date = Some("Date must fall within the trip dates".to_string());
                    None
                }
                None => {
                    errors.date = Some("Enter a date as YYYY-MM-DD".to_string());
                    None
                }
            }
        };

        let time = if self.time.trim().is_empty() {
            errors.time = Some("Time is required".to_string());
            None
        } else {
            match parse_time(&self.time) {
                Some(time) => Some(time),
                None => {
                    errors.time = Some("Enter a time as HH:MM".to_string());
                    None
                }
            }
        };

        match (date, time) {
            (Some(date), Some(time)) if errors.is_empty() => Ok(ActivityDraft {
                name: self.name.trim().to_string(),
                date,
                time,
                notes: self.notes.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }
}

fn parse_date_field(raw: &str, label: &str, slot: &mut Option<String>) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        *slot = Some(format!("{label} is required"));
        return None;
    }
    match parse_date(raw) {
        Some(date) => Some(date),
        None => {
            *slot = Some("Enter a date as YYYY-MM-DD".to_string());
            None
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip_range() -> DateRange {
        DateRange {
            start: "2025-05-15".parse().expect("valid start date"),
            end: "2025-05-22".parse().expect("valid end date"),
        }
    }

    #[test]
    fn trip_form_accepts_valid_input() {
        let form = TripForm {
            destination: "Paris, France".to_string(),
            start_date: "2025-05-15".to_string(),
            end_date: "2025-05-22".to_string(),
            image: String::new(),
        };
        let draft = form.validate().expect("form should validate");
        assert_eq!(draft.destination, "Paris, France");
        assert_eq!(draft.date_range, trip_range());
        assert_eq!(draft.image, PLACEHOLDER_COVER);
    }

    #[test]
    fn trip_form_rejects_end_before_start() {
        let form = TripForm {
            destination: "Paris, France".to_string(),
            start_date: "2025-05-22".to_string(),
            end_date: "2025-05-15".to_string(),
            image: String::new(),
        };
        let errors = form.validate().expect_err("end precedes start");
        assert_eq!(
            errors.end_date.as_deref(),
            Some("End date must be after start date")
        );
        assert!(errors.destination.is_none());
        assert!(errors.start_date.is_none());
    }

    #[test]
    fn trip_form_reports_every_missing_field() {
        let errors = TripForm::default().validate().expect_err("all blank");
        assert_eq!(errors.destination.as_deref(), Some("Destination is required"));
        assert_eq!(errors.start_date.as_deref(), Some("Start date is required"));
        assert_eq!(errors.end_date.as_deref(), Some("End date is required"));
    }

    #[test]
    fn trip_form_rejects_unparseable_dates() {
        let form = TripForm {
            destination: "Paris, France".to_string(),
            start_date: "15/05/2025".to_string(),
            end_date: "2025-05-22".to_string(),
            image: String::new(),
        };
        let errors = form.validate().expect_err("bad start date");
        assert_eq!(
            errors.start_date.as_deref(),
            Some("Enter a date as YYYY-MM-DD")
        );
    }

    #[test]
    fn trip_form_keeps_custom_image() {
        let form = TripForm {
            destination: "Paris, France".to_string(),
            start_date: "2025-05-15".to_string(),
            end_date: "2025-05-22".to_string(),
            image: "  http://example.com/eiffel.jpg ".to_string(),
        };
        let draft = form.validate().expect("form should validate");
        assert_eq!(draft.image, "http://example.com/eiffel.jpg");
    }

    #[test]
    fn same_day_trip_is_allowed() {
        let form = TripForm {
            destination: "Paris, France".to_string(),
            start_date: "2025-05-15".to_string(),
            end_date: "2025-05-15".to_string(),
            image: String::new(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn activity_form_accepts_populated_in_range_input() {
        let form = ActivityForm {
            name: "Louvre Museum".to_string(),
            date: "2025-05-16".to_string(),
            time: "14:00".to_string(),
            notes: "Book tickets ahead".to_string(),
        };
        let draft = form.validate(&trip_range()).expect("form should validate");
        assert_eq!(draft.name, "Louvre Museum");
        assert_eq!(draft.time.to_string(), "14:00:00");
        assert_eq!(draft.notes, "Book tickets ahead");
    }

    #[test]
    fn activity_form_reports_every_missing_field() {
        let errors = ActivityForm::default()
            .validate(&trip_range())
            .expect_err("all blank");
        assert_eq!(errors.name.as_deref(), Some("Activity name is required"));
        assert_eq!(errors.date.as_deref(), Some("Date is required"));
        assert_eq!(errors.time.as_deref(), Some("Time is required"));
    }

    #[test]
    fn activity_form_rejects_date_outside_trip() {
        let form = ActivityForm {
            name: "Louvre Museum".to_string(),
            date: "2025-06-01".to_string(),
            time: "14:00".to_string(),
            notes: String::new(),
        };
        let errors = form.validate(&trip_range()).expect_err("date out of range");
        assert_eq!(
            errors.date.as_deref(),
            Some("Date must fall within the trip dates")
        );
    }

    #[test]
    fn activity_form_accepts_times_with_seconds() {
        let form = ActivityForm {
            name: "Louvre Museum".to_string(),
            date: "2025-05-16".to_string(),
            time: "14:00:30".to_string(),
            notes: String::new(),
        };
        assert!(form.validate(&trip_range()).is_ok());
    }
}
