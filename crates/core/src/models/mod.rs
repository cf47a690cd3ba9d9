//! Shared domain models.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for a trip.
pub type TripId = i64;
/// Identifier for an activity within a trip.
pub type ActivityId = i64;
/// Identifier for a participant.
pub type ParticipantId = i64;

/// Participant id reserved for the trip organizer.
pub const ORGANIZER_ID: ParticipantId = 1;

/// Stock cover image used when a trip has none of its own.
pub const PLACEHOLDER_COVER: &str = "/api/placeholder/400/160";
/// Stock avatar used for participants without one.
pub const PLACEHOLDER_AVATAR: &str = "/api/placeholder/32/32";

/// Issues timestamp-based ids.
///
/// Ids are millisecond timestamps forced strictly increasing, so two
/// ids issued within the same millisecond never collide.
#[derive(Debug, Clone, Default)]
pub struct IdSource {
    last: i64,
}

impl IdSource {
    /// Issue the next id.
    pub fn next_id(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        self.last
    }
}

/// Inclusive span of days a trip covers.
///
/// `start <= end` is enforced at creation by the trip form validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the trip.
    pub start: NaiveDate,
    /// Last day of the trip.
    pub end: NaiveDate,
}

impl DateRange {
    /// Trip length in days.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the range, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|date| *date <= self.end)
            .collect()
    }
}

/// A planned journey with a date range, activities, and participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    /// Unique identifier.
    pub id: TripId,
    /// Destination label shown throughout the UI.
    pub destination: String,
    /// Travel dates, inclusive on both ends.
    pub date_range: DateRange,
    /// Cover image URL (opaque, never validated).
    pub image: String,
    /// Scheduled activities.
    #[serde(default)]
    pub activities: Vec<Activity>,
    /// People on the trip; [`ORGANIZER_ID`] marks the organizer.
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Trip {
    /// User-facing date summary, e.g. `May 15 - May 22, 2025 · 7 days`.
    pub fn date_label(&self) -> String {
        let days = self.date_range.duration_days();
        let unit = if days == 1 { "day" } else { "days" };
        format!(
            "{} - {} · {} {}",
            self.date_range.start.format("%b %-d"),
            self.date_range.end.format("%b %-d, %Y"),
            days,
            unit
        )
    }
}

/// A scheduled event within a trip, tied to a specific date and time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Unique identifier.
    pub id: ActivityId,
    /// Short human label.
    pub name: String,
    /// Day the activity takes place; inside the parent trip's range.
    pub date: NaiveDate,
    /// Start time.
    pub time: NaiveTime,
    /// Free-form notes, possibly empty.
    #[serde(default)]
    pub notes: String,
}

/// A person associated with a trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Unique identifier; `1` is reserved for the organizer.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Avatar image URL (opaque, never validated).
    pub avatar: String,
}

impl Participant {
    /// Whether this participant organizes the trip.
    ///
    /// The organizer is immutable: the UI never offers removal for it.
    pub fn is_organizer(&self) -> bool {
        self.id == ORGANIZER_ID
    }

    /// Role caption shown next to the name.
    pub fn role_label(&self) -> &'static str {
        if self.is_organizer() {
            "Trip Organizer"
        } else {
            "Participant"
        }
    }
}

/// Payload for creating a trip, produced by the trip form validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripDraft {
    /// Destination label.
    pub destination: String,
    /// Travel dates.
    pub date_range: DateRange,
    /// Cover image URL.
    pub image: String,
}

/// Payload for adding an activity, produced by the activity form validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    /// Short human label.
    pub name: String,
    /// Day of the activity.
    pub date: NaiveDate,
    /// Start time.
    pub time: NaiveTime,
    /// Free-form notes.
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        value.parse().expect("valid test date")
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let mut ids = IdSource::default();
        let mut previous = ids.next_id();
        for _ in 0..100 {
            let next = ids.next_id();
            assert!(next > previous, "{next} should exceed {previous}");
            previous = next;
        }
    }

    #[test]
    fn date_range_helpers() {
        let range = DateRange {
            start: date("2025-05-15"),
            end: date("2025-05-22"),
        };
        assert_eq!(range.duration_days(), 7);
        assert!(range.contains(date("2025-05-15")));
        assert!(range.contains(date("2025-05-22")));
        assert!(!range.contains(date("2025-05-23")));

        let dates = range.dates();
        assert_eq!(dates.len(), 8);
        assert_eq!(dates[0], range.start);
        assert_eq!(dates[7], range.end);
    }

    #[test]
    fn organizer_role() {
        let organizer = Participant {
            id: ORGANIZER_ID,
            name: "Alex Johnson".to_string(),
            avatar: PLACEHOLDER_AVATAR.to_string(),
        };
        let guest = Participant {
            id: 2,
            name: "Maria Garcia".to_string(),
            avatar: PLACEHOLDER_AVATAR.to_string(),
        };
        assert_eq!(organizer.role_label(), "Trip Organizer");
        assert_eq!(guest.role_label(), "Participant");
    }
}
