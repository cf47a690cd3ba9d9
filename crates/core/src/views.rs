//! Pure derived views over the trip collection.
//!
//! Nothing here mutates state; every function takes the trips and a
//! reference date and computes what a pane displays.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{Activity, Trip};

/// Status facet of the trip list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every trip.
    #[default]
    All,
    /// Trips whose end date is on or after the reference date.
    Upcoming,
    /// Trips whose end date is strictly before the reference date.
    Past,
}

impl StatusFilter {
    /// Label shown in the list header.
    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All Trips",
            StatusFilter::Upcoming => "Upcoming",
            StatusFilter::Past => "Past",
        }
    }

    /// The next facet in the cycle All → Upcoming → Past → All.
    pub fn cycle(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Upcoming,
            StatusFilter::Upcoming => StatusFilter::Past,
            StatusFilter::Past => StatusFilter::All,
        }
    }
}

/// Combined search and status predicate for the trip list.
#[derive(Debug, Clone, Default)]
pub struct TripQuery {
    /// Case-insensitive substring matched against the destination.
    pub search: String,
    /// Status facet.
    pub status: StatusFilter,
}

impl TripQuery {
    /// Whether `trip` passes both facets relative to `today`.
    pub fn matches(&self, trip: &Trip, today: NaiveDate) -> bool {
        let matches_search = trip
            .destination
            .to_lowercase()
            .contains(&self.search.to_lowercase());

        let is_past = trip.date_range.end < today;
        let matches_status = match self.status {
            StatusFilter::All => true,
            StatusFilter::Upcoming => !is_past,
            StatusFilter::Past => is_past,
        };

        matches_search && matches_status
    }
}

/// Trips passing `query`, in collection order.
pub fn filter_trips<'a>(trips: &'a [Trip], query: &TripQuery, today: NaiveDate) -> Vec<&'a Trip> {
    trips
        .iter()
        .filter(|trip| query.matches(trip, today))
        .collect()
}

/// A trip's activities partitioned by day.
///
/// Keys ascend; within a day the trip's own ordering is preserved, and
/// every activity appears exactly once.
pub fn group_activities(trip: &Trip) -> BTreeMap<NaiveDate, Vec<&Activity>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&Activity>> = BTreeMap::new();
    for activity in &trip.activities {
        grouped.entry(activity.date).or_default().push(activity);
    }
    grouped
}

/// Status chip text for a trip row.
pub fn trip_status_label(trip: &Trip, today: NaiveDate) -> &'static str {
    if trip.date_range.end < today {
        "Completed"
    } else {
        "Upcoming"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, DateRange};
    use chrono::NaiveTime;

    fn date(value: &str) -> NaiveDate {
        value.parse().expect("valid test date")
    }

    fn time(value: &str) -> NaiveTime {
        value.parse().expect("valid test time")
    }

    fn trip(id: i64, destination: &str, start: &str, end: &str) -> Trip {
        Trip {
            id,
            destination: destination.to_string(),
            date_range: DateRange {
                start: date(start),
                end: date(end),
            },
            image: String::new(),
            activities: Vec::new(),
            participants: Vec::new(),
        }
    }

    fn activity(id: i64, name: &str, day: &str, at: &str) -> Activity {
        Activity {
            id,
            name: name.to_string(),
            date: date(day),
            time: time(at),
            notes: String::new(),
        }
    }

    #[test]
    fn upcoming_filter_keeps_only_future_end_dates() {
        let trips = vec![
            trip(1, "Paris, France", "2025-05-15", "2025-05-22"),
            trip(2, "Tokyo, Japan", "2025-06-10", "2025-06-18"),
            trip(3, "New York City, USA", "2025-07-05", "2025-07-10"),
        ];
        let today = date("2025-06-01");

        let query = TripQuery {
            search: String::new(),
            status: StatusFilter::Upcoming,
        };
        let upcoming = filter_trips(&trips, &query, today);
        assert_eq!(
            upcoming.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![2, 3]
        );

        let query = TripQuery {
            search: String::new(),
            status: StatusFilter::Past,
        };
        let past = filter_trips(&trips, &query, today);
        assert_eq!(past.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn trip_ending_today_counts_as_upcoming() {
        let trips = vec![trip(1, "Paris, France", "2025-05-15", "2025-05-22")];
        let query = TripQuery {
            search: String::new(),
            status: StatusFilter::Upcoming,
        };
        assert_eq!(filter_trips(&trips, &query, date("2025-05-22")).len(), 1);
        assert_eq!(filter_trips(&trips, &query, date("2025-05-23")).len(), 0);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let trips = vec![
            trip(1, "Paris, France", "2025-05-15", "2025-05-22"),
            trip(2, "Tokyo, Japan", "2025-06-10", "2025-06-18"),
        ];
        let today = date("2025-01-01");

        let query = TripQuery {
            search: "TOKYO".to_string(),
            status: StatusFilter::All,
        };
        let hits = filter_trips(&trips, &query, today);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);

        let query = TripQuery {
            search: "france".to_string(),
            status: StatusFilter::All,
        };
        assert_eq!(filter_trips(&trips, &query, today).len(), 1);
    }

    #[test]
    fn search_and_status_combine() {
        let trips = vec![
            trip(1, "Paris, France", "2025-05-15", "2025-05-22"),
            trip(2, "Paris, Texas", "2025-07-01", "2025-07-04"),
        ];
        let query = TripQuery {
            search: "paris".to_string(),
            status: StatusFilter::Upcoming,
        };
        let hits = filter_trips(&trips, &query, date("2025-06-01"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn grouping_preserves_every_activity_once_with_sorted_keys() {
        let mut subject = trip(1, "Paris, France", "2025-05-15", "2025-05-22");
        subject.activities = vec![
            activity(103, "Seine River Cruise", "2025-05-17", "19:00:00"),
            activity(101, "Eiffel Tower Visit", "2025-05-16", "10:00:00"),
            activity(102, "Louvre Museum", "2025-05-16", "14:00:00"),
        ];

        let grouped = group_activities(&subject);
        let keys: Vec<NaiveDate> = grouped.keys().copied().collect();
        assert_eq!(keys, vec![date("2025-05-16"), date("2025-05-17")]);

        let total: usize = grouped.values().map(Vec::len).sum();
        assert_eq!(total, subject.activities.len());

        // Insertion order within a day is kept.
        let day_one = &grouped[&date("2025-05-16")];
        assert_eq!(day_one[0].id, 101);
        assert_eq!(day_one[1].id, 102);
    }

    #[test]
    fn status_chip_labels() {
        let subject = trip(1, "Paris, France", "2025-05-15", "2025-05-22");
        assert_eq!(trip_status_label(&subject, date("2025-05-01")), "Upcoming");
        assert_eq!(trip_status_label(&subject, date("2025-06-01")), "Completed");
    }
}
