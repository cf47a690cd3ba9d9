//! In-memory application state: the trip collection and the selection.

use crate::models::{
    Activity, ActivityDraft, ActivityId, IdSource, Participant, Trip, TripDraft, TripId,
    ORGANIZER_ID, PLACEHOLDER_AVATAR,
};

/// Owns the trip list, the current selection, and the detail-pane flag.
///
/// Every operation is synchronous and total: unknown ids are no-ops and
/// nothing here can fail. State lives only in memory and is rebuilt from
/// the catalog on every launch.
#[derive(Debug, Default)]
pub struct TripStore {
    trips: Vec<Trip>,
    selected: Option<TripId>,
    detail_open: bool,
    ids: IdSource,
    organizer: String,
}

impl TripStore {
    /// Create an empty store. `organizer` becomes participant 1 on every
    /// trip created through [`TripStore::add_trip`].
    pub fn new(organizer: impl Into<String>) -> Self {
        Self {
            organizer: organizer.into(),
            ..Self::default()
        }
    }

    /// Install the fetched trip collection, replacing whatever is held.
    ///
    /// A selection pointing at a trip that is no longer present is
    /// cleared along with the detail pane.
    pub fn set_trips(&mut self, trips: Vec<Trip>) {
        self.trips = trips;
        if let Some(id) = self.selected {
            if self.trip(id).is_none() {
                self.selected = None;
                self.detail_open = false;
            }
        }
    }

    /// Append a new trip with a generated id and the organizer as its
    /// sole participant. Returns the id.
    pub fn add_trip(&mut self, draft: TripDraft) -> TripId {
        let id = self.ids.next_id();
        self.trips.push(Trip {
            id,
            destination: draft.destination,
            date_range: draft.date_range,
            image: draft.image,
            activities: Vec::new(),
            participants: vec![Participant {
                id: ORGANIZER_ID,
                name: self.organizer.clone(),
                avatar: PLACEHOLDER_AVATAR.to_string(),
            }],
        });
        id
    }

    /// Replace the trip carrying `updated.id`. Unknown ids are ignored.
    ///
    /// The selection is held by id, so an update to the selected trip is
    /// visible through [`TripStore::selected_trip`] with no extra step.
    pub fn update_trip(&mut self, updated: Trip) {
        if let Some(slot) = self.trips.iter_mut().find(|trip| trip.id == updated.id) {
            *slot = updated;
        }
    }

    /// Remove the trip with `id`. Deleting the selected trip clears the
    /// selection and closes the detail pane.
    pub fn delete_trip(&mut self, id: TripId) {
        self.trips.retain(|trip| trip.id != id);
        if self.selected == Some(id) {
            self.selected = None;
            self.detail_open = false;
        }
    }

    /// Select the trip with `id` and open the detail pane. Unknown ids
    /// leave the current selection untouched.
    pub fn select_trip(&mut self, id: TripId) {
        if self.trip(id).is_some() {
            self.selected = Some(id);
            self.detail_open = true;
        }
    }

    /// Close the detail pane, keeping the selection.
    pub fn close_detail(&mut self) {
        self.detail_open = false;
    }

    /// Flip the detail pane open or closed.
    pub fn toggle_detail(&mut self) {
        self.detail_open = !self.detail_open;
    }

    /// Append an activity to the trip with `trip_id`, generating its id.
    /// Goes through the replace-by-id path, like the activity form it
    /// serves. Returns `None` when the trip does not exist.
    pub fn add_activity(&mut self, trip_id: TripId, draft: ActivityDraft) -> Option<ActivityId> {
        let mut updated = self.trip(trip_id)?.clone();
        let id = self.ids.next_id();
        updated.activities.push(Activity {
            id,
            name: draft.name,
            date: draft.date,
            time: draft.time,
            notes: draft.notes,
        });
        self.update_trip(updated);
        Some(id)
    }

    /// All trips in insertion order.
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// Look up a trip by id.
    pub fn trip(&self, id: TripId) -> Option<&Trip> {
        self.trips.iter().find(|trip| trip.id == id)
    }

    /// Id of the selected trip, if any.
    pub fn selected_id(&self) -> Option<TripId> {
        self.selected
    }

    /// The selected trip, if any.
    pub fn selected_trip(&self) -> Option<&Trip> {
        self.selected.and_then(|id| self.trip(id))
    }

    /// Whether the detail pane is open.
    pub fn detail_open(&self) -> bool {
        self.detail_open
    }

    /// Number of trips held.
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    /// Whether the store holds no trips.
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateRange;
    use chrono::NaiveDate;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange {
            start: start.parse().expect("valid start date"),
            end: end.parse().expect("valid end date"),
        }
    }

    fn draft(destination: &str) -> TripDraft {
        TripDraft {
            destination: destination.to_string(),
            date_range: range("2025-05-15", "2025-05-22"),
            image: "/api/placeholder/400/160".to_string(),
        }
    }

    #[test]
    fn add_trip_grows_collection_and_is_retrievable() {
        let mut store = TripStore::new("Alex Johnson");
        assert!(store.is_empty());

        let id = store.add_trip(draft("Paris, France"));
        assert_eq!(store.len(), 1);

        let trip = store.trip(id).expect("trip should be retrievable by id");
        assert_eq!(trip.destination, "Paris, France");
        assert!(trip.activities.is_empty());
        assert_eq!(trip.participants.len(), 1);
        assert!(trip.participants[0].is_organizer());
        assert_eq!(trip.participants[0].name, "Alex Johnson");
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut store = TripStore::new("Alex Johnson");
        let first = store.add_trip(draft("Paris, France"));
        let second = store.add_trip(draft("Tokyo, Japan"));
        assert!(second > first);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn deleting_selected_trip_clears_selection() {
        let mut store = TripStore::new("Alex Johnson");
        let id = store.add_trip(draft("Paris, France"));
        store.select_trip(id);
        assert_eq!(store.selected_id(), Some(id));
        assert!(store.detail_open());

        store.delete_trip(id);
        assert!(store.is_empty());
        assert_eq!(store.selected_id(), None);
        assert!(!store.detail_open());
    }

    #[test]
    fn deleting_another_trip_keeps_selection() {
        let mut store = TripStore::new("Alex Johnson");
        let kept = store.add_trip(draft("Paris, France"));
        let removed = store.add_trip(draft("Tokyo, Japan"));
        store.select_trip(kept);

        store.delete_trip(removed);
        assert_eq!(store.selected_id(), Some(kept));
        assert!(store.detail_open());
    }

    #[test]
    fn update_replaces_by_id_and_reflects_in_selection() {
        let mut store = TripStore::new("Alex Johnson");
        let id = store.add_trip(draft("Paris, France"));
        store.select_trip(id);

        let mut updated = store.trip(id).expect("trip exists").clone();
        updated.destination = "Lyon, France".to_string();
        store.update_trip(updated);

        let selected = store.selected_trip().expect("selection still present");
        assert_eq!(selected.destination, "Lyon, France");
    }

    #[test]
    fn update_with_unknown_id_is_a_no_op() {
        let mut store = TripStore::new("Alex Johnson");
        let id = store.add_trip(draft("Paris, France"));

        let mut ghost = store.trip(id).expect("trip exists").clone();
        ghost.id = id + 1;
        ghost.destination = "Nowhere".to_string();
        store.update_trip(ghost);

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.trip(id).expect("trip kept").destination,
            "Paris, France"
        );
    }

    #[test]
    fn select_unknown_id_is_a_no_op() {
        let mut store = TripStore::new("Alex Johnson");
        let id = store.add_trip(draft("Paris, France"));
        store.select_trip(id + 1);
        assert_eq!(store.selected_id(), None);
        assert!(!store.detail_open());
    }

    #[test]
    fn close_and_toggle_detail() {
        let mut store = TripStore::new("Alex Johnson");
        let id = store.add_trip(draft("Paris, France"));
        store.select_trip(id);
        assert!(store.detail_open());

        store.close_detail();
        assert!(!store.detail_open());
        assert_eq!(store.selected_id(), Some(id));

        store.toggle_detail();
        assert!(store.detail_open());
    }

    #[test]
    fn add_activity_appends_through_the_store() {
        let mut store = TripStore::new("Alex Johnson");
        let id = store.add_trip(draft("Paris, France"));
        let activity = ActivityDraft {
            name: "Louvre Museum".to_string(),
            date: "2025-05-16".parse::<NaiveDate>().expect("valid date"),
            time: "14:00:00".parse().expect("valid time"),
            notes: String::new(),
        };

        let activity_id = store
            .add_activity(id, activity.clone())
            .expect("trip exists");
        let trip = store.trip(id).expect("trip exists");
        assert_eq!(trip.activities.len(), 1);
        assert_eq!(trip.activities[0].id, activity_id);
        assert_eq!(trip.activities[0].name, "Louvre Museum");

        assert_eq!(store.add_activity(id + 1, activity), None);
    }

    #[test]
    fn set_trips_clears_stale_selection() {
        let mut store = TripStore::new("Alex Johnson");
        let id = store.add_trip(draft("Paris, France"));
        store.select_trip(id);

        store.set_trips(Vec::new());
        assert_eq!(store.selected_id(), None);
        assert!(!store.detail_open());
    }
}
