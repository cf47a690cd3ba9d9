//! Simulated trip catalog.
//!
//! Stands in for the backend the planner would eventually talk to: a
//! configurable delay followed by a fixed set of trips. Fired once at
//! startup, fire-and-forget, with no retry or cancellation.

use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

use crate::models::Trip;

const SEED_TRIPS: &str = include_str!("seed_trips.json");

/// Failure surfaced by [`TripCatalog::fetch`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog payload could not be decoded.
    #[error("malformed trip data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Source of the initial trip collection.
#[derive(Debug, Clone)]
pub struct TripCatalog {
    delay: Duration,
}

impl TripCatalog {
    /// Create a catalog that answers after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Fetch the trip collection, simulating network latency.
    pub async fn fetch(&self) -> Result<Vec<Trip>, CatalogError> {
        sleep(self.delay).await;
        let trips: Vec<Trip> = serde_json::from_str(SEED_TRIPS)?;
        debug!(total = trips.len(), "catalog fetch complete");
        Ok(trips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_returns_seed_trips() -> Result<(), CatalogError> {
        let catalog = TripCatalog::new(Duration::ZERO);
        let trips = catalog.fetch().await?;

        assert_eq!(trips.len(), 3);
        assert_eq!(trips[0].destination, "Paris, France");
        assert_eq!(trips[1].destination, "Tokyo, Japan");
        assert_eq!(trips[2].destination, "New York City, USA");

        assert_eq!(trips[0].activities.len(), 3);
        assert_eq!(trips[0].participants.len(), 4);
        assert!(trips[0].participants[0].is_organizer());

        for trip in &trips {
            assert!(trip.date_range.start <= trip.date_range.end);
            for activity in &trip.activities {
                assert!(trip.date_range.contains(activity.date));
            }
        }
        Ok(())
    }
}
