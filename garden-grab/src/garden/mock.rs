//! In-memory content directory for testing without API access.

use std::collections::HashMap;

use super::client::{ContentDirectory, PlacesListing};
use super::error::GardenError;
use super::types::{CityChannels, Place};

/// Mock content directory serving canned data.
///
/// Mimics the real `GardenClient` interface so walker code can run
/// against it unchanged.
#[derive(Debug, Default)]
pub struct MockDirectory {
    version: String,
    places: Vec<Place>,
    channels: HashMap<String, CityChannels>,
}

impl MockDirectory {
    /// Create a mock directory with the given version token.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            places: Vec::new(),
            channels: HashMap::new(),
        }
    }

    /// Add a place and its channel listing.
    pub fn with_place(mut self, place: Place, channels: CityChannels) -> Self {
        self.channels.insert(place.id.clone(), channels);
        self.places.push(place);
        self
    }
}

impl ContentDirectory for MockDirectory {
    async fn places(&self) -> Result<PlacesListing, GardenError> {
        Ok(PlacesListing {
            version: self.version.clone(),
            places: self.places.clone(),
        })
    }

    async fn channels(&self, place_id: &str) -> Result<CityChannels, GardenError> {
        self.channels
            .get(place_id)
            .cloned()
            .ok_or_else(|| GardenError::Api {
                status: 404,
                message: format!("no mock channels for place {place_id}"),
            })
    }

    fn listen_url(&self, stream_id: &str) -> String {
        format!("mock://listen/{stream_id}/channel.mp3")
    }
}
