//! DTOs for the Radio Garden content API.
//!
//! Only the fields the harvest actually consumes are modeled; the API
//! sends plenty more, which serde ignores. Everything below `data` is
//! optional-by-default because city pages routinely omit `content`,
//! `items` or `page` members.

use serde::Deserialize;

/// Response of the places endpoint.
#[derive(Debug, Deserialize)]
pub struct PlacesResponse {
    /// Upstream data version token; namespaces the stream cache.
    #[serde(default)]
    pub version: String,
    pub data: PlacesData,
}

#[derive(Debug, Deserialize)]
pub struct PlacesData {
    pub list: Vec<Place>,
}

/// A city node in the places listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub id: String,
    pub country: String,
    /// `[longitude, latitude]`, as the API sends it.
    pub geo: [f64; 2],
}

impl Place {
    pub fn longitude(&self) -> f64 {
        self.geo[0]
    }

    pub fn latitude(&self) -> f64 {
        self.geo[1]
    }
}

/// Response of the per-place channels endpoint.
#[derive(Debug, Deserialize)]
pub struct ChannelsResponse {
    pub data: CityChannels,
}

/// One city's channel listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CityChannels {
    /// Display title of the city.
    pub title: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    pub page: Option<StationPage>,
}

/// A station entry inside a city's channel listing.
#[derive(Debug, Clone, Deserialize)]
pub struct StationPage {
    pub title: String,
    /// Station page path; its last segment is the station id.
    pub url: String,
}

impl CityChannels {
    /// Iterate over every station page in the listing, flattening the
    /// content/items nesting and skipping entries without a page.
    pub fn stations(&self) -> impl Iterator<Item = &StationPage> {
        self.content
            .iter()
            .flat_map(|block| block.items.iter())
            .filter_map(|item| item.page.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_places_response() {
        let json = r#"{
            "apiVersion": 1,
            "version": "8deccc38",
            "data": {
                "list": [
                    {"id": "abc123", "country": "Germany", "geo": [13.405, 52.52], "size": 5},
                    {"id": "def456", "country": "France", "geo": [2.35, 48.85]}
                ]
            }
        }"#;

        let response: PlacesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.version, "8deccc38");
        assert_eq!(response.data.list.len(), 2);
        assert_eq!(response.data.list[0].country, "Germany");
        assert_eq!(response.data.list[0].longitude(), 13.405);
        assert_eq!(response.data.list[0].latitude(), 52.52);
    }

    #[test]
    fn missing_version_decodes_empty() {
        let json = r#"{"data": {"list": []}}"#;
        let response: PlacesResponse = serde_json::from_str(json).unwrap();
        assert!(response.version.is_empty());
    }

    #[test]
    fn decode_channels_response() {
        let json = r#"{
            "data": {
                "title": "Berlin",
                "content": [
                    {
                        "items": [
                            {"page": {"title": "Radio Eins", "url": "/listen/radio-eins/abc"}},
                            {"href": "/something-else"}
                        ]
                    },
                    {"title": "Picks"}
                ]
            }
        }"#;

        let response: ChannelsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.title, "Berlin");

        let stations: Vec<_> = response.data.stations().collect();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].title, "Radio Eins");
        assert_eq!(stations[0].url, "/listen/radio-eins/abc");
    }

    #[test]
    fn channels_without_content() {
        let json = r#"{"data": {"title": "Quiet Town"}}"#;
        let response: ChannelsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.stations().count(), 0);
    }
}
