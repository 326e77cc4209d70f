//! Radio Garden content API: typed client, DTOs and a test mock.
//!
//! The API is a read-only directory of countries, cities and radio
//! stations; this module covers the places and channels endpoints plus
//! construction of the stream-page URLs the resolver follows.

mod client;
mod error;
pub mod mock;
mod types;

pub use client::{ContentDirectory, GardenClient, GardenConfig, PlacesListing};
pub use error::GardenError;
pub use types::{ChannelsResponse, CityChannels, ContentBlock, ContentItem, Place, StationPage};
