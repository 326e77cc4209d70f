//! The directory walk: countries → cities → stations → playlist.
//!
//! Strictly sequential: one city fetched at a time, one stream resolved
//! at a time. Upstream listing failures abort the run; what happens to
//! a station that will not resolve is a configured policy.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use indicatif::ProgressBar;
use tracing::{info, warn};
use url::Url;

use crate::garden::{ContentDirectory, GardenError, Place};
use crate::playlist::{Playlist, PlaylistError, Track};
use crate::resolver::{RedirectSource, ResolveError, StreamCache, StreamResolver};
use crate::tiles::{self, TileError};

/// What to do with a station whose stream URL cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Log a warning and leave the station out of the playlist.
    #[default]
    Skip,
    /// Abort the whole run; no playlist is written.
    Abort,
}

/// Configuration for a harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Playlist display title.
    pub title: String,
    /// Where the playlist document is written.
    pub output_path: PathBuf,
    /// Root directory for the stream cache namespaces.
    pub cache_dir: PathBuf,
    /// Carto basemap style for thumbnails.
    pub tile_style: String,
    /// Candidate zoom levels for thumbnail selection.
    pub zoom_range: RangeInclusive<u8>,
    /// Policy for unresolvable stations and unusable geo.
    pub unresolved: UnresolvedPolicy,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            title: "Radio Garden".to_string(),
            output_path: PathBuf::from("Radio Garden.xspf"),
            cache_dir: PathBuf::from("cache"),
            tile_style: tiles::DEFAULT_TILE_STYLE.to_string(),
            zoom_range: tiles::DEFAULT_ZOOM_RANGE,
            unresolved: UnresolvedPolicy::Skip,
        }
    }
}

/// Errors from a harvest run.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error(transparent)]
    Garden(#[from] GardenError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Tile(#[from] TileError),

    #[error(transparent)]
    Playlist(#[from] PlaylistError),
}

/// Walks the place directory and assembles the playlist.
pub struct Harvester<D, S> {
    directory: D,
    source: S,
    config: HarvestConfig,
}

impl<D: ContentDirectory, S: RedirectSource + Sync> Harvester<D, S> {
    /// Create a harvester over a content directory and a redirect
    /// source.
    pub fn new(directory: D, source: S, config: HarvestConfig) -> Self {
        Self {
            directory,
            source,
            config,
        }
    }

    /// The run configuration.
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Run the full walk and return the assembled playlist.
    ///
    /// The playlist is only returned if the walk completed under the
    /// configured policy; the caller writes it to disk.
    pub async fn run(&self, progress: &ProgressBar) -> Result<Playlist, HarvestError> {
        let listing = self.directory.places().await?;
        if listing.version.is_empty() {
            return Err(GardenError::MissingVersion.into());
        }

        let countries = group_by_country(listing.places);
        let city_count: usize = countries.values().map(Vec::len).sum();
        info!(
            version = %listing.version,
            countries = countries.len(),
            cities = city_count,
            "fetched places listing"
        );

        let cache = StreamCache::open(&self.config.cache_dir, &listing.version)?;
        let resolver = StreamResolver::new(&self.source, cache);

        let mut playlist = Playlist::new(&self.config.title);
        progress.set_length(city_count as u64);

        for (country, places) in &countries {
            for place in places {
                progress.set_message(country.clone());
                self.harvest_city(country, place, &resolver, &mut playlist)
                    .await?;
                progress.inc(1);
            }
        }

        info!(tracks = playlist.len(), "walk complete");
        Ok(playlist)
    }

    /// Process one city: fetch its channels, resolve every station and
    /// append the resulting tracks.
    async fn harvest_city(
        &self,
        country: &str,
        place: &Place,
        resolver: &StreamResolver<&S>,
        playlist: &mut Playlist,
    ) -> Result<(), HarvestError> {
        let channels = self.directory.channels(&place.id).await?;
        let city = channels.title.as_str();

        let image = match tiles::find_best_zoom(
            place.latitude(),
            place.longitude(),
            self.config.zoom_range.clone(),
        ) {
            Ok(offset) => Some(tiles::thumbnail_url(&self.config.tile_style, &offset.address)),
            Err(e) if self.config.unresolved == UnresolvedPolicy::Abort => return Err(e.into()),
            Err(e) => {
                warn!(place = %place.id, city, error = %e, "unusable geo, dropping thumbnail");
                None
            }
        };

        for station in channels.stations() {
            let Some(station_id) = station_id_from_page_url(&station.url) else {
                warn!(city, url = %station.url, "cannot derive station id, skipping");
                continue;
            };

            let candidate = self.directory.listen_url(&station_id);
            let location = match resolver.resolve(&station_id, &candidate).await {
                Ok(url) => url,
                Err(e) if self.config.unresolved == UnresolvedPolicy::Abort => {
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(station = %station_id, city, error = %e, "unresolvable station, skipping");
                    continue;
                }
            };

            playlist.push(Track {
                location,
                title: station.title.clone(),
                creator: country.to_string(),
                album: city.to_string(),
                image: image.clone(),
            });
        }

        Ok(())
    }
}

/// Group the places listing by country name, countries and cities both
/// in a stable order.
fn group_by_country(places: Vec<Place>) -> BTreeMap<String, Vec<Place>> {
    let mut countries: BTreeMap<String, Vec<Place>> = BTreeMap::new();
    for place in places {
        countries.entry(place.country.clone()).or_default().push(place);
    }
    countries
}

/// Last path segment of a station page URL.
///
/// Accepts both absolute URLs and bare paths; query strings and
/// fragments are not part of the id.
fn station_id_from_page_url(page_url: &str) -> Option<String> {
    let path = match Url::parse(page_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => page_url.to_string(),
    };

    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}
