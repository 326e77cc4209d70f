//! Slippy-map tile coordinates for station thumbnails.
//!
//! Each track in the output playlist carries a small map image of the
//! station's city, served by the Carto basemap CDN. This module maps a
//! (latitude, longitude) pair to the Web Mercator tile containing it,
//! and can pick the zoom level that centers the point best within its
//! tile.

use std::fmt;
use std::ops::RangeInclusive;

/// Tile edge length in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Largest latitude representable in Web Mercator. Beyond this the
/// projection formula leaves the `[0, 2^zoom)` tile range.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Zoom levels scanned when choosing a thumbnail.
pub const DEFAULT_ZOOM_RANGE: RangeInclusive<u8> = 6..=11;

/// Errors from tile coordinate computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TileError {
    /// Latitude outside the Web Mercator range (or NaN).
    #[error("latitude {0} outside Web Mercator range (|lat| < {MAX_LATITUDE})")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180] (or NaN).
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    /// `find_best_zoom` was given an empty zoom range.
    #[error("no candidate zoom levels to choose from")]
    NoCandidateZoom,
}

/// Address of a single map tile.
///
/// Invariant: `x` and `y` are always within `[0, 2^zoom)`. Construction
/// goes through [`to_tile`], which validates its inputs, so any
/// `TileAddress` value is valid by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileAddress {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// A tile address together with the pixel position of the point inside
/// the tile, in `[0, 256)` on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileOffset {
    pub address: TileAddress,
    pub pixel_x: f64,
    pub pixel_y: f64,
}

impl TileOffset {
    /// Squared pixel distance from the tile center.
    fn center_distance_sq(&self) -> f64 {
        let half = TILE_SIZE / 2.0;
        let dx = self.pixel_x - half;
        let dy = self.pixel_y - half;
        dx * dx + dy * dy
    }
}

/// Fractional tile coordinates for a point, after input validation.
fn to_tile_fractional(lat_deg: f64, lon_deg: f64, zoom: u8) -> Result<(f64, f64), TileError> {
    if !(lat_deg.abs() < MAX_LATITUDE) {
        return Err(TileError::LatitudeOutOfRange(lat_deg));
    }
    if !(lon_deg.abs() <= 180.0) {
        return Err(TileError::LongitudeOutOfRange(lon_deg));
    }

    let lat_rad = lat_deg.to_radians();
    let n = f64::from(1u32 << u32::from(zoom));

    let x = (lon_deg + 180.0) / 360.0 * n;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0 * n;

    Ok((x, y))
}

/// Map a geographic point to the tile containing it.
///
/// Uses the standard Web Mercator tiling formula. Latitude must lie
/// strictly inside the Mercator-valid range and longitude in
/// `[-180, 180]`; anything else (including NaN) is rejected rather than
/// propagated into a garbage tile address.
pub fn to_tile(lat_deg: f64, lon_deg: f64, zoom: u8) -> Result<TileAddress, TileError> {
    let (x, y) = to_tile_fractional(lat_deg, lon_deg, zoom)?;
    let max = (1u32 << u32::from(zoom)) - 1;

    // lon = +180 lands exactly on the right edge; fold it into the
    // last column (likewise for y at the latitude limit).
    let x = (x.floor() as u32).min(max);
    let y = (y.floor() as u32).min(max);

    Ok(TileAddress { zoom, x, y })
}

/// Like [`to_tile`], additionally returning the pixel offset of the
/// point within its tile.
pub fn to_tile_with_offset(lat_deg: f64, lon_deg: f64, zoom: u8) -> Result<TileOffset, TileError> {
    let (x, y) = to_tile_fractional(lat_deg, lon_deg, zoom)?;
    let address = to_tile(lat_deg, lon_deg, zoom)?;

    Ok(TileOffset {
        address,
        pixel_x: (x - x.floor()) * TILE_SIZE,
        pixel_y: (y - y.floor()) * TILE_SIZE,
    })
}

/// Pick the zoom level in `zooms` whose tile centers the point best.
///
/// Scans every candidate zoom and returns the one minimizing the pixel
/// distance from the tile center; ties go to the lowest zoom.
pub fn find_best_zoom(
    lat_deg: f64,
    lon_deg: f64,
    zooms: RangeInclusive<u8>,
) -> Result<TileOffset, TileError> {
    let mut best: Option<TileOffset> = None;

    for zoom in zooms {
        let candidate = to_tile_with_offset(lat_deg, lon_deg, zoom)?;
        match &best {
            Some(current) if current.center_distance_sq() <= candidate.center_distance_sq() => {}
            _ => best = Some(candidate),
        }
    }

    best.ok_or(TileError::NoCandidateZoom)
}

/// Carto basemap styles accepted by the thumbnail CDN.
pub const DEFAULT_TILE_STYLE: &str = "light_all";

/// Build the thumbnail image URL for a tile.
///
/// The CDN load-balances across subdomains a-d; the subdomain is chosen
/// from the tile coordinates so the same tile always yields the same
/// URL.
pub fn thumbnail_url(style: &str, tile: &TileAddress) -> String {
    let subdomain = [b'a', b'b', b'c', b'd'][((tile.x + tile.y) % 4) as usize] as char;
    format!(
        "https://{}.basemaps.cartocdn.com/{}/{}/{}/{}.png",
        subdomain, style, tile.zoom, tile.x, tile.y
    )
}
