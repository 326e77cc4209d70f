//! Radio Garden playlist grabber.
//!
//! Walks the Radio Garden place directory (countries → cities →
//! stations), resolves each station's playable stream URL through one
//! HTTP redirect hop with a persistent per-station cache, and writes an
//! XSPF playlist with map-tile thumbnails.

pub mod garden;
pub mod harvest;
pub mod playlist;
pub mod resolver;
pub mod tiles;
