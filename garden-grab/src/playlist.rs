//! XSPF playlist document.
//!
//! The output format is XSPF with the AIMP player's extension blocks: a
//! summary block carrying the playlist identity (a fresh UUID per
//! document) and a settings block with display-format hints. The
//! extension contents are opaque player data; only the track entries
//! carry harvested information.

use std::path::Path;

use serde::Serialize;

const XSPF_NS: &str = "http://xspf.org/ns/0/";
const AIMP_NS: &str = "http://www.aimp.ru/playlist/ns/0/";
const AIMP_SUMMARY: &str = "http://www.aimp.ru/playlist/summary/0";
const AIMP_SETTINGS: &str = "http://www.aimp.ru/playlist/settings/0";

/// Errors from playlist serialization.
#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    /// XML serialization failed
    #[error("XML error: {message}")]
    Xml { message: String },

    /// Writing the playlist file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One track entry in the playlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    /// Playable media URL.
    pub location: String,
    /// Station display title.
    pub title: String,
    /// Country name, carried in the XSPF creator field.
    pub creator: String,
    /// City name, carried in the XSPF album field.
    pub album: String,
    /// Map-tile thumbnail URL, when the city's geo was usable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
struct Prop {
    #[serde(rename = "@name")]
    name: &'static str,
    #[serde(rename = "$text")]
    value: String,
}

impl Prop {
    fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Extension {
    #[serde(rename = "@application")]
    application: &'static str,
    #[serde(rename = "aimp:prop")]
    props: Vec<Prop>,
}

#[derive(Debug, Serialize)]
struct TrackList {
    #[serde(rename = "track")]
    tracks: Vec<Track>,
}

#[derive(Debug, Serialize)]
#[serde(rename = "playlist")]
struct XspfDocument<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "@xmlns:aimp")]
    xmlns_aimp: &'static str,
    #[serde(rename = "@version")]
    version: &'static str,
    title: &'a str,
    #[serde(rename = "extension")]
    extensions: &'a [Extension],
    #[serde(rename = "trackList")]
    track_list: &'a TrackList,
}

/// An XSPF playlist under construction.
///
/// Tracks are appended during the walk; the document is rendered and
/// written once, at the end, only if the whole walk succeeded.
#[derive(Debug)]
pub struct Playlist {
    title: String,
    extensions: Vec<Extension>,
    track_list: TrackList,
}

impl Playlist {
    /// Create an empty playlist with a fresh identity.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();

        let summary = Extension {
            application: AIMP_SUMMARY,
            props: vec![
                Prop::new("ID", uuid::Uuid::new_v4().to_string()),
                Prop::new("Name", title.clone()),
                Prop::new("NameIsAutoSet", "0"),
                Prop::new("Shuffled", "0"),
                Prop::new("UserReordered", "0"),
                Prop::new("SortingTemplate", "%Artist %Year %Album"),
            ],
        };

        let settings = Extension {
            application: AIMP_SETTINGS,
            props: vec![
                Prop::new("Flags", "554"),
                Prop::new("FormatMainLine", "%Title"),
                Prop::new("FormatSecondLine", "%Artist - %Album"),
                Prop::new("GroupFormatLine", "GRP_TITLE"),
                Prop::new("GroupFormatLine", "%Artist %Album"),
            ],
        };

        Self {
            title,
            extensions: vec![summary, settings],
            track_list: TrackList { tracks: Vec::new() },
        }
    }

    /// Append a track.
    pub fn push(&mut self, track: Track) {
        self.track_list.tracks.push(track);
    }

    /// Number of tracks so far.
    pub fn len(&self) -> usize {
        self.track_list.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_list.tracks.is_empty()
    }

    /// The tracks appended so far, in order.
    pub fn tracks(&self) -> &[Track] {
        &self.track_list.tracks
    }

    /// Render the full document, XML declaration included.
    pub fn to_xml(&self) -> Result<String, PlaylistError> {
        let document = XspfDocument {
            xmlns: XSPF_NS,
            xmlns_aimp: AIMP_NS,
            version: "1",
            title: &self.title,
            extensions: &self.extensions,
            track_list: &self.track_list,
        };

        let body = quick_xml::se::to_string(&document).map_err(|e| PlaylistError::Xml {
            message: e.to_string(),
        })?;

        Ok(format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n{body}"))
    }

    /// Write the document to disk in one shot.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PlaylistError> {
        std::fs::write(path, self.to_xml()?)?;
        Ok(())
    }
}
