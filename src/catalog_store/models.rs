//! Catalog models.
//!
//! `Track` is the stored record. `NewTrack` and `TrackPatch` are the write-side
//! payloads: every field is optional there, and what is missing is decided by
//! validation (for creation) or left untouched (for updates).

use serde::{Deserialize, Serialize};

/// A track as stored in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub track_name: String,
    pub artist: String,
    pub album: String,
    /// Free text: a bare year, a full date, or anything the source carried.
    pub release_date: String,
    pub spotify_url: String,
    pub genre: String,
    pub album_cover_url: String,
    /// Stored as given, no range is enforced.
    pub popularity: i64,
    pub duration_min: Option<f64>,
}

/// Payload for creating a track.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewTrack {
    /// Generated when absent or blank.
    pub id: Option<String>,
    pub track_name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub release_date: Option<String>,
    pub spotify_url: Option<String>,
    pub genre: Option<String>,
    pub album_cover_url: Option<String>,
    pub popularity: Option<i64>,
    pub duration_min: Option<f64>,
}

impl NewTrack {
    /// Builds the stored record with the given id, applying field defaults.
    pub fn into_track(self, id: String) -> Track {
        Track {
            id,
            track_name: self.track_name.unwrap_or_default(),
            artist: self.artist.unwrap_or_default(),
            album: self.album.unwrap_or_default(),
            release_date: self.release_date.unwrap_or_default(),
            spotify_url: self.spotify_url.unwrap_or_default(),
            genre: self.genre.unwrap_or_default(),
            album_cover_url: self.album_cover_url.unwrap_or_default(),
            popularity: self.popularity.unwrap_or(0),
            duration_min: self.duration_min,
        }
    }
}

/// Partial update: only the fields that are `Some` are written.
///
/// The id is not part of the patch, a track keeps its id for its whole life.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackPatch {
    pub track_name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub release_date: Option<String>,
    pub spotify_url: Option<String>,
    pub genre: Option<String>,
    pub album_cover_url: Option<String>,
    pub popularity: Option<i64>,
    pub duration_min: Option<f64>,
}

impl TrackPatch {
    pub fn is_empty(&self) -> bool {
        *self == TrackPatch::default()
    }

    pub fn apply_to(&self, track: &mut Track) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut track.track_name, &self.track_name);
        set(&mut track.artist, &self.artist);
        set(&mut track.album, &self.album);
        set(&mut track.release_date, &self.release_date);
        set(&mut track.spotify_url, &self.spotify_url);
        set(&mut track.genre, &self.genre);
        set(&mut track.album_cover_url, &self.album_cover_url);
        set(&mut track.popularity, &self.popularity);
        if self.duration_min.is_some() {
            track.duration_min = self.duration_min;
        }
    }
}

/// One entry of the top artists report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistPopularity {
    pub artist: String,
    pub total: i64,
}

/// One entry of the genre histogram.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_track() -> Track {
        NewTrack {
            track_name: Some("Bohemian Rhapsody".to_string()),
            artist: Some("Queen".to_string()),
            album: Some("A Night at the Opera".to_string()),
            release_date: Some("1975-10-31".to_string()),
            popularity: Some(88),
            duration_min: Some(5.9),
            ..Default::default()
        }
        .into_track("t1".to_string())
    }

    #[test]
    fn new_track_defaults_missing_fields() {
        let track = NewTrack {
            track_name: Some("Song".to_string()),
            artist: Some("Artist".to_string()),
            ..Default::default()
        }
        .into_track("abc".to_string());

        assert_eq!(track.id, "abc");
        assert_eq!(track.album, "");
        assert_eq!(track.genre, "");
        assert_eq!(track.popularity, 0);
        assert_eq!(track.duration_min, None);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let original = make_track();
        let mut track = original.clone();

        let patch = TrackPatch {
            popularity: Some(12),
            genre: Some("rock".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut track);

        assert_eq!(track.popularity, 12);
        assert_eq!(track.genre, "rock");
        assert_eq!(track.track_name, original.track_name);
        assert_eq!(track.artist, original.artist);
        assert_eq!(track.album, original.album);
        assert_eq!(track.release_date, original.release_date);
        assert_eq!(track.duration_min, original.duration_min);
    }

    #[test]
    fn empty_patch_is_noop() {
        let original = make_track();
        let mut track = original.clone();
        let patch = TrackPatch::default();

        assert!(patch.is_empty());
        patch.apply_to(&mut track);
        assert_eq!(track, original);
    }

    #[test]
    fn patch_deserialization_ignores_id_and_missing_fields() {
        let patch: TrackPatch =
            serde_json::from_str(r#"{"id": "other", "album": "Live"}"#).unwrap();
        assert_eq!(patch.album.as_deref(), Some("Live"));
        assert!(patch.track_name.is_none());
        assert!(patch.popularity.is_none());
    }
}
