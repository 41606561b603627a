//! Catalog fixtures: seed tracks and CSV sources for import tests.
#![allow(dead_code)]

use super::constants::*;
use std::path::{Path, PathBuf};
use track_catalog_server::catalog_store::Track;

fn track(
    id: &str,
    name: &str,
    artist: &str,
    release_date: &str,
    genre: &str,
    popularity: i64,
) -> Track {
    Track {
        id: id.to_string(),
        track_name: name.to_string(),
        artist: artist.to_string(),
        album: String::new(),
        release_date: release_date.to_string(),
        spotify_url: String::new(),
        genre: genre.to_string(),
        album_cover_url: String::new(),
        popularity,
        duration_min: None,
    }
}

/// The five tracks `TestServer::spawn` starts with.
pub fn test_tracks() -> Vec<Track> {
    vec![
        track(TRACK_1_ID, TRACK_1_NAME, ARTIST_QUEEN, "1975-10-31", "rock", 50),
        track(TRACK_2_ID, "Don't Stop Me Now", ARTIST_QUEEN, "1979-01-26", "rock", 30),
        track(TRACK_3_ID, "Hey Jude", ARTIST_BEATLES, "1968-08-26", "pop", 40),
        track(TRACK_4_ID, "Yesterday", ARTIST_BEATLES, "1965-09-13", "pop", 20),
        track(TRACK_5_ID, "Blinding Lights", ARTIST_WEEKND, "2019-11-29", "synthpop", 90),
    ]
}

/// `count` tracks named "Song 000".. with popularity equal to their index.
pub fn numbered_tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| {
            track(
                &format!("n-{:03}", i),
                &format!("Song {:03}", i),
                "Numbers",
                "2000-01-01",
                "",
                i as i64,
            )
        })
        .collect()
}

/// Writes `content` as `tracks.csv` inside `dir`.
pub fn write_csv_source(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("tracks.csv");
    std::fs::write(&path, content).expect("Failed to write CSV source");
    path
}
