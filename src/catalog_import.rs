//! One-shot CSV import into an empty catalog.
//!
//! The import only runs against an empty store. Every usable row of the source
//! is mapped to a [`Track`] and the whole batch is written in one transaction,
//! so a failure halfway leaves the store exactly as it was.

use crate::catalog_store::{CatalogError, CatalogResult, CatalogStore, NewTrack, Track};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Source header name for each track field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub id: String,
    pub track_name: String,
    pub artist: String,
    pub album: String,
    pub release_date: String,
    pub spotify_url: String,
    pub genre: String,
    pub album_cover_url: String,
    pub popularity: String,
    pub duration_min: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            track_name: "track_name".to_string(),
            artist: "artist".to_string(),
            album: "album".to_string(),
            release_date: "release_date".to_string(),
            spotify_url: "spotify_url".to_string(),
            genre: "genre".to_string(),
            album_cover_url: "album_cover_url".to_string(),
            popularity: "popularity".to_string(),
            duration_min: "duration_min".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSettings {
    pub source_path: Option<PathBuf>,
    pub delimiter: u8,
    pub columns: ColumnMapping,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            source_path: None,
            delimiter: b',',
            columns: ColumnMapping::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The store already held tracks, nothing was read.
    AlreadyPopulated,
    /// No usable source, nothing was written.
    SourceUnavailable(String),
    Imported(ImportReport),
}

/// Column positions resolved against the source header.
struct ColumnIndices {
    id: Option<usize>,
    track_name: usize,
    artist: usize,
    album: Option<usize>,
    release_date: Option<usize>,
    spotify_url: Option<usize>,
    genre: Option<usize>,
    album_cover_url: Option<usize>,
    popularity: Option<usize>,
    duration_min: Option<usize>,
}

impl ColumnIndices {
    fn resolve(headers: &[String], mapping: &ColumnMapping) -> CatalogResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name.trim());
        let required = |name: &str| {
            find(name).ok_or_else(|| {
                CatalogError::SourceUnavailable(format!("missing required column '{}'", name))
            })
        };

        Ok(Self {
            id: find(mapping.id.as_str()),
            track_name: required(mapping.track_name.as_str())?,
            artist: required(mapping.artist.as_str())?,
            album: find(mapping.album.as_str()),
            release_date: find(mapping.release_date.as_str()),
            spotify_url: find(mapping.spotify_url.as_str()),
            genre: find(mapping.genre.as_str()),
            album_cover_url: find(mapping.album_cover_url.as_str()),
            popularity: find(mapping.popularity.as_str()),
            duration_min: find(mapping.duration_min.as_str()),
        })
    }
}

/// UTF-8 when valid, Latin-1 otherwise.
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.trim().to_string(),
        Err(_) => bytes
            .iter()
            .map(|&b| b as char)
            .collect::<String>()
            .trim()
            .to_string(),
    }
}

fn parse_popularity(value: &str) -> i64 {
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64))
        .unwrap_or(0)
}

fn parse_duration(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn row_to_new_track(fields: &[String], columns: &ColumnIndices) -> NewTrack {
    let text = |index: Option<usize>| index.and_then(|i| fields.get(i)).cloned();
    let non_empty = |index: Option<usize>| text(index).filter(|v| !v.is_empty());

    NewTrack {
        id: non_empty(columns.id),
        track_name: non_empty(Some(columns.track_name)),
        artist: non_empty(Some(columns.artist)),
        album: text(columns.album),
        release_date: text(columns.release_date),
        spotify_url: text(columns.spotify_url),
        genre: text(columns.genre),
        album_cover_url: text(columns.album_cover_url),
        popularity: Some(text(columns.popularity).map(|v| parse_popularity(&v)).unwrap_or(0)),
        duration_min: text(columns.duration_min).and_then(|v| parse_duration(&v)),
    }
}

/// Reads and maps every row. Rows without a track name or artist are skipped.
fn read_source(path: &Path, settings: &ImportSettings) -> CatalogResult<(Vec<Track>, usize)> {
    let unavailable = |e: csv::Error| {
        CatalogError::SourceUnavailable(format!("{}: {}", path.display(), e))
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(settings.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(unavailable)?;

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(unavailable)?
        .iter()
        .map(decode_field)
        .collect();
    let columns = ColumnIndices::resolve(&headers, &settings.columns)?;

    let mut tracks = Vec::new();
    let mut skipped = 0;
    for record in reader.byte_records() {
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(unavailable(e)),
            Err(e) => {
                warn!("Skipping unreadable row: {}", e);
                skipped += 1;
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let fields: Vec<String> = record.iter().map(decode_field).collect();

        let new_track = row_to_new_track(&fields, &columns);
        if new_track.track_name.is_none() || new_track.artist.is_none() {
            warn!("Skipping row at line {}: missing track name or artist", line);
            skipped += 1;
            continue;
        }

        let id = new_track
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        tracks.push(new_track.into_track(id));
    }
    Ok((tracks, skipped))
}

/// Populates an empty store from the configured CSV source.
///
/// A populated store and a missing source are both reported as outcomes, not
/// errors. Storage failures, including duplicate ids inside the source, roll
/// back the whole batch and are returned as errors.
pub fn run_import(store: &dyn CatalogStore, settings: &ImportSettings) -> CatalogResult<ImportOutcome> {
    let existing = store.get_tracks_count()?;
    if existing > 0 {
        info!("Catalog already holds {} tracks, skipping import", existing);
        return Ok(ImportOutcome::AlreadyPopulated);
    }

    let path = match &settings.source_path {
        Some(path) => path,
        None => {
            warn!("No import source configured, starting with an empty catalog");
            return Ok(ImportOutcome::SourceUnavailable(
                "no import source configured".to_string(),
            ));
        }
    };

    info!("Importing tracks from {}", path.display());
    let (tracks, skipped) = match read_source(path, settings) {
        Ok(result) => result,
        Err(CatalogError::SourceUnavailable(reason)) => {
            warn!("Import source unavailable, starting with an empty catalog: {}", reason);
            return Ok(ImportOutcome::SourceUnavailable(reason));
        }
        Err(e) => return Err(e),
    };

    let imported = store.insert_tracks(&tracks)?;
    let report = ImportReport { imported, skipped };
    info!(
        "Import done: {} tracks imported, {} rows skipped",
        report.imported, report.skipped
    );
    Ok(ImportOutcome::Imported(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::SqliteCatalogStore;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_store(dir: &TempDir) -> SqliteCatalogStore {
        SqliteCatalogStore::new(dir.path().join("catalog.db"), 1).unwrap()
    }

    fn write_source(dir: &TempDir, content: &[u8]) -> PathBuf {
        let path = dir.path().join("tracks.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    fn settings_for(path: PathBuf) -> ImportSettings {
        ImportSettings {
            source_path: Some(path),
            ..Default::default()
        }
    }

    const SOURCE: &[u8] = b"id,track_name,artist,album,release_date,popularity,genre,duration_min
t1,Bohemian Rhapsody,Queen,A Night at the Opera,1975-10-31,88,rock,5.9
t2,Blinding Lights,The Weeknd,After Hours,2019-11-29,95,synthpop,3.3
,Heat Waves,Glass Animals,Dreamland,2020-06-29,lots,indie,
";

    #[test]
    fn imports_rows_with_defaults() {
        let dir = TempDir::new().unwrap();
        let store = create_test_store(&dir);
        let settings = settings_for(write_source(&dir, SOURCE));

        let outcome = run_import(&store, &settings).unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Imported(ImportReport {
                imported: 3,
                skipped: 0
            })
        );

        let queen = store.get_track("t1").unwrap();
        assert_eq!(queen.artist, "Queen");
        assert_eq!(queen.popularity, 88);
        assert_eq!(queen.duration_min, Some(5.9));
        assert_eq!(queen.spotify_url, "");

        let page = store
            .query_tracks(
                &crate::catalog_store::TrackFilter {
                    search: Some("Heat Waves".to_string()),
                    ..Default::default()
                },
                Default::default(),
                None,
            )
            .unwrap();
        let heat_waves = &page.tracks[0];
        assert_eq!(heat_waves.popularity, 0);
        assert_eq!(heat_waves.duration_min, None);
        assert_eq!(heat_waves.id.len(), 32);
    }

    #[test]
    fn second_run_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let store = create_test_store(&dir);
        let settings = settings_for(write_source(&dir, SOURCE));

        run_import(&store, &settings).unwrap();
        let outcome = run_import(&store, &settings).unwrap();
        assert_eq!(outcome, ImportOutcome::AlreadyPopulated);
        assert_eq!(store.get_tracks_count().unwrap(), 3);
    }

    #[test]
    fn missing_source_leaves_store_empty() {
        let dir = TempDir::new().unwrap();
        let store = create_test_store(&dir);
        let settings = settings_for(dir.path().join("does-not-exist.csv"));

        let outcome = run_import(&store, &settings).unwrap();
        assert!(matches!(outcome, ImportOutcome::SourceUnavailable(_)));
        assert_eq!(store.get_tracks_count().unwrap(), 0);

        let outcome = run_import(&store, &ImportSettings::default()).unwrap();
        assert!(matches!(outcome, ImportOutcome::SourceUnavailable(_)));
    }

    #[test]
    fn missing_required_column_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = create_test_store(&dir);
        let settings = settings_for(write_source(&dir, b"id,title\n1,Song\n"));

        let outcome = run_import(&store, &settings).unwrap();
        assert!(matches!(outcome, ImportOutcome::SourceUnavailable(reason) if reason.contains("track_name")));
    }

    #[test]
    fn duplicate_id_rolls_back_everything() {
        let dir = TempDir::new().unwrap();
        let store = create_test_store(&dir);
        let settings = settings_for(write_source(
            &dir,
            b"id,track_name,artist\nsame,One,Band\nother,Two,Band\nsame,Three,Band\n",
        ));

        let result = run_import(&store, &settings);
        assert!(matches!(result, Err(CatalogError::DuplicateKey(id)) if id == "same"));
        assert_eq!(store.get_tracks_count().unwrap(), 0);
    }

    #[test]
    fn skips_rows_without_name_or_artist() {
        let dir = TempDir::new().unwrap();
        let store = create_test_store(&dir);
        let settings = settings_for(write_source(
            &dir,
            b"id,track_name,artist\na,One,Band\nb,,Band\nc,Three,  \nd,Four,Band\n",
        ));

        let outcome = run_import(&store, &settings).unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Imported(ImportReport {
                imported: 2,
                skipped: 2
            })
        );
        assert!(store.get_track("b").is_err());
    }

    #[test]
    fn custom_mapping_and_delimiter() {
        let dir = TempDir::new().unwrap();
        let store = create_test_store(&dir);
        let settings = ImportSettings {
            source_path: Some(write_source(
                &dir,
                b"Title;Performer;Score\nSong;Band;-5\n",
            )),
            delimiter: b';',
            columns: ColumnMapping {
                track_name: "Title".to_string(),
                artist: "Performer".to_string(),
                popularity: "Score".to_string(),
                ..Default::default()
            },
        };

        run_import(&store, &settings).unwrap();
        let page = store
            .query_tracks(&Default::default(), Default::default(), None)
            .unwrap();
        assert_eq!(page.tracks.len(), 1);
        assert_eq!(page.tracks[0].track_name, "Song");
        assert_eq!(page.tracks[0].popularity, -5);
    }

    #[test]
    fn latin1_fields_are_decoded() {
        let dir = TempDir::new().unwrap();
        let store = create_test_store(&dir);
        let settings = settings_for(write_source(
            &dir,
            b"id,track_name,artist\nx,Halo,Beyonc\xe9\n",
        ));

        run_import(&store, &settings).unwrap();
        assert_eq!(store.get_track("x").unwrap().artist, "Beyoncé");
    }

    #[test]
    fn popularity_parsing_is_lenient() {
        assert_eq!(parse_popularity("42"), 42);
        assert_eq!(parse_popularity("42.7"), 42);
        assert_eq!(parse_popularity("n/a"), 0);
        assert_eq!(parse_popularity(""), 0);
    }
}
