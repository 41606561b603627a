//! SQLite-backed catalog store.
//!
//! One write connection guarded by a mutex serializes all writes. Reads go
//! through a small round-robin pool of read-only connections, which WAL mode
//! lets run alongside a writer.

use super::error::{CatalogError, CatalogResult};
use super::models::*;
use super::query::{escape_like, fold_case, Pagination, TrackFilter, TrackPage, TrackSort};
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use super::validation::{validate_new_track, validate_track};
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, ErrorCode};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

const TRACK_COLUMNS: &str = "id, track_name, artist, album, release_date, spotify_url, genre, album_cover_url, popularity, duration_min";

#[derive(Clone)]
pub struct SqliteCatalogStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    let latest_version = CATALOG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &CATALOG_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating catalog db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    if db_version < BASE_DB_VERSION as i64 {
        bail!(
            "Database has user_version {} and was not created by this server",
            db_version
        );
    }

    let mut current_version = (db_version - BASE_DB_VERSION as i64) as usize;
    if current_version > latest_version {
        bail!(
            "Database schema version {} is newer than the latest known version {}",
            current_version,
            latest_version
        );
    }

    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in CATALOG_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating catalog db from version {} to {}",
                    current_version, schema.version
                );
                migration_fn(&tx)?;
            }
            current_version = schema.version;
        }
        tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
        tx.commit()?;
    }

    latest_schema
        .validate(conn)
        .context("Catalog db schema validation failed")?;
    Ok(())
}

fn map_insert_error(err: rusqlite::Error, id: &str) -> CatalogError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            CatalogError::DuplicateKey(id.to_string())
        }
        _ => CatalogError::Storage(err),
    }
}

impl SqliteCatalogStore {
    /// Open (creating or migrating as needed) the catalog database.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of connections for concurrent read operations
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open catalog database")?;

        migrate_if_needed(&mut write_conn)?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let track_count: i64 = write_conn.query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))?;
        info!(
            "Opened catalog {}: {} tracks",
            db_path_ref.display(),
            track_count
        );

        let read_pool_size = read_pool_size.max(1);
        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteCatalogStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn parse_track_row(row: &rusqlite::Row) -> rusqlite::Result<Track> {
        Ok(Track {
            id: row.get(0)?,
            track_name: row.get(1)?,
            artist: row.get(2)?,
            album: row.get(3)?,
            release_date: row.get(4)?,
            spotify_url: row.get(5)?,
            genre: row.get(6)?,
            album_cover_url: row.get(7)?,
            popularity: row.get(8)?,
            duration_min: row.get(9)?,
        })
    }

    fn find_track(conn: &Connection, id: &str) -> CatalogResult<Option<Track>> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM tracks WHERE id = ?1",
            TRACK_COLUMNS
        ))?;
        match stmt.query_row(params![id], Self::parse_track_row) {
            Ok(track) => Ok(Some(track)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_track(conn: &Connection, track: &Track) -> rusqlite::Result<()> {
        let mut stmt = conn.prepare_cached(&format!(
            "INSERT INTO tracks ({}, track_name_folded, artist_folded)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            TRACK_COLUMNS
        ))?;
        stmt.execute(params![
            track.id,
            track.track_name,
            track.artist,
            track.album,
            track.release_date,
            track.spotify_url,
            track.genre,
            track.album_cover_url,
            track.popularity,
            track.duration_min,
            fold_case(&track.track_name),
            fold_case(&track.artist),
        ])?;
        Ok(())
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn get_track(&self, id: &str) -> CatalogResult<Track> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        Self::find_track(&conn, id)?.ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    fn create_track(&self, mut new_track: NewTrack) -> CatalogResult<Track> {
        validate_new_track(&new_track)?;

        let id = match new_track.id.take().map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => id,
            _ => Uuid::new_v4().simple().to_string(),
        };
        let track = new_track.into_track(id);

        let conn = self.write_conn.lock().unwrap();
        if Self::find_track(&conn, &track.id)?.is_some() {
            return Err(CatalogError::DuplicateKey(track.id));
        }
        Self::insert_track(&conn, &track).map_err(|e| map_insert_error(e, &track.id))?;

        debug!("Created track {} ({} - {})", track.id, track.artist, track.track_name);
        Ok(track)
    }

    fn update_track(&self, id: &str, patch: &TrackPatch) -> CatalogResult<Track> {
        let mut conn = self.write_conn.lock().unwrap();
        let tx = conn.transaction()?;

        let mut track =
            Self::find_track(&tx, id)?.ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        if patch.is_empty() {
            return Ok(track);
        }
        patch.apply_to(&mut track);
        validate_track(&track)?;

        tx.execute(
            "UPDATE tracks SET track_name = ?2, artist = ?3, album = ?4, release_date = ?5,
                    spotify_url = ?6, genre = ?7, album_cover_url = ?8, popularity = ?9,
                    duration_min = ?10, track_name_folded = ?11, artist_folded = ?12
             WHERE id = ?1",
            params![
                track.id,
                track.track_name,
                track.artist,
                track.album,
                track.release_date,
                track.spotify_url,
                track.genre,
                track.album_cover_url,
                track.popularity,
                track.duration_min,
                fold_case(&track.track_name),
                fold_case(&track.artist),
            ],
        )?;
        tx.commit()?;

        debug!("Updated track {}", track.id);
        Ok(track)
    }

    fn delete_track(&self, id: &str) -> CatalogResult<()> {
        let conn = self.write_conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM tracks WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        debug!("Deleted track {}", id);
        Ok(())
    }

    fn query_tracks(
        &self,
        filter: &TrackFilter,
        sort: TrackSort,
        pagination: Option<Pagination>,
    ) -> CatalogResult<TrackPage> {
        let (where_sql, values) = filter.where_clause();
        let bound: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();

        let mut sql = format!(
            "SELECT {} FROM tracks{} ORDER BY {}",
            TRACK_COLUMNS,
            where_sql,
            sort.order_by_sql()
        );
        let window = pagination.map(|p| (p.limit(), p.offset()));
        let mut page_bound = bound.clone();
        if let Some((limit, offset)) = &window {
            sql.push_str(" LIMIT ? OFFSET ?");
            page_bound.push(limit);
            page_bound.push(offset);
        }

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();

        let tracks = {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(page_bound.as_slice(), Self::parse_track_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        match pagination {
            Some(p) => {
                let total: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM tracks{}", where_sql),
                    bound.as_slice(),
                    |r| r.get(0),
                )?;
                Ok(TrackPage::paginated(tracks, total as usize, p))
            }
            None => Ok(TrackPage::unpaginated(tracks)),
        }
    }

    fn get_tracks_count(&self) -> CatalogResult<usize> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    fn get_top_artists(&self, limit: usize) -> CatalogResult<Vec<ArtistPopularity>> {
        // Summed in Rust: SQLite's SUM() fails on i64 overflow and any
        // popularity value is accepted on write.
        let mut totals: HashMap<String, i128> = HashMap::new();
        {
            let read_conn = self.get_read_conn();
            let conn = read_conn.lock().unwrap();
            let mut stmt = conn.prepare_cached("SELECT artist, popularity FROM tracks")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let popularity: i64 = row.get(1)?;
                *totals.entry(row.get(0)?).or_insert(0) += popularity as i128;
            }
        }

        let mut ranked: Vec<(String, i128)> = totals.into_iter().collect();
        ranked.sort_by(|(a_artist, a_total), (b_artist, b_total)| {
            b_total.cmp(a_total).then_with(|| a_artist.cmp(b_artist))
        });
        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(artist, total)| ArtistPopularity {
                artist,
                total: total.clamp(i64::MIN as i128, i64::MAX as i128) as i64,
            })
            .collect())
    }

    fn get_genres_with_counts(&self) -> CatalogResult<Vec<GenreCount>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();

        let mut stmt = conn.prepare_cached(
            "SELECT genre, COUNT(*) AS c FROM tracks WHERE genre != ''
             GROUP BY genre ORDER BY c DESC, genre ASC",
        )?;
        let results = stmt
            .query_map([], |row| {
                Ok(GenreCount {
                    genre: row.get(0)?,
                    count: row.get::<_, i64>(1)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(results)
    }

    fn suggest_track_names(&self, query: &str, limit: usize) -> CatalogResult<Vec<String>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();

        let pattern = format!("%{}%", escape_like(&fold_case(query)));
        let mut stmt = conn.prepare_cached(
            "SELECT track_name FROM tracks WHERE track_name_folded LIKE ?1 ESCAPE '\\'
             GROUP BY track_name ORDER BY MAX(popularity) DESC, track_name ASC LIMIT ?2",
        )?;
        let results = stmt
            .query_map(params![pattern, limit as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(results)
    }

    fn insert_tracks(&self, tracks: &[Track]) -> CatalogResult<usize> {
        let mut conn = self.write_conn.lock().unwrap();
        let tx = conn.transaction()?;
        for track in tracks {
            Self::insert_track(&tx, track).map_err(|e| map_insert_error(e, &track.id))?;
        }
        tx.commit()?;
        Ok(tracks.len())
    }
}
