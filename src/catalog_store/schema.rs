//! SQLite schema for the track catalog.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};
use super::query::fold_case;
use anyhow::Result;
use rusqlite::{params, Connection};

/// First release: the columns the original CSV export carried.
const TRACKS_TABLE_V0: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true),
        sqlite_column!("track_name", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("album", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!(
            "release_date",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "spotify_url",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "popularity",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[
        ("idx_tracks_popularity", "popularity"),
        ("idx_tracks_release_date", "release_date"),
    ],
    unique_constraints: &[&["id"]],
};

/// Adds genre, duration and cover art. Columns are appended after the v0 ones,
/// matching what `ALTER TABLE ADD COLUMN` produces.
const TRACKS_TABLE_V1: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true),
        sqlite_column!("track_name", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("album", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!(
            "release_date",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "spotify_url",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "popularity",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("genre", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("duration_min", &SqlType::Real),
        sqlite_column!(
            "album_cover_url",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
    ],
    indices: &[
        ("idx_tracks_popularity", "popularity"),
        ("idx_tracks_release_date", "release_date"),
        ("idx_tracks_genre", "genre"),
    ],
    unique_constraints: &[&["id"]],
};

/// Lowercased copies of the track name and artist, used for case-insensitive
/// search beyond ASCII.
pub const TRACKS_TABLE: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true),
        sqlite_column!("track_name", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("album", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!(
            "release_date",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "spotify_url",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "popularity",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("genre", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("duration_min", &SqlType::Real),
        sqlite_column!(
            "album_cover_url",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "track_name_folded",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "artist_folded",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
    ],
    indices: &[
        ("idx_tracks_popularity", "popularity"),
        ("idx_tracks_release_date", "release_date"),
        ("idx_tracks_genre", "genre"),
    ],
    unique_constraints: &[&["id"]],
};

fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    for column_name in ["genre", "duration_min", "album_cover_url"] {
        TRACKS_TABLE_V1.add_column(conn, column_name)?;
    }
    TRACKS_TABLE_V1.create_index(conn, "idx_tracks_genre", "genre")?;
    Ok(())
}

fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    TRACKS_TABLE.add_column(conn, "track_name_folded")?;
    TRACKS_TABLE.add_column(conn, "artist_folded")?;

    let rows = {
        let mut stmt = conn.prepare("SELECT rowid, track_name, artist FROM tracks")?;
        let rows = stmt.query_map([], |r| {
            Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?, r.get::<_, String>(2)?))
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };

    let mut update = conn.prepare(
        "UPDATE tracks SET track_name_folded = ?2, artist_folded = ?3 WHERE rowid = ?1",
    )?;
    for (rowid, track_name, artist) in rows {
        update.execute(params![rowid, fold_case(&track_name), fold_case(&artist)])?;
    }
    Ok(())
}

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[TRACKS_TABLE_V0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[TRACKS_TABLE_V1],
        migration: Some(migrate_v0_to_v1),
    },
    VersionedSchema {
        version: 2,
        tables: &[TRACKS_TABLE],
        migration: Some(migrate_v1_to_v2),
    },
];
