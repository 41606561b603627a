//! Listing queries: filters, sort orders and pagination.
//!
//! Request parameters arrive as raw strings and are parsed leniently. Blank
//! values count as absent, unknown sort keys fall back to the default order and
//! unusable page numbers fall back to their defaults. Nothing here rejects a
//! request.

use super::models::Track;
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 20;
pub const MAX_PER_PAGE: usize = 500;

pub const TOP_ARTISTS_LIMIT: usize = 10;
pub const SUGGESTIONS_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackSort {
    #[default]
    PopularityDesc,
    PopularityAsc,
    ReleaseDesc,
    ReleaseAsc,
}

impl TrackSort {
    /// Unknown or missing keys map to the default order.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("popularity_asc") => TrackSort::PopularityAsc,
            Some("release_desc") => TrackSort::ReleaseDesc,
            Some("release_asc") => TrackSort::ReleaseAsc,
            _ => TrackSort::PopularityDesc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackSort::PopularityDesc => "popularity_desc",
            TrackSort::PopularityAsc => "popularity_asc",
            TrackSort::ReleaseDesc => "release_desc",
            TrackSort::ReleaseAsc => "release_asc",
        }
    }

    /// Ties always fall back to insertion order.
    pub(crate) fn order_by_sql(&self) -> &'static str {
        match self {
            TrackSort::PopularityDesc => "popularity DESC, rowid ASC",
            TrackSort::PopularityAsc => "popularity ASC, rowid ASC",
            TrackSort::ReleaseDesc => "release_date DESC, rowid ASC",
            TrackSort::ReleaseAsc => "release_date ASC, rowid ASC",
        }
    }
}

/// Conjunction of optional predicates over the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackFilter {
    /// Case-insensitive substring of the track name or the artist.
    pub search: Option<String>,
    /// Exact genre.
    pub genre: Option<String>,
    /// Inclusive lower bound on popularity.
    pub popularity_min: Option<i64>,
    /// Prefix of the release date, usually a year.
    pub release_year: Option<String>,
}

impl TrackFilter {
    /// Builds the `WHERE` clause (with leading space, or empty) and its bound values.
    pub(crate) fn where_clause(&self) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions: Vec<&'static str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(search) = &self.search {
            let pattern = format!("%{}%", escape_like(&fold_case(search)));
            conditions.push(
                "(track_name_folded LIKE ? ESCAPE '\\' OR artist_folded LIKE ? ESCAPE '\\')",
            );
            values.push(Box::new(pattern.clone()));
            values.push(Box::new(pattern));
        }
        if let Some(genre) = &self.genre {
            conditions.push("genre = ?");
            values.push(Box::new(genre.clone()));
        }
        if let Some(popularity_min) = self.popularity_min {
            conditions.push("popularity >= ?");
            values.push(Box::new(popularity_min));
        }
        if let Some(release_year) = &self.release_year {
            conditions.push("substr(release_date, 1, length(?)) = ?");
            values.push(Box::new(release_year.clone()));
            values.push(Box::new(release_year.clone()));
        }

        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), values)
        }
    }
}

/// Lowercases the full Unicode range. Searchable text is stored folded, so
/// matching does not depend on SQLite's ASCII-only `LIKE` folding.
pub(crate) fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Escapes `%`, `_` and the escape character itself for `LIKE ... ESCAPE '\'`.
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    /// Zero values fall back to the defaults, `per_page` is capped.
    pub fn new(page: usize, per_page: usize) -> Self {
        let page = if page == 0 { DEFAULT_PAGE } else { page };
        let per_page = if per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            per_page.min(MAX_PER_PAGE)
        };
        Self { page, per_page }
    }

    /// Row offset of the first record on this page, saturating at the
    /// largest offset SQLite accepts.
    pub fn offset(&self) -> i64 {
        let offset = (self.page.saturating_sub(1) as u64).saturating_mul(self.per_page as u64);
        offset.min(i64::MAX as u64) as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Raw query string of `GET /api/tracks`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TrackQueryParams {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub popularity: Option<String>,
    pub release_year: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_positive(value: &Option<String>) -> Option<usize> {
    non_blank(value)
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v >= 1)
}

impl TrackQueryParams {
    pub fn filter(&self) -> TrackFilter {
        TrackFilter {
            search: non_blank(&self.search),
            genre: non_blank(&self.genre),
            popularity_min: non_blank(&self.popularity).and_then(|v| v.parse::<i64>().ok()),
            release_year: non_blank(&self.release_year),
        }
    }

    pub fn sort(&self) -> TrackSort {
        TrackSort::from_param(self.sort.as_deref())
    }

    /// Pagination is requested when either `page` or `per_page` is present,
    /// even if its value turns out to be unusable.
    pub fn pagination(&self) -> Option<Pagination> {
        if self.page.is_none() && self.per_page.is_none() {
            return None;
        }
        Some(Pagination::new(
            parse_positive(&self.page).unwrap_or(DEFAULT_PAGE),
            parse_positive(&self.per_page).unwrap_or(DEFAULT_PER_PAGE),
        ))
    }
}

/// One page of a listing, with the numbers a client needs to navigate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackPage {
    pub tracks: Vec<Track>,
    pub total: usize,
    pub pages: usize,
    pub page: usize,
    pub per_page: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl TrackPage {
    pub fn paginated(tracks: Vec<Track>, total: usize, pagination: Pagination) -> Self {
        let pages = total.div_ceil(pagination.per_page.max(1));
        Self {
            tracks,
            total,
            pages,
            page: pagination.page,
            per_page: pagination.per_page,
            has_prev: pagination.page > 1,
            has_next: pagination.page < pages,
        }
    }

    /// The whole result set as a single page.
    pub fn unpaginated(tracks: Vec<Track>) -> Self {
        let total = tracks.len();
        Self {
            tracks,
            total,
            pages: 1,
            page: 1,
            per_page: total,
            has_prev: false,
            has_next: false,
        }
    }
}
