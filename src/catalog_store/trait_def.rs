//! CatalogStore trait definition.

use super::error::CatalogResult;
use super::models::{ArtistPopularity, GenreCount, NewTrack, Track, TrackPatch};
use super::query::{Pagination, TrackFilter, TrackPage, TrackSort};

/// Storage backend for the track catalog.
///
/// Implementations must be safe to share across request handlers: reads may
/// run concurrently, writes are serialized by the implementation.
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Single Track Operations
    // =========================================================================

    /// Get a track by id.
    fn get_track(&self, id: &str) -> CatalogResult<Track>;

    /// Validate and insert a new track, generating its id when none is given.
    fn create_track(&self, new_track: NewTrack) -> CatalogResult<Track>;

    /// Apply a partial update and return the resulting record.
    fn update_track(&self, id: &str, patch: &TrackPatch) -> CatalogResult<Track>;

    fn delete_track(&self, id: &str) -> CatalogResult<()>;

    // =========================================================================
    // Listing
    // =========================================================================

    /// Filtered, sorted listing. Without pagination the whole result set is
    /// returned as a single page.
    fn query_tracks(
        &self,
        filter: &TrackFilter,
        sort: TrackSort,
        pagination: Option<Pagination>,
    ) -> CatalogResult<TrackPage>;

    // =========================================================================
    // Aggregates
    // =========================================================================

    fn get_tracks_count(&self) -> CatalogResult<usize>;

    /// Artists ranked by the sum of their tracks' popularity.
    fn get_top_artists(&self, limit: usize) -> CatalogResult<Vec<ArtistPopularity>>;

    /// Non-empty genres with their track counts, most common first.
    fn get_genres_with_counts(&self) -> CatalogResult<Vec<GenreCount>>;

    /// Distinct track names containing `query`, most popular first.
    fn suggest_track_names(&self, query: &str, limit: usize) -> CatalogResult<Vec<String>>;

    // =========================================================================
    // Bulk Write
    // =========================================================================

    /// Insert all tracks in a single transaction. Either every track is stored
    /// or none is.
    fn insert_tracks(&self, tracks: &[Track]) -> CatalogResult<usize>;
}
