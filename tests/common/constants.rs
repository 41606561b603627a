//! Shared constants for end-to-end tests
//!
//! When the seeded catalog changes, update only this file.
#![allow(dead_code)]

// ============================================================================
// Seeded Catalog
// ============================================================================

/// "Bohemian Rhapsody" by Queen, popularity 50
pub const TRACK_1_ID: &str = "track-1";
pub const TRACK_1_NAME: &str = "Bohemian Rhapsody";

/// "Don't Stop Me Now" by Queen, popularity 30
pub const TRACK_2_ID: &str = "track-2";

/// "Hey Jude" by The Beatles, popularity 40
pub const TRACK_3_ID: &str = "track-3";

/// "Yesterday" by The Beatles, popularity 20
pub const TRACK_4_ID: &str = "track-4";

/// "Blinding Lights" by The Weeknd, popularity 90
pub const TRACK_5_ID: &str = "track-5";

pub const ARTIST_QUEEN: &str = "Queen";
pub const ARTIST_BEATLES: &str = "The Beatles";
pub const ARTIST_WEEKND: &str = "The Weeknd";

/// Number of tracks in the seeded catalog
pub const SEEDED_TRACKS_COUNT: usize = 5;

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// HTTP request timeout
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval while waiting for server readiness
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
