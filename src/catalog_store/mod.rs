mod error;
mod models;
mod query;
mod schema;
mod store;
mod trait_def;
mod validation;

pub use error::{CatalogError, CatalogResult};
pub use models::*;
pub use query::{
    Pagination, TrackFilter, TrackPage, TrackQueryParams, TrackSort, DEFAULT_PAGE,
    DEFAULT_PER_PAGE, MAX_PER_PAGE, SUGGESTIONS_LIMIT, TOP_ARTISTS_LIMIT,
};
pub use schema::CATALOG_VERSIONED_SCHEMAS;
pub use store::SqliteCatalogStore;
pub use trait_def::CatalogStore;
pub use validation::{validate_new_track, validate_track, ValidationError};
