//! `/api` routes: track CRUD, listing and aggregate reports.

use super::error::{ApiResult, ErrorResponse};
use super::metrics::{dec_catalog_tracks, inc_catalog_tracks};
use super::state::{GuardedCatalogStore, ServerState};
use crate::catalog_store::{
    ArtistPopularity, GenreCount, NewTrack, Track, TrackPage, TrackPatch, TrackQueryParams,
    SUGGESTIONS_LIMIT, TOP_ARTISTS_LIMIT,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

#[derive(Deserialize, Debug, Default)]
struct SuggestParams {
    #[serde(default)]
    q: Option<String>,
}

async fn list_tracks(
    State(store): State<GuardedCatalogStore>,
    params: Result<Query<TrackQueryParams>, QueryRejection>,
) -> ApiResult<Json<TrackPage>> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let page = store.query_tracks(&params.filter(), params.sort(), params.pagination())?;
    Ok(Json(page))
}

async fn get_track(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<String>,
) -> ApiResult<Json<Track>> {
    Ok(Json(store.get_track(&id)?))
}

async fn create_track(
    State(store): State<GuardedCatalogStore>,
    payload: Result<Json<NewTrack>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Track>)> {
    let Json(new_track) = payload?;
    let track = store.create_track(new_track)?;
    inc_catalog_tracks();
    info!("Track {} created", track.id);
    Ok((StatusCode::CREATED, Json(track)))
}

async fn update_track(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<String>,
    payload: Result<Json<TrackPatch>, JsonRejection>,
) -> ApiResult<Json<Track>> {
    let Json(patch) = payload?;
    Ok(Json(store.update_track(&id, &patch)?))
}

async fn delete_track(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    store.delete_track(&id)?;
    dec_catalog_tracks();
    info!("Track {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn suggest(
    State(store): State<GuardedCatalogStore>,
    params: Result<Query<SuggestParams>, QueryRejection>,
) -> ApiResult<Json<Vec<String>>> {
    let query = params.ok().and_then(|Query(p)| p.q).unwrap_or_default();
    Ok(Json(store.suggest_track_names(&query, SUGGESTIONS_LIMIT)?))
}

async fn top_artists(
    State(store): State<GuardedCatalogStore>,
) -> ApiResult<Json<Vec<ArtistPopularity>>> {
    Ok(Json(store.get_top_artists(TOP_ARTISTS_LIMIT)?))
}

async fn genres(State(store): State<GuardedCatalogStore>) -> ApiResult<Json<Vec<GenreCount>>> {
    Ok(Json(store.get_genres_with_counts()?))
}

/// Syncing with Spotify needs credentials this server does not manage.
async fn sync() -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(ErrorResponse {
            error: "Spotify sync is not available on this server".to_string(),
            kind: "not_implemented".to_string(),
        }),
    )
}

pub fn make_api_routes(state: ServerState) -> Router {
    Router::new()
        .route("/tracks", get(list_tracks).post(create_track))
        .route(
            "/tracks/{id}",
            get(get_track).put(update_track).delete(delete_track),
        )
        .route("/suggest", get(suggest))
        .route("/top-artists", get(top_artists))
        .route("/genres", get(genres))
        .route("/sync", post(sync))
        .with_state(state)
}
