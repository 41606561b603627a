//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per catalog-server endpoint.
//! When API routes or request formats change, update only this file.
#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Get home request failed")
    }

    // ========================================================================
    // Track Endpoints
    // ========================================================================

    /// GET /api/tracks with raw query parameters
    pub async fn list_tracks(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/api/tracks", self.base_url))
            .query(query)
            .send()
            .await
            .expect("List tracks request failed")
    }

    /// GET /api/tracks/{id}
    pub async fn get_track(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/api/tracks/{}", self.base_url, id))
            .send()
            .await
            .expect("Get track request failed")
    }

    /// POST /api/tracks
    pub async fn create_track(&self, body: serde_json::Value) -> Response {
        self.client
            .post(format!("{}/api/tracks", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Create track request failed")
    }

    /// POST /api/tracks with a raw, possibly malformed, body
    pub async fn create_track_raw(&self, body: &str) -> Response {
        self.client
            .post(format!("{}/api/tracks", self.base_url))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Create track request failed")
    }

    /// PUT /api/tracks/{id}
    pub async fn update_track(&self, id: &str, body: serde_json::Value) -> Response {
        self.client
            .put(format!("{}/api/tracks/{}", self.base_url, id))
            .json(&body)
            .send()
            .await
            .expect("Update track request failed")
    }

    /// DELETE /api/tracks/{id}
    pub async fn delete_track(&self, id: &str) -> Response {
        self.client
            .delete(format!("{}/api/tracks/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete track request failed")
    }

    // ========================================================================
    // Report Endpoints
    // ========================================================================

    /// GET /api/suggest?q=
    pub async fn suggest(&self, query: &str) -> Response {
        self.client
            .get(format!("{}/api/suggest", self.base_url))
            .query(&[("q", query)])
            .send()
            .await
            .expect("Suggest request failed")
    }

    /// GET /api/top-artists
    pub async fn top_artists(&self) -> Response {
        self.client
            .get(format!("{}/api/top-artists", self.base_url))
            .send()
            .await
            .expect("Top artists request failed")
    }

    /// GET /api/genres
    pub async fn genres(&self) -> Response {
        self.client
            .get(format!("{}/api/genres", self.base_url))
            .send()
            .await
            .expect("Genres request failed")
    }

    /// POST /api/sync
    pub async fn sync(&self) -> Response {
        self.client
            .post(format!("{}/api/sync", self.base_url))
            .send()
            .await
            .expect("Sync request failed")
    }
}
