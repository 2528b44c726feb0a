//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all music-library-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
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

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    async fn post_json(&self, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("POST request failed")
    }

    async fn put_json(&self, path: &str, body: Value) -> Response {
        self.client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("PUT request failed")
    }

    async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE request failed")
    }

    /// Posts `body` and returns the created record, asserting a 201.
    async fn create(&self, path: &str, body: Value) -> Value {
        let response = self.post_json(path, body).await;
        assert_eq!(
            response.status(),
            StatusCode::CREATED,
            "Creating record at {} failed",
            path
        );
        response.json().await.expect("Invalid JSON in response")
    }

    // ========================================================================
    // Home
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// GET /user
    pub async fn get_users(&self) -> Response {
        self.get("/user").await
    }

    /// GET /user/{id}
    pub async fn get_user(&self, id: &str) -> Response {
        self.get(&format!("/user/{}", id)).await
    }

    /// POST /user
    pub async fn post_user(&self, login: &str, password: &str) -> Response {
        self.post_json("/user", json!({ "login": login, "password": password }))
            .await
    }

    /// PUT /user/{id}
    pub async fn update_password(
        &self,
        id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Response {
        self.put_json(
            &format!("/user/{}", id),
            json!({ "oldPassword": old_password, "newPassword": new_password }),
        )
        .await
    }

    /// DELETE /user/{id}
    pub async fn delete_user(&self, id: &str) -> Response {
        self.delete(&format!("/user/{}", id)).await
    }

    /// Creates the standard test user and returns its JSON view.
    pub async fn create_test_user(&self) -> Value {
        self.create("/user", json!({ "login": TEST_LOGIN, "password": TEST_PASS }))
            .await
    }

    // ========================================================================
    // Artists
    // ========================================================================

    /// GET /artist
    pub async fn get_artists(&self) -> Response {
        self.get("/artist").await
    }

    /// GET /artist/{id}
    pub async fn get_artist(&self, id: &str) -> Response {
        self.get(&format!("/artist/{}", id)).await
    }

    /// POST /artist
    pub async fn post_artist(&self, body: Value) -> Response {
        self.post_json("/artist", body).await
    }

    /// PUT /artist/{id}
    pub async fn put_artist(&self, id: &str, body: Value) -> Response {
        self.put_json(&format!("/artist/{}", id), body).await
    }

    /// DELETE /artist/{id}
    pub async fn delete_artist(&self, id: &str) -> Response {
        self.delete(&format!("/artist/{}", id)).await
    }

    pub async fn create_artist(&self) -> Value {
        self.create("/artist", json!({ "name": ARTIST_NAME, "grammy": false }))
            .await
    }

    // ========================================================================
    // Albums
    // ========================================================================

    /// GET /album
    pub async fn get_albums(&self) -> Response {
        self.get("/album").await
    }

    /// GET /album/{id}
    pub async fn get_album(&self, id: &str) -> Response {
        self.get(&format!("/album/{}", id)).await
    }

    /// POST /album
    pub async fn post_album(&self, body: Value) -> Response {
        self.post_json("/album", body).await
    }

    /// PUT /album/{id}
    pub async fn put_album(&self, id: &str, body: Value) -> Response {
        self.put_json(&format!("/album/{}", id), body).await
    }

    /// DELETE /album/{id}
    pub async fn delete_album(&self, id: &str) -> Response {
        self.delete(&format!("/album/{}", id)).await
    }

    pub async fn create_album(&self, artist_id: Option<&str>) -> Value {
        self.create(
            "/album",
            json!({ "name": ALBUM_NAME, "year": ALBUM_YEAR, "artistId": artist_id }),
        )
        .await
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    /// GET /track
    pub async fn get_tracks(&self) -> Response {
        self.get("/track").await
    }

    /// GET /track/{id}
    pub async fn get_track(&self, id: &str) -> Response {
        self.get(&format!("/track/{}", id)).await
    }

    /// POST /track
    pub async fn post_track(&self, body: Value) -> Response {
        self.post_json("/track", body).await
    }

    /// PUT /track/{id}
    pub async fn put_track(&self, id: &str, body: Value) -> Response {
        self.put_json(&format!("/track/{}", id), body).await
    }

    /// DELETE /track/{id}
    pub async fn delete_track(&self, id: &str) -> Response {
        self.delete(&format!("/track/{}", id)).await
    }

    pub async fn create_track(&self, artist_id: Option<&str>, album_id: Option<&str>) -> Value {
        self.create(
            "/track",
            json!({
                "name": TRACK_NAME,
                "artistId": artist_id,
                "albumId": album_id,
                "duration": TRACK_DURATION
            }),
        )
        .await
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    /// GET /favs
    pub async fn get_favorites(&self) -> Response {
        self.get("/favs").await
    }

    /// POST /favs/{kind}/{id}
    pub async fn add_favorite(&self, kind: &str, id: &str) -> Response {
        self.client
            .post(self.url(&format!("/favs/{}/{}", kind, id)))
            .send()
            .await
            .expect("POST request failed")
    }

    /// DELETE /favs/{kind}/{id}
    pub async fn remove_favorite(&self, kind: &str, id: &str) -> Response {
        self.delete(&format!("/favs/{}/{}", kind, id)).await
    }

    /// GET /favs, parsed
    pub async fn favorites(&self) -> Value {
        let response = self.get_favorites().await;
        assert_eq!(response.status(), StatusCode::OK);
        response.json().await.expect("Invalid JSON in response")
    }
}

/// Extracts the `id` field of a record.
pub fn id_of(record: &Value) -> String {
    record["id"].as_str().expect("Record has no id").to_string()
}
