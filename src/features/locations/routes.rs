use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::locations::handlers;
use crate::features::locations::services::LocationService;

/// Create routes for the locations feature
pub fn routes(service: Arc<LocationService>) -> Router {
    Router::new()
        .route(
            "/api/locations",
            get(handlers::list_locations).post(handlers::create_location),
        )
        .route("/api/locations/nearby", get(handlers::nearby_locations))
        .route(
            "/api/locations/{id}",
            get(handlers::get_location)
                .put(handlers::update_location)
                .delete(handlers::delete_location),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::locations::models::Location;
    use crate::modules::kv::MemoryStore;
    use crate::shared::geo::Coordinates;
    use crate::shared::test_helpers::{memory_repository, sample_location, FixedGeocoder};
    use crate::shared::types::ApiResponse;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn server() -> (Arc<MemoryStore>, TestServer) {
        let (store, repository) = memory_repository();
        let geocoder = Arc::new(FixedGeocoder(Some(Coordinates::new(47.6, -122.3))));
        let service = Arc::new(LocationService::new(repository, geocoder));
        (store, TestServer::new(routes(service)).unwrap())
    }

    fn body(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Depot",
            "streetAddress": "123 Main St.",
            "city": "Anytown",
            "state": "WA",
            "zip": "12345",
            "tags": ["parking"],
            "displayOnSite": true
        })
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (_store, server) = server();

        let response = server.post("/api/locations").json(&body("loc1")).await;
        response.assert_status(StatusCode::CREATED);

        let response = server.get("/api/locations/loc1").await;
        response.assert_status_ok();
        let payload = response.json::<ApiResponse<Location>>();
        let location = payload.data.unwrap();
        assert_eq!(location.name, "Depot");
        assert_eq!(location.coordinates, Coordinates::new(47.6, -122.3));
        assert_eq!(location.tags, vec!["parking"]);
    }

    #[tokio::test]
    async fn test_get_missing_is_404() {
        let (_store, server) = server();
        server
            .get("/api/locations/nope")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_body() {
        let (_store, server) = server();

        let mut invalid = body("a:b");
        server
            .post("/api/locations")
            .json(&invalid)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        invalid["id"] = json!("ok");
        invalid["name"] = json!("");
        server
            .post("/api/locations")
            .json(&invalid)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_path_id_is_400() {
        let (_store, server) = server();

        server
            .get("/api/locations/loc.1")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .put("/api/locations/loc.1")
            .json(&body("loc.1"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .delete("/api/locations/loc.1")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_rejects_repeated_tags() {
        let (_store, server) = server();

        let mut repeated = body("loc1");
        repeated["tags"] = json!(["parking", "water", "parking"]);
        server
            .post("/api/locations")
            .json(&repeated)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get("/api/locations/loc1")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_near_pole_is_400() {
        let (_store, server) = server();

        let mut arctic = body("arctic");
        arctic["coordinates"] = json!({"latitude": 89.0, "longitude": 0.0});
        server
            .post("/api/locations")
            .json(&arctic)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_duplicate_is_409() {
        let (_store, server) = server();
        server.post("/api/locations").json(&body("loc1")).await;
        server
            .post("/api/locations")
            .json(&body("loc1"))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_list_is_paginated() {
        let (_store, server) = server();
        for id in ["c", "a", "b"] {
            server.post("/api/locations").json(&body(id)).await;
        }

        let response = server
            .get("/api/locations")
            .add_query_param("page", 1)
            .add_query_param("page_size", 2)
            .await;
        response.assert_status_ok();

        let payload = response.json::<ApiResponse<Vec<Location>>>();
        assert_eq!(payload.meta.unwrap().total, 3);
        let ids: Vec<String> = payload.data.unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_page_past_the_end_is_empty() {
        let (_store, server) = server();
        server.post("/api/locations").json(&body("a")).await;

        let response = server
            .get("/api/locations")
            .add_query_param("page", i64::MAX)
            .add_query_param("page_size", 100)
            .await;
        response.assert_status_ok();

        let payload = response.json::<ApiResponse<Vec<Location>>>();
        assert_eq!(payload.meta.unwrap().total, 1);
        assert!(payload.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_nearby() {
        let (_store, server) = server();
        server.post("/api/locations").json(&body("loc1")).await;

        let response = server
            .get("/api/locations/nearby")
            .add_query_param("latitude", 47.6)
            .add_query_param("longitude", -122.3)
            .add_query_param("radius", 1)
            .add_query_param("unitOfDistance", "km")
            .await;
        response.assert_status_ok();
        let found = response.json::<ApiResponse<Vec<Location>>>().data.unwrap();
        assert_eq!(found.len(), 1);

        server
            .get("/api/locations/nearby")
            .add_query_param("latitude", 47.6)
            .add_query_param("longitude", -122.3)
            .add_query_param("radius", 1)
            .add_query_param("width", 1)
            .add_query_param("height", 1)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (_store, server) = server();
        server.post("/api/locations").json(&body("loc1")).await;

        let mut changed = body("loc1");
        changed["name"] = json!("Renamed");
        changed["tags"] = json!([]);
        server
            .put("/api/locations/loc1")
            .json(&changed)
            .await
            .assert_status_ok();

        let location = server
            .get("/api/locations/loc1")
            .await
            .json::<ApiResponse<Location>>()
            .data
            .unwrap();
        assert_eq!(location.name, "Renamed");
        assert!(location.tags.is_empty());

        server
            .put("/api/locations/other")
            .json(&body("other"))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        server
            .delete("/api/locations/loc1")
            .await
            .assert_status_ok();
        server
            .delete("/api/locations/loc1")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_backend_outage_is_503() {
        let (store, server) = server();
        store.fail_command("CONNECT");
        server
            .get("/api/locations/loc1")
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_stored_record_round_trips_over_http() {
        let (_store, server) = server();
        let mut location = sample_location("loc9", 10.0, 20.0);
        location.tags = vec!["a".to_string(), "b".to_string()];

        let payload = serde_json::to_value(&location).unwrap();
        server
            .post("/api/locations")
            .json(&payload)
            .await
            .assert_status(StatusCode::CREATED);

        let stored = server
            .get("/api/locations/loc9")
            .await
            .json::<ApiResponse<Location>>()
            .data
            .unwrap();
        assert_eq!(stored, location);
    }
}
