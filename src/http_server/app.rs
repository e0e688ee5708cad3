use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
#[cfg(not(debug_assertions))]
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin};
use tower_http::cors::CorsLayer;

use crate::{
    database::Database,
    http_server::{rpc, state::AppState},
};

async fn root() -> &'static str {
    "artist-catalog"
}

pub struct HttpServerConfig {
    pub port: u16,
    pub database: Database,
    pub default_page_size: u64,
}

pub fn router(app_state: Arc<AppState>) -> Router {
    #[cfg(debug_assertions)]
    let cors_layer = CorsLayer::permissive();

    #[cfg(not(debug_assertions))]
    let cors_layer = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(AllowMethods::exact(axum::http::Method::POST))
        .allow_headers(AllowHeaders::list([axum::http::header::CONTENT_TYPE]));

    Router::new()
        .route("/", get(root))
        .route("/rpc/CreateArtist", post(rpc::create_artist))
        .route("/rpc/GetArtist", post(rpc::get_artist))
        .route("/rpc/GetArtists", post(rpc::get_artists))
        .route("/rpc/UpdateArtist", post(rpc::update_artist))
        .route("/rpc/FilterArtists", post(rpc::filter_artists))
        .layer(ServiceBuilder::new().layer(cors_layer))
        .with_state(app_state)
}

pub async fn start(config: HttpServerConfig) -> color_eyre::Result<()> {
    let HttpServerConfig {
        port,
        database,
        default_page_size,
    } = config;

    let app_state = Arc::new(AppState::new(Arc::new(database), default_page_size));
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", port))?;
    log::info!("Listening on port {}", port);
    axum::serve(listener, app)
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_db;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        router(Arc::new(AppState::new(test_db().await, 2)))
    }

    async fn call(app: &Router, method: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/rpc/{method}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn artist_body(name: &str, spotify_id: &str) -> Value {
        json!({
            "name": name,
            "images": [{ "url": format!("https://img/{spotify_id}"), "width": 10, "height": 10 }],
            "albums": [{
                "name": format!("{name} debut"),
                "albumType": "album",
                "releaseDate": { "seconds": 865000000, "nanos": 250000000 },
                "images": [],
                "externals": { "spotify": format!("{spotify_id}-album") }
            }],
            "externals": { "spotify": spotify_id }
        })
    }

    #[tokio::test]
    async fn test_create_then_get_artist() {
        let app = test_app().await;

        let (status, created) = call(&app, "CreateArtist", artist_body("Coal Chamber", "sp-1")).await;
        assert_eq!(status, StatusCode::OK);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, artist) = call(&app, "GetArtist", json!({ "id": id })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(artist["name"], "Coal Chamber");
        assert_eq!(artist["externals"]["spotify"], "sp-1");
        assert_eq!(artist["images"].as_array().unwrap().len(), 1);
        assert_eq!(artist["albums"][0]["releaseDate"]["seconds"], 865000000);
        assert_eq!(artist["albums"][0]["releaseDate"]["nanos"], 0);
        assert_eq!(artist["albums"][0]["albumType"], "album");
        assert!(artist["lastUpdated"]["seconds"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict_with_existing_id() {
        let app = test_app().await;
        let (_, created) = call(&app, "CreateArtist", artist_body("Abba", "sp-abba")).await;

        let (status, body) = call(&app, "CreateArtist", artist_body("Abba", "sp-abba")).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_create_without_spotify_id_is_bad_request() {
        let app = test_app().await;

        let (status, _) = call(&app, "CreateArtist", json!({ "name": "Nameless" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_unknown_artist_is_not_found() {
        let app = test_app().await;

        let (status, _) = call(&app, "GetArtist", json!({ "id": "404" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "GetArtist", json!({ "id": "not-a-number" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_artists_uses_default_page_size_and_omits_albums() {
        let app = test_app().await;
        for (name, spotify_id) in [("Abba", "sp-1"), ("Blur", "sp-2"), ("Oasis", "sp-3")] {
            call(&app, "CreateArtist", artist_body(name, spotify_id)).await;
        }

        let (status, body) = call(&app, "GetArtists", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        let artists = body["artists"].as_array().unwrap();
        assert_eq!(artists.len(), 2);
        assert!(artists[0].get("albums").is_none());

        let (_, body) = call(&app, "GetArtists", json!({ "limit": 5, "offset": 2 })).await;
        assert_eq!(body["artists"][0]["name"], "Oasis");
    }

    #[tokio::test]
    async fn test_filter_artists_by_name() {
        let app = test_app().await;
        for (name, spotify_id) in [("Coal Chamber", "sp-1"), ("Abba", "sp-2"), ("Oasis", "sp-3")] {
            call(&app, "CreateArtist", artist_body(name, spotify_id)).await;
        }

        let (status, body) = call(&app, "FilterArtists", json!({ "name": "oa" })).await;

        assert_eq!(status, StatusCode::OK);
        let artists = body["artists"].as_array().unwrap();
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0]["name"], "Coal Chamber");
    }

    #[tokio::test]
    async fn test_update_artist_renames() {
        let app = test_app().await;
        let (_, created) = call(&app, "CreateArtist", artist_body("Blur", "sp-blur")).await;

        let (status, updated) = call(
            &app,
            "UpdateArtist",
            json!({ "id": created["id"], "name": "Blur (UK)" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Blur (UK)");
        assert_eq!(updated["images"].as_array().unwrap().len(), 1);
        assert_eq!(updated["albums"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_artist_images_only_keeps_name() {
        let app = test_app().await;
        let (_, created) = call(&app, "CreateArtist", artist_body("Blur", "sp-blur")).await;

        let (status, updated) = call(
            &app,
            "UpdateArtist",
            json!({
                "id": created["id"],
                "images": [{ "url": "https://img/new", "width": 1, "height": 1 }]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Blur");
        let images = updated["images"].as_array().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0]["url"], "https://img/new");
    }

    #[tokio::test]
    async fn test_get_artists_rejects_limit_past_i64() {
        let app = test_app().await;

        let (status, _) = call(&app, "GetArtists", json!({ "limit": u64::MAX })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
