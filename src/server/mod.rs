use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::storage::ClubStore;

pub mod error;
pub mod routes;

pub use error::ApiError;

/// Server state
pub struct AppState {
    pub store: ClubStore,
}

pub fn create_router(store: ClubStore) -> Router {
    let state = Arc::new(AppState { store });

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/v1/reports", get(routes::list_reports))
        .route("/api/v1/reports/{name}", get(routes::run_report))
        .route("/api/v1/stats/player/{id}", get(routes::player_stats))
        .route(
            "/api/v1/{entity}",
            get(routes::list_records).post(routes::create_record),
        )
        .route("/api/v1/{entity}/{id}", get(routes::get_record))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, store: ClubStore) -> anyhow::Result<()> {
    let app = create_router(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);
    println!("{} Server running at http://{}", crate::ui::Icons::GLOBE, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::entity::EntityKind;
    use crate::query::Report;

    fn app() -> (Router, ClubStore) {
        let store = ClubStore::open_in_memory().unwrap();
        (create_router(store.clone()), store)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder().method(method).uri(uri).body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    #[tokio::test]
    async fn health_check() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn create_then_fetch_team() {
        let (app, _) = app();
        let team = json!({ "team_name": "Real Madrid", "city": "Madrid", "stadium_name": "Santiago Bernabéu" });

        let (status, body) = send(&app, "POST", "/api/v1/teams", Some(team)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Team successfully added");
        let id = body["id"].as_i64().unwrap();

        let (status, body) = send(&app, "GET", &format!("/api/v1/teams/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["team_name"], "Real Madrid");

        let (status, body) = send(&app, "GET", "/api/v1/teams", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_record_is_a_bad_request() {
        let (app, store) = app();
        let player = json!({ "player_name": "Old Timer", "age": 200, "position_id": 1 });

        let (status, body) = send(&app, "POST", "/api/v1/players", Some(player)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");
        assert!(store.get_all(EntityKind::Player).is_empty());
    }

    #[tokio::test]
    async fn constraint_failure_is_a_bad_request() {
        let (app, _) = app();
        let stat = json!({
            "player_id": 42, "goals": 1, "assists": 0,
            "yellow_cards": 0, "red_cards": 0, "minutes_played": 90
        });

        let (status, body) = send(&app, "POST", "/api/v1/season-stats", Some(stat)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "constraint");
    }

    #[tokio::test]
    async fn array_body_is_an_atomic_batch() {
        let (app, store) = app();
        let positions = json!([{ "position_name": "Goalkeeper" }, { "position_name": "Defender" }]);
        let (status, body) = send(&app, "POST", "/api/v1/positions", Some(positions)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["count"], 2);

        let broken = json!([{ "position_name": "Winger" }, { "position_name": "" }]);
        let (status, body) = send(&app, "POST", "/api/v1/positions", Some(broken)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("row 2"));
        assert_eq!(store.get_all(EntityKind::Position).len(), 2);
    }

    #[tokio::test]
    async fn empty_and_missing_reads_are_not_found() {
        let (app, _) = app();
        assert_eq!(send(&app, "GET", "/api/v1/coaches", None).await.0, StatusCode::NOT_FOUND);
        assert_eq!(send(&app, "GET", "/api/v1/coaches/7", None).await.0, StatusCode::NOT_FOUND);
        assert_eq!(send(&app, "GET", "/api/v1/referees", None).await.0, StatusCode::NOT_FOUND);
        assert_eq!(send(&app, "GET", "/api/v1/stats/player/7", None).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reports_are_listed_and_run() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/api/v1/reports", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), Report::all().len());

        let (status, body) = send(&app, "GET", "/api/v1/reports/top-teams?limit=3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, _) = send(&app, "GET", "/api/v1/reports/best-haircut", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn player_stats_summary() {
        let (app, _) = app();
        send(&app, "POST", "/api/v1/positions", Some(json!({ "position_name": "Midfielder" }))).await;
        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/players",
            Some(json!({ "player_name": "Pedri", "age": 21, "position_id": 1 })),
        )
        .await;
        let id = body["id"].as_i64().unwrap();
        send(
            &app,
            "POST",
            "/api/v1/season-stats",
            Some(json!({
                "player_id": id, "goals": 4, "assists": 6,
                "yellow_cards": 2, "red_cards": 0, "minutes_played": 1800
            })),
        )
        .await;

        let (status, body) = send(&app, "GET", &format!("/api/v1/stats/player/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["player_name"], "Pedri");
    }
}
