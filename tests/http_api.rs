use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use quiz_rooms_back::{
    config::{AppConfig, StorageBackend},
    dao::room_store::MemoryRoomStore,
    routes,
    state::AppState,
};

fn app() -> Router {
    let config = AppConfig {
        storage: StorageBackend::Memory,
        ..AppConfig::default()
    };
    routes::router(AppState::with_store(
        &config,
        Arc::new(MemoryRoomStore::new()),
    ))
}

fn request(method: Method, uri: &str, player: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = player {
        builder = builder
            .header("x-player-id", id)
            .header("x-player-email", format!("{id}@example.com"))
            .header("x-player-username", id);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(res: Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthcheck_reports_ok() {
    let res = app()
        .oneshot(request(Method::GET, "/healthcheck", None, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn healthcheck_reports_degraded_without_store() {
    let app = routes::router(AppState::new(&AppConfig::default()));
    let res = app
        .oneshot(request(Method::GET, "/healthcheck", None, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["status"], "degraded");
    assert!(body.get("storage").is_none());
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let res = app()
        .oneshot(request(
            Method::POST,
            "/rooms",
            None,
            Some(json!({ "maxPlayers": 4 })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(res).await;
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn invalid_capacity_is_rejected() {
    let res = app()
        .oneshot(request(
            Method::POST,
            "/rooms",
            Some("alice"),
            Some(json!({ "maxPlayers": 11 })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["error"], "InvalidParameter");
}

#[tokio::test]
async fn mistyped_bodies_are_invalid_parameters() {
    for body in [json!({ "maxPlayers": -1 }), json!({ "maxPlayers": "4" }), json!({})] {
        let res = app()
            .oneshot(request(Method::POST, "/rooms", Some("alice"), Some(body.clone())))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {body}");
        let payload = json_body(res).await;
        assert_eq!(payload["error"], "InvalidParameter");
        assert!(payload["message"].is_string());
    }
}

#[tokio::test]
async fn negative_question_index_is_invalid_parameter() {
    let app = app();
    let res = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/rooms",
            Some("alice"),
            Some(json!({ "maxPlayers": 2 })),
        ))
        .await
        .unwrap();
    let room_id = json_body(res).await["roomId"].as_str().unwrap().to_string();

    let res = app
        .oneshot(request(
            Method::POST,
            "/game/answer",
            Some("alice"),
            Some(json!({ "roomId": room_id, "answer": "x", "questionIndex": -1 })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["error"], "InvalidParameter");
}

#[tokio::test]
async fn body_without_json_content_type_is_invalid_parameter() {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/rooms/join")
        .header("x-player-id", "alice")
        .header("x-player-email", "alice@example.com")
        .body(Body::from(r#"{"roomId":"ROOMX"}"#))
        .unwrap();
    let res = app().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["error"], "InvalidParameter");
}

#[tokio::test]
async fn room_lifecycle_over_http() {
    let app = app();

    let res = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/rooms",
            Some("alice"),
            Some(json!({ "maxPlayers": 2 })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let created = json_body(res).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["adminId"], "alice");
    let room_id = created["roomId"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/rooms/join",
            Some("bob"),
            Some(json!({ "roomId": room_id })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let joined = json_body(res).await;
    assert_eq!(joined["room"]["players"].as_array().unwrap().len(), 2);

    let res = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/rooms/join",
            Some("carol"),
            Some(json!({ "roomId": room_id })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(res).await["error"], "RoomFull");

    let res = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/rooms/start",
            Some("bob"),
            Some(json!({ "roomId": room_id })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/rooms/start",
            Some("alice"),
            Some(json!({ "roomId": room_id })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/rooms/{room_id}"),
            Some("alice"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let room = json_body(res).await;
    assert_eq!(room["status"], "playing");
    assert_eq!(room["questions"].as_array().unwrap().len(), 10);
    let answer = room["questions"][0]["answer"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/game/answer",
            Some("bob"),
            Some(json!({ "roomId": room_id, "answer": answer, "questionIndex": 0 })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let outcome = json_body(res).await;
    assert_eq!(outcome["isCorrect"], true);
    assert_eq!(outcome["currentScore"], 1);
    assert_eq!(outcome["gameEnded"], false);
    assert_eq!(outcome["nextQuestionIndex"], 1);

    let res = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/game/answer",
            Some("bob"),
            Some(json!({ "roomId": room_id, "answer": answer, "questionIndex": 0 })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(res).await["error"], "AlreadyAnswered");

    let res = app
        .clone()
        .oneshot(request(Method::GET, "/history", Some("bob"), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!([]));
}

#[tokio::test]
async fn unknown_room_is_not_found() {
    let res = app()
        .oneshot(request(
            Method::GET,
            "/rooms/ROOMMISSING00",
            Some("alice"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(res).await["error"], "NotFound");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let res = app()
        .oneshot(request(
            Method::GET,
            routes::docs::OPENAPI_JSON_PATH,
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let doc = json_body(res).await;
    assert!(doc["paths"]["/rooms"].is_object());
    assert!(doc["paths"]["/game/answer"].is_object());
}
