use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, MemoryStore};
use server::{MessageStyle, Options};

const EMAIL: &str = "priya@example.com";
const PASSWORD: &str = "s3cret!";

async fn app_with(messages: MessageStyle) -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .store(Arc::new(MemoryStore::new()))
        .build();
    server::router(
        engine,
        db,
        Options {
            messages,
            ..Options::default()
        },
    )
}

fn basic(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{password}")))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, basic(EMAIL, PASSWORD))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, basic(EMAIL, PASSWORD))
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn signed_up(messages: MessageStyle) -> Router {
    let app = app_with(messages).await;
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/signup",
            json!({ "name": "Priya", "email": "Priya@Example.com", "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    app
}

#[tokio::test]
async fn signup_returns_profile_without_hash() {
    let app = app_with(MessageStyle::Specific).await;
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/signup",
            json!({ "name": " Priya ", "email": EMAIL, "password": PASSWORD }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Priya");
    assert_eq!(body["email"], EMAIL);
    assert_eq!(body["expenses"], 0);
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn signup_reports_every_form_error() {
    let app = app_with(MessageStyle::Specific).await;
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/signup",
            json!({ "name": "", "email": "bad", "password": "1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<(&str, &str)> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|field| {
            (
                field["field"].as_str().unwrap(),
                field["message"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        fields,
        vec![
            ("name", "Name is required"),
            ("email", "Invalid email"),
            ("password", "Min 6 characters"),
        ]
    );

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/signup",
            json!({ "name": "Priya", "email": "priya@", "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid email");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/signup",
            json!({ "name": "Priya", "email": EMAIL, "password": "12345" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Min 6 characters");
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let app = signed_up(MessageStyle::Specific).await;
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/signup",
            json!({ "name": "Other", "email": EMAIL, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn login_messages_follow_style() {
    let app = signed_up(MessageStyle::Specific).await;
    let (status, body) = send(
        &app,
        json_request("POST", "/login", json!({ "email": EMAIL, "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Wrong password");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/login",
            json!({ "email": "nobody@example.com", "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No account for this email");

    let app = signed_up(MessageStyle::Generic).await;
    let (status, body) = send(
        &app,
        json_request("POST", "/login", json!({ "email": EMAIL, "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication failed");

    let (status, body) = send(
        &app,
        json_request("POST", "/login", json!({ "email": EMAIL, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], EMAIL);
}

#[tokio::test]
async fn protected_routes_need_credentials() {
    let app = signed_up(MessageStyle::Specific).await;

    let request = Request::builder()
        .uri("/expenses")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/summary")
        .header(header::AUTHORIZATION, basic(EMAIL, "wrong-pass"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn categories_are_public() {
    let app = app_with(MessageStyle::Specific).await;
    let request = Request::builder()
        .uri("/categories")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let categories = body.as_array().unwrap();
    assert_eq!(categories.len(), 8);
    assert_eq!(categories[0]["name"], "Food & Dining");
    assert_eq!(categories[7]["name"], "Other");
}

#[tokio::test]
async fn create_and_list_expenses() {
    let app = signed_up(MessageStyle::Specific).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/expenses", json!({ "title": "Coffee", "amount": "4.5" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["synced"], true);
    assert_eq!(body["expense"]["amount_minor"], 450);
    assert_eq!(body["expense"]["amount"], "₹4.50");
    assert_eq!(body["expense"]["category"], "Food & Dining");
    assert_eq!(body["expense"]["state"]["state"], "new");

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/expenses",
            json!({ "title": "Metro", "amount": "30", "category": "Transport", "date": "2024-03-09" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, get("/expenses")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["total_minor"], 3_450);

    let (status, body) = send(&app, get("/expenses?category=Transport&date=2024-03-09")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["expenses"][0]["title"], "Metro");

    let (status, _) = send(&app, get("/expenses?date=09-03-2024")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_expense_lists_field_errors() {
    let app = signed_up(MessageStyle::Specific).await;
    let (status, body) = send(
        &app,
        json_request("POST", "/expenses", json!({ "title": " ", "amount": "0" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|field| field["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["title", "amount"]);

    let (_, body) = send(&app, get("/expenses")).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn delete_completes_after_grace() {
    let app = signed_up(MessageStyle::Specific).await;
    let (_, created) = send(
        &app,
        json_request("POST", "/expenses", json!({ "title": "Movie", "amount": "250" })),
    )
    .await;
    let id = created["expense"]["id"].as_i64().unwrap();

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/expenses/{id}"))
        .header(header::AUTHORIZATION, basic(EMAIL, PASSWORD))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, delete).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["pending_until"].is_string());

    tokio::time::sleep(Duration::from_millis(600)).await;
    let (_, body) = send(&app, get("/summary")).await;
    assert_eq!(body["total_minor"], 0);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn delete_unknown_or_malformed_id() {
    let app = signed_up(MessageStyle::Specific).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/expenses/42")
        .header(header::AUTHORIZATION, basic(EMAIL, PASSWORD))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["pending_until"].is_null());

    let request = Request::builder()
        .method("DELETE")
        .uri("/expenses/abc")
        .header(header::AUTHORIZATION, basic(EMAIL, PASSWORD))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summary_breakdown_and_totals() {
    let app = signed_up(MessageStyle::Specific).await;
    for (title, amount, category, date) in [
        ("Groceries", "60", "Food & Dining", "2024-03-09"),
        ("Bus pass", "40", "Transport", "2024-03-01"),
        ("Gift", "100", "Gifts", "2024-02-14"),
    ] {
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/expenses",
                json!({ "title": title, "amount": amount, "category": category, "date": date }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, get("/breakdown")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_minor"], 20_000);
    assert_eq!(body["categories"][0]["category"]["name"], "Other");
    assert_eq!(body["categories"][0]["percent"], 50.0);

    let (status, body) = send(&app, get("/summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["average_minor"], 6_667);
    assert_eq!(body["recent"].as_array().unwrap().len(), 3);
    assert_eq!(body["donut"]["total_minor"], 20_000);

    let (status, body) = send(&app, get("/donut")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["size"], 170.0);
    assert_eq!(body["slices"].as_array().unwrap().len(), 3);

    let (status, body) = send(&app, get("/totals?month=2024-03&date=2024-03-09")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["month_total_minor"], 10_000);
    assert_eq!(body["date_total_minor"], 6_000);

    let (status, _) = send(&app, get("/totals?month=March")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_and_reload() {
    let app = signed_up(MessageStyle::Specific).await;
    send(
        &app,
        json_request("POST", "/expenses", json!({ "title": "Tea", "amount": "1" })),
    )
    .await;

    let (status, body) = send(&app, json_request("POST", "/expenses/reload", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, _) = send(&app, json_request("POST", "/logout", json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, get("/expenses")).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn logout_completes_pending_deletion() {
    let app = signed_up(MessageStyle::Specific).await;
    for title in ["Tea", "Cake"] {
        send(
            &app,
            json_request("POST", "/expenses", json!({ "title": title, "amount": "3" })),
        )
        .await;
    }
    let (_, body) = send(&app, get("/expenses")).await;
    let id = body["expenses"][0]["id"].as_i64().unwrap();

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/expenses/{id}"))
        .header(header::AUTHORIZATION, basic(EMAIL, PASSWORD))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = send(&app, json_request("POST", "/logout", json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    tokio::time::sleep(Duration::from_millis(600)).await;
    let (_, body) = send(&app, get("/expenses")).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["expenses"][0]["title"], "Tea");
}
