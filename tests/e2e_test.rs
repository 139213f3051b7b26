use axum::body::Body;
use axum::http::{Request, StatusCode};
use book_catalog::adapters::mock::BookRepository as InMemoryBookRepository;
use book_catalog::api::handlers::AppState;
use book_catalog::api::router::create_router;
use book_catalog::application::book::ServiceDependencies;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::book_payload;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// インメモリのリポジトリと実際のAPIルーターでアプリケーションを組み立てる
fn setup_app() -> axum::Router {
    let book_repository = Arc::new(InMemoryBookRepository::new());
    let app_state = Arc::new(AppState {
        service_deps: ServiceDependencies { book_repository },
    });

    create_router(app_state)
}

/// リクエストを送り、ステータスとJSONボディを返す
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap();

    (status, json)
}

/// 書籍を登録し、採番されたIDを返す
async fn create(app: &axum::Router, title: &str) -> i64 {
    let (status, body) = send(app, "POST", "/books", Some(book_payload(title))).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_i64().unwrap()
}

// ============================================================================
// 一覧
// ============================================================================

#[tokio::test]
async fn test_list_on_empty_table_reports_no_data() {
    let app = setup_app();

    let (status, body) = send(&app, "GET", "/books", None).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(
        body,
        json!({
            "code": 202,
            "status": "success",
            "message": "data successfully accepted",
            "data": "no data available",
        })
    );
}

#[tokio::test]
async fn test_list_after_create_contains_exactly_that_book() {
    let app = setup_app();
    let (_, created) = send(&app, "POST", "/books", Some(book_payload("Dune"))).await;

    let (status, body) = send(&app, "GET", "/books", None).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    let books = body["data"].as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0], created["data"]);
}

// ============================================================================
// 登録
// ============================================================================

#[tokio::test]
async fn test_create_returns_code_202_with_http_200() {
    let app = setup_app();

    let (status, body) = send(&app, "POST", "/books", Some(book_payload("Dune"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 202);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "data successfully created");
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["title"], "Dune");
    assert_eq!(body["data"]["author"], "Frank Herbert");
    assert_eq!(body["data"]["date_of_issue"], "1965-08-01");
    assert!(body["data"]["created_at"].is_string());
    assert!(body["data"]["updated_at"].is_string());
}

#[tokio::test]
async fn test_create_with_duplicate_title_fails_on_title() {
    let app = setup_app();
    create(&app, "Dune").await;

    let (status, body) = send(&app, "POST", "/books", Some(book_payload("Dune"))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 422);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "data not match with our validation");
    assert_eq!(
        body["data"],
        json!({"title": ["The title has already been taken."]})
    );
}

#[tokio::test]
async fn test_title_uniqueness_is_case_sensitive() {
    let app = setup_app();
    create(&app, "Dune").await;

    let (status, _) = send(&app, "POST", "/books", Some(book_payload("DUNE"))).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_with_missing_author_names_author() {
    let app = setup_app();
    let mut payload = book_payload("Dune");
    payload.as_object_mut().unwrap().remove("author");

    let (status, body) = send(&app, "POST", "/books", Some(payload)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["data"],
        json!({"author": ["The author field is required."]})
    );
}

#[tokio::test]
async fn test_create_reports_all_missing_fields_at_once() {
    let app = setup_app();

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({"title": "Dune", "date_of_issue": "1965-08-01"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = body["data"].as_object().unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors.contains_key("description"));
    assert!(errors.contains_key("author"));
    assert!(errors.contains_key("publisher"));
}

#[tokio::test]
async fn test_create_with_invalid_date_fails() {
    let app = setup_app();
    let mut payload = book_payload("Dune");
    payload["date_of_issue"] = json!("2023-13-40");

    let (status, body) = send(&app, "POST", "/books", Some(payload)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["data"]["date_of_issue"].is_array());
    assert!(body["data"].get("title").is_none());
}

#[tokio::test]
async fn test_create_with_unpadded_or_short_year_date_fails() {
    let app = setup_app();

    for loose in ["1965-8-1", "65-08-01"] {
        let mut payload = book_payload("Dune");
        payload["date_of_issue"] = json!(loose);

        let (status, body) = send(&app, "POST", "/books", Some(payload)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{} was accepted", loose);
        assert!(
            body["data"]["date_of_issue"]
                .as_array()
                .unwrap()
                .contains(&json!("The date of issue does not match the format Y-m-d."))
        );
    }

    let (_, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(body["data"], "no data available");
}

#[tokio::test]
async fn test_create_without_body_reports_every_field() {
    let app = setup_app();

    let (status, body) = send(&app, "POST", "/books", None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"].as_object().unwrap().len(), 5);
}

// ============================================================================
// 詳細取得
// ============================================================================

#[tokio::test]
async fn test_get_unknown_book_returns_404_without_data() {
    let app = setup_app();

    let (status, body) = send(&app, "GET", "/books/42", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({
            "code": 404,
            "status": "error",
            "message": "book not found in our database",
        })
    );
}

#[tokio::test]
async fn test_get_with_non_numeric_id_returns_404() {
    let app = setup_app();

    let (status, body) = send(&app, "GET", "/books/abc", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_get_existing_book_returns_206_with_stored_record() {
    let app = setup_app();
    let (_, created) = send(&app, "POST", "/books", Some(book_payload("Dune"))).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/books/{}", id), None).await;

    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(body["code"], 206);
    assert_eq!(body["message"], "data successfully accepted");
    assert_eq!(body["data"], created["data"]);
}

// ============================================================================
// 更新
// ============================================================================

#[tokio::test]
async fn test_update_only_author_keeps_other_fields() {
    let app = setup_app();
    let (_, created) = send(&app, "POST", "/books", Some(book_payload("Dune"))).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/books/{}", id),
        Some(json!({"author": "F. Herbert"})),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["code"], 202);
    assert_eq!(body["message"], "data successfully updated");

    let updated = &body["data"];
    assert_eq!(updated["author"], "F. Herbert");
    for field in ["title", "description", "publisher", "date_of_issue", "created_at"] {
        assert_eq!(updated[field], created["data"][field], "{} changed", field);
    }

    let (_, fetched) = send(&app, "GET", &format!("/books/{}", id), None).await;
    assert_eq!(fetched["data"]["author"], "F. Herbert");
}

#[tokio::test]
async fn test_update_with_own_title_succeeds() {
    let app = setup_app();
    let id = create(&app, "Dune").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/books/{}", id),
        Some(json!({"title": "Dune", "publisher": "Ace"})),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["data"]["title"], "Dune");
    assert_eq!(body["data"]["publisher"], "Ace");
}

#[tokio::test]
async fn test_update_with_other_books_title_fails() {
    let app = setup_app();
    create(&app, "Dune").await;
    let id = create(&app, "Children of Dune").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/books/{}", id),
        Some(json!({"title": "Dune"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["data"],
        json!({"title": ["The title has already been taken."]})
    );
}

#[tokio::test]
async fn test_update_unknown_book_returns_404() {
    let app = setup_app();

    let (status, body) = send(
        &app,
        "PATCH",
        "/books/7",
        Some(json!({"author": "Someone"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "book not found in our database");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_update_validates_before_lookup() {
    let app = setup_app();

    let (status, body) = send(
        &app,
        "PATCH",
        "/books/7",
        Some(json!({"date_of_issue": "yesterday"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["data"]["date_of_issue"].is_array());
}

#[tokio::test]
async fn test_update_with_null_field_keeps_value() {
    let app = setup_app();
    let id = create(&app, "Dune").await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/books/{}", id),
        Some(json!({"author": null})),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["data"]["author"], "Frank Herbert");
}

// ============================================================================
// 削除
// ============================================================================

#[tokio::test]
async fn test_delete_returns_remaining_books() {
    let app = setup_app();
    let first = create(&app, "Dune").await;
    let second = create(&app, "Dune Messiah").await;

    let (status, body) = send(&app, "DELETE", &format!("/books/{}", first), None).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["code"], 202);
    assert_eq!(body["message"], "data successfully removed");
    let remaining = body["data"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["id"], second);
}

#[tokio::test]
async fn test_delete_last_book_then_list_reports_no_data() {
    let app = setup_app();
    let id = create(&app, "Dune").await;

    let (status, body) = send(&app, "DELETE", &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["data"], "no data available");

    let (status, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["data"], "no data available");
}

#[tokio::test]
async fn test_delete_unknown_book_returns_404() {
    let app = setup_app();

    let (status, body) = send(&app, "DELETE", "/books/1", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
    assert!(body.get("data").is_none());
}
