//! Integration tests for kitoboy-api endpoints
//!
//! Each test runs the full router against a fresh SQLite database in a
//! temporary directory.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use kitoboy_api::services::ClassifierClient;
use kitoboy_api::{build_router, AppState};
use kitoboy_common::api::auth::{issue_token, DEFAULT_TOKEN_TTL};
use kitoboy_common::db::{create_user, init_database};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const SECRET: &str = "integration-test-secret";
const BOUNDARY: &str = "kitoboy-test-boundary";

const NEW_YEAR_EXPORT: &str = "2024-12-29T14:11:33.922Z,Lorem ipsum\n\
2025-01-01T07:12:34.542Z,Excepteur sint\n";

struct TestApp {
    db: SqlitePool,
    token: String,
    classifier: Option<ClassifierClient>,
    _dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = init_database(&dir.path().join("kitoboy.db")).await.unwrap();
        create_user(&db, "operator", "hunter2").await.unwrap();

        Self {
            db,
            token: issue_token("operator", SECRET, DEFAULT_TOKEN_TTL).unwrap(),
            classifier: None,
            _dir: dir,
        }
    }

    fn router(&self) -> Router {
        build_router(AppState::new(
            self.db.clone(),
            SECRET,
            self.classifier.clone(),
            Vec::new(),
        ))
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        (status, extract_json(response.into_body()).await)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn upload(&self, fields: &[(&str, &str)], file: Option<&str>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/create-avatar")
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(fields, file)))
            .unwrap();
        self.send(request).await
    }

    /// Upload the New Year export for a new person; returns the avatar id
    async fn create_sample_avatar(&self, surname: &str) -> String {
        let (status, body) = self
            .upload(
                &[
                    ("username", "whale_rider"),
                    ("url", "https://social.example/whale_rider"),
                    ("surname", surname),
                    ("name", "Иван"),
                ],
                Some(NEW_YEAR_EXPORT),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Classifier callback tagging every post of the avatar
    async fn tag_posts(&self, avatar_id: &str, tags: &[(&str, Vec<&str>)]) {
        let (_, avatar) = self.get(&format!("/get-avatar/{}", avatar_id)).await;
        let posts = avatar["posts"].as_array().unwrap();

        let texts: Vec<Value> = tags
            .iter()
            .map(|(text, names)| {
                let post = posts.iter().find(|p| p["text"] == *text).unwrap();
                json!({
                    "id": post["id"],
                    "predictions": names
                        .iter()
                        .map(|name| json!({ "prediction": name, "color": "#3BA7FB" }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();

        let (status, _) = self.post_json("/add-posts-attributes", json!({ "texts": texts })).await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }
}

fn multipart_body(fields: &[(&str, &str)], file: Option<&str>) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        ));
    }
    if let Some(contents) = file {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"posts.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n{}\r\n",
            BOUNDARY, contents
        ));
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    body
}

/// Test helper: Extract JSON body from response (Null for empty bodies)
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health and routing
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = TestApp::new().await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "kitoboy-api");
    assert!(body["version"].is_string());
    assert!(body["uptimeSeconds"].is_number());
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/no-such-endpoint").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .uri("/get-statuses")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let forged = Request::builder()
        .uri("/get-statuses")
        .header(
            header::AUTHORIZATION,
            format!(
                "Bearer {}",
                issue_token("operator", "other-secret", DEFAULT_TOKEN_TTL).unwrap()
            ),
        )
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_issues_usable_token() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/login", json!({ "username": " operator ", "password": "hunter2" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");

    let request = Request::builder()
        .uri("/get-statuses")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", body["token"].as_str().unwrap()),
        )
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = TestApp::new().await;

    for credentials in [
        json!({ "username": "operator", "password": "wrong" }),
        json!({ "username": "nobody", "password": "hunter2" }),
        json!({ "username": "operator" }),
    ] {
        let (status, body) = app.post_json("/login", credentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Incorrect credentials");
    }
}

#[tokio::test]
async fn test_register_then_duplicate() {
    let app = TestApp::new().await;

    let credentials = json!({ "username": "analyst", "password": "s3cret" });
    let (status, body) = app.post_json("/register", credentials.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");

    let (status, body) = app.post_json("/register", credentials).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");

    let (status, _) = app
        .post_json("/login", json!({ "username": "analyst", "password": "s3cret" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Catalogues
// =============================================================================

#[tokio::test]
async fn test_get_statuses_returns_seeded_rows() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/get-statuses").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body["statuses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect();
    assert!(ids.contains(&"suicide".to_string()));
    assert!(ids.contains(&"anti_suicide".to_string()));
    assert!(ids.contains(&"not_set".to_string()));
}

#[tokio::test]
async fn test_get_attributes_empty_catalogue() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/get-attributes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attributes"], json!([]));
}

// =============================================================================
// Avatar upload
// =============================================================================

#[tokio::test]
async fn test_create_avatar_without_classifier() {
    let app = TestApp::new().await;
    let avatar_id = app.create_sample_avatar("Иванов").await;

    let (status, avatar) = app.get(&format!("/get-avatar/{}", avatar_id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(avatar["username"], "whale_rider");
    assert_eq!(avatar["person"]["surname"], "Иванов");
    assert_eq!(avatar["status"]["id"], "not_set");

    let posts = avatar["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    // Newest first
    assert_eq!(posts[0]["text"], "Excepteur sint");
    assert_eq!(posts[1]["text"], "Lorem ipsum");
    assert_eq!(posts[0]["attributes"], json!([]));
}

#[tokio::test]
async fn test_create_avatar_for_existing_person() {
    let app = TestApp::new().await;
    let first = app.create_sample_avatar("Петров").await;
    let (_, avatar) = app.get(&format!("/get-avatar/{}", first)).await;
    let person_id = avatar["person"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .upload(
            &[("username", "second_account"), ("personId", person_id.as_str())],
            Some(NEW_YEAR_EXPORT),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, person) = app.get(&format!("/get-person-with-avatars/{}", person_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(person["surname"], "Петров");
    assert_eq!(person["avatars"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_avatar_rejects_bad_input() {
    let app = TestApp::new().await;

    let (status, body) = app.upload(&[("username", "u")], None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "IncorrectFile");

    let (status, body) = app
        .upload(&[("username", "u")], Some("29.12.2024 not a date,text\n"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "IncorrectFile");

    let (status, body) = app.upload(&[("surname", "Без ника")], Some(NEW_YEAR_EXPORT)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Incorrect avatar params");

    let (status, body) = app
        .upload(&[("username", "u"), ("personId", "missing")], Some(NEW_YEAR_EXPORT))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Incorrect person params");

    // Nothing was stored
    let (_, body) = app.post_json("/get-avatars", json!({})).await;
    assert_eq!(body["avatars"], json!([]));
}

#[tokio::test]
async fn test_create_avatar_reports_classifier_failure() {
    let mut app = TestApp::new().await;
    // Nothing listens on the discard port
    app.classifier = Some(ClassifierClient::new("http://127.0.0.1:9").unwrap());

    let (status, body) = app
        .upload(&[("username", "whale_rider")], Some(NEW_YEAR_EXPORT))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Error while sending posts to prediction, but avatar has been successfully created"
    );

    // The avatar survives the classifier failure
    let (_, body) = app.post_json("/get-avatars", json!({})).await;
    assert_eq!(body["avatars"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_avatar_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/get-avatar/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Avatar not found");
}

#[tokio::test]
async fn test_get_avatars_pagination() {
    let app = TestApp::new().await;
    for surname in ["Первый", "Второй", "Третий"] {
        app.create_sample_avatar(surname).await;
    }

    let (status, body) = app.post_json("/get-avatars", json!({ "page": 1, "size": 2 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pages"], 2);
    let avatars = body["avatars"].as_array().unwrap();
    assert_eq!(avatars.len(), 2);
    // Newest first
    assert_eq!(avatars[0]["person"]["surname"], "Третий");

    let (_, body) = app.post_json("/get-avatars", json!({ "page": 2, "size": 2 })).await;
    assert_eq!(body["avatars"].as_array().unwrap().len(), 1);

    let (_, body) = app.post_json("/get-avatars", json!({ "page": 3, "size": 2 })).await;
    assert_eq!(body["avatars"], json!([]));
}

#[tokio::test]
async fn test_get_avatars_huge_page_is_empty() {
    let app = TestApp::new().await;
    app.create_sample_avatar("Иванов").await;

    let (status, body) = app
        .post_json("/get-avatars", json!({ "page": i64::MAX, "size": 100 }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], i64::MAX);
    assert_eq!(body["pages"], 1);
    assert_eq!(body["avatars"], json!([]));
}

// =============================================================================
// Attributes
// =============================================================================

#[tokio::test]
async fn test_classifier_callback_creates_and_links_attributes() {
    let app = TestApp::new().await;
    let avatar_id = app.create_sample_avatar("Иванов").await;

    app.tag_posts(
        &avatar_id,
        &[
            ("Lorem ipsum", vec!["Депрессия"]),
            ("Excepteur sint", vec!["Депрессия", "Травля"]),
        ],
    )
    .await;

    let (_, body) = app.get("/get-attributes").await;
    let names: Vec<_> = body["attributes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Депрессия", "Травля"]);

    let (_, avatar) = app.get(&format!("/get-avatar/{}", avatar_id)).await;
    assert_eq!(avatar["posts"][0]["attributes"].as_array().unwrap().len(), 2);
    assert_eq!(avatar["posts"][1]["attributes"][0]["name"], "Депрессия");
}

#[tokio::test]
async fn test_classifier_callback_skips_unknown_posts() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json(
            "/add-posts-attributes",
            json!({ "texts": [{ "id": "missing", "predictions": [{ "prediction": "X" }] }] }),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["posts"], json!([]));

    let (status, body) = app.post_json("/add-posts-attributes", json!({ "texts": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Incorrect params");
}

#[tokio::test]
async fn test_add_and_remove_attribute() {
    let app = TestApp::new().await;
    let avatar_id = app.create_sample_avatar("Иванов").await;
    app.tag_posts(&avatar_id, &[("Lorem ipsum", vec!["Депрессия"])]).await;

    let (_, avatar) = app.get(&format!("/get-avatar/{}", avatar_id)).await;
    let untagged = avatar["posts"][0]["id"].as_str().unwrap().to_string();
    let attribute_id = avatar["posts"][1]["attributes"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = app
        .post_json(
            &format!("/add-attribute/{}", untagged),
            json!({ "attributeId": attribute_id }),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (_, avatar) = app.get(&format!("/get-avatar/{}", avatar_id)).await;
    assert_eq!(avatar["posts"][0]["attributes"][0]["id"], attribute_id.as_str());

    let (status, _) = app
        .post_json(
            &format!("/remove-attribute/{}", untagged),
            json!({ "attributeId": attribute_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post_json(
            &format!("/remove-attribute/{}", untagged),
            json!({ "attributeId": attribute_id }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        format!("Attribute {} not found at post {}", attribute_id, untagged)
    );

    let (status, body) = app
        .post_json(&format!("/add-attribute/{}", untagged), json!({ "attributeId": "missing" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Incorrect params");
}

// =============================================================================
// Dynamics
// =============================================================================

#[tokio::test]
async fn test_dynamics_by_day_and_month() {
    let app = TestApp::new().await;
    let avatar_id = app.create_sample_avatar("Иванов").await;
    app.tag_posts(
        &avatar_id,
        &[
            ("Lorem ipsum", vec!["Травля"]),
            ("Excepteur sint", vec!["Травля", "Депрессия"]),
        ],
    )
    .await;

    let (_, body) = app.get("/get-attributes").await;
    let id_of = |name: &str| {
        body["attributes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|a| a["name"] == name)
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string()
    };
    let bullying = id_of("Травля");
    let depression = id_of("Депрессия");

    let (status, chart) = app
        .get(&format!(
            "/get-avatar/{}/dynamics?startDate=2024-12-28&endDate=2025-01-02&granularity=day&attributeIds={},{}",
            avatar_id, bullying, depression
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        chart["labels"],
        json!(["28/12/2024", "29/12/2024", "30/12/2024", "31/12/2024", "1/1/2025", "2/1/2025"])
    );
    assert_eq!(chart["datasets"][0]["label"], "Травля");
    assert_eq!(chart["datasets"][0]["data"], json!([0, 1, 0, 0, 1, 0]));
    assert_eq!(chart["datasets"][1]["data"], json!([0, 0, 0, 0, 1, 0]));
    assert!(chart.get("warning").is_none());
    assert_eq!(chart["availableAttributes"].as_array().unwrap().len(), 2);

    let (_, chart) = app
        .get(&format!(
            "/get-avatar/{}/dynamics?startDate=2024-12-28&endDate=2025-01-02&granularity=month&attributeIds={}",
            avatar_id, bullying
        ))
        .await;
    assert_eq!(chart["labels"], json!(["Декабрь 2024", "Январь 2025"]));
    assert_eq!(chart["datasets"][0]["data"], json!([1, 1]));
}

#[tokio::test]
async fn test_dynamics_day_cap_warning() {
    let app = TestApp::new().await;
    let avatar_id = app.create_sample_avatar("Иванов").await;
    app.tag_posts(&avatar_id, &[("Lorem ipsum", vec!["Травля"])]).await;
    let (_, body) = app.get("/get-attributes").await;
    let attribute_id = body["attributes"][0]["id"].as_str().unwrap().to_string();

    let (status, chart) = app
        .get(&format!(
            "/get-avatar/{}/dynamics?startDate=2024-01-01&endDate=2025-01-01&granularity=day&attributeIds={}",
            avatar_id, attribute_id
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(chart["labels"].as_array().unwrap().len(), 91);
    assert_eq!(
        chart["warning"],
        "Максимальное количество отображаемых дней: 90. Выберите другую скважность для выбранного периода"
    );
}

#[tokio::test]
async fn test_dynamics_without_selection_is_empty() {
    let app = TestApp::new().await;
    let avatar_id = app.create_sample_avatar("Иванов").await;

    let (status, chart) = app
        .get(&format!(
            "/get-avatar/{}/dynamics?startDate=2024-12-28&endDate=2025-01-02&granularity=year",
            avatar_id
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chart["labels"], json!([]));
    assert_eq!(chart["datasets"], json!([]));

    let (status, body) = app
        .get(&format!("/get-avatar/{}/dynamics?utcOffsetMinutes=east", avatar_id))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Incorrect utcOffsetMinutes");

    let (status, _) = app.get("/get-avatar/missing/dynamics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dynamics_rejects_unbounded_month_range() {
    let app = TestApp::new().await;
    let avatar_id = app.create_sample_avatar("Иванов").await;
    app.tag_posts(&avatar_id, &[("Lorem ipsum", vec!["Травля"])]).await;
    let (_, body) = app.get("/get-attributes").await;
    let attribute_id = body["attributes"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .get(&format!(
            "/get-avatar/{}/dynamics?startDate=0001-01-01&endDate=9999-12-31&granularity=month&attributeIds={}",
            avatar_id, attribute_id
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Period too long: at most 100 years");

    // The same range by day is served, capped with a warning
    let (status, chart) = app
        .get(&format!(
            "/get-avatar/{}/dynamics?startDate=0001-01-01&endDate=9999-12-31&granularity=day&attributeIds={}",
            avatar_id, attribute_id
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chart["labels"].as_array().unwrap().len(), 91);
    assert!(chart["warning"].is_string());
}

// =============================================================================
// Persons and statuses
// =============================================================================

#[tokio::test]
async fn test_search_person_case_insensitive_cyrillic() {
    let app = TestApp::new().await;
    app.create_sample_avatar("Иванов").await;
    app.create_sample_avatar("Сидоров").await;

    // "иван"
    let (status, body) = app.get("/search-person?searchString=%D0%B8%D0%B2%D0%B0%D0%BD").await;
    assert_eq!(status, StatusCode::OK);
    let persons = body["persons"].as_array().unwrap();
    // Both persons have the first name "Иван"
    assert_eq!(persons.len(), 2);

    let (_, body) = app.get("/search-person?searchString=%D0%A1%D0%98%D0%94").await;
    let persons = body["persons"].as_array().unwrap();
    assert_eq!(persons.len(), 1);
    assert_eq!(persons[0]["surname"], "Сидоров");

    let (_, body) = app.get("/search-person?searchString=").await;
    assert_eq!(body["persons"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_person_fields() {
    let app = TestApp::new().await;
    let avatar_id = app.create_sample_avatar("Иванов").await;
    let (_, avatar) = app.get(&format!("/get-avatar/{}", avatar_id)).await;
    let person_id = avatar["person"]["id"].as_str().unwrap().to_string();

    let (status, person) = app
        .post_json(
            &format!("/update-person/{}", person_id),
            json!({ "phone": "+7 900 000-00-00", "description": "Школа №5" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(person["phone"], "+7 900 000-00-00");
    assert_eq!(person["description"], "Школа №5");
    assert_eq!(person["surname"], "Иванов");

    let (status, body) = app
        .post_json(&format!("/update-person/{}", person_id), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Incorrect body params");

    let (status, body) = app
        .post_json("/update-person/missing", json!({ "phone": "1" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Error while updating person");
}

#[tokio::test]
async fn test_status_updates() {
    let app = TestApp::new().await;
    let avatar_id = app.create_sample_avatar("Иванов").await;
    let (_, avatar) = app.get(&format!("/get-avatar/{}", avatar_id)).await;
    let person_id = avatar["person"]["id"].as_str().unwrap().to_string();

    let (status, avatar) = app
        .post_json(
            &format!("/update-avatar-status/{}", avatar_id),
            json!({ "statusId": "suicide" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(avatar["statusId"], "suicide");

    let (status, person) = app
        .post_json(
            &format!("/update-person-status/{}", person_id),
            json!({ "statusId": "anti_suicide" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(person["statusId"], "anti_suicide");

    let (_, view) = app.get(&format!("/get-person-with-avatars/{}", person_id)).await;
    assert_eq!(view["status"]["name"], "Безопасный");
    assert_eq!(view["avatars"][0]["status"]["id"], "suicide");

    let (status, body) = app
        .post_json(
            &format!("/update-avatar-status/{}", avatar_id),
            json!({ "statusId": "at_risk" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown status at_risk");

    let (status, body) = app
        .post_json("/update-avatar-status/missing", json!({ "statusId": "suicide" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Error while updating avatar status");

    let (status, body) = app.get("/get-person-with-avatars/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Person not found");
}
