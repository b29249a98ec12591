//! API integration tests for recipe-server.
//!
//! These tests drive the full router in-process against the in-memory store,
//! authenticating with HS256 tokens signed by the development secret.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use recipe_server::config::DEV_JWT_SECRET;
use recipe_server::{create_router, create_router_with_config, Config};
use serde::Serialize;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const ALICE: i64 = 1;
const BOB: i64 = 2;

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    exp: u64,
}

fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn token_with_exp(owner: i64, exp: u64) -> String {
    let claims = TestClaims {
        sub: owner.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(DEV_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn token(owner: i64) -> String {
    token_with_exp(owner, now_epoch() + 3600)
}

/// Helper to create a multipart body with a single file field
fn create_image_multipart(field: &str, content: &[u8], content_type: &str) -> (String, Vec<u8>) {
    let boundary = "----TestBoundary7MA4YWxkTrZu0gW";
    let mut body = Vec::new();

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"upload.bin\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    (format!("multipart/form-data; boundary={}", boundary), body)
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([10, 120, 60]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// PNG of `size`x`size` pseudo-random pixels; noise keeps it from compressing
fn noise_png(size: u32) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    let img = image::RgbImage::from_fn(size, size, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        image::Rgb([r, g, b])
    });
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Router plus the temporary media root it writes uploads to
struct TestApp {
    router: Router,
    media: TempDir,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(Config::default())
    }

    fn with_config(config: Config) -> Self {
        let media = tempfile::tempdir().unwrap();
        let config = Config {
            media_root: media.path().to_path_buf(),
            ..config
        };
        Self {
            router: create_router_with_config(&config),
            media,
        }
    }

    fn media_path(&self, url: &str) -> PathBuf {
        self.media.path().join(url.trim_start_matches("/media/"))
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        owner: i64,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token(owner)));

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn get(&self, uri: &str, owner: i64) -> (StatusCode, Value) {
        self.call(Method::GET, uri, owner, None).await
    }

    async fn upload(
        &self,
        recipe_id: i64,
        owner: i64,
        field: &str,
        content: &[u8],
    ) -> (StatusCode, Value) {
        let (content_type, body) = create_image_multipart(field, content, "image/png");
        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/recipe/recipes/{}/upload-image", recipe_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token(owner)))
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn create_recipe(&self, owner: i64, payload: Value) -> Value {
        let (status, json) = self
            .call(Method::POST, "/api/recipe/recipes", owner, Some(payload))
            .await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", json);
        json
    }
}

fn sample_recipe(title: &str, tags: &[&str], ingredients: &[&str]) -> Value {
    json!({
        "title": title,
        "time_minutes": 10,
        "price": "5.50",
        "tags": tags.iter().map(|name| json!({"name": name})).collect::<Vec<_>>(),
        "ingredients": ingredients.iter().map(|name| json!({"name": name})).collect::<Vec<_>>(),
    })
}

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}

fn id_of(entity: &Value) -> i64 {
    entity["id"].as_i64().unwrap()
}

// ============================================================================
// Health & Readiness Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = create_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "healthy");
    assert_eq!(json["persistent_storage"], false);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ready_endpoint_returns_ok() {
    let app = TestApp::new();

    let (status, json) = app
        .send(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = TestApp::new();

    let (status, json) = app
        .send(
            Request::builder()
                .uri("/api/recipe/recipes")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "AUTH_MISSING_TOKEN");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::new();

    let (status, json) = app
        .send(
            Request::builder()
                .uri("/api/recipe/tags")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", token_with_exp(ALICE, now_epoch() - 3600)),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "AUTH_TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let app = TestApp::new();
    let claims = TestClaims {
        sub: ALICE.to_string(),
        exp: now_epoch() + 3600,
    };
    let forged = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"not-the-server-secret"),
    )
    .unwrap();

    let (status, json) = app
        .send(
            Request::builder()
                .uri("/api/recipe/ingredients")
                .header(header::AUTHORIZATION, format!("Bearer {}", forged))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "AUTH_INVALID_TOKEN");
}

// ============================================================================
// Recipe Create / Retrieve Tests
// ============================================================================

#[tokio::test]
async fn test_create_recipe_returns_detail() {
    let app = TestApp::new();

    let created = app
        .create_recipe(
            ALICE,
            json!({
                "title": "Thai Prawn Curry",
                "description": "Creamy and spicy",
                "time_minutes": 30,
                "price": "12.50",
                "link": "https://example.com/curry",
                "tags": [{"name": "Thai"}, {"name": "Dinner"}],
                "ingredients": [{"name": "Prawns"}],
            }),
        )
        .await;

    assert_eq!(created["title"], "Thai Prawn Curry");
    assert_eq!(created["description"], "Creamy and spicy");
    assert_eq!(created["time_minutes"], 30);
    assert_eq!(created["price"], "12.50");
    assert_eq!(created["image"], Value::Null);
    assert_eq!(created["tags"].as_array().unwrap().len(), 2);
    assert_eq!(names(&created["ingredients"]), vec!["Prawns"]);

    let (status, detail) = app
        .get(&format!("/api/recipe/recipes/{}", id_of(&created)), ALICE)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail, created);
}

#[tokio::test]
async fn test_create_ignores_owner_in_payload() {
    let app = TestApp::new();

    let mut payload = sample_recipe("Spoofed", &["Vegan"], &[]);
    payload["user"] = json!(BOB);
    let created = app.create_recipe(ALICE, payload).await;

    let (_, alice_list) = app.get("/api/recipe/recipes", ALICE).await;
    assert_eq!(ids(&alice_list), vec![id_of(&created)]);

    let (_, bob_list) = app.get("/api/recipe/recipes", BOB).await;
    assert_eq!(bob_list, json!([]));

    let (_, bob_tags) = app.get("/api/recipe/tags", BOB).await;
    assert_eq!(bob_tags, json!([]));
}

#[tokio::test]
async fn test_create_reports_field_errors() {
    let app = TestApp::new();

    let (status, json) = app
        .call(
            Method::POST,
            "/api/recipe/recipes",
            ALICE,
            Some(json!({"title": "", "price": "1234.00"})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_FAILED");
    assert_eq!(json["fields"]["title"][0], "This field may not be blank.");
    assert_eq!(json["fields"]["time_minutes"][0], "This field is required.");
    assert!(json["fields"]["price"].is_array());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/recipe/recipes")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(ALICE)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let (status, json) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_other_users_recipe_is_not_found() {
    let app = TestApp::new();
    let created = app.create_recipe(BOB, sample_recipe("Bob's", &[], &[])).await;
    let uri = format!("/api/recipe/recipes/{}", id_of(&created));

    let (status, json) = app.get(&uri, ALICE).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");

    let (status, _) = app
        .call(Method::PATCH, &uri, ALICE, Some(json!({"title": "Mine now"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call(Method::DELETE, &uri, ALICE, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, unchanged) = app.get(&uri, BOB).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["title"], "Bob's");
}

#[tokio::test]
async fn test_unknown_and_non_numeric_ids_are_not_found() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/recipe/recipes/999", ALICE).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/recipe/recipes/abc", ALICE).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Recipe Listing & Filtering Tests
// ============================================================================

#[tokio::test]
async fn test_list_is_owner_scoped_and_newest_first() {
    let app = TestApp::new();
    let first = app.create_recipe(ALICE, sample_recipe("First", &[], &[])).await;
    app.create_recipe(BOB, sample_recipe("Other", &[], &[])).await;
    let second = app.create_recipe(ALICE, sample_recipe("Second", &[], &[])).await;

    let (status, list) = app.get("/api/recipe/recipes", ALICE).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&list), vec![id_of(&second), id_of(&first)]);
    // Summary representation omits detail-only fields
    assert!(list[0].get("description").is_none());
    assert!(list[0].get("image").is_none());
}

#[tokio::test]
async fn test_filter_by_tags_matches_any_tag_once() {
    let app = TestApp::new();
    let vegan = app
        .create_recipe(ALICE, sample_recipe("Tofu bowl", &["Vegan"], &[]))
        .await;
    let both = app
        .create_recipe(ALICE, sample_recipe("Salad", &["Vegan", "Quick"], &[]))
        .await;
    let untagged = app.create_recipe(ALICE, sample_recipe("Stew", &[], &[])).await;

    let vegan_tag = id_of(&vegan["tags"][0]);
    let quick_tag = both["tags"]
        .as_array()
        .unwrap()
        .iter()
        .find(|tag| tag["name"] == "Quick")
        .map(id_of)
        .unwrap();

    let (status, list) = app
        .get(
            &format!("/api/recipe/recipes?tags={},{}", vegan_tag, quick_tag),
            ALICE,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&list), vec![id_of(&both), id_of(&vegan)]);
    assert!(!ids(&list).contains(&id_of(&untagged)));
}

#[tokio::test]
async fn test_tag_and_ingredient_filters_combine() {
    let app = TestApp::new();
    let tagged_only = app
        .create_recipe(ALICE, sample_recipe("Tagged", &["Dinner"], &[]))
        .await;
    let both = app
        .create_recipe(ALICE, sample_recipe("Both", &["Dinner"], &["Rice"]))
        .await;
    app.create_recipe(ALICE, sample_recipe("Ingredient only", &[], &["Rice"]))
        .await;

    let dinner = id_of(&tagged_only["tags"][0]);
    let rice = id_of(&both["ingredients"][0]);

    let (status, list) = app
        .get(
            &format!("/api/recipe/recipes?tags={}&ingredients={}", dinner, rice),
            ALICE,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&list), vec![id_of(&both)]);
}

#[tokio::test]
async fn test_empty_filter_means_no_filter() {
    let app = TestApp::new();
    app.create_recipe(ALICE, sample_recipe("One", &["Vegan"], &[])).await;
    app.create_recipe(ALICE, sample_recipe("Two", &[], &[])).await;

    let (status, list) = app.get("/api/recipe/recipes?tags=&ingredients=", ALICE).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_foreign_tag_ids_filter_nothing_in() {
    let app = TestApp::new();
    let bobs = app
        .create_recipe(BOB, sample_recipe("Bob's", &["Vegan"], &[]))
        .await;
    app.create_recipe(ALICE, sample_recipe("Alice's", &["Vegan"], &[]))
        .await;

    let (_, list) = app
        .get(
            &format!("/api/recipe/recipes?tags={}", id_of(&bobs["tags"][0])),
            ALICE,
        )
        .await;

    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_malformed_filter_is_rejected() {
    let app = TestApp::new();

    for query in ["tags=1,x", "ingredients=abc", "tags=1,,2"] {
        let (status, json) = app
            .get(&format!("/api/recipe/recipes?{}", query), ALICE)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query: {}", query);
        assert_eq!(json["code"], "INVALID_FILTER_FORMAT");
    }
}

// ============================================================================
// Recipe Update / Delete Tests
// ============================================================================

#[tokio::test]
async fn test_partial_update_keeps_omitted_fields() {
    let app = TestApp::new();
    let created = app
        .create_recipe(ALICE, sample_recipe("Old title", &["Thai"], &["Rice"]))
        .await;
    let uri = format!("/api/recipe/recipes/{}", id_of(&created));

    let (status, updated) = app
        .call(Method::PATCH, &uri, ALICE, Some(json!({"title": "New title"})))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "New title");
    assert_eq!(updated["price"], "5.50");
    assert_eq!(updated["tags"], created["tags"]);
    assert_eq!(updated["ingredients"], created["ingredients"]);
}

#[tokio::test]
async fn test_patch_replaces_tag_set() {
    let app = TestApp::new();
    let created = app
        .create_recipe(ALICE, sample_recipe("Curry", &["Thai"], &[]))
        .await;
    let uri = format!("/api/recipe/recipes/{}", id_of(&created));

    let (status, updated) = app
        .call(
            Method::PATCH,
            &uri,
            ALICE,
            Some(json!({"tags": [{"name": "Lunch"}]})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&updated["tags"]), vec!["Lunch"]);

    // The old tag survives, it is just no longer assigned
    let (_, all_tags) = app.get("/api/recipe/tags", ALICE).await;
    assert_eq!(names(&all_tags), vec!["Thai", "Lunch"]);
}

#[tokio::test]
async fn test_full_update_requires_all_fields() {
    let app = TestApp::new();
    let created = app.create_recipe(ALICE, sample_recipe("Curry", &[], &[])).await;
    let uri = format!("/api/recipe/recipes/{}", id_of(&created));

    let (status, json) = app
        .call(Method::PUT, &uri, ALICE, Some(json!({"title": "Only title"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["fields"]["price"][0], "This field is required.");

    let (status, updated) = app
        .call(
            Method::PUT,
            &uri,
            ALICE,
            Some(json!({
                "title": "Spaghetti Carbonara",
                "time_minutes": 25,
                "price": 7.5,
                "user": BOB,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Spaghetti Carbonara");
    assert_eq!(updated["price"], "7.50");

    // Still Alice's recipe
    let (status, _) = app.get(&uri, ALICE).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_recipe() {
    let app = TestApp::new();
    let created = app.create_recipe(ALICE, sample_recipe("Gone", &[], &[])).await;
    let uri = format!("/api/recipe/recipes/{}", id_of(&created));

    let (status, body) = app.call(Method::DELETE, &uri, ALICE, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.get(&uri, ALICE).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Tag & Ingredient Tests
// ============================================================================

#[tokio::test]
async fn test_tags_are_reused_within_owner_only() {
    let app = TestApp::new();
    let first = app.create_recipe(ALICE, sample_recipe("A", &["Vegan"], &[])).await;
    let second = app.create_recipe(ALICE, sample_recipe("B", &["Vegan"], &[])).await;
    let bobs = app.create_recipe(BOB, sample_recipe("C", &["Vegan"], &[])).await;

    assert_eq!(id_of(&first["tags"][0]), id_of(&second["tags"][0]));
    assert_ne!(id_of(&first["tags"][0]), id_of(&bobs["tags"][0]));

    let (_, alice_tags) = app.get("/api/recipe/tags", ALICE).await;
    assert_eq!(names(&alice_tags), vec!["Vegan"]);
}

#[tokio::test]
async fn test_tags_listed_by_name_descending() {
    let app = TestApp::new();
    app.create_recipe(ALICE, sample_recipe("A", &["Breakfast", "Vegan", "Lunch"], &[]))
        .await;

    let (status, tags) = app.get("/api/recipe/tags", ALICE).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&tags), vec!["Vegan", "Lunch", "Breakfast"]);
}

#[tokio::test]
async fn test_assigned_only_filters_unused_ingredients() {
    let app = TestApp::new();
    let created = app
        .create_recipe(ALICE, sample_recipe("Porridge", &[], &["Oats", "Honey"]))
        .await;
    let uri = format!("/api/recipe/recipes/{}", id_of(&created));
    app.call(
        Method::PATCH,
        &uri,
        ALICE,
        Some(json!({"ingredients": [{"name": "Oats"}]})),
    )
    .await;

    let (_, assigned) = app
        .get("/api/recipe/ingredients?assigned_only=1", ALICE)
        .await;
    assert_eq!(names(&assigned), vec!["Oats"]);

    let (_, all) = app.get("/api/recipe/ingredients?assigned_only=0", ALICE).await;
    assert_eq!(names(&all), vec!["Oats", "Honey"]);

    let (_, default) = app.get("/api/recipe/ingredients", ALICE).await;
    assert_eq!(default, all);
}

#[tokio::test]
async fn test_assigned_only_shared_tag_listed_once() {
    let app = TestApp::new();
    app.create_recipe(ALICE, sample_recipe("A", &["Dinner"], &[])).await;
    app.create_recipe(ALICE, sample_recipe("B", &["Dinner"], &[])).await;

    let (_, tags) = app.get("/api/recipe/tags?assigned_only=1", ALICE).await;
    assert_eq!(names(&tags), vec!["Dinner"]);
}

#[tokio::test]
async fn test_invalid_assigned_only_is_rejected() {
    let app = TestApp::new();

    let (status, json) = app.get("/api/recipe/tags?assigned_only=yes", ALICE).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_FILTER_FORMAT");
}

#[tokio::test]
async fn test_rename_tag() {
    let app = TestApp::new();
    let created = app.create_recipe(ALICE, sample_recipe("A", &["Dinnr"], &[])).await;
    let tag_id = id_of(&created["tags"][0]);
    let uri = format!("/api/recipe/tags/{}", tag_id);

    let (status, tag) = app
        .call(Method::PATCH, &uri, ALICE, Some(json!({"name": "Dinner"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tag, json!({"id": tag_id, "name": "Dinner"}));

    let (status, json) = app
        .call(Method::PUT, &uri, ALICE, Some(json!({"name": "  "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["fields"]["name"][0], "This field may not be blank.");

    let (status, _) = app
        .call(Method::PUT, &uri, BOB, Some(json!({"name": "Stolen"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_ingredient_detaches_it() {
    let app = TestApp::new();
    let created = app
        .create_recipe(ALICE, sample_recipe("Toast", &[], &["Bread", "Butter"]))
        .await;
    let butter = created["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["name"] == "Butter")
        .map(id_of)
        .unwrap();

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/recipe/ingredients/{}", butter),
            BOB,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/recipe/ingredients/{}", butter),
            ALICE,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, recipe) = app
        .get(&format!("/api/recipe/recipes/{}", id_of(&created)), ALICE)
        .await;
    assert_eq!(names(&recipe["ingredients"]), vec!["Bread"]);
}

// ============================================================================
// Image Upload Tests
// ============================================================================

#[tokio::test]
async fn test_upload_image() {
    let app = TestApp::new();
    let created = app.create_recipe(ALICE, sample_recipe("Photo", &[], &[])).await;
    let recipe_id = id_of(&created);

    let (status, json) = app.upload(recipe_id, ALICE, "image", &png_bytes()).await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", json);
    assert_eq!(json["id"], recipe_id);
    let url = json["image"].as_str().unwrap();
    assert!(url.starts_with("/media/uploads/recipe/"));
    assert!(url.ends_with(".png"));
    assert!(app.media_path(url).exists());

    let (_, detail) = app
        .get(&format!("/api/recipe/recipes/{}", recipe_id), ALICE)
        .await;
    assert_eq!(detail["image"], url);
}

#[tokio::test]
async fn test_upload_replaces_previous_image() {
    let app = TestApp::new();
    let recipe_id = id_of(&app.create_recipe(ALICE, sample_recipe("Photo", &[], &[])).await);

    let (_, first) = app.upload(recipe_id, ALICE, "image", &png_bytes()).await;
    let (_, second) = app.upload(recipe_id, ALICE, "image", &png_bytes()).await;

    let first_url = first["image"].as_str().unwrap();
    let second_url = second["image"].as_str().unwrap();
    assert_ne!(first_url, second_url);
    assert!(!app.media_path(first_url).exists());
    assert!(app.media_path(second_url).exists());
}

#[tokio::test]
async fn test_upload_invalid_image() {
    let app = TestApp::new();
    let recipe_id = id_of(&app.create_recipe(ALICE, sample_recipe("Photo", &[], &[])).await);

    let (status, json) = app.upload(recipe_id, ALICE, "image", b"notanimage").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_FAILED");
    assert!(json["fields"]["image"][0]
        .as_str()
        .unwrap()
        .starts_with("Upload a valid image."));

    let (_, detail) = app
        .get(&format!("/api/recipe/recipes/{}", recipe_id), ALICE)
        .await;
    assert_eq!(detail["image"], Value::Null);
}

#[tokio::test]
async fn test_upload_missing_image_field() {
    let app = TestApp::new();
    let recipe_id = id_of(&app.create_recipe(ALICE, sample_recipe("Photo", &[], &[])).await);

    let (status, json) = app.upload(recipe_id, ALICE, "file", &png_bytes()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["fields"]["image"][0], "No file was submitted.");
}

#[tokio::test]
async fn test_upload_to_other_users_recipe_is_not_found() {
    let app = TestApp::new();
    let recipe_id = id_of(&app.create_recipe(BOB, sample_recipe("Bob's", &[], &[])).await);

    let (status, _) = app.upload(recipe_id, ALICE, "image", &png_bytes()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_larger_than_default_extractor_limit() {
    let app = TestApp::new();
    let recipe_id = id_of(&app.create_recipe(ALICE, sample_recipe("Photo", &[], &[])).await);

    let png = noise_png(1000);
    assert!(png.len() > 2 * 1024 * 1024);
    assert!(png.len() < Config::default().max_file_size());

    let (status, json) = app.upload(recipe_id, ALICE, "image", &png).await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", json);
    let url = json["image"].as_str().unwrap();
    assert_eq!(std::fs::read(app.media_path(url)).unwrap().len(), png.len());
}

#[tokio::test]
async fn test_upload_over_configured_size_is_field_error() {
    let app = TestApp::with_config(Config {
        max_file_size_mb: 1,
        ..Config::default()
    });
    let recipe_id = id_of(&app.create_recipe(ALICE, sample_recipe("Photo", &[], &[])).await);

    let png = noise_png(700);
    assert!(png.len() > 1024 * 1024);

    let (status, json) = app.upload(recipe_id, ALICE, "image", &png).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_FAILED");
    assert_eq!(
        json["fields"]["image"][0],
        "Ensure this file is no larger than 1 MB."
    );

    let (_, detail) = app
        .get(&format!("/api/recipe/recipes/{}", recipe_id), ALICE)
        .await;
    assert_eq!(detail["image"], Value::Null);
}
