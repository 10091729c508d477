use std::sync::Arc;

use catalog_db_rust::{app, MemoryStore};
use reqwest::{redirect, Client, Response, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            // redirects are asserted on, not followed
            client: Client::builder()
                .redirect(redirect::Policy::none())
                .build()
                .unwrap(),
            base_url,
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<Response> {
        self.client
            .post(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<Response> {
        self.client
            .get(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }
}

async fn spawn_catalog() -> TestClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let router = app(Arc::new(MemoryStore::new()));

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestClient::new(format!("http://{}", address))
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get("location")
        .expect("redirect has a location")
        .to_str()
        .unwrap()
        .to_string()
}

/// Posts a create form that must succeed and returns the new record's id
async fn create(client: &TestClient, kind: &str, form: Value) -> String {
    let response = client
        .post(&format!("/catalog/{}/create", kind), form)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let target = location(&response);
    let prefix = format!("/catalog/{}/", kind);
    assert!(target.starts_with(&prefix), "unexpected redirect {}", target);
    target[prefix.len()..].to_string()
}

#[tokio::test]
async fn test_health_and_home() {
    let client = spawn_catalog().await;

    let response = client.get("/health").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");

    let response = client.get("/").await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog");

    let response = client.get("/catalog").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["template"], "index");
    assert_eq!(view["values"]["work_count"], 0);
    assert_eq!(view["values"]["error"], Value::Null);
}

#[tokio::test]
async fn test_invalid_creator_is_redisplayed() {
    let client = spawn_catalog().await;

    let response = client
        .post(
            "/catalog/creator/create",
            json!({"first_name": "", "family_name": "Do-e", "date_of_birth": "tomorrow"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let view: Value = response.json().await.unwrap();
    assert_eq!(view["template"], "creator_form");
    let fields: Vec<&str> = view["values"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["first_name", "family_name", "date_of_birth"]);
    assert_eq!(view["values"]["creator"]["date_of_birth"], "tomorrow");

    let list: Value = client.get("/catalog/creators").await.unwrap().json().await.unwrap();
    assert_eq!(list["values"]["creator_list"], json!([]));
}

#[tokio::test]
async fn test_rejected_work_keeps_selected_tags() {
    let client = spawn_catalog().await;

    let creator = create(&client, "creator", json!({"first_name": "Mary", "family_name": "Shelley"})).await;
    let horror = create(&client, "tag", json!({"name": "Horror"})).await;
    let _gothic = create(&client, "tag", json!({"name": "Gothic"})).await;
    let classic = create(&client, "tag", json!({"name": "Classic"})).await;

    let response = client
        .post(
            "/catalog/work/create",
            json!({
                "title": "Frankenstein",
                "creator": creator,
                "summary": "A creature",
                "isbn": "",
                "tags": [horror, classic],
            }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let view: Value = response.json().await.unwrap();
    let checked: Vec<&str> = view["values"]["tags"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["checked"] == json!(true))
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(checked, vec!["Classic", "Horror"]);
    assert_eq!(view["values"]["errors"][0]["message"], "ISBN must not be empty.");
}

#[tokio::test]
async fn test_rejected_work_update_keeps_selected_tags() {
    let client = spawn_catalog().await;

    let creator = create(&client, "creator", json!({"first_name": "Mary", "family_name": "Shelley"})).await;
    let horror = create(&client, "tag", json!({"name": "Horror"})).await;
    let gothic = create(&client, "tag", json!({"name": "Gothic"})).await;
    let classic = create(&client, "tag", json!({"name": "Classic"})).await;
    let work = create(
        &client,
        "work",
        json!({
            "title": "Frankenstein",
            "creator": creator,
            "summary": "A creature",
            "isbn": "9780141439471",
            "tags": [gothic],
        }),
    )
    .await;

    let response = client
        .post(
            &format!("/catalog/work/{}/update", work),
            json!({
                "title": "Frankenstein",
                "creator": creator,
                "summary": "",
                "isbn": "9780141439471",
                "tags": [horror, classic],
            }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let view: Value = response.json().await.unwrap();
    let checked: Vec<&str> = view["values"]["tags"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["checked"] == json!(true))
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(checked, vec!["Classic", "Horror"]);
    assert_eq!(view["values"]["work"]["isbn"], "9780141439471");
    assert_eq!(view["values"]["errors"][0]["field"], "summary");

    // the stored work still carries only its original tag
    let detail: Value = client
        .get(&format!("/catalog/work/{}", work))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["values"]["work"]["summary"], "A creature");
    assert_eq!(detail["values"]["tags"].as_array().unwrap().len(), 1);
    assert_eq!(detail["values"]["tags"][0]["name"], "Gothic");
}

#[tokio::test]
async fn test_single_tag_value_is_accepted() {
    let client = spawn_catalog().await;

    let creator = create(&client, "creator", json!({"first_name": "Bram", "family_name": "Stoker"})).await;
    let gothic = create(&client, "tag", json!({"name": "Gothic"})).await;
    let work = create(
        &client,
        "work",
        json!({
            "title": "Dracula",
            "creator": creator,
            "summary": "Count",
            "isbn": "9780141439846",
            "tags": gothic,
        }),
    )
    .await;

    let view: Value = client
        .get(&format!("/catalog/work/{}", work))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["title"], "Dracula");
    assert_eq!(view["values"]["tags"][0]["name"], "Gothic");
    assert_eq!(view["values"]["creator"]["name"], "Stoker, Bram");
}

#[tokio::test]
async fn test_referenced_records_cannot_be_deleted() {
    let client = spawn_catalog().await;

    let creator = create(&client, "creator", json!({"first_name": "Ursula", "family_name": "LeGuin"})).await;
    let tag = create(&client, "tag", json!({"name": "Fantasy"})).await;
    let work = create(
        &client,
        "work",
        json!({
            "title": "Earthsea",
            "creator": creator,
            "summary": "A wizard",
            "isbn": "9780547773742",
            "tags": [tag],
        }),
    )
    .await;
    let copy = create(
        &client,
        "copy",
        json!({"work": work, "imprint": "Parnassus", "status": "Available"}),
    )
    .await;

    // creator is held by the work
    let response = client
        .post(&format!("/catalog/creator/{}/delete", creator), json!({}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["values"]["creator_works"][0]["title"], "Earthsea");
    let response = client.get(&format!("/catalog/creator/{}", creator)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // tag is held by the work, work by its copy
    let response = client
        .post(&format!("/catalog/tag/{}/delete", tag), json!({}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let response = client
        .post(&format!("/catalog/work/{}/delete", work), json!({}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // unwinding from the leaves works
    for (kind, id, list) in [
        ("copy", &copy, "/catalog/copies"),
        ("work", &work, "/catalog/works"),
        ("tag", &tag, "/catalog/tags"),
        ("creator", &creator, "/catalog/creators"),
    ] {
        let response = client
            .post(&format!("/catalog/{}/{}/delete", kind, id), json!({}))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "deleting {}", kind);
        assert_eq!(location(&response), list);

        let response = client.get(&format!("/catalog/{}/{}", kind, id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // deleting again is still a success
    let response = client
        .post(&format!("/catalog/creator/{}/delete", creator), json!({}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_tag_names_stay_unique() {
    let client = spawn_catalog().await;

    let first = create(&client, "tag", json!({"name": "Poetry"})).await;
    let again = create(&client, "tag", json!({"name": "Poetry"})).await;
    assert_eq!(first, again);

    let other = create(&client, "tag", json!({"name": "Drama"})).await;
    let response = client
        .post(&format!("/catalog/tag/{}/update", other), json!({"name": "Poetry"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let list: Value = client.get("/catalog/tags").await.unwrap().json().await.unwrap();
    let names: Vec<&str> = list["values"]["tag_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Drama", "Poetry"]);
}

#[tokio::test]
async fn test_copy_status_and_dashboard_counts() {
    let client = spawn_catalog().await;

    let creator = create(&client, "creator", json!({"first_name": "Frank", "family_name": "Herbert"})).await;
    let work = create(
        &client,
        "work",
        json!({"title": "Dune", "creator": creator, "summary": "Spice", "isbn": "9780441013593"}),
    )
    .await;

    create(&client, "copy", json!({"work": work, "imprint": "Ace", "status": "Available"})).await;
    create(&client, "copy", json!({"work": work, "imprint": "Ace", "status": "Loaned", "due_back": "2026-12-01"})).await;
    let defaulted = create(&client, "copy", json!({"work": work, "imprint": "Chilton"})).await;

    let view: Value = client
        .get(&format!("/catalog/copy/{}", defaulted))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["title"], "Copy: Dune");
    assert_eq!(view["values"]["copy"]["status"], "Maintenance");

    let response = client
        .post(
            "/catalog/copy/create",
            json!({"work": work, "imprint": "Ace", "status": "Misplaced"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let view: Value = client.get("/catalog").await.unwrap().json().await.unwrap();
    assert_eq!(view["values"]["work_count"], 1);
    assert_eq!(view["values"]["copy_count"], 3);
    assert_eq!(view["values"]["copy_available_count"], 1);
    assert_eq!(view["values"]["creator_count"], 1);
    assert_eq!(view["values"]["tag_count"], 0);
}

#[tokio::test]
async fn test_missing_records() {
    let client = spawn_catalog().await;

    for path in [
        "/catalog/creator/nope",
        "/catalog/work/nope",
        "/catalog/tag/nope",
        "/catalog/copy/nope",
        "/catalog/work/nope/update",
    ] {
        let response = client.get(path).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    // updating a record that is gone goes back to the list
    let response = client
        .post("/catalog/tag/nope/update", json!({"name": "Ghost"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/tags");

    let response = client.get("/catalog/creator/nope/delete").await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/creators");
}
