//! API integration tests
//!
//! These run against a live server (`cargo run`) on localhost:3000.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:3000";

/// Register a throwaway user and return (token, user id)
async fn register_and_login(client: &Client, email: &str) -> (String, String) {
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "email": email, "password": "p1" }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "p1" }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    let token = body["token"].as_str().expect("No token in response").to_string();
    let id = body["user"]["id"].as_str().expect("No user id").to_string();
    (token, id)
}

fn unique_email(tag: &str) -> String {
    format!("{}-{}@test.local", tag, uuid::Uuid::new_v4())
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
#[ignore]
async fn test_register_strips_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "email": unique_email("reg"), "password": "p1" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["user"]["id"].is_string());
    assert!(body["user"]["password"].is_null());
    assert!(body["user"]["passwordHash"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_email_conflicts() {
    let client = Client::new();
    let email = unique_email("dup");

    let first = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "email": email, "password": "p1" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "email": email, "password": "p2" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let email = unique_email("badpw");

    client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "email": email, "password": "p1" }))
        .send()
        .await
        .expect("Failed to send request");

    let wrong_password = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(wrong_password.status(), 401);

    let unknown_email = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": unique_email("ghost"), "password": "p1" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(unknown_email.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_books_require_token() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_book_crud_ownership() {
    let client = Client::new();
    let (token_a, user_a) = register_and_login(&client, &unique_email("owner")).await;
    let (token_b, _) = register_and_login(&client, &unique_email("intruder")).await;

    // Create as user A
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&json!({
            "title": "T",
            "author": "Au",
            "genre": "Fiction",
            "publishedYear": 2020
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["book"]["id"].as_str().expect("No book id").to_string();
    assert_eq!(body["book"]["ownerId"], user_a.as_str());
    assert!(body["book"]["updatedAt"].is_null());

    // User B may read but not mutate
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&json!({ "title": "T2" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // Stored record unchanged after the forbidden update
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["title"], "T");

    // Owner updates and deletes
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&json!({ "title": "T2" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["title"], "T2");
    assert!(body["book"]["updatedAt"].is_string());

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["id"], book_id.as_str());

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_search_requires_genre() {
    let client = Client::new();
    let (token, _) = register_and_login(&client, &unique_email("search")).await;

    let response = client
        .get(format!("{}/books/search", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .get(format!("{}/books/search?genre=fiction", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_list_pagination_metadata() {
    let client = Client::new();
    let (token, _) = register_and_login(&client, &unique_email("page")).await;

    let response = client
        .get(format!("{}/books?page=1&limit=5", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_array());
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert!(body["pagination"]["totalBooks"].is_number());
    assert_eq!(body["pagination"]["hasPrev"], false);
}

#[tokio::test]
#[ignore]
async fn test_me_returns_current_user() {
    let client = Client::new();
    let email = unique_email("me");
    let (token, user_id) = register_and_login(&client, &email).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"], user_id.as_str());
    assert_eq!(body["email"], email.as_str());
    assert!(body["passwordHash"].is_null());
}
