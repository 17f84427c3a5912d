//! API integration tests
//!
//! These run against a live server (with a database behind it):
//! `cargo run` in one terminal, then `cargo test -- --ignored`.

use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Register a fresh user and return its id
async fn register_user(client: &Client, name: &str) -> Uuid {
    let email = format!("{}-{}@example.com", name, Uuid::new_v4());

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "name": name,
            "email": email,
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse register response");
    body["id"]
        .as_str()
        .expect("No user id in response")
        .parse()
        .expect("User id is not a UUID")
}

/// Create a listing owned by the given user and return its id
async fn create_item(client: &Client, owner_id: Uuid, name: &str) -> Uuid {
    let response = client
        .post(format!("{}/items", BASE_URL))
        .json(&json!({
            "name": name,
            "description": "integration test listing",
            "ownerId": owner_id
        }))
        .send()
        .await
        .expect("Failed to send create item request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse item response");
    body["id"]
        .as_str()
        .expect("No item id in response")
        .parse()
        .expect("Item id is not a UUID")
}

/// Submit a borrow request, returning the raw response
async fn request_borrow(client: &Client, item_id: Uuid, borrower_id: Uuid) -> reqwest::Response {
    client
        .post(format!("{}/transactions", BASE_URL))
        .json(&json!({ "itemId": item_id, "borrowerId": borrower_id }))
        .send()
        .await
        .expect("Failed to send borrow request")
}

async fn get_item_status(client: &Client, item_id: Uuid) -> String {
    let body: Value = client
        .get(format!("{}/items/{}", BASE_URL, item_id))
        .send()
        .await
        .expect("Failed to fetch item")
        .json()
        .await
        .expect("Failed to parse item");

    body["status"].as_str().expect("Item has no status").to_string()
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
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let client = Client::new();
    let email = format!("login-{}@example.com", Uuid::new_v4());

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "name": "Login Tester",
            "email": email,
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);

    // Correct credentials
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "correct-horse-battery" }))
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse login response");
    assert_eq!(body["user"]["email"], email.as_str());

    // Wrong password
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_borrow_request_is_rejected() {
    let client = Client::new();
    let owner = register_user(&client, "owner").await;
    let borrower = register_user(&client, "borrower").await;
    let item = create_item(&client, owner, "Cordless drill").await;

    let response = request_borrow(&client, item, borrower).await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse transaction");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["lenderId"].as_str().unwrap(), owner.to_string());

    // Requesting the same item again conflicts with the pending claim
    let response = request_borrow(&client, item, borrower).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "ActiveClaimExists");

    // A pending request does not take the item out of circulation
    assert_eq!(get_item_status(&client, item).await, "available");
}

#[tokio::test]
#[ignore]
async fn test_owner_cannot_borrow_own_item() {
    let client = Client::new();
    let owner = register_user(&client, "owner").await;
    let item = create_item(&client, owner, "Ladder").await;

    let response = request_borrow(&client, item, owner).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "SelfBorrow");
}

#[tokio::test]
#[ignore]
async fn test_only_lender_decides_and_approval_borrows_item() {
    let client = Client::new();
    let owner = register_user(&client, "owner").await;
    let borrower = register_user(&client, "borrower").await;
    let item = create_item(&client, owner, "Tent").await;

    let response = request_borrow(&client, item, borrower).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let transaction_id = body["id"].as_str().unwrap().to_string();

    // The borrower may not decide their own request
    let response = client
        .put(format!("{}/transactions/{}", BASE_URL, transaction_id))
        .json(&json!({ "status": "approved", "userId": borrower }))
        .send()
        .await
        .expect("Failed to send decision");
    assert_eq!(response.status(), 403);

    // The lender approves
    let response = client
        .put(format!("{}/transactions/{}", BASE_URL, transaction_id))
        .json(&json!({ "status": "approved", "userId": owner }))
        .send()
        .await
        .expect("Failed to send decision");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "approved");
    assert!(body["borrowDate"].is_string());
    assert_eq!(get_item_status(&client, item).await, "borrowed");

    // Deciding an already-approved transaction is an invalid transition
    let response = client
        .put(format!("{}/transactions/{}", BASE_URL, transaction_id))
        .json(&json!({ "status": "rejected", "userId": owner }))
        .send()
        .await
        .expect("Failed to send decision");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "InvalidTransition");
}

#[tokio::test]
#[ignore]
async fn test_rejection_leaves_item_available() {
    let client = Client::new();
    let owner = register_user(&client, "owner").await;
    let borrower = register_user(&client, "borrower").await;
    let item = create_item(&client, owner, "Projector").await;

    let response = request_borrow(&client, item, borrower).await;
    let body: Value = response.json().await.unwrap();
    let transaction_id = body["id"].as_str().unwrap().to_string();

    let response = client
        .put(format!("{}/transactions/{}", BASE_URL, transaction_id))
        .json(&json!({ "status": "rejected", "userId": owner }))
        .send()
        .await
        .expect("Failed to send decision");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "rejected");
    assert_eq!(get_item_status(&client, item).await, "available");

    // A rejected request no longer blocks new claims
    let response = request_borrow(&client, item, borrower).await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_return_after_approval_and_idempotent_cancel() {
    let client = Client::new();
    let owner = register_user(&client, "owner").await;
    let borrower = register_user(&client, "borrower").await;
    let item = create_item(&client, owner, "Bicycle").await;

    let response = request_borrow(&client, item, borrower).await;
    let body: Value = response.json().await.unwrap();
    let transaction_id = body["id"].as_str().unwrap().to_string();

    let response = client
        .put(format!("{}/transactions/{}", BASE_URL, transaction_id))
        .json(&json!({ "status": "approved", "userId": owner }))
        .send()
        .await
        .expect("Failed to send decision");
    assert_eq!(response.status(), 200);

    // Borrower returns the item
    let response = client
        .post(format!("{}/transactions/cancel", BASE_URL))
        .json(&json!({ "itemId": item, "borrowerId": borrower }))
        .send()
        .await
        .expect("Failed to send cancel request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["transaction"]["status"], "cancelled");
    assert_eq!(body["item"]["status"], "available");

    // No active transaction is left, so a second cancel is a 404 and the
    // item stays available
    let response = client
        .post(format!("{}/transactions/cancel", BASE_URL))
        .json(&json!({ "itemId": item, "borrowerId": borrower }))
        .send()
        .await
        .expect("Failed to send cancel request");
    assert_eq!(response.status(), 404);

    assert_eq!(get_item_status(&client, item).await, "available");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrow_requests_single_winner() {
    let client = Client::new();
    let owner = register_user(&client, "owner").await;
    let first = register_user(&client, "first-borrower").await;
    let second = register_user(&client, "second-borrower").await;
    let item = create_item(&client, owner, "Chainsaw").await;

    let (a, b) = tokio::join!(
        request_borrow(&client, item, first),
        request_borrow(&client, item, second)
    );

    let statuses = [a.status().as_u16(), b.status().as_u16()];
    let winners = statuses.iter().filter(|s| **s == 201).count();
    let losers = statuses.iter().filter(|s| **s == 400).count();

    assert_eq!(winners, 1, "exactly one request must win, got {:?}", statuses);
    assert_eq!(losers, 1, "the other request must conflict, got {:?}", statuses);
}

#[tokio::test]
#[ignore]
async fn test_user_transactions_are_enriched() {
    let client = Client::new();
    let owner = register_user(&client, "owner").await;
    let borrower = register_user(&client, "borrower").await;
    let item = create_item(&client, owner, "Telescope").await;

    let response = request_borrow(&client, item, borrower).await;
    assert_eq!(response.status(), 201);

    for user in [owner, borrower] {
        let body: Value = client
            .get(format!("{}/transactions/user/{}", BASE_URL, user))
            .send()
            .await
            .expect("Failed to fetch user transactions")
            .json()
            .await
            .expect("Failed to parse user transactions");

        let list = body.as_array().expect("Expected an array");
        let entry = list
            .iter()
            .find(|t| t["itemId"].as_str() == Some(&item.to_string()))
            .expect("Transaction for item not listed");

        assert_eq!(entry["status"], "pending");
        assert_eq!(entry["item"]["name"], "Telescope");
        assert_eq!(entry["borrower"]["id"].as_str().unwrap(), borrower.to_string());
        assert_eq!(entry["lender"]["id"].as_str().unwrap(), owner.to_string());
    }
}
