//! Organization lifecycle integration tests.
//!
//! Run with: `cargo test -p orgkit-api --test organizations_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::test_user;
use helpers::setup_test_app;
use serde_json::json;

#[tokio::test]
async fn test_create_organization_yields_single_owner_membership() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = test_user("alice@example.com");

    let response = client
        .post("/organizations")
        .add_header("Authorization", format!("Bearer {}", user.token))
        .json(&json!({ "name": "Acme Inc", "slug": "acme" }))
        .await;
    assert_eq!(response.status_code(), 201);

    // The fresh organization has exactly one member: the creator, as OWNER.
    let response = client
        .get("/organizations/slug/acme")
        .add_header("Authorization", format!("Bearer {}", user.token))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: serde_json::Value = response.json();
    let users = body["users"].as_array().expect("users array");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["role"], "OWNER");
    assert_eq!(users[0]["invitation_accepted"], true);
    assert_eq!(users[0]["user"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_duplicate_slug_conflicts_regardless_of_creator() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");
    let bob = test_user("bob@example.com");

    let response = client
        .post("/organizations")
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .json(&json!({ "name": "Acme Inc", "slug": "acme" }))
        .await;
    assert_eq!(response.status_code(), 201);

    let response = client
        .post("/organizations")
        .add_header("Authorization", format!("Bearer {}", bob.token))
        .json(&json!({ "name": "Other Acme", "slug": "acme" }))
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn test_invalid_slug_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = test_user("alice@example.com");

    for slug in ["a", "Has Spaces", "UPPER", "under_score"] {
        let response = client
            .post("/organizations")
            .add_header("Authorization", format!("Bearer {}", user.token))
            .json(&json!({ "name": "Acme Inc", "slug": slug }))
            .await;
        assert_eq!(response.status_code(), 400, "slug {:?} should be rejected", slug);
    }
}

#[tokio::test]
async fn test_non_member_cannot_fetch_organization_by_id() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");
    let mallory = test_user("mallory@example.com");

    let response = client
        .post("/organizations")
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .json(&json!({ "name": "Acme Inc", "slug": "acme" }))
        .await;
    let org: serde_json::Value = response.json();
    let org_id = org["id"].as_str().expect("org id");

    let response = client
        .get(&format!("/organizations/{}", org_id))
        .add_header("Authorization", format!("Bearer {}", mallory.token))
        .await;
    assert_eq!(response.status_code(), 403);

    let response = client
        .get(&format!("/organizations/{}", uuid::Uuid::new_v4()))
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_update_requires_manager_and_delete_requires_owner() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");
    let mallory = test_user("mallory@example.com");

    let response = client
        .post("/organizations")
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .json(&json!({ "name": "Acme Inc", "slug": "acme" }))
        .await;
    let org: serde_json::Value = response.json();
    let org_id = org["id"].as_str().expect("org id");

    // Outsider can neither update nor delete.
    let response = client
        .patch(&format!("/organizations/{}", org_id))
        .add_header("Authorization", format!("Bearer {}", mallory.token))
        .json(&json!({ "name": "Evil Corp" }))
        .await;
    assert_eq!(response.status_code(), 403);

    let response = client
        .delete(&format!("/organizations/{}", org_id))
        .add_header("Authorization", format!("Bearer {}", mallory.token))
        .await;
    assert_eq!(response.status_code(), 403);

    // The owner can do both.
    let response = client
        .patch(&format!("/organizations/{}", org_id))
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .json(&json!({ "name": "Acme International", "billing_email": "billing@acme.test" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["name"], "Acme International");
    assert_eq!(updated["billing_email"], "billing@acme.test");
    // The slug is immutable.
    assert_eq!(updated["slug"], "acme");

    let response = client
        .delete(&format!("/organizations/{}", org_id))
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .await;
    assert_eq!(response.status_code(), 204);

    let response = client
        .get(&format!("/organizations/{}", org_id))
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_session_reflects_default_organization() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");

    // First created organization becomes the default.
    let response = client
        .post("/organizations")
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .json(&json!({ "name": "First Org", "slug": "first-org" }))
        .await;
    assert_eq!(response.status_code(), 201);
    let first: serde_json::Value = response.json();

    let response = client
        .post("/organizations")
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .json(&json!({ "name": "Second Org", "slug": "second-org" }))
        .await;
    assert_eq!(response.status_code(), 201);
    let second: serde_json::Value = response.json();

    let response = client
        .get("/session")
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .await;
    assert_eq!(response.status_code(), 200);
    let session: serde_json::Value = response.json();
    assert_eq!(session["organization"]["id"], first["id"]);
    assert_eq!(session["role"], "OWNER");

    // Switching the default moves the session context.
    let response = client
        .post("/organizations/default")
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .json(&json!({ "organization_id": second["id"] }))
        .await;
    assert_eq!(response.status_code(), 204);

    let response = client
        .get("/session")
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .await;
    let session: serde_json::Value = response.json();
    assert_eq!(session["organization"]["id"], second["id"]);
}

#[tokio::test]
async fn test_set_default_requires_membership() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");
    let mallory = test_user("mallory@example.com");

    let response = client
        .post("/organizations")
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .json(&json!({ "name": "Acme Inc", "slug": "acme" }))
        .await;
    let org: serde_json::Value = response.json();

    let response = client
        .post("/organizations/default")
        .add_header("Authorization", format!("Bearer {}", mallory.token))
        .json(&json!({ "organization_id": org["id"] }))
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client.get("/organizations").await;
    assert_eq!(response.status_code(), 401);

    let response = client
        .get("/organizations")
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;
    assert_eq!(response.status_code(), 401);

    // Health stays public.
    let response = client.get("/health").await;
    assert_eq!(response.status_code(), 200);
}
