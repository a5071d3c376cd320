//! Invitation flow and member administration integration tests.
//!
//! Run with: `cargo test -p orgkit-api --test invitations_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::test_user;
use helpers::setup_test_app;
use serde_json::json;

async fn create_org(
    client: &axum_test::TestServer,
    token: &str,
    name: &str,
    slug: &str,
) -> serde_json::Value {
    let response = client
        .post("/organizations")
        .add_header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": name, "slug": slug }))
        .await;
    assert_eq!(response.status_code(), 201);
    response.json()
}

async fn invite(
    client: &axum_test::TestServer,
    token: &str,
    org_id: &str,
    email: &str,
    role: &str,
) -> axum_test::TestResponse {
    client
        .post(&format!("/organizations/{}/users", org_id))
        .add_header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "email": email, "role": role }))
        .await
}

#[tokio::test]
async fn test_invite_accept_flow() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");

    let org = create_org(client, &alice.token, "Acme Inc", "acme").await;
    let org_id = org["id"].as_str().expect("org id");

    // Invitation is stored pending with a token.
    let response = invite(client, &alice.token, org_id, "bob@example.com", "MEMBER").await;
    assert_eq!(response.status_code(), 201);
    let membership: serde_json::Value = response.json();
    assert_eq!(membership["invitation_accepted"], false);
    let token = membership["invitation_token"]
        .as_str()
        .expect("invitation token")
        .to_string();

    // Pending list shows bob with the invited role.
    let response = client
        .get(&format!("/organizations/{}/invitations", org_id))
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .await;
    assert_eq!(response.status_code(), 200);
    let pending: serde_json::Value = response.json();
    let entries = pending.as_array().expect("pending array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["email"], "bob@example.com");
    assert_eq!(entries[0]["role"], "MEMBER");

    // Bob authenticates (fresh provider subject, same email) and inspects the
    // invitation before accepting.
    let bob = test_user("bob@example.com");
    let response = client
        .get(&format!("/organizations/invitations/{}", token))
        .add_header("Authorization", format!("Bearer {}", bob.token))
        .await;
    assert_eq!(response.status_code(), 200);
    let view: serde_json::Value = response.json();
    assert_eq!(view["organization_slug"], "acme");
    assert_eq!(view["email"], "bob@example.com");

    let response = client
        .post(&format!("/organizations/invitations/{}", token))
        .add_header("Authorization", format!("Bearer {}", bob.token))
        .await;
    assert_eq!(response.status_code(), 200);
    let accepted: serde_json::Value = response.json();
    assert_eq!(accepted["invitation_accepted"], true);
    assert!(accepted.get("invitation_token").is_none() || accepted["invitation_token"].is_null());

    // A consumed token is gone: the second accept is a 404.
    let response = client
        .post(&format!("/organizations/invitations/{}", token))
        .add_header("Authorization", format!("Bearer {}", bob.token))
        .await;
    assert_eq!(response.status_code(), 404);

    // Bob now appears as an accepted member, and the org became his default.
    let response = client
        .get(&format!("/organizations/{}/users", org_id))
        .add_header("Authorization", format!("Bearer {}", bob.token))
        .await;
    assert_eq!(response.status_code(), 200);
    let members: serde_json::Value = response.json();
    assert_eq!(members.as_array().expect("members").len(), 2);

    let response = client
        .get("/session")
        .add_header("Authorization", format!("Bearer {}", bob.token))
        .await;
    let session: serde_json::Value = response.json();
    assert_eq!(session["organization"]["id"].as_str(), Some(org_id));
    assert_eq!(session["role"], "MEMBER");
}

#[tokio::test]
async fn test_elevation_policy_on_invite() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");

    let org = create_org(client, &alice.token, "Acme Inc", "acme").await;
    let org_id = org["id"].as_str().expect("org id");

    // An OWNER may invite with role OWNER.
    let response = invite(client, &alice.token, org_id, "owner2@example.com", "OWNER").await;
    assert_eq!(response.status_code(), 201);

    // Promote an ADMIN into the org.
    let response = invite(client, &alice.token, org_id, "admin@example.com", "ADMIN").await;
    assert_eq!(response.status_code(), 201);
    let token = response.json::<serde_json::Value>()["invitation_token"]
        .as_str()
        .expect("token")
        .to_string();
    let admin = test_user("admin@example.com");
    let response = client
        .post(&format!("/organizations/invitations/{}", token))
        .add_header("Authorization", format!("Bearer {}", admin.token))
        .await;
    assert_eq!(response.status_code(), 200);

    // The ADMIN may not grant OWNER, but may grant MEMBER.
    let response = invite(client, &admin.token, org_id, "eve@example.com", "OWNER").await;
    assert_eq!(response.status_code(), 403);
    let response = invite(client, &admin.token, org_id, "eve@example.com", "MEMBER").await;
    assert_eq!(response.status_code(), 201);
}

#[tokio::test]
async fn test_member_cannot_invite() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");

    let org = create_org(client, &alice.token, "Acme Inc", "acme").await;
    let org_id = org["id"].as_str().expect("org id");

    let response = invite(client, &alice.token, org_id, "bob@example.com", "MEMBER").await;
    let token = response.json::<serde_json::Value>()["invitation_token"]
        .as_str()
        .expect("token")
        .to_string();
    let bob = test_user("bob@example.com");
    client
        .post(&format!("/organizations/invitations/{}", token))
        .add_header("Authorization", format!("Bearer {}", bob.token))
        .await;

    let response = invite(client, &bob.token, org_id, "carol@example.com", "GUEST").await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_accept_requires_matching_user() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");

    let org = create_org(client, &alice.token, "Acme Inc", "acme").await;
    let org_id = org["id"].as_str().expect("org id");

    let response = invite(client, &alice.token, org_id, "bob@example.com", "MEMBER").await;
    let token = response.json::<serde_json::Value>()["invitation_token"]
        .as_str()
        .expect("token")
        .to_string();

    // Carol is authenticated but the invitation is addressed to bob.
    let carol = test_user("carol@example.com");
    let response = client
        .post(&format!("/organizations/invitations/{}", token))
        .add_header("Authorization", format!("Bearer {}", carol.token))
        .await;
    assert_eq!(response.status_code(), 403);

    // An unknown token is indistinguishable from a consumed one.
    let response = client
        .post("/organizations/invitations/00000000000000000000000000000000")
        .add_header("Authorization", format!("Bearer {}", carol.token))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_duplicate_invitation_conflicts() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");

    let org = create_org(client, &alice.token, "Acme Inc", "acme").await;
    let org_id = org["id"].as_str().expect("org id");

    let response = invite(client, &alice.token, org_id, "bob@example.com", "MEMBER").await;
    assert_eq!(response.status_code(), 201);
    let response = invite(client, &alice.token, org_id, "bob@example.com", "GUEST").await;
    assert_eq!(response.status_code(), 409);

    // Inviting an existing accepted member conflicts too.
    let response = invite(client, &alice.token, org_id, "alice@example.com", "ADMIN").await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn test_cancel_invitation() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");

    let org = create_org(client, &alice.token, "Acme Inc", "acme").await;
    let org_id = org["id"].as_str().expect("org id");

    let response = invite(client, &alice.token, org_id, "bob@example.com", "MEMBER").await;
    let membership: serde_json::Value = response.json();
    let invitation_id = membership["id"].as_str().expect("membership id");
    let token = membership["invitation_token"].as_str().expect("token");

    let response = client
        .delete(&format!(
            "/organizations/{}/invitations/{}",
            org_id, invitation_id
        ))
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .await;
    assert_eq!(response.status_code(), 204);

    // The token no longer resolves.
    let response = client
        .get(&format!("/organizations/invitations/{}", token))
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_cancel_accepted_invitation_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");

    let org = create_org(client, &alice.token, "Acme Inc", "acme").await;
    let org_id = org["id"].as_str().expect("org id");

    let response = invite(client, &alice.token, org_id, "bob@example.com", "MEMBER").await;
    let membership: serde_json::Value = response.json();
    let invitation_id = membership["id"].as_str().expect("membership id");
    let token = membership["invitation_token"].as_str().expect("token");

    let bob = test_user("bob@example.com");
    let response = client
        .post(&format!("/organizations/invitations/{}", token))
        .add_header("Authorization", format!("Bearer {}", bob.token))
        .await;
    assert_eq!(response.status_code(), 200);

    // Once accepted, the membership is active and cancellation is the wrong
    // code path; removal is the only way to take bob out.
    let response = client
        .delete(&format!(
            "/organizations/{}/invitations/{}",
            org_id, invitation_id
        ))
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .await;
    assert_eq!(response.status_code(), 400);

    // Bob's membership survived the attempt.
    let response = client
        .get(&format!("/organizations/{}/users", org_id))
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .await;
    let members: serde_json::Value = response.json();
    assert_eq!(members.as_array().expect("members").len(), 2);
}

#[tokio::test]
async fn test_role_change_and_removal_respect_owner_protection() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = test_user("alice@example.com");

    let org = create_org(client, &alice.token, "Acme Inc", "acme").await;
    let org_id = org["id"].as_str().expect("org id");

    let response = invite(client, &alice.token, org_id, "bob@example.com", "MEMBER").await;
    let token = response.json::<serde_json::Value>()["invitation_token"]
        .as_str()
        .expect("token")
        .to_string();
    let bob = test_user("bob@example.com");
    let response = client
        .post(&format!("/organizations/invitations/{}", token))
        .add_header("Authorization", format!("Bearer {}", bob.token))
        .await;
    let bob_membership: serde_json::Value = response.json();
    let bob_user_id = bob_membership["user_id"].as_str().expect("bob user id");

    // Owner promotes bob to ADMIN.
    let response = client
        .patch(&format!("/organizations/{}/users/{}", org_id, bob_user_id))
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .json(&json!({ "role": "ADMIN" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["role"], "ADMIN");

    // Nobody may touch the owner, not even another manager.
    let response = client
        .patch(&format!("/organizations/{}/users/{}", org_id, alice.user_id))
        .add_header("Authorization", format!("Bearer {}", bob.token))
        .json(&json!({ "role": "MEMBER" }))
        .await;
    assert_eq!(response.status_code(), 403);

    let response = client
        .delete(&format!("/organizations/{}/users/{}", org_id, alice.user_id))
        .add_header("Authorization", format!("Bearer {}", bob.token))
        .await;
    assert_eq!(response.status_code(), 403);

    // An ADMIN may not promote to OWNER.
    let response = client
        .patch(&format!("/organizations/{}/users/{}", org_id, bob_user_id))
        .add_header("Authorization", format!("Bearer {}", bob.token))
        .json(&json!({ "role": "OWNER" }))
        .await;
    assert_eq!(response.status_code(), 403);

    // Removing bob works and leaves the org with just the owner.
    let response = client
        .delete(&format!("/organizations/{}/users/{}", org_id, bob_user_id))
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .await;
    assert_eq!(response.status_code(), 204);

    let response = client
        .get(&format!("/organizations/{}/users", org_id))
        .add_header("Authorization", format!("Bearer {}", alice.token))
        .await;
    let members: serde_json::Value = response.json();
    assert_eq!(members.as_array().expect("members").len(), 1);
}
