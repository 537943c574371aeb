//! End-to-end tests driving the full router over an in-memory store.

#![allow(clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{KAKAO_TOKEN, PASSWORD, TestApp};
use moa_core::model::NewNotification;
use moa_core::{CardId, UserId};

// ============================================================================
// Health and auth
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.get("/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "MOA API is running");
}

#[tokio::test]
async fn test_register_normalizes_login_id_and_rejects_duplicates() {
    let app = TestApp::new();
    let body = app.register("Alice.Kim").await;
    assert_eq!(body["userId"], "alice.kim");
    assert_eq!(body["userName"], "Test User");
    assert!(body.get("passwordHash").is_none());

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "userId": "alice.kim", "password": PASSWORD, "userName": "Other" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_register_validation_error_names_field() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "userId": "bob1", "password": "lettersonly", "userName": "Bob" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"]["field"], "password");
}

#[tokio::test]
async fn test_wrong_body_shape_is_validation_error() {
    let app = TestApp::new();
    let (status, body) = app
        .request(
            axum::http::Method::POST,
            "/api/auth/login",
            None,
            Some(json!("not an object")),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = TestApp::new();
    app.register("carol").await;
    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "userId": "carol", "password": "wrong-pass-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect login id or password");

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "userId": "nobody", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_returns_bearer_pair() {
    let app = TestApp::new();
    let tokens = app.sign_up("dave").await;
    assert_eq!(tokens["tokenType"], "bearer");
    assert_eq!(tokens["expiresIn"], 120 * 60);
    assert!(tokens["accessToken"].as_str().unwrap().len() > 20);
    assert_ne!(tokens["accessToken"], tokens["refreshToken"]);

    let token = tokens["accessToken"].as_str().unwrap();
    let (status, me) = app.get("/api/users/me", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["userId"], "dave");
    assert!(me["lastLoginAt"].is_string());
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let app = TestApp::new();
    let tokens = app.sign_up("erin").await;
    let old_refresh = tokens["refreshToken"].as_str().unwrap();

    let (status, rotated) = app
        .post(
            "/api/auth/refresh",
            None,
            json!({ "refreshToken": old_refresh }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(rotated["refreshToken"], old_refresh);

    // The presented token was revoked by the rotation.
    let (status, body) = app
        .post(
            "/api/auth/refresh",
            None,
            json!({ "refreshToken": old_refresh }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid refresh token");

    let (status, _) = app
        .post(
            "/api/auth/refresh",
            None,
            json!({ "refreshToken": rotated["refreshToken"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_issues_one_pair() {
    let app = TestApp::new();
    let tokens = app.sign_up("erin2").await;
    let body = json!({ "refreshToken": tokens["refreshToken"] });

    let (first, second) = tokio::join!(
        app.post("/api/auth/refresh", None, body.clone()),
        app.post("/api/auth/refresh", None, body.clone()),
    );
    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::UNAUTHORIZED]);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = TestApp::new();
    let tokens = app.sign_up("frank").await;
    let (status, _) = app
        .post(
            "/api/auth/refresh",
            None,
            json!({ "refreshToken": tokens["accessToken"] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = TestApp::new();
    let tokens = app.sign_up("gina").await;
    let refresh = tokens["refreshToken"].as_str().unwrap();

    let (status, body) = app
        .post("/api/auth/logout", None, json!({ "refreshToken": refresh }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["revoked"], true);

    let (status, _) = app
        .post("/api/auth/refresh", None, json!({ "refreshToken": refresh }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.post("/api/auth/logout", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["revoked"], false);
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let app = TestApp::new();
    let first = app.sign_up("hank").await;
    let (_, second) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "userId": "hank", "password": PASSWORD }),
        )
        .await;

    let token = second["accessToken"].as_str().unwrap();
    let (status, body) = app.post("/api/auth/logout-all", Some(token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["revoked"], 2);

    for refresh in [&first["refreshToken"], &second["refreshToken"]] {
        let (status, _) = app
            .post("/api/auth/refresh", None, json!({ "refreshToken": refresh }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_social_login_creates_user_once() {
    let app = TestApp::new();
    let request = json!({ "provider": "kakao", "accessToken": KAKAO_TOKEN });

    let (status, tokens) = app.post("/api/auth/social", None, request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let token = tokens["accessToken"].as_str().unwrap();
    let (_, me) = app.get("/api/users/me", Some(token)).await;
    assert_eq!(me["userId"], "kakao_4242");
    assert_eq!(me["userName"], "Kakao Friend");
    assert_eq!(me["socialProvider"], "kakao");

    let (status, again) = app.post("/api/auth/social", None, request).await;
    assert_eq!(status, StatusCode::OK);
    let (_, me_again) = app
        .get("/api/users/me", Some(again["accessToken"].as_str().unwrap()))
        .await;
    assert_eq!(me_again["id"], me["id"]);

    let (status, _) = app
        .post(
            "/api/auth/social",
            None,
            json!({ "provider": "kakao", "accessToken": "bogus" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_social_login_survives_taken_login_id() {
    let app = TestApp::new();
    let squatter = app.register("kakao_4242").await;
    let request = json!({ "provider": "kakao", "accessToken": KAKAO_TOKEN });

    let (status, tokens) = app.post("/api/auth/social", None, request.clone()).await;
    assert_eq!(status, StatusCode::OK, "{tokens}");
    let (_, me) = app
        .get("/api/users/me", Some(tokens["accessToken"].as_str().unwrap()))
        .await;
    assert_ne!(me["id"], squatter["id"]);
    assert_eq!(me["socialProvider"], "kakao");
    let login_id = me["userId"].as_str().unwrap();
    assert!(login_id.starts_with("kakao_4242_"), "{login_id}");

    // The next sign-in finds the same account by its social identity.
    let (status, again) = app.post("/api/auth/social", None, request).await;
    assert_eq!(status, StatusCode::OK);
    let (_, me_again) = app
        .get("/api/users/me", Some(again["accessToken"].as_str().unwrap()))
        .await;
    assert_eq!(me_again["id"], me["id"]);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_users_me_requires_token() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/users/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app.get("/api/users/me", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::new();
    let token = app.access_token("ivy").await;

    let (status, user) = app
        .patch(
            "/api/users/me",
            Some(&token),
            json!({ "userName": "Ivy Park", "phoneNumber": "010-1234-5678" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["userName"], "Ivy Park");
    assert_eq!(user["phoneNumber"], "010-1234-5678");

    let (status, _) = app
        .patch("/api/users/me", Some(&token), json!({ "phoneNumber": "call me" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let long_url = format!("https://img.example/{}", "a".repeat(500));
    let (status, body) = app
        .patch("/api/users/me", Some(&token), json!({ "profileImageUrl": long_url }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field"], "profileImageUrl");

    let (status, profile) = app.get("/api/users/me/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["userName"], "Ivy Park");
    assert_eq!(profile["totalActivities"], 0);
    assert_eq!(profile["totalShares"], 0);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let tokens = app.sign_up("jack").await;
    let token = tokens["accessToken"].as_str().unwrap();

    let (status, body) = app
        .post(
            "/api/users/me/password",
            Some(token),
            json!({ "currentPassword": "wrong-pass-1", "newPassword": "newpass456" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Current password is incorrect");

    let (status, _) = app
        .post(
            "/api/users/me/password",
            Some(token),
            json!({ "currentPassword": PASSWORD, "newPassword": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/users/me/password",
            Some(token),
            json!({ "currentPassword": PASSWORD, "newPassword": "newpass456" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Existing sessions are signed out.
    let (status, _) = app
        .post(
            "/api/auth/refresh",
            None,
            json!({ "refreshToken": tokens["refreshToken"] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "userId": "jack", "password": "newpass456" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_withdraw_deactivates_account() {
    let app = TestApp::new();
    let token = app.access_token("kate").await;

    let (status, _) = app.delete("/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "userId": "kate", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

// ============================================================================
// Cards
// ============================================================================

#[tokio::test]
async fn test_cards_are_public_and_hide_inactive() {
    let app = TestApp::new();
    let active = app.card("QR-A", true).await;
    let inactive = app.card("QR-B", false).await;

    let (status, list) = app.get("/api/cards", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["id"], active.id.to_string());
    assert_eq!(list["page"], 1);
    assert_eq!(list["page_size"], 20);

    let (status, _) = app.get(&format!("/api/cards/{}", inactive.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, card) = app.get(&format!("/api/cards/{}", active.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["qrCode"], "QR-A");
    assert_eq!(card["activityData"]["questions"], 3);

    let (status, _) = app.get("/api/cards/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_card_list_filters_and_pages() {
    let app = TestApp::new();
    for i in 0..3 {
        app.card(&format!("QR-{i}"), true).await;
    }

    let (status, list) = app.get("/api/cards?activityType=quiz&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 3);
    assert_eq!(list["items"].as_array().unwrap().len(), 2);
    assert_eq!(list["total_pages"], 2);

    let (_, list) = app.get("/api/cards?activityType=drawing", None).await;
    assert_eq!(list["total"], 0);

    let (status, body) = app.get("/api/cards?limit=101", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field"], "limit");
}

#[tokio::test]
async fn test_scan_by_qr_code() {
    let app = TestApp::new();
    let card = app.card("QR-SCAN", true).await;
    app.card("QR-OFF", false).await;
    let token = app.access_token("leo").await;

    let (status, body) = app
        .post("/api/cards/scan?qrCode=QR-SCAN", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], card.id.to_string());

    let (status, _) = app
        .post("/api/cards/scan?qrCode=QR-OFF", None, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/api/cards/scan?qrCode=QR-MISSING", None, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Activities and archive
// ============================================================================

#[tokio::test]
async fn test_record_activity() {
    let app = TestApp::new();
    let card = app.card("QR-ACT", true).await;
    let off = app.card("QR-ACT-OFF", false).await;
    let token = app.access_token("mia").await;

    let (status, activity) = app
        .post(
            "/api/activities",
            Some(&token),
            json!({ "cardId": card.id, "activityResult": { "score": 3 } }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(activity["activityResult"]["score"], 3);

    let (status, body) = app
        .post(
            "/api/activities",
            Some(&token),
            json!({ "cardId": card.id, "activityResult": [1, 2] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field"], "activityResult");

    let (status, _) = app
        .post(
            "/api/activities",
            Some(&token),
            json!({ "cardId": off.id, "activityResult": {} }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/activities",
            Some(&token),
            json!({ "cardId": CardId::new(), "activityResult": {} }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/activities",
            None,
            json!({ "cardId": card.id, "activityResult": {} }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_activity_ownership_and_stats() {
    let app = TestApp::new();
    let card = app.card("QR-OWN", true).await;
    let owner = app.access_token("nina").await;
    let other = app.access_token("otto").await;

    let (_, activity) = app
        .post(
            "/api/activities",
            Some(&owner),
            json!({ "cardId": card.id, "activityResult": { "done": true } }),
        )
        .await;
    let uri = format!("/api/activities/{}", activity["id"].as_str().unwrap());

    let (status, _) = app.get(&uri, Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&uri, Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, list) = app.get("/api/activities/me", Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);

    let (status, stats) = app.get("/api/activities/stats/me", Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalActivities"], 1);
    assert_eq!(stats["uniqueCards"], 1);
    assert!(stats["recentActivityDate"].is_string());

    let (_, stats) = app.get("/api/activities/stats/me", Some(&other)).await;
    assert_eq!(stats["totalActivities"], 0);
    assert!(stats["recentActivityDate"].is_null());
}

#[tokio::test]
async fn test_archive() {
    let app = TestApp::new();
    let first = app.card("QR-ARC-1", true).await;
    let second = app.card("QR-ARC-2", true).await;
    let token = app.access_token("pia").await;

    for card in [&first, &first, &second] {
        let (status, _) = app
            .post(
                "/api/activities",
                Some(&token),
                json!({ "cardId": card.id, "activityResult": {} }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, cards) = app.get("/api/archive/cards", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let cards = cards.as_array().unwrap();
    assert_eq!(cards.len(), 2);
    // Most recently active first.
    assert_eq!(cards[0]["cardId"], second.id.to_string());
    assert_eq!(cards[1]["activityCount"], 2);

    let (status, recent) = app
        .get("/api/archive/recent?days=7&limit=2", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let recent = recent.as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["cardTitle"], "Card QR-ARC-2");

    let (status, body) = app.get("/api/archive/recent?days=0", Some(&token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field"], "days");

    let (status, activities) = app
        .get(
            &format!("/api/archive/cards/{}/activities", first.id),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(activities.as_array().unwrap().len(), 2);

    let (status, _) = app
        .get(
            &format!("/api/archive/cards/{}/activities", CardId::new()),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Shares
// ============================================================================

#[tokio::test]
async fn test_share_lifecycle() {
    let app = TestApp::new();
    let card = app.card("QR-SHARE", true).await;
    let token = app.access_token("quinn").await;

    let (status, share) = app
        .post(
            "/api/shares",
            Some(&token),
            json!({ "cardId": card.id, "password": "open-sesame" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let share_token = share["shareToken"].as_str().unwrap().to_string();
    assert_eq!(share_token.len(), 16);
    assert_eq!(
        share["shareUrl"],
        format!("https://moa.test/share/{share_token}")
    );
    assert_eq!(share["hasPassword"], true);
    assert!(share["expiryDate"].is_string());
    assert!(share.get("passwordHash").is_none());

    let (status, info) = app
        .get(&format!("/api/shares/token/{share_token}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["cardTitle"], "Card QR-SHARE");
    assert_eq!(info["viewCount"], 0);

    let access = format!("/api/shares/token/{share_token}/access");
    let (status, _) = app.post(&access, None, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.post(&access, None, json!({ "password": "wrong" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, opened) = app
        .post(&access, None, json!({ "password": "open-sesame" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(opened["viewCount"], 1);

    let (status, stats) = app.get("/api/shares/stats/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalShares"], 1);
    assert_eq!(stats["totalViews"], 1);
    assert_eq!(stats["mostViewedShareId"], share["id"]);

    let uri = format!("/api/shares/{}", share["id"].as_str().unwrap());
    let (status, updated) = app
        .patch(&uri, Some(&token), json!({ "isActive": false }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isActive"], false);

    let (status, _) = app
        .get(&format!("/api/shares/token/{share_token}"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
    let (status, _) = app.get(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_share_expiry_options() {
    let app = TestApp::new();
    let card = app.card("QR-EXP", true).await;
    let token = app.access_token("rosa").await;

    let (status, never) = app
        .post(
            "/api/shares",
            Some(&token),
            json!({ "cardId": card.id, "expiryDays": null }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(never["expiryDate"].is_null());
    assert_eq!(never["hasPassword"], false);

    let (status, body) = app
        .post(
            "/api/shares",
            Some(&token),
            json!({ "cardId": card.id, "expiryDays": 400 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field"], "expiryDays");

    let uri = format!("/api/shares/{}", never["id"].as_str().unwrap());
    let (status, updated) = app
        .patch(&uri, Some(&token), json!({ "expiryDays": 3 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["expiryDate"].is_string());

    let (_, list) = app.get("/api/shares/me?isActive=true", Some(&token)).await;
    assert_eq!(list["total"], 1);
    let (_, list) = app.get("/api/shares/me?isActive=false", Some(&token)).await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_share_ownership() {
    let app = TestApp::new();
    let card = app.card("QR-OWNED", true).await;
    let off = app.card("QR-OWNED-OFF", false).await;
    let owner = app.access_token("sam").await;
    let other = app.access_token("tess").await;

    let (_, share) = app
        .post("/api/shares", Some(&owner), json!({ "cardId": card.id }))
        .await;
    let uri = format!("/api/shares/{}", share["id"].as_str().unwrap());

    let (status, _) = app.get(&uri, Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&uri, Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post("/api/shares", Some(&owner), json!({ "cardId": off.id }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/shares/token/unknown-token", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Notifications
// ============================================================================

#[tokio::test]
async fn test_notifications() {
    let app = TestApp::new();
    let token = app.access_token("uma").await;
    let other = app.access_token("vic").await;
    let (_, me) = app.get("/api/users/me", Some(&token)).await;
    let user_id: UserId = serde_json::from_value(me["id"].clone()).unwrap();

    for title in ["First", "Second"] {
        app.state
            .notifications
            .notify(NewNotification {
                user_id,
                kind: "system".to_string(),
                title: title.to_string(),
                message: "Hello".to_string(),
                link_url: None,
            })
            .await
            .unwrap();
    }

    let (status, list) = app.get("/api/notifications/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 2);
    assert_eq!(list["unreadCount"], 2);
    assert_eq!(list["notifications"][0]["type"], "system");
    let id = list["notifications"][0]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/notifications/{id}");

    let (status, _) = app
        .patch(&uri, Some(&other), json!({ "isRead": true }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app.patch(&uri, Some(&token), json!({ "isRead": true })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isRead"], true);

    let (_, unread) = app
        .get("/api/notifications/me?unreadOnly=true", Some(&token))
        .await;
    assert_eq!(unread["notifications"].as_array().unwrap().len(), 1);
    assert_eq!(unread["unreadCount"], 1);

    let (status, body) = app
        .post("/api/notifications/read-all", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 1);

    let (_, stats) = app.get("/api/notifications/stats/me", Some(&token)).await;
    assert_eq!(stats["totalNotifications"], 2);
    assert_eq!(stats["unreadNotifications"], 0);
    assert_eq!(stats["readNotifications"], 2);

    let (status, _) = app.delete(&uri, Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
