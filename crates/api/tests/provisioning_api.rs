//! HTTP-level tests for login and admin account provisioning.

#![cfg(feature = "postgres-tests")]

mod common;

use axum::http::StatusCode;
use common::{body_json, count, get_auth, post_json, post_json_auth, TestAccount};
use serde_json::json;
use sqlx::PgPool;
use theatre_core::roles::AppRole;

const PROVISION: &str = "/api/v1/admin/users";

async fn rows(pool: &PgPool) -> (i64, i64, i64) {
    (
        count(pool, "SELECT COUNT(*) FROM identities").await,
        count(pool, "SELECT COUNT(*) FROM allowed_users").await,
        count(pool, "SELECT COUNT(*) FROM user_roles").await,
    )
}

async fn admin(pool: &PgPool) -> TestAccount {
    common::provision(pool, "admin@theatre.test", AppRole::Admin).await
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn provisioning_without_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let body = json!({ "email": "guest@theatre.test", "secret": "secret123" });
    let response = post_json(app, PROVISION, body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(rows(&pool).await, (0, 0, 0));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn provisioning_by_non_admin_is_403(pool: PgPool) {
    let user = common::provision(&pool, "user@theatre.test", AppRole::User).await;
    let before = rows(&pool).await;
    let app = common::build_test_app(pool.clone());

    let body = json!({ "email": "guest@theatre.test", "secret": "secret123" });
    let response = post_json_auth(app, PROVISION, body, &user.token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(rows(&pool).await, before);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn auth_is_checked_before_body(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, PROVISION, json!("not an object")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_fields_are_400(pool: PgPool) {
    let admin = admin(&pool).await;
    let before = rows(&pool).await;

    for body in [
        json!({ "email": "guest@theatre.test" }),
        json!({ "secret": "secret123" }),
        json!({ "email": "   ", "secret": "secret123" }),
        json!({}),
    ] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(app, PROVISION, body.clone(), &admin.token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let json = body_json(response).await;
        assert_eq!(json["error"], "Email and secret are required");
    }
    assert_eq!(rows(&pool).await, before);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_email_short_secret_and_unknown_role_are_400(pool: PgPool) {
    let admin = admin(&pool).await;
    let before = rows(&pool).await;

    for body in [
        json!({ "email": "not-an-email", "secret": "secret123" }),
        json!({ "email": "guest@theatre.test", "secret": "abc" }),
        json!({ "email": "guest@theatre.test", "secret": "secret123", "role": "owner" }),
    ] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(app, PROVISION, body.clone(), &admin.token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
    assert_eq!(rows(&pool).await, before);
}

// ---------------------------------------------------------------------------
// Success and duplicates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn provisioning_creates_one_row_per_table(pool: PgPool) {
    let admin = admin(&pool).await;
    let app = common::build_test_app(pool.clone());

    let body = json!({ "email": "  Guest@Theatre.TEST ", "secret": "secret123" });
    let response = post_json_auth(app, PROVISION, body, &admin.token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "success": true }));

    let identities: Vec<(String, bool)> = sqlx::query_as(
        "SELECT email, email_confirmed FROM identities WHERE email <> 'admin@theatre.test'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(identities, vec![("guest@theatre.test".to_string(), true)]);

    let allowed = count(
        &pool,
        "SELECT COUNT(*) FROM allowed_users WHERE email = 'guest@theatre.test'",
    )
    .await;
    assert_eq!(allowed, 1);

    let roles: Vec<String> = sqlx::query_scalar(
        "SELECT r.role FROM user_roles r JOIN identities i ON i.id = r.user_id
         WHERE i.email = 'guest@theatre.test'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(roles, vec!["user".to_string()], "role defaults to user");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn provisioning_an_admin(pool: PgPool) {
    let admin = admin(&pool).await;
    let app = common::build_test_app(pool.clone());

    let body = json!({ "email": "boss@theatre.test", "secret": "secret123", "role": "admin" });
    let response = post_json_auth(app, PROVISION, body, &admin.token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM user_roles WHERE role = 'admin'").await,
        2
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_email_is_409(pool: PgPool) {
    let admin = admin(&pool).await;
    let body = json!({ "email": "guest@theatre.test", "secret": "secret123" });

    let app = common::build_test_app(pool.clone());
    let first = post_json_auth(app, PROVISION, body.clone(), &admin.token).await;
    assert_eq!(first.status(), StatusCode::OK);
    let after_first = rows(&pool).await;

    let app = common::build_test_app(pool.clone());
    let second = post_json_auth(app, PROVISION, body, &admin.token).await;

    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["code"], "DUPLICATE_EMAIL");
    assert_eq!(rows(&pool).await, after_first);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn provisioned_user_can_log_in(pool: PgPool) {
    let admin = admin(&pool).await;
    let app = common::build_test_app(pool.clone());
    let body = json!({ "email": "guest@theatre.test", "secret": "secret123" });
    let response = post_json_auth(app, PROVISION, body, &admin.token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let login = json!({ "email": "Guest@theatre.test", "secret": "secret123" });
    let response = post_json(app, "/api/v1/auth/login", login).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["user"]["email"], "guest@theatre.test");
    assert_eq!(json["user"]["roles"], json!(["user"]));

    let token = json["access_token"].as_str().unwrap();
    let app = common::build_test_app(pool);
    let me = get_auth(app, "/api/v1/me", token).await;
    assert_eq!(me.status(), StatusCode::OK);
    let me = body_json(me).await;
    assert_eq!(me["data"]["is_admin"], false);
    assert!(me["data"]["booking"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_wrong_secret_is_401(pool: PgPool) {
    common::provision_with_secret(&pool, "guest@theatre.test", "secret123", AppRole::User).await;
    let app = common::build_test_app(pool);

    let login = json!({ "email": "guest@theatre.test", "secret": "wrong-secret" });
    let response = post_json(app, "/api/v1/auth/login", login).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_for_unknown_email_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let login = json!({ "email": "ghost@theatre.test", "secret": "whatever" });
    let response = post_json(app, "/api/v1/auth/login", login).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_after_removal_from_allow_list_is_403(pool: PgPool) {
    common::provision_with_secret(&pool, "guest@theatre.test", "secret123", AppRole::User).await;
    sqlx::query("DELETE FROM allowed_users WHERE email = 'guest@theatre.test'")
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    let login = json!({ "email": "guest@theatre.test", "secret": "secret123" });
    let response = post_json(app, "/api/v1/auth/login", login).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_lists_users_with_roles(pool: PgPool) {
    let admin = admin(&pool).await;
    common::provision(&pool, "guest@theatre.test", AppRole::User).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, PROVISION, &admin.token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users
        .iter()
        .any(|u| u["email"] == "guest@theatre.test" && u["roles"] == json!(["user"])));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn token_of_removed_user_is_rejected(pool: PgPool) {
    let admin = admin(&pool).await;
    let guest = common::provision(&pool, "guest@theatre.test", AppRole::User).await;

    let app = common::build_test_app(pool.clone());
    let response =
        common::delete_auth(app, &format!("/api/v1/admin/users/{}", guest.id), &admin.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/me", &guest.token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn granted_admin_role_takes_effect_immediately(pool: PgPool) {
    let admin = admin(&pool).await;
    let guest = common::provision(&pool, "guest@theatre.test", AppRole::User).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, PROVISION, &guest.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/admin/users/{}/roles", guest.id);
    let response = common::put_json_auth(app, &uri, json!({ "role": "admin" }), &admin.token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same token, new privileges: roles are never read from the token.
    let app = common::build_test_app(pool);
    let response = get_auth(app, PROVISION, &guest.token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn revoking_last_admin_is_409(pool: PgPool) {
    let admin = admin(&pool).await;
    let app = common::build_test_app(pool);

    let uri = format!("/api/v1/admin/users/{}/roles/admin", admin.id);
    let response = common::delete_auth(app, &uri, &admin.token).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "LAST_ADMIN");
}
