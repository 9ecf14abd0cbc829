mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crm_api::database::repository::users;
use common::{set_cookie, spawn_db_app, unique_email};

const PASSWORD: &str = "correct horse";

#[tokio::test]
async fn unknown_email_and_wrong_password_look_the_same() -> Result<()> {
    let Some(app) = spawn_db_app().await? else { return Ok(()) };
    let email = unique_email();
    app.create_user(&email, PASSWORD).await?;

    let unknown = app.login(&unique_email(), PASSWORD).await?;
    let unknown_status = unknown.status();
    let unknown_body: Value = unknown.json().await?;

    let wrong = app.login(&email, "battery staple").await?;
    let wrong_status = wrong.status();
    let wrong_body: Value = wrong.json().await?;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_body, wrong_body);
    assert_eq!(wrong_body["error"], "Invalid credentials.");
    Ok(())
}

#[tokio::test]
async fn repeated_failures_lock_the_account() -> Result<()> {
    let Some(app) = spawn_db_app().await? else { return Ok(()) };
    let email = unique_email();
    let user_id = app.create_user(&email, PASSWORD).await?;

    for attempt in 1..=4 {
        let res = app.login(&email, "wrong").await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let user = users::find(&app.state.db, user_id).await?.unwrap();
        assert_eq!(user.failed_attempts, attempt);
        assert!(user.locked_until.is_none());
    }

    // Fifth failure arms the lock and clears the counter
    assert_eq!(app.login(&email, "wrong").await?.status(), StatusCode::UNAUTHORIZED);
    let user = users::find(&app.state.db, user_id).await?.unwrap();
    assert_eq!(user.failed_attempts, 0);
    assert!(user.locked_until.is_some());

    // Even the right password is refused while locked, and nothing is counted
    let res = app.login(&email, PASSWORD).await?;
    assert_eq!(res.status(), StatusCode::LOCKED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Account locked. Try later.");
    let user = users::find(&app.state.db, user_id).await?.unwrap();
    assert_eq!(user.failed_attempts, 0);
    Ok(())
}

#[tokio::test]
async fn expired_lock_allows_login_and_resets_state() -> Result<()> {
    let Some(app) = spawn_db_app().await? else { return Ok(()) };
    let email = unique_email();
    let user_id = app.create_user(&email, PASSWORD).await?;

    sqlx::query(
        "UPDATE users SET failed_attempts = 3, locked_until = NOW() - INTERVAL '1 minute' WHERE id = $1",
    )
    .bind(user_id)
    .execute(&app.state.db)
    .await?;

    let res = app.login(&email, PASSWORD).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "authenticated");

    let user = users::find(&app.state.db, user_id).await?.unwrap();
    assert_eq!(user.failed_attempts, 0);
    assert!(user.locked_until.is_none());
    Ok(())
}

#[tokio::test]
async fn login_regenerates_session_and_keeps_token() -> Result<()> {
    let Some(app) = spawn_db_app().await? else { return Ok(()) };
    let email = unique_email();
    app.create_user(&email, PASSWORD).await?;

    let first = app.get("/auth").await?;
    let before = set_cookie(first.headers()).expect("initial cookie");
    let token = first.json::<Value>().await?["csrf_token"]
        .as_str()
        .unwrap()
        .to_string();

    let res = app
        .client
        .post(app.url("/auth"))
        .header(common::CSRF_HEADER, &token)
        .json(&json!({"email": email, "password": PASSWORD}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let after = set_cookie(res.headers()).expect("regenerated cookie");
    assert_ne!(before, after);

    let status: Value = app.get("/auth").await?.json().await?;
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["csrf_token"], token.as_str());

    assert_eq!(app.get("/dashboard").await?.status(), StatusCode::OK);

    let res = app.post("/auth", json!({"action": "logout"})).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(app.get("/dashboard").await?.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
