use axum::http::StatusCode;

use crate::tests::helper;

#[sqlx::test]
async fn test_login(pool: sqlx::SqlitePool) {
    let mut app = helper::setup_test_app(pool).await;

    let registered = helper::register(&mut app, "Ada", "ada@example.com").await;

    let (status_code, user, _) =
        helper::maybe_login(&mut app, "ada@example.com", helper::PASSWORD).await;
    assert_eq!(StatusCode::OK, status_code);
    let user = user.unwrap();
    assert_eq!(registered.id, user.id);

    let (status_code, _) = helper::list_entries(&mut app, &user.token).await;
    assert_eq!(StatusCode::OK, status_code);
}

#[sqlx::test]
async fn test_login_invalid_credentials(pool: sqlx::SqlitePool) {
    let mut app = helper::setup_test_app(pool).await;

    helper::register(&mut app, "Ada", "ada@example.com").await;

    let (status_code, user, error) =
        helper::maybe_login(&mut app, "ada@example.com", "notsosecret").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(user.is_none());
    assert_eq!(Some("Invalid credentials".to_string()), error);

    let (status_code, _, error) =
        helper::maybe_login(&mut app, "bob@example.com", helper::PASSWORD).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid credentials".to_string()), error);
}
