use axum::http::StatusCode;
use serde_json::json;

use crate::tests::helper;

#[sqlx::test]
async fn test_private_entry_is_never_public(pool: sqlx::SqlitePool) {
    let mut app = helper::setup_test_app(pool).await;

    let user = helper::register(&mut app, "Ada", "ada@example.com").await;

    let payload = json!({
        "title": "Secret",
        "content": "Dear diary",
        "type": "text",
        "entryInterval": 5,
    });
    let (status_code, _, _) = helper::maybe_create_entry(&mut app, &user.token, &payload).await;
    assert_eq!(StatusCode::OK, status_code);

    let (_, status) = helper::entry_status(&mut app, &user.token).await;
    assert_eq!(false, status.unwrap()["canCreateEntry"]);

    let (status_code, entries) = helper::list_public_entries(&mut app).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(Some(Vec::new()), entries);
}

#[sqlx::test]
async fn test_public_entries(pool: sqlx::SqlitePool) {
    let mut app = helper::setup_test_app(pool.clone()).await;
    let database = helper::setup_test_database(pool).await;

    helper::register(&mut app, "Ada", "ada@example.com").await;
    helper::register(&mut app, "Bob", "bob@example.com").await;

    helper::insert_entry(&database, "ada@example.com", "Ada old", true, helper::days_ago(9), 1).await;
    helper::insert_entry(&database, "ada@example.com", "Ada hidden", false, helper::days_ago(5), 1).await;
    helper::insert_entry(&database, "bob@example.com", "Bob new", true, helper::days_ago(1), 1).await;

    // no token needed
    let (status_code, entries) = helper::list_public_entries(&mut app).await;
    assert_eq!(StatusCode::OK, status_code);
    let entries = entries.unwrap();

    assert_eq!(2, entries.len());

    assert_eq!("Bob new", entries[0]["title"]);
    assert_eq!("Bob", entries[0]["author"]["name"]);
    assert_eq!(true, entries[0]["isPublic"]);

    assert_eq!("Ada old", entries[1]["title"]);
    assert_eq!("Ada", entries[1]["author"]["name"]);

    // only the name of the author is shared
    assert!(entries[0]["author"].get("email").is_none());
}
