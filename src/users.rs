use chrono::naive::NaiveDateTime;
use uuid::Uuid;

/// A registered user
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    #[allow(dead_code)] // used by sqlx
    pub created_at: NaiveDateTime,
}
