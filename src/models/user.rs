use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Authenticated user as returned by the session endpoints.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
}

// Full row, only used for credential checks
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

impl UserRecord {
    pub fn verify_password(&self, password: &str) -> Result<bool, bcrypt::BcryptError> {
        bcrypt::verify(password, &self.password_hash)
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self { id: record.id, email: record.email, name: record.name }
    }
}

// POST /api/sessions
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Emails are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
