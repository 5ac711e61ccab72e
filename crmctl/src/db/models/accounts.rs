//! Database models for accounts.

use crate::api::models::accounts::Role;
use crate::types::AccountId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new account
#[derive(Debug, Clone)]
pub struct AccountCreateDBRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub password_hash: String,
}

/// Database request for updating an account's profile fields
#[derive(Debug, Clone, Default)]
pub struct AccountUpdateDBRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Database response for an account
#[derive(Debug, Clone, FromRow)]
pub struct AccountDBResponse {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountDBResponse {
    pub fn is_organisor(&self) -> bool {
        self.role.is_organisor()
    }

    pub fn is_agent(&self) -> bool {
        self.role.is_agent()
    }
}
