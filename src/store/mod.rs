use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::{MemoryContentStore, MemoryCredentialStore};
pub use postgres::{PgContentStore, PgCredentialStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Pending => "pending",
            ContentStatus::Approved => "approved",
            ContentStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<ContentStatus> {
        match s {
            "pending" => Some(ContentStatus::Pending),
            "approved" => Some(ContentStatus::Approved),
            "rejected" => Some(ContentStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_by: Uuid,
    pub status: ContentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which slice of the content population an actor may see.
#[derive(Debug, Clone, Copy)]
pub enum Scope {
    All,
    Author(Uuid),
}

#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub status: Option<ContentStatus>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl StatusCounts {
    pub fn total(&self) -> i64 {
        self.pending + self.approved + self.rejected
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate record")]
    Duplicate,
    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persists a new account; `StoreError::Duplicate` when the email is taken.
    async fn insert(&self, account: Account) -> Result<Account, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert(&self, item: ContentItem) -> Result<ContentItem, StoreError>;
    /// Scoped search in insertion order; an empty filter returns the whole scope.
    async fn search(
        &self,
        scope: Scope,
        filter: &ContentFilter,
    ) -> Result<Vec<ContentItem>, StoreError>;
    /// Rewrites the status and refreshes `updated_at`; `None` when the id
    /// does not resolve.
    async fn set_status(
        &self,
        id: Uuid,
        status: ContentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<ContentItem>, StoreError>;
    async fn status_counts(&self) -> Result<StatusCounts, StoreError>;
    /// Reviewed items only (approved/rejected), most recently updated first.
    async fn recent(&self, limit: usize) -> Result<Vec<ContentItem>, StoreError>;
}
