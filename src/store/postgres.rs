use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    Account, ContentFilter, ContentItem, ContentStatus, ContentStore, CredentialStore, Role, Scope,
    StatusCounts, StoreError,
};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

// Role and status live as TEXT columns; the rows convert into the domain
// enums on the way out so a corrupt value fails loudly instead of mapping to
// some default.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, StoreError> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| StoreError::Backend(format!("unknown role value: {}", row.role)))?;
        Ok(Account {
            id: row.id,
            email: row.email,
            role,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ContentRow {
    id: Uuid,
    title: String,
    description: String,
    created_by: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for ContentItem {
    type Error = StoreError;

    fn try_from(row: ContentRow) -> Result<Self, StoreError> {
        let status = ContentStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Backend(format!("unknown status value: {}", row.status)))?;
        Ok(ContentItem {
            id: row.id,
            title: row.title,
            description: row.description,
            created_by: row.created_by,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ILIKE treats %, _ and \ as pattern syntax; escape them so the keyword
// stays a literal substring match, same as the in-memory store's `contains`.
fn escape_like_pattern(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert(&self, account: Account) -> Result<Account, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, email, role, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, role, password_hash, created_at
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(account.role.as_str())
        .bind(&account.password_hash)
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, role, password_hash, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, role, password_hash, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }
}

pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn insert(&self, item: ContentItem) -> Result<ContentItem, StoreError> {
        let row = sqlx::query_as::<_, ContentRow>(
            r#"
            INSERT INTO content_items (id, title, description, created_by, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, created_by, status, created_at, updated_at
            "#,
        )
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.created_by)
        .bind(item.status.as_str())
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn search(
        &self,
        scope: Scope,
        filter: &ContentFilter,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let author = match scope {
            Scope::All => None,
            Scope::Author(id) => Some(id),
        };
        let status = filter.status.map(|s| s.as_str());

        let rows = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT id, title, description, created_by, status, created_at, updated_at
            FROM content_items
            WHERE ($1::uuid IS NULL OR created_by = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL
                   OR title ILIKE '%' || $3 || '%' ESCAPE '\'
                   OR description ILIKE '%' || $3 || '%' ESCAPE '\')
            ORDER BY created_at
            "#,
        )
        .bind(author)
        .bind(status)
        .bind(filter.keyword.as_deref().map(escape_like_pattern))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ContentItem::try_from).collect()
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ContentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<ContentItem>, StoreError> {
        let row = sqlx::query_as::<_, ContentRow>(
            r#"
            UPDATE content_items
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, title, description, created_by, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContentItem::try_from).transpose()
    }

    async fn status_counts(&self) -> Result<StatusCounts, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM content_items GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            match ContentStatus::parse(&status) {
                Some(ContentStatus::Pending) => counts.pending = count,
                Some(ContentStatus::Approved) => counts.approved = count,
                Some(ContentStatus::Rejected) => counts.rejected = count,
                None => {
                    return Err(StoreError::Backend(format!(
                        "unknown status value: {status}"
                    )));
                }
            }
        }
        Ok(counts)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ContentItem>, StoreError> {
        let rows = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT id, title, description, created_by, status, created_at, updated_at
            FROM content_items
            WHERE status IN ('approved', 'rejected')
            ORDER BY updated_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ContentItem::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like_pattern("50% off"), "50\\% off");
        assert_eq!(escape_like_pattern("a_b"), "a\\_b");
        assert_eq!(escape_like_pattern("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like_pattern("plain keyword"), "plain keyword");
    }
}
