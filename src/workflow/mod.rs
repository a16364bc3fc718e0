use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::store::{
    ContentFilter, ContentItem, ContentStatus, ContentStore, CredentialStore, Role, Scope,
    StatusCounts,
};

/// Server-side bound on the description; the client enforces the same limit.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// How many reviewed items the activity feed returns.
const RECENT_ACTIVITY_LIMIT: usize = 5;

/// A content item with the author's email populated for display.
#[derive(Debug, Clone, Serialize)]
pub struct ContentView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_by: Uuid,
    pub author_email: Option<String>,
    pub status: ContentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatsSummary {
    #[serde(rename = "totalSubmissions")]
    pub total_submissions: i64,
    pub stats: StatusCounts,
}

/// Creates, lists, searches, and reviews content items. Role scoping happens
/// here; admin-only access to transitions, stats, and the activity feed is
/// enforced at the route boundary.
#[derive(Clone)]
pub struct ContentWorkflow {
    content: Arc<dyn ContentStore>,
    credentials: Arc<dyn CredentialStore>,
}

impl ContentWorkflow {
    pub fn new(content: Arc<dyn ContentStore>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            content,
            credentials,
        }
    }

    pub async fn create(
        &self,
        author_id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<ContentView, AppError> {
        let title = title.trim();
        let description = description.trim();
        if title.is_empty() || description.is_empty() {
            return Err(AppError::Validation(
                "title and description are required".to_string(),
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(AppError::Validation(format!(
                "description must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }

        let now = Utc::now();
        let item = self
            .content
            .insert(ContentItem {
                id: Uuid::new_v4(),
                title: title.to_string(),
                description: description.to_string(),
                created_by: author_id,
                status: ContentStatus::Pending,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!("content {} submitted by {}", item.id, author_id);
        Ok(self.populate(vec![item]).await?.remove(0))
    }

    /// Admins see everything, users only what they authored.
    pub async fn list(&self, actor_id: Uuid, role: Role) -> Result<Vec<ContentView>, AppError> {
        let items = self
            .content
            .search(scope_for(actor_id, role), &ContentFilter::default())
            .await?;
        self.populate(items).await
    }

    pub async fn search(
        &self,
        actor_id: Uuid,
        role: Role,
        filter: ContentFilter,
    ) -> Result<Vec<ContentView>, AppError> {
        let items = self
            .content
            .search(scope_for(actor_id, role), &filter)
            .await?;
        self.populate(items).await
    }

    /// Rewrites the status and refreshes `updated_at`. Re-approving an already
    /// approved item is accepted; there is no transition guard.
    pub async fn transition(
        &self,
        item_id: Uuid,
        target: ContentStatus,
    ) -> Result<ContentView, AppError> {
        if target == ContentStatus::Pending {
            return Err(AppError::Validation(
                "items cannot be moved back to pending".to_string(),
            ));
        }

        let item = self
            .content
            .set_status(item_id, target, Utc::now())
            .await?
            .ok_or(AppError::NotFound)?;

        tracing::info!("content {} marked {}", item.id, target.as_str());
        Ok(self.populate(vec![item]).await?.remove(0))
    }

    /// Whole-population counts, not role-scoped.
    pub async fn stats(&self) -> Result<StatsSummary, AppError> {
        let counts = self.content.status_counts().await?;
        Ok(StatsSummary {
            total_submissions: counts.total(),
            stats: counts,
        })
    }

    pub async fn recent_activity(&self) -> Result<Vec<ContentView>, AppError> {
        let items = self.content.recent(RECENT_ACTIVITY_LIMIT).await?;
        self.populate(items).await
    }

    /// Resolves author emails for a batch of items, one lookup per distinct
    /// author.
    async fn populate(&self, items: Vec<ContentItem>) -> Result<Vec<ContentView>, AppError> {
        let mut emails: HashMap<Uuid, Option<String>> = HashMap::new();
        for item in &items {
            if !emails.contains_key(&item.created_by) {
                let email = self
                    .credentials
                    .find_by_id(item.created_by)
                    .await?
                    .map(|a| a.email);
                emails.insert(item.created_by, email);
            }
        }

        Ok(items
            .into_iter()
            .map(|item| {
                let author_email = emails.get(&item.created_by).cloned().flatten();
                ContentView {
                    id: item.id,
                    title: item.title,
                    description: item.description,
                    created_by: item.created_by,
                    author_email,
                    status: item.status,
                    created_at: item.created_at,
                    updated_at: item.updated_at,
                }
            })
            .collect())
    }
}

fn scope_for(actor_id: Uuid, role: Role) -> Scope {
    match role {
        Role::Admin => Scope::All,
        Role::User => Scope::Author(actor_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Account, MemoryContentStore, MemoryCredentialStore};

    async fn fixture() -> (ContentWorkflow, Uuid, Uuid) {
        let credentials = Arc::new(MemoryCredentialStore::default());
        let alice = Account {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            role: Role::User,
            password_hash: "h".to_string(),
            created_at: Utc::now(),
        };
        let admin = Account {
            id: Uuid::new_v4(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            password_hash: "h".to_string(),
            created_at: Utc::now(),
        };
        let (alice_id, admin_id) = (alice.id, admin.id);
        credentials.insert(alice).await.unwrap();
        credentials.insert(admin).await.unwrap();

        let workflow = ContentWorkflow::new(Arc::new(MemoryContentStore::default()), credentials);
        (workflow, alice_id, admin_id)
    }

    #[tokio::test]
    async fn new_items_start_pending_with_author_email() {
        let (workflow, alice, _) = fixture().await;
        let item = workflow.create(alice, "T", "D").await.unwrap();
        assert_eq!(item.status, ContentStatus::Pending);
        assert_eq!(item.created_by, alice);
        assert_eq!(item.author_email.as_deref(), Some("alice@example.com"));
        assert_eq!(item.created_at, item.updated_at);
    }

    #[tokio::test]
    async fn create_rejects_missing_and_oversized_fields() {
        let (workflow, alice, _) = fixture().await;

        let err = workflow.create(alice, "  ", "D").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = workflow.create(alice, "T", "").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let long = "x".repeat(MAX_DESCRIPTION_CHARS + 1);
        let err = workflow.create(alice, "T", &long).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // exactly at the bound is fine
        let exact = "x".repeat(MAX_DESCRIPTION_CHARS);
        workflow.create(alice, "T", &exact).await.unwrap();
    }

    #[tokio::test]
    async fn list_is_role_scoped() {
        let (workflow, alice, admin) = fixture().await;
        workflow.create(alice, "alice item", "d").await.unwrap();
        workflow.create(admin, "admin item", "d").await.unwrap();

        let own = workflow.list(alice, Role::User).await.unwrap();
        assert_eq!(own.len(), 1);
        assert!(own.iter().all(|i| i.created_by == alice));

        let all = workflow.list(admin, Role::Admin).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn search_filters_combine_conjunctively() {
        let (workflow, alice, admin) = fixture().await;
        let guide = workflow.create(alice, "Rust Guide", "intro").await.unwrap();
        workflow.create(alice, "Cooking", "pasta").await.unwrap();
        workflow.create(admin, "Rust Tips", "tricks").await.unwrap();

        workflow
            .transition(guide.id, ContentStatus::Approved)
            .await
            .unwrap();

        // keyword only, admin scope
        let hits = workflow
            .search(
                admin,
                Role::Admin,
                ContentFilter {
                    status: None,
                    keyword: Some("rust".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);

        // keyword + status narrow together
        let hits = workflow
            .search(
                admin,
                Role::Admin,
                ContentFilter {
                    status: Some(ContentStatus::Approved),
                    keyword: Some("rust".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, guide.id);

        // user scope applies before the filters
        let hits = workflow
            .search(
                alice,
                Role::User,
                ContentFilter {
                    status: None,
                    keyword: Some("rust".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        // no filters returns the role-scoped full set
        let hits = workflow
            .search(alice, Role::User, ContentFilter::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn transition_updates_stats_and_is_idempotent() {
        let (workflow, alice, _) = fixture().await;
        let item = workflow.create(alice, "T", "D").await.unwrap();

        let before = workflow.stats().await.unwrap();
        assert_eq!(before.stats.pending, 1);
        assert_eq!(before.stats.approved, 0);

        let approved = workflow
            .transition(item.id, ContentStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.status, ContentStatus::Approved);

        let after = workflow.stats().await.unwrap();
        assert_eq!(after.stats.approved, before.stats.approved + 1);
        assert_eq!(after.stats.pending, before.stats.pending - 1);
        assert_eq!(after.total_submissions, 1);

        // re-approving is accepted and just rewrites status
        let again = workflow
            .transition(item.id, ContentStatus::Approved)
            .await
            .unwrap();
        assert_eq!(again.status, ContentStatus::Approved);
        assert_eq!(workflow.stats().await.unwrap().stats.approved, 1);

        // reviewed items can still flip the other way
        let rejected = workflow
            .transition(item.id, ContentStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(rejected.status, ContentStatus::Rejected);
    }

    #[tokio::test]
    async fn transition_unknown_item_is_not_found() {
        let (workflow, _, _) = fixture().await;
        let err = workflow
            .transition(Uuid::new_v4(), ContentStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn transition_back_to_pending_is_rejected() {
        let (workflow, alice, _) = fixture().await;
        let item = workflow.create(alice, "T", "D").await.unwrap();
        let err = workflow
            .transition(item.id, ContentStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn recent_activity_caps_at_five_and_skips_pending() {
        let (workflow, alice, _) = fixture().await;

        for i in 0..7 {
            let item = workflow
                .create(alice, &format!("item {i}"), "d")
                .await
                .unwrap();
            if i < 6 {
                let target = if i % 2 == 0 {
                    ContentStatus::Approved
                } else {
                    ContentStatus::Rejected
                };
                workflow.transition(item.id, target).await.unwrap();
            }
        }

        let recent = workflow.recent_activity().await.unwrap();
        assert_eq!(recent.len(), 5);
        assert!(recent.iter().all(|i| i.status != ContentStatus::Pending));
        // newest review first
        for pair in recent.windows(2) {
            assert!(pair[0].updated_at >= pair[1].updated_at);
        }
    }
}
