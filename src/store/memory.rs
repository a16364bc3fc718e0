use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Account, ContentFilter, ContentItem, ContentStatus, ContentStore, CredentialStore, Scope,
    StatusCounts, StoreError,
};

/// In-memory credential store. Each instance is fully isolated, which is what
/// the tests rely on.
#[derive(Default)]
pub struct MemoryCredentialStore {
    accounts: RwLock<Vec<Account>>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, account: Account) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(StoreError::Duplicate);
        }
        accounts.push(account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryContentStore {
    items: RwLock<Vec<ContentItem>>,
}

fn matches(item: &ContentItem, scope: Scope, filter: &ContentFilter) -> bool {
    if let Scope::Author(author) = scope {
        if item.created_by != author {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if item.status != status {
            return false;
        }
    }
    if let Some(keyword) = &filter.keyword {
        let keyword = keyword.to_lowercase();
        if !item.title.to_lowercase().contains(&keyword)
            && !item.description.to_lowercase().contains(&keyword)
        {
            return false;
        }
    }
    true
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn insert(&self, item: ContentItem) -> Result<ContentItem, StoreError> {
        let mut items = self.items.write().await;
        items.push(item.clone());
        Ok(item)
    }

    async fn search(
        &self,
        scope: Scope,
        filter: &ContentFilter,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|i| matches(i, scope, filter))
            .cloned()
            .collect())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ContentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<ContentItem>, StoreError> {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.status = status;
                item.updated_at = updated_at;
                Ok(Some(item.clone()))
            }
            None => Ok(None),
        }
    }

    async fn status_counts(&self) -> Result<StatusCounts, StoreError> {
        let items = self.items.read().await;
        let mut counts = StatusCounts::default();
        for item in items.iter() {
            match item.status {
                ContentStatus::Pending => counts.pending += 1,
                ContentStatus::Approved => counts.approved += 1,
                ContentStatus::Rejected => counts.rejected += 1,
            }
        }
        Ok(counts)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ContentItem>, StoreError> {
        let items = self.items.read().await;
        let mut reviewed: Vec<ContentItem> = items
            .iter()
            .filter(|i| i.status != ContentStatus::Pending)
            .cloned()
            .collect();
        reviewed.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        reviewed.truncate(limit);
        Ok(reviewed)
    }
}

#[cfg(test)]
mod tests {
    use super::super::Role;
    use super::*;

    fn item(title: &str, description: &str, author: Uuid) -> ContentItem {
        let now = Utc::now();
        ContentItem {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            created_by: author,
            status: ContentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryCredentialStore::default();
        let account = Account {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            role: Role::User,
            password_hash: "x".to_string(),
            created_at: Utc::now(),
        };
        store.insert(account.clone()).await.unwrap();

        let again = Account {
            id: Uuid::new_v4(),
            ..account
        };
        assert!(matches!(
            store.insert(again).await,
            Err(StoreError::Duplicate)
        ));
    }

    #[tokio::test]
    async fn search_is_scoped_and_keyword_is_case_insensitive() {
        let store = MemoryContentStore::default();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.insert(item("Rust Guide", "intro", alice)).await.unwrap();
        store.insert(item("Cooking", "pasta RECIPES", bob)).await.unwrap();

        let all = store
            .search(Scope::All, &ContentFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let own = store
            .search(Scope::Author(alice), &ContentFilter::default())
            .await
            .unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].title, "Rust Guide");

        let filter = ContentFilter {
            status: None,
            keyword: Some("recipes".to_string()),
        };
        let hits = store.search(Scope::All, &filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].created_by, bob);
    }

    #[tokio::test]
    async fn keyword_metacharacters_match_literally() {
        let store = MemoryContentStore::default();
        let author = Uuid::new_v4();
        store
            .insert(item("Sale", "50% off everything", author))
            .await
            .unwrap();
        store
            .insert(item("Discount", "50 dollars off", author))
            .await
            .unwrap();

        // "%" is part of the keyword, not a wildcard
        let filter = ContentFilter {
            status: None,
            keyword: Some("50% off".to_string()),
        };
        let hits = store.search(Scope::All, &filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Sale");
    }

    #[tokio::test]
    async fn recent_orders_by_update_and_skips_pending() {
        let store = MemoryContentStore::default();
        let author = Uuid::new_v4();
        let pending = store.insert(item("p", "d", author)).await.unwrap();
        let first = store.insert(item("first", "d", author)).await.unwrap();
        let second = store.insert(item("second", "d", author)).await.unwrap();

        let t1 = Utc::now();
        let t2 = t1 + chrono::Duration::seconds(10);
        store
            .set_status(first.id, ContentStatus::Approved, t1)
            .await
            .unwrap();
        store
            .set_status(second.id, ContentStatus::Rejected, t2)
            .await
            .unwrap();

        let recent = store.recent(5).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, second.id);
        assert_eq!(recent[1].id, first.id);
        assert!(recent.iter().all(|i| i.id != pending.id));
    }
}
