use serde::Deserialize;

use crate::error::AppError;
use crate::store::{ContentFilter, ContentStatus};

#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub status: Option<String>,
    pub keyword: Option<String>,
}

impl SearchQuery {
    /// Empty query values count as absent, so `?status=&keyword=` returns the
    /// role-scoped full set. An unrecognized status is an error rather than an
    /// empty result.
    pub fn into_filter(self) -> Result<ContentFilter, AppError> {
        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(s) => Some(ContentStatus::parse(s).ok_or_else(|| {
                AppError::Validation(format!("unknown status value: {s}"))
            })?),
        };
        let keyword = self.keyword.filter(|k| !k.is_empty());
        Ok(ContentFilter { status, keyword })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_count_as_absent() {
        let query = SearchQuery {
            status: Some(String::new()),
            keyword: Some(String::new()),
        };
        let filter = query.into_filter().unwrap();
        assert!(filter.status.is_none());
        assert!(filter.keyword.is_none());
    }

    #[test]
    fn status_values_are_validated() {
        let query = SearchQuery {
            status: Some("approved".to_string()),
            keyword: None,
        };
        assert_eq!(
            query.into_filter().unwrap().status,
            Some(ContentStatus::Approved)
        );

        let query = SearchQuery {
            status: Some("bogus".to_string()),
            keyword: None,
        };
        assert!(matches!(
            query.into_filter(),
            Err(AppError::Validation(_))
        ));
    }
}
