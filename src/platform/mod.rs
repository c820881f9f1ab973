pub mod gitlab;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

use crate::error::Result;
use types::*;

#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch one page of issues. An empty page means the listing is exhausted.
    async fn list_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>>;

    /// Look up a user by exact username.
    async fn find_user(&self, username: &str) -> Result<Option<User>>;

    /// Look up a project milestone by exact title.
    async fn find_milestone(&self, title: &str) -> Result<Option<Milestone>>;

    /// List the names of all project labels matching `search`.
    async fn list_labels(&self, search: &str) -> Result<Vec<String>>;

    /// Apply a partial update to an issue.
    async fn edit_issue(&self, iid: u64, edit: &IssueEdit) -> Result<()>;
}
