//! In-memory `IssueTracker` used by unit tests.
//!
//! Listing applies the same state/label/assignee filters as the server and
//! edits mutate the stored issues, so paging behaves like the real API when
//! issues drop out of a query.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::IssueTracker;

#[derive(Default)]
pub struct FakeTracker {
    issues: Mutex<Vec<Issue>>,
    users: Vec<User>,
    milestones: Vec<Milestone>,
    labels: Vec<String>,
    edits: Mutex<Vec<(u64, IssueEdit)>>,
    list_calls: Mutex<u32>,
    /// Number of upcoming `list_issues` calls that fail.
    failing_lists: Mutex<u32>,
    failing_edits: HashSet<u64>,
}

impl FakeTracker {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            issues: Mutex::new(issues),
            ..Self::default()
        }
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    pub fn with_milestones(mut self, milestones: Vec<Milestone>) -> Self {
        self.milestones = milestones;
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn failing_lists(self, count: u32) -> Self {
        *self.failing_lists.lock().unwrap() = count;
        self
    }

    pub fn failing_edit(mut self, iid: u64) -> Self {
        self.failing_edits.insert(iid);
        self
    }

    pub fn edits(&self) -> Vec<(u64, IssueEdit)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn edited_iids(&self) -> Vec<u64> {
        self.edits().into_iter().map(|(iid, _)| iid).collect()
    }

    pub fn list_calls(&self) -> u32 {
        *self.list_calls.lock().unwrap()
    }

    pub fn issue(&self, iid: u64) -> Option<Issue> {
        self.issues
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.iid == iid)
            .cloned()
    }

    fn matches(issue: &Issue, query: &IssueQuery) -> bool {
        issue.state == query.state
            && query.labels.iter().all(|l| issue.has_label(l))
            && query
                .assignee_username
                .as_ref()
                .map_or(true, |name| issue.assignees.iter().any(|u| &u.username == name))
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn list_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>> {
        *self.list_calls.lock().unwrap() += 1;
        {
            let mut failing = self.failing_lists.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(AppError::GitLabApi("502 Bad Gateway".to_string()));
            }
        }

        let per_page = query.per_page as usize;
        let skip = (query.page.saturating_sub(1) as usize) * per_page;
        Ok(self
            .issues
            .lock()
            .unwrap()
            .iter()
            .filter(|i| Self::matches(i, query))
            .skip(skip)
            .take(per_page)
            .cloned()
            .collect())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_milestone(&self, title: &str) -> Result<Option<Milestone>> {
        Ok(self.milestones.iter().find(|m| m.title == title).cloned())
    }

    async fn list_labels(&self, search: &str) -> Result<Vec<String>> {
        Ok(self
            .labels
            .iter()
            .filter(|l| l.contains(search))
            .cloned()
            .collect())
    }

    async fn edit_issue(&self, iid: u64, edit: &IssueEdit) -> Result<()> {
        if self.failing_edits.contains(&iid) {
            return Err(AppError::GitLabApi(format!("403 Forbidden editing #{iid}")));
        }
        self.edits.lock().unwrap().push((iid, edit.clone()));

        let mut issues = self.issues.lock().unwrap();
        let issue = issues
            .iter_mut()
            .find(|i| i.iid == iid)
            .ok_or_else(|| AppError::NotFound(format!("issue #{iid}")))?;

        if let Some(ids) = &edit.assignee_ids {
            issue.assignees = ids
                .iter()
                .map(|id| {
                    self.users
                        .iter()
                        .find(|u| u.id == *id)
                        .cloned()
                        .unwrap_or(User {
                            id: *id,
                            username: format!("user-{id}"),
                        })
                })
                .collect();
        }
        if let Some(labels) = &edit.add_labels {
            for label in labels.split(',') {
                if !issue.has_label(label) {
                    issue.labels.push(label.to_string());
                }
            }
        }
        if let Some(id) = edit.milestone_id {
            let title = self
                .milestones
                .iter()
                .find(|m| m.id == id)
                .map(|m| m.title.clone())
                .unwrap_or_default();
            issue.milestone = Some(Milestone { id, title });
        }
        Ok(())
    }
}

pub fn user(id: u64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
    }
}

pub fn milestone(id: u64, title: &str) -> Milestone {
    Milestone {
        id,
        title: title.to_string(),
    }
}

pub fn issue(iid: u64, labels: &[&str]) -> Issue {
    Issue {
        id: 1000 + iid,
        iid,
        title: format!("Issue {iid}"),
        description: format!("Description of issue {iid}"),
        labels: labels.iter().map(|l| l.to_string()).collect(),
        assignees: Vec::new(),
        milestone: None,
        state: IssueState::Opened,
        web_url: format!("https://gitlab.test/group/project/-/issues/{iid}"),
    }
}
