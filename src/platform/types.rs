use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u64,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueState {
    Opened,
    Closed,
}

impl IssueState {
    pub fn as_query(&self) -> &'static str {
        match self {
            IssueState::Opened => "opened",
            IssueState::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    /// Project-scoped number used in URLs and edit calls.
    pub iid: u64,
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
    pub assignees: Vec<User>,
    pub milestone: Option<Milestone>,
    pub state: IssueState,
    pub web_url: String,
}

impl Issue {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn assignee_ids(&self) -> Vec<u64> {
        self.assignees.iter().map(|u| u.id).collect()
    }
}

/// One page of an issue listing.
#[derive(Debug, Clone)]
pub struct IssueQuery {
    pub state: IssueState,
    /// Issues must carry all of these labels.
    pub labels: Vec<String>,
    pub assignee_username: Option<String>,
    pub per_page: u32,
    pub page: u32,
}

impl IssueQuery {
    pub fn opened(per_page: u32) -> Self {
        Self {
            state: IssueState::Opened,
            labels: Vec::new(),
            assignee_username: None,
            per_page,
            page: 1,
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_assignee(mut self, username: impl Into<String>) -> Self {
        self.assignee_username = Some(username.into());
        self
    }

    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// Partial update of an issue. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<u64>>,
    /// Comma separated, as the API expects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_labels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
}

impl IssueEdit {
    pub fn assignees(ids: Vec<u64>) -> Self {
        Self {
            assignee_ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn add_label(label: &str) -> Self {
        Self {
            add_labels: Some(label.to_string()),
            ..Self::default()
        }
    }

    pub fn milestone(id: u64) -> Self {
        Self {
            milestone_id: Some(id),
            ..Self::default()
        }
    }
}
