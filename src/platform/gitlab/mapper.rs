use serde::Deserialize;

use crate::platform::types;

/// Issue as returned by `GET /projects/:id/issues`.
#[derive(Debug, Deserialize)]
pub struct ApiIssue {
    pub id: u64,
    pub iid: u64,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<ApiUser>,
    pub milestone: Option<ApiMilestone>,
    pub state: String,
    #[serde(default)]
    pub web_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiMilestone {
    pub id: u64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiLabel {
    pub name: String,
}

/// Map a GitLab issue to our platform Issue type.
pub fn map_issue(issue: ApiIssue) -> types::Issue {
    types::Issue {
        id: issue.id,
        iid: issue.iid,
        title: issue.title,
        description: issue.description.unwrap_or_default(),
        labels: issue.labels,
        assignees: issue.assignees.into_iter().map(map_user).collect(),
        milestone: issue.milestone.map(map_milestone),
        state: match issue.state.as_str() {
            "closed" => types::IssueState::Closed,
            _ => types::IssueState::Opened,
        },
        web_url: issue.web_url,
    }
}

pub fn map_user(user: ApiUser) -> types::User {
    types::User {
        id: user.id,
        username: user.username,
    }
}

pub fn map_milestone(milestone: ApiMilestone) -> types::Milestone {
    types::Milestone {
        id: milestone.id,
        title: milestone.title,
    }
}
