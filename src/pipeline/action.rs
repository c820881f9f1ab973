use async_trait::async_trait;

use crate::error::Result;
use crate::llm::Classifier;
use crate::platform::types::{Issue, IssueEdit, Milestone, User};

/// The edit planned for one issue and a line describing it for the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub edit: IssueEdit,
    pub summary: String,
}

/// What a bulk run does to each qualifying issue.
///
/// `plan` must not mutate anything; the driver makes the single edit call
/// (or skips it on a dry run).
#[async_trait]
pub trait IssueAction: Send + Sync {
    fn name(&self) -> &str;
    async fn plan(&self, issue: &Issue) -> Result<Change>;
}

/// Swap one assignee for another, keeping any co-assignees.
pub struct Reassign {
    from: User,
    to: User,
}

impl Reassign {
    pub fn new(from: User, to: User) -> Self {
        Self { from, to }
    }

    pub fn assignees_for(&self, issue: &Issue) -> Vec<u64> {
        let mut ids: Vec<u64> = issue
            .assignee_ids()
            .into_iter()
            .filter(|id| *id != self.from.id)
            .collect();
        if !ids.contains(&self.to.id) {
            ids.push(self.to.id);
        }
        ids
    }
}

#[async_trait]
impl IssueAction for Reassign {
    fn name(&self) -> &str {
        "reassign"
    }

    async fn plan(&self, issue: &Issue) -> Result<Change> {
        Ok(Change {
            edit: IssueEdit::assignees(self.assignees_for(issue)),
            summary: format!(
                "reassigned from @{} to @{}",
                self.from.username, self.to.username
            ),
        })
    }
}

pub struct MoveToMilestone {
    milestone: Milestone,
}

impl MoveToMilestone {
    pub fn new(milestone: Milestone) -> Self {
        Self { milestone }
    }
}

#[async_trait]
impl IssueAction for MoveToMilestone {
    fn name(&self) -> &str {
        "milestone"
    }

    async fn plan(&self, issue: &Issue) -> Result<Change> {
        let current = issue
            .milestone
            .as_ref()
            .map_or("(none)", |m| m.title.as_str());
        Ok(Change {
            edit: IssueEdit::milestone(self.milestone.id),
            summary: format!("updated {current} to {}", self.milestone.title),
        })
    }
}

/// Add the module label chosen by the classifier.
pub struct Relabel {
    classifier: Classifier,
}

impl Relabel {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl IssueAction for Relabel {
    fn name(&self) -> &str {
        "relabel"
    }

    async fn plan(&self, issue: &Issue) -> Result<Change> {
        let label = self.classifier.classify(issue).await?;
        Ok(Change {
            edit: IssueEdit::add_label(&label),
            summary: format!("added module label {label}"),
        })
    }
}
