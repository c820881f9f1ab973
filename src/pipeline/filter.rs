use std::collections::HashSet;
use std::fmt;

use crate::pipeline::processed::ProcessedSet;
use crate::platform::types::Issue;

/// Why an issue was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyProcessed,
    ExcludedLabel(String),
    ExcludedLabelPrefix(String),
    NoMilestone,
    AlreadyInTarget,
    ExcludedMilestone(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyProcessed => write!(f, "already processed in this run"),
            SkipReason::ExcludedLabel(label) => write!(f, "has excluded label {label:?}"),
            SkipReason::ExcludedLabelPrefix(label) => write!(f, "already labelled {label:?}"),
            SkipReason::NoMilestone => write!(f, "has no milestone"),
            SkipReason::AlreadyInTarget => write!(f, "already in the target milestone"),
            SkipReason::ExcludedMilestone(title) => write!(f, "in excluded milestone {title:?}"),
        }
    }
}

/// Decides which fetched issues get updated.
///
/// Every rule can only exclude. Labels to match are part of the query and
/// not checked here.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    exclude_labels: HashSet<String>,
    exclude_label_prefixes: Vec<String>,
    require_milestone: bool,
    target_milestone: Option<u64>,
    exclude_milestones: HashSet<String>,
}

impl IssueFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_labels.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn exclude_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.exclude_label_prefixes.push(prefix.into());
        self
    }

    pub fn require_milestone(mut self, required: bool) -> Self {
        self.require_milestone = required;
        self
    }

    pub fn target_milestone(mut self, id: u64) -> Self {
        self.target_milestone = Some(id);
        self
    }

    pub fn exclude_milestones<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_milestones
            .extend(titles.into_iter().map(Into::into));
        self
    }

    /// The first rule that excludes the issue, or `None` if it qualifies.
    pub fn check(&self, issue: &Issue, processed: &ProcessedSet) -> Option<SkipReason> {
        if processed.contains(issue.iid) {
            return Some(SkipReason::AlreadyProcessed);
        }

        if let Some(label) = issue
            .labels
            .iter()
            .find(|l| self.exclude_labels.contains(l.as_str()))
        {
            return Some(SkipReason::ExcludedLabel(label.clone()));
        }

        if let Some(label) = issue.labels.iter().find(|l| {
            self.exclude_label_prefixes
                .iter()
                .any(|p| l.starts_with(p.as_str()))
        }) {
            return Some(SkipReason::ExcludedLabelPrefix(label.clone()));
        }

        match &issue.milestone {
            None if self.require_milestone => Some(SkipReason::NoMilestone),
            Some(m) if self.target_milestone == Some(m.id) => Some(SkipReason::AlreadyInTarget),
            Some(m) if self.exclude_milestones.contains(&m.title) => {
                Some(SkipReason::ExcludedMilestone(m.title.clone()))
            }
            _ => None,
        }
    }

    pub fn include(&self, issue: &Issue, processed: &ProcessedSet) -> bool {
        self.check(issue, processed).is_none()
    }
}
