use crate::args::ArgMap;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::pipeline::action::Reassign;
use crate::pipeline::filter::IssueFilter;
use crate::pipeline::report::RunReport;
use crate::pipeline::{PageStrategy, Pipeline};
use crate::platform::types::IssueQuery;
use crate::platform::IssueTracker;

use super::resolve_user;

#[derive(Debug, Clone)]
pub struct ReassignOptions {
    pub assignee: String,
    pub assign_to: String,
    pub labels_to_match: Vec<String>,
    pub labels_to_exclude: Vec<String>,
}

impl ReassignOptions {
    pub fn from_args(args: &ArgMap) -> Result<Self> {
        let assignee = args.require("assignee")?.trim().to_string();
        let assign_to = args.require("assignTo")?.trim().to_string();
        if assignee == assign_to {
            return Err(AppError::Config(format!(
                "--assignee and --assignTo are both @{assignee}"
            )));
        }

        Ok(Self {
            assignee,
            assign_to,
            labels_to_match: args.list("labelsToMatch").unwrap_or_default(),
            labels_to_exclude: args.list("labelsToExclude").unwrap_or_default(),
        })
    }
}

/// Move open issues from one assignee to another.
///
/// The listing is filtered by the assignee being replaced, so reassigned
/// issues disappear from it and pages are drained rather than advanced.
pub async fn run(
    config: &AppConfig,
    options: &ReassignOptions,
    tracker: &dyn IssueTracker,
) -> Result<RunReport> {
    let from = resolve_user(tracker, &options.assignee).await?;
    let to = resolve_user(tracker, &options.assign_to).await?;

    tracing::info!(
        from = %from.username,
        to = %to.username,
        labels = ?options.labels_to_match,
        "Reassigning open issues"
    );

    let query = IssueQuery::opened(config.gitlab.per_page)
        .with_labels(options.labels_to_match.clone())
        .with_assignee(from.username.clone());
    let filter = IssueFilter::new().exclude_labels(options.labels_to_exclude.iter().cloned());
    let action = Reassign::new(from, to);

    Pipeline::new(tracker, &action, query, &config.pipeline)
        .with_filter(filter)
        .with_strategy(PageStrategy::Drain)
        .run()
        .await
}
