use crate::args::ArgMap;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::pipeline::action::MoveToMilestone;
use crate::pipeline::filter::IssueFilter;
use crate::pipeline::report::RunReport;
use crate::pipeline::Pipeline;
use crate::platform::types::IssueQuery;
use crate::platform::IssueTracker;

#[derive(Debug, Clone)]
pub struct MilestoneOptions {
    pub milestone_name: String,
    /// Issues currently in one of these milestones are left alone.
    pub milestone_exclude: Vec<String>,
    pub labels_to_match: Vec<String>,
    pub labels_to_exclude: Vec<String>,
    /// Also move issues that have no milestone yet.
    pub include_unscheduled: bool,
}

impl MilestoneOptions {
    pub fn from_args(args: &ArgMap) -> Result<Self> {
        Ok(Self {
            milestone_name: args.require("milestoneName")?.trim().to_string(),
            milestone_exclude: args.list("milestoneExclude").unwrap_or_default(),
            labels_to_match: args.list("labelsToMatch").unwrap_or_default(),
            labels_to_exclude: args.list("labelsToExclude").unwrap_or_default(),
            include_unscheduled: args.parsed("includeUnscheduled")?.unwrap_or(false),
        })
    }
}

/// Move open issues matching the labels into the named milestone.
pub async fn run(
    config: &AppConfig,
    options: &MilestoneOptions,
    tracker: &dyn IssueTracker,
) -> Result<RunReport> {
    let milestone = tracker
        .find_milestone(&options.milestone_name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("milestone {:?}", options.milestone_name)))?;

    tracing::info!(
        milestone = %milestone.title,
        milestone_id = milestone.id,
        labels = ?options.labels_to_match,
        "Moving issues to milestone"
    );

    let query =
        IssueQuery::opened(config.gitlab.per_page).with_labels(options.labels_to_match.clone());
    let filter = IssueFilter::new()
        .require_milestone(!options.include_unscheduled)
        .target_milestone(milestone.id)
        .exclude_milestones(options.milestone_exclude.iter().cloned())
        .exclude_labels(options.labels_to_exclude.iter().cloned());
    let action = MoveToMilestone::new(milestone);

    Pipeline::new(tracker, &action, query, &config.pipeline)
        .with_filter(filter)
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::platform::testing::{issue, milestone, FakeTracker};
    use crate::platform::types::IssueEdit;

    fn config() -> AppConfig {
        AppConfig {
            pipeline: PipelineConfig {
                action_delay_ms: 0,
                page_delay_ms: 0,
                retry_delay_ms: 0,
                ..PipelineConfig::default()
            },
            ..AppConfig::default()
        }
    }

    fn scheduled(iid: u64, labels: &[&str], id: u64, title: &str) -> crate::platform::types::Issue {
        let mut candidate = issue(iid, labels);
        candidate.milestone = Some(milestone(id, title));
        candidate
    }

    #[test]
    fn test_options_require_milestone_name() {
        let err = MilestoneOptions::from_args(&ArgMap::parse(["--labelsToMatch=P2"])).unwrap_err();
        assert!(err.to_string().contains("--milestoneName"));
    }

    #[tokio::test]
    async fn test_missing_milestone_stops_before_listing() {
        let tracker = FakeTracker::new(vec![issue(1, &["P2"])]);
        let options =
            MilestoneOptions::from_args(&ArgMap::parse(["--milestoneName=v9.9"])).unwrap();

        let err = run(&config(), &options, &tracker).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(tracker.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_moves_scheduled_issues_only() {
        let tracker = FakeTracker::new(vec![
            scheduled(1, &["P2"], 1, "v1.0"),
            scheduled(2, &["P2"], 2, "v2.0"),
            scheduled(3, &["P2"], 3, "Backlog"),
            issue(4, &["P2"]),
            scheduled(5, &["P2", "customer"], 1, "v1.0"),
            scheduled(6, &["P3"], 1, "v1.0"),
        ])
        .with_milestones(vec![
            milestone(1, "v1.0"),
            milestone(2, "v2.0"),
            milestone(3, "Backlog"),
        ]);
        let options = MilestoneOptions::from_args(&ArgMap::parse([
            "--milestoneName=v2.0",
            "--milestoneExclude=Backlog",
            "--labelsToMatch=P2",
            "--labelsToExclude=customer",
        ]))
        .unwrap();

        let report = run(&config(), &options, &tracker).await.unwrap();

        assert_eq!(tracker.edits(), vec![(1, IssueEdit::milestone(2))]);
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 4);
    }

    #[tokio::test]
    async fn test_include_unscheduled() {
        let tracker = FakeTracker::new(vec![issue(4, &[])]).with_milestones(vec![milestone(2, "v2.0")]);
        let options = MilestoneOptions::from_args(&ArgMap::parse([
            "--milestoneName=v2.0",
            "--includeUnscheduled=true",
        ]))
        .unwrap();

        let report = run(&config(), &options, &tracker).await.unwrap();

        assert_eq!(tracker.edited_iids(), vec![4]);
        assert_eq!(report.updated, 1);
    }
}
