use crate::args::ArgMap;
use crate::config::AppConfig;
use crate::error::Result;
use crate::llm::{ChatClient, Classifier, Taxonomy};
use crate::pipeline::action::Relabel;
use crate::pipeline::filter::IssueFilter;
use crate::pipeline::report::RunReport;
use crate::pipeline::Pipeline;
use crate::platform::types::IssueQuery;
use crate::platform::IssueTracker;

const DEFAULT_PREFIX: &str = "M::";
const DEFAULT_EXCLUDE: &[&str] = &["QA", "bug"];

#[derive(Debug, Clone)]
pub struct RelabelOptions {
    pub label_prefix: String,
    pub labels_to_match: Vec<String>,
    pub labels_to_exclude: Vec<String>,
}

impl RelabelOptions {
    pub fn from_args(args: &ArgMap) -> Result<Self> {
        Ok(Self {
            label_prefix: args
                .get("labelPrefix")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(DEFAULT_PREFIX)
                .to_string(),
            labels_to_match: args.list("labelsToMatch").unwrap_or_default(),
            labels_to_exclude: args
                .list("labelsToExclude")
                .unwrap_or_else(|| DEFAULT_EXCLUDE.iter().map(|l| l.to_string()).collect()),
        })
    }
}

/// Give every open issue without a module label one chosen by the model.
pub async fn run(
    config: &AppConfig,
    options: &RelabelOptions,
    tracker: &dyn IssueTracker,
) -> Result<RunReport> {
    let labels = tracker.list_labels(&options.label_prefix).await?;
    let taxonomy = Taxonomy::new(&options.label_prefix, labels)?;
    tracing::info!(
        count = taxonomy.len(),
        model = %config.llm.model,
        "Module labels: {}",
        taxonomy.display_names().join(",")
    );

    let classifier = Classifier::new(
        ChatClient::new(&config.llm)?,
        taxonomy,
        config.llm.max_corrections,
    );
    let action = Relabel::new(classifier);

    let query =
        IssueQuery::opened(config.gitlab.per_page).with_labels(options.labels_to_match.clone());
    let filter = IssueFilter::new()
        .exclude_labels(options.labels_to_exclude.iter().cloned())
        .exclude_label_prefix(options.label_prefix.clone());

    Pipeline::new(tracker, &action, query, &config.pipeline)
        .with_filter(filter)
        .run()
        .await
}
