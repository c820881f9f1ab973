pub mod action;
pub mod filter;
pub mod processed;
pub mod report;
pub mod throttle;

use std::collections::HashSet;

use crate::config::PipelineConfig;
use crate::error::{AppError, Result};
use crate::platform::types::{Issue, IssueQuery};
use crate::platform::IssueTracker;

use action::IssueAction;
use filter::{IssueFilter, SkipReason};
use processed::ProcessedSet;
use report::RunReport;
use throttle::Throttle;

/// How the page index moves after a page has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStrategy {
    /// Always read the next page.
    Advance,
    /// Read the same page again while updates keep removing issues from the
    /// query's results; move on once a page produces no update.
    Drain,
}

/// Pages through an issue listing, filters each issue and applies an action,
/// retrying the whole pass on failure.
pub struct Pipeline<'a> {
    tracker: &'a dyn IssueTracker,
    action: &'a dyn IssueAction,
    query: IssueQuery,
    filter: IssueFilter,
    strategy: PageStrategy,
    throttle: Throttle,
    retry_attempts: u32,
    start_page: u32,
    dry_run: bool,
    processed: ProcessedSet,
    /// Issues already counted in `report.skipped`.
    skipped: HashSet<u64>,
    /// Issues already counted in `report.failed` and not updated since.
    failed: HashSet<u64>,
    report: RunReport,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        tracker: &'a dyn IssueTracker,
        action: &'a dyn IssueAction,
        query: IssueQuery,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            tracker,
            action,
            query,
            filter: IssueFilter::new(),
            strategy: PageStrategy::Advance,
            throttle: Throttle::from_config(config),
            retry_attempts: config.retry_attempts,
            start_page: config.start_page.max(1),
            dry_run: config.dry_run,
            processed: ProcessedSet::new(),
            skipped: HashSet::new(),
            failed: HashSet::new(),
            report: RunReport::start(config.dry_run),
        }
    }

    pub fn with_filter(mut self, filter: IssueFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_strategy(mut self, strategy: PageStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    /// Run until the listing is exhausted or the retry budget is spent.
    pub async fn run(mut self) -> Result<RunReport> {
        let max_attempts = self.retry_attempts.saturating_add(1);

        loop {
            self.report.attempts += 1;
            let attempt = self.report.attempts;

            match self.run_pages().await {
                Ok(()) => {
                    self.report.finish();
                    tracing::info!(
                        action = self.action.name(),
                        updated = self.report.updated,
                        skipped = self.report.skipped,
                        failed = self.report.failed,
                        pages = self.report.pages,
                        attempts = attempt,
                        dry_run = self.dry_run,
                        "Total issues updated: {}",
                        self.report.updated
                    );
                    return Ok(self.report);
                }
                Err(e) => {
                    tracing::error!(
                        attempt,
                        updated = self.report.updated,
                        error = %e,
                        "Error updating issues"
                    );
                    if attempt >= max_attempts {
                        tracing::error!("Max retries reached");
                        return Err(AppError::RetriesExhausted {
                            attempts: attempt,
                            updated: self.report.updated,
                            source: Box::new(e),
                        });
                    }
                    tracing::info!(
                        retries_left = max_attempts - attempt,
                        "Retrying..."
                    );
                    self.throttle.before_retry().await;
                }
            }
        }
    }

    /// One pass over the listing. Fetch errors end the pass; issue errors don't.
    async fn run_pages(&mut self) -> Result<()> {
        let mut page = self.start_page;
        let mut failed_this_pass = HashSet::new();

        loop {
            tracing::info!(page, "Processing page {page}...");
            let issues = self.tracker.list_issues(&self.query.at_page(page)).await?;
            self.report.pages += 1;

            if issues.is_empty() {
                tracing::debug!(page, "Empty page, listing exhausted");
                return Ok(());
            }

            let edits = self.process_page(&issues, &mut failed_this_pass).await;
            tracing::info!(
                page,
                fetched = issues.len(),
                edits,
                updated = self.report.updated,
                "Processed page"
            );

            page = match self.strategy {
                PageStrategy::Drain if edits > 0 => page,
                _ => page + 1,
            };
            self.throttle.after_page().await;
        }
    }

    /// Returns the number of edits sent to the tracker.
    ///
    /// `skipped` and `failed` count distinct issues, however often a page is
    /// re-read. An issue that fails in one pass and is updated in a later one
    /// counts as updated only.
    async fn process_page(
        &mut self,
        issues: &[Issue],
        failed_this_pass: &mut HashSet<u64>,
    ) -> usize {
        let mut edits = 0;

        for issue in issues {
            self.report.fetched += 1;

            if failed_this_pass.contains(&issue.iid) {
                continue;
            }
            match self.filter.check(issue, &self.processed) {
                Some(SkipReason::AlreadyProcessed) => continue,
                Some(reason) => {
                    tracing::debug!(iid = issue.iid, %reason, "Skipping issue");
                    if self.skipped.insert(issue.iid) {
                        self.report.skipped += 1;
                    }
                    continue;
                }
                None => {}
            }

            match self.apply(issue).await {
                Ok(()) => {
                    self.processed.insert(issue.iid);
                    self.report.updated += 1;
                    if self.failed.remove(&issue.iid) {
                        self.report.failed -= 1;
                    }
                    if !self.dry_run {
                        edits += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        iid = issue.iid,
                        url = %issue.web_url,
                        error = %e,
                        "Failed to update issue"
                    );
                    failed_this_pass.insert(issue.iid);
                    if self.failed.insert(issue.iid) {
                        self.report.failed += 1;
                    }
                }
            }

            if !self.dry_run {
                self.throttle.after_action().await;
            }
        }

        edits
    }

    async fn apply(&self, issue: &Issue) -> Result<()> {
        let change = self.action.plan(issue).await?;

        if self.dry_run {
            tracing::info!(
                iid = issue.iid,
                "[dry run] {} {}",
                issue.web_url,
                change.summary
            );
            return Ok(());
        }

        self.tracker.edit_issue(issue.iid, &change.edit).await?;
        tracing::info!(iid = issue.iid, "{} {}", issue.web_url, change.summary);
        Ok(())
    }
}
