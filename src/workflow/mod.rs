pub mod milestone;
pub mod reassign;
pub mod relabel;

use crate::args::ArgMap;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::pipeline::report::RunReport;
use crate::platform::gitlab::GitLabTracker;
use crate::platform::types::User;
use crate::platform::IssueTracker;

/// The bulk tools shipped as binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Reassign,
    Relabel,
    Milestone,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Reassign => "gitlab-reassign",
            Tool::Relabel => "gitlab-relabel",
            Tool::Milestone => "gitlab-milestone",
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            Tool::Reassign => {
                "Usage:
  gitlab-reassign \\
    --host=https://gitlab.example.com \\
    --token=<gitlab-bot-token> \\
    --projectId=21 \\
    --assignee=<from-username> \\
    --assignTo=<to-username> \\
    --labelsToMatch=\"bug,TO DO\" \\
    --labelsToExclude=\"QA,wontfix,duplicate\""
            }
            Tool::Relabel => {
                "Usage:
  gitlab-relabel \\
    --host=https://gitlab.example.com \\
    --token=<gitlab-bot-token> \\
    --projectId=21 \\
    [--labelPrefix=M::] [--labelsToExclude=QA,bug] [--model=moonshot-v1-8k]

  The chat completion key is read from llm.api_key (or GITLAB_BULK__LLM__API_KEY)."
            }
            Tool::Milestone => {
                "Usage:
  gitlab-milestone \\
    --host=https://gitlab.example.com \\
    --token=<gitlab-bot-token> \\
    --projectId=<gitlab-project-id> \\
    --milestoneName=<gitlab-milestone-name> \\
    --labelsToMatch=\"P2,Auto Bug\" \\
    --labelsToExclude=\"customer,enhancement,feature\" \\
    --perPage=100 [--milestoneExclude=v1.0] [--includeUnscheduled]"
            }
        }
    }
}

/// Load configuration, check the tool's arguments, then run it against GitLab.
///
/// Every configuration and argument check happens before the first request.
pub async fn run_tool(tool: Tool, args: &ArgMap) -> Result<RunReport> {
    let config = AppConfig::load(args)?;
    tracing::debug!(config = ?config, "Loaded configuration");

    match tool {
        Tool::Reassign => {
            let options = reassign::ReassignOptions::from_args(args)?;
            let tracker = GitLabTracker::new(&config.gitlab)?;
            reassign::run(&config, &options, &tracker).await
        }
        Tool::Relabel => {
            let options = relabel::RelabelOptions::from_args(args)?;
            config.validate_llm()?;
            let tracker = GitLabTracker::new(&config.gitlab)?;
            relabel::run(&config, &options, &tracker).await
        }
        Tool::Milestone => {
            let options = milestone::MilestoneOptions::from_args(args)?;
            let tracker = GitLabTracker::new(&config.gitlab)?;
            milestone::run(&config, &options, &tracker).await
        }
    }
}

async fn resolve_user(tracker: &dyn IssueTracker, username: &str) -> Result<User> {
    tracker
        .find_user(username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user @{username}")))
}
