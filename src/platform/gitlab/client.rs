use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::GitLabConfig;
use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::IssueTracker;

use super::mapper::{self, ApiIssue, ApiLabel, ApiMilestone, ApiUser};

/// Labels are listed in pages of this size regardless of the issue page size.
const LABEL_PAGE_SIZE: u32 = 100;

pub struct GitLabTracker {
    client: Client,
    /// `<host>/api/v4`
    api_base: String,
    token: String,
    /// Percent-encoded project id or path.
    project: String,
}

impl GitLabTracker {
    pub fn new(config: &GitLabConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base(&config.host),
            token: config.token.clone(),
            project: urlencoding::encode(config.project_id.trim()).into_owned(),
        })
    }

    fn project_url(&self, path: &str) -> String {
        format!("{}/projects/{}{path}", self.api_base, self.project)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("PRIVATE-TOKEN", &self.token)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .authorized(self.client.get(url))
            .query(query)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }
}

fn api_base(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.ends_with("/api/v4") {
        host.to_string()
    } else {
        format!("{host}/api/v4")
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::GitLabApi(format!("{url} returned {status}: {body}")))
}

#[async_trait]
impl IssueTracker for GitLabTracker {
    async fn list_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>> {
        let mut params = vec![
            ("state", query.state.as_query().to_string()),
            ("scope", "all".to_string()),
            ("per_page", query.per_page.to_string()),
            ("page", query.page.to_string()),
        ];
        if !query.labels.is_empty() {
            params.push(("labels", query.labels.join(",")));
        }
        if let Some(username) = &query.assignee_username {
            params.push(("assignee_username", username.clone()));
        }

        let issues: Vec<ApiIssue> = self.get_json(&self.project_url("/issues"), &params).await?;
        Ok(issues.into_iter().map(mapper::map_issue).collect())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>> {
        let url = format!("{}/users", self.api_base);
        let users: Vec<ApiUser> = self
            .get_json(&url, &[("username", username.to_string())])
            .await?;

        Ok(users
            .into_iter()
            .find(|u| u.username == username)
            .map(mapper::map_user))
    }

    async fn find_milestone(&self, title: &str) -> Result<Option<Milestone>> {
        let milestones: Vec<ApiMilestone> = self
            .get_json(
                &self.project_url("/milestones"),
                &[("title", title.to_string())],
            )
            .await?;

        Ok(milestones
            .into_iter()
            .find(|m| m.title == title)
            .map(mapper::map_milestone))
    }

    async fn list_labels(&self, search: &str) -> Result<Vec<String>> {
        let url = self.project_url("/labels");
        let mut names = Vec::new();
        let mut page = 1u32;

        loop {
            let labels: Vec<ApiLabel> = self
                .get_json(
                    &url,
                    &[
                        ("search", search.to_string()),
                        ("per_page", LABEL_PAGE_SIZE.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;

            let count = labels.len();
            names.extend(labels.into_iter().map(|l| l.name));
            if count < LABEL_PAGE_SIZE as usize {
                break;
            }
            page += 1;
        }

        Ok(names)
    }

    async fn edit_issue(&self, iid: u64, edit: &IssueEdit) -> Result<()> {
        let url = self.project_url(&format!("/issues/{iid}"));
        let response = self
            .authorized(self.client.put(&url))
            .json(edit)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
