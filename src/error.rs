use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Chat completion API error: {0}")]
    LlmApi(String),

    #[error("Chat completion input too long: {0}")]
    LlmContextLength(String),

    #[error("Issue #{iid}: no valid label after {corrections} corrections (last answer: {last_answer:?})")]
    ClassificationExhausted {
        iid: u64,
        corrections: u32,
        last_answer: String,
    },

    #[error("Giving up after {attempts} attempts ({updated} issues updated)")]
    RetriesExhausted {
        attempts: u32,
        updated: usize,
        #[source]
        source: Box<AppError>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_chain_names_cause_once() {
        let err = AppError::RetriesExhausted {
            attempts: 6,
            updated: 2,
            source: Box::new(AppError::GitLabApi("502 Bad Gateway".to_string())),
        };

        let rendered = format!("{:#}", anyhow::Error::new(err));

        assert_eq!(rendered.matches("502 Bad Gateway").count(), 1);
        assert!(rendered.starts_with("Giving up after 6 attempts (2 issues updated)"));
    }
}
