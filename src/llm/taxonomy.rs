use crate::error::{AppError, Result};

/// The fixed set of labels a classification may produce.
///
/// Every label carries the same prefix (`M::` by default); the model is shown
/// names without it and its answers are re-prefixed before validation.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    prefix: String,
    labels: Vec<String>,
}

impl Taxonomy {
    /// Keep the labels that carry `prefix`. An empty result is an error since
    /// no answer could ever validate.
    pub fn new(prefix: &str, labels: Vec<String>) -> Result<Self> {
        let mut labels: Vec<String> = labels
            .into_iter()
            .filter(|l| l.starts_with(prefix) && l.len() > prefix.len())
            .collect();
        labels.sort();
        labels.dedup();

        if labels.is_empty() {
            return Err(AppError::Config(format!(
                "project has no labels with prefix {prefix:?}"
            )));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            labels,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Label names as shown to the model.
    pub fn display_names(&self) -> Vec<&str> {
        self.labels
            .iter()
            .map(|l| l.strip_prefix(self.prefix.as_str()).unwrap_or(l))
            .collect()
    }

    /// Turn a raw model answer into a candidate label.
    pub fn normalize(&self, answer: &str) -> String {
        let answer = answer.trim().trim_matches(|c: char| c == '`' || c == '"' || c == '\'');
        let answer = answer.trim();
        if answer.starts_with(self.prefix.as_str()) {
            answer.to_string()
        } else {
            format!("{}{answer}", self.prefix)
        }
    }
}
