use crate::error::{AppError, Result};
use crate::llm::client::{ChatClient, Message};
use crate::llm::prompt;
use crate::llm::taxonomy::Taxonomy;
use crate::platform::types::Issue;

/// Picks one taxonomy label for an issue using a chat-completion model.
pub struct Classifier {
    client: ChatClient,
    taxonomy: Taxonomy,
    max_corrections: u32,
}

impl Classifier {
    pub fn new(client: ChatClient, taxonomy: Taxonomy, max_corrections: u32) -> Self {
        Self {
            client,
            taxonomy,
            max_corrections,
        }
    }

    /// Classify an issue.
    ///
    /// If the title plus description is too long for the model, the issue is
    /// classified once more from its title alone.
    pub async fn classify(&self, issue: &Issue) -> Result<String> {
        match self.classify_with(issue, true).await {
            Err(AppError::LlmContextLength(msg)) if !issue.description.is_empty() => {
                tracing::warn!(
                    iid = issue.iid,
                    error = %msg,
                    "Description too long, retrying with title only"
                );
                self.classify_with(issue, false).await
            }
            other => other,
        }
    }

    async fn classify_with(&self, issue: &Issue, include_description: bool) -> Result<String> {
        let mut messages = prompt::conversation(&self.taxonomy, issue, include_description);
        let mut corrections = 0u32;

        loop {
            let answer = self.client.complete(&messages).await?;
            let label = self.taxonomy.normalize(&answer);

            if self.taxonomy.contains(&label) {
                tracing::debug!(iid = issue.iid, label = %label, corrections, "Issue classified");
                return Ok(label);
            }

            if corrections >= self.max_corrections {
                return Err(AppError::ClassificationExhausted {
                    iid: issue.iid,
                    corrections,
                    last_answer: answer,
                });
            }

            corrections += 1;
            tracing::warn!(
                iid = issue.iid,
                answer = %answer.trim(),
                correction = corrections,
                "Model answered outside the taxonomy, asking again"
            );

            messages.push(Message::assistant(answer));
            messages.push(Message::user(prompt::correction_message()));
        }
    }
}
