//! Query synthesis: question + profile in, candidate program out.
//!
//! One stateless round trip to the model per question, followed by the
//! mandatory cleanup pass. Model-call failures are caught here and surfaced
//! as LLM errors; they never unwind further.

use std::time::Instant;

use tracing::debug;

use crate::error::{ChatError, Result};
use crate::llm::{clean_program, prompt::build_query_prompt, LlmClient, Message, SamplingOptions};

/// Turns questions into candidate query programs via the LLM.
pub struct Synthesizer {
    client: Box<dyn LlmClient>,
    options: SamplingOptions,
}

impl Synthesizer {
    /// Creates a synthesizer over the given client.
    pub fn new(client: Box<dyn LlmClient>, options: SamplingOptions) -> Self {
        Self { client, options }
    }

    /// Generates and cleans a candidate program for the question.
    ///
    /// The profile is embedded in full on every call; the model keeps no
    /// state between questions.
    pub async fn synthesize(&self, profile: &str, question: &str) -> Result<String> {
        let prompt = build_query_prompt(profile, question);
        let messages = [Message::user(prompt)];

        let start = Instant::now();
        let raw = self.client.complete(&messages, self.options).await?;
        debug!(
            llm_duration_ms = start.elapsed().as_millis(),
            response_len = raw.len(),
            "Received model reply"
        );

        let program = clean_program(&raw);
        if program.is_empty() {
            return Err(ChatError::llm("Model returned an empty program"));
        }

        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    #[tokio::test]
    async fn test_synthesize_returns_cleaned_program() {
        let client = MockLlmClient::new()
            .with_response("by department", "```python\nresult = df.groupby(\"Department\").sum(\"Net Amount\")\n```");
        let synth = Synthesizer::new(Box::new(client), SamplingOptions::default());

        let program = synth
            .synthesize("Total Rows: 3", "Total by department?")
            .await
            .unwrap();

        assert_eq!(
            program,
            r#"result = df.groupby("Department").sum("Net Amount")"#
        );
    }

    #[tokio::test]
    async fn test_service_failure_surfaces_as_llm_error() {
        let client = MockLlmClient::failing("Failed to connect to Ollama. Is it running? Try: ollama serve");
        let synth = Synthesizer::new(Box::new(client), SamplingOptions::default());

        let err = synth.synthesize("profile", "question").await.unwrap_err();

        assert_eq!(err.category(), "LLM Error");
        assert!(err.to_string().contains("ollama serve"));
    }

    #[tokio::test]
    async fn test_empty_reply_is_llm_error() {
        let client = MockLlmClient::new().with_response("blank", "``````");
        let synth = Synthesizer::new(Box::new(client), SamplingOptions::default());

        let err = synth.synthesize("profile", "blank?").await.unwrap_err();
        assert!(err.to_string().contains("empty program"));
    }
}
