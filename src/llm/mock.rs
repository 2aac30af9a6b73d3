//! Mock LLM client for testing.
//!
//! Returns canned query programs based on input patterns, and can simulate
//! an unreachable service for failure-path tests. Also selectable at the CLI
//! via `--llm mock` for offline demos.

use async_trait::async_trait;

use crate::error::{ChatError, Result};
use crate::llm::types::{Message, SamplingOptions};
use crate::llm::LlmClient;

/// Mock LLM client that returns canned responses based on input patterns.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    /// When set, every call fails with this message.
    fail_with: Option<String>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the input contains `pattern`, the mock returns `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Makes every completion fail, simulating an unreachable service.
    pub fn failing(msg: impl Into<String>) -> Self {
        Self {
            custom_responses: Vec::new(),
            fail_with: Some(msg.into()),
        }
    }

    /// Generates a mock response based on the input.
    fn mock_response(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();

        // Check custom responses first
        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        // Default pattern matching
        if input_lower.contains("total") && input_lower.contains("department") {
            return r#"result = df.groupby("Department").sum("Net Amount")"#.to_string();
        }

        if input_lower.contains("how many") || input_lower.contains("count") {
            return "result = df.count()".to_string();
        }

        if input_lower.contains("first") || input_lower.contains("show me") {
            return "result = df.head(5)".to_string();
        }

        "result = df.head(3)".to_string()
    }

    /// Extracts the text to pattern-match from a message list.
    ///
    /// Full prompts embed the dataset profile, whose boilerplate would
    /// trip the default patterns, so when a `User Question:` line is
    /// present only that line is matched.
    fn extract_user_input(messages: &[Message]) -> String {
        let content = messages
            .iter()
            .rev()
            .find(|m| m.role == crate::llm::types::Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        content
            .lines()
            .find_map(|line| line.strip_prefix("User Question:"))
            .map(|q| q.trim().to_string())
            .unwrap_or(content)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message], _options: SamplingOptions) -> Result<String> {
        if let Some(msg) = &self.fail_with {
            return Err(ChatError::llm(msg.clone()));
        }
        let input = Self::extract_user_input(messages);
        Ok(self.mock_response(&input))
    }
}
