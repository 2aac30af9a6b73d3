//! Session orchestration.
//!
//! Runs the full pipeline for one question — profile, synthesis, execution,
//! normalization — and folds every failure into a single `Outcome`. Nothing
//! raised by a stage escapes past here; the interactive loop only ever sees
//! an Outcome per question.

use std::sync::Arc;

use tracing::{debug, info};

use crate::frame::Frame;
use crate::llm::{LlmClient, SamplingOptions};
use crate::normalize::{normalize, ResultTable};
use crate::profile::{build_profile, NO_DATA};
use crate::query::execute;
use crate::synth::Synthesizer;

/// Stage at which a question failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// No dataset is loaded; the model was never called.
    Profile,
    /// The model service call failed.
    Synthesis,
    /// The generated program failed to parse or run, or produced no result.
    Execution,
}

impl Stage {
    /// Returns the stage tag used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "profile-unavailable",
            Self::Synthesis => "synthesis-failed",
            Self::Execution => "execution-failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The tagged result of one question.
///
/// A zero-row table is a valid answer, not a failure.
#[derive(Debug)]
pub enum Outcome {
    /// The question was answered.
    Answer {
        /// The normalized result.
        result: ResultTable,
        /// The cleaned program that produced it.
        program: String,
    },
    /// The pipeline stopped at a stage.
    Failure {
        /// Where it stopped.
        stage: Stage,
        /// The underlying cause, for display.
        reason: String,
    },
}

impl Outcome {
    fn failure(stage: Stage, reason: impl Into<String>) -> Self {
        Self::Failure {
            stage,
            reason: reason.into(),
        }
    }
}

/// One interactive session over a single dataset.
///
/// The dataset sits behind an `Arc` so the synthesizer and executor see the
/// same object for the session's lifetime; per-question execution scopes
/// work on derived copies and never write back.
pub struct Session {
    dataset: Option<Arc<Frame>>,
    synthesizer: Synthesizer,
}

impl Session {
    /// Creates a session over the dataset and LLM client.
    pub fn new(
        dataset: Option<Arc<Frame>>,
        client: Box<dyn LlmClient>,
        options: SamplingOptions,
    ) -> Self {
        Self {
            dataset,
            synthesizer: Synthesizer::new(client, options),
        }
    }

    /// Returns the dataset, if one is loaded.
    pub fn dataset(&self) -> Option<&Frame> {
        self.dataset.as_deref()
    }

    /// Answers one question, short-circuiting on the first failed stage.
    pub async fn ask(&self, question: &str) -> Outcome {
        // Rebuilt per question; pure and cheap.
        let profile = build_profile(self.dataset.as_deref());
        let dataset = match self.dataset.as_deref() {
            Some(dataset) if profile != NO_DATA => dataset,
            _ => {
                return Outcome::failure(Stage::Profile, "No data loaded. Check the input file.")
            }
        };

        info!(question, "Processing question");

        let program = match self.synthesizer.synthesize(&profile, question).await {
            Ok(program) => program,
            Err(e) => {
                return Outcome::failure(
                    Stage::Synthesis,
                    format!("{e}. Make sure Ollama is running: ollama serve"),
                );
            }
        };
        debug!(program, "Generated program");

        let value = match execute(dataset, &program) {
            Ok(value) => value,
            Err(e) => return Outcome::failure(Stage::Execution, e.to_string()),
        };

        match normalize(value) {
            Ok(result) => {
                info!(rows = result.rows, "Question answered");
                Outcome::Answer { result, program }
            }
            Err(e) => Outcome::failure(Stage::Execution, e.to_string()),
        }
    }
}
