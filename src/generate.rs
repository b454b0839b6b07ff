//! Structured generation boundary.
//!
//! The workflow leans on a language model for four jobs: asking a gap
//! question, drafting deep-dive questions, converting an answer into an
//! X-Y-Z bullet, and refining a bullet from feedback. All four go through
//! the [`Generator`] trait, which returns raw JSON; [`generate_structured`]
//! layers typed decoding on top. Tests substitute a scripted generator,
//! so nothing in the engine knows which model (if any) is behind it.

use async_trait::async_trait;
use miette::Diagnostic;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failures at the generation boundary.
#[derive(Debug, Error, Diagnostic)]
pub enum GenerateError {
    #[error("generation transport failed: {message}")]
    #[diagnostic(
        code(burnish::generate::transport),
        help("check connectivity and credentials for the configured model backend")
    )]
    Transport { message: String },

    #[error("model output did not match the expected shape: {message}")]
    #[diagnostic(
        code(burnish::generate::invalid_output),
        help("the model returned JSON that failed to decode; the raw output is in `message`")
    )]
    InvalidOutput { message: String },

    #[error("model declined to produce output: {message}")]
    #[diagnostic(code(burnish::generate::refused))]
    Refused { message: String },
}

/// Produces structured JSON for a prompt. Implementations own prompt
/// transport, retries, and model selection.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Value, GenerateError>;
}

/// Run `prompt` through the generator and decode the JSON into `T`.
pub async fn generate_structured<T: DeserializeOwned>(
    generator: &dyn Generator,
    prompt: &str,
) -> Result<T, GenerateError> {
    let value = generator.generate(prompt).await?;
    serde_json::from_value(value).map_err(|err| GenerateError::InvalidOutput {
        message: err.to_string(),
    })
}

/// One conversational question about a skill gap.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GapQuestion {
    pub question: String,
}

/// The question list opening a job deep dive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeepDiveQuestions {
    pub questions: Vec<String>,
}

/// An achievement restated in X-Y-Z form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct XyzRewrite {
    pub x_accomplished: String,
    pub y_measured_by: String,
    pub z_by_doing: String,
    /// The model's own one-line rendering; the workflow composes its
    /// bullets from the three parts instead.
    #[serde(default)]
    pub bullet: String,
}

/// A bullet revised from human edit feedback.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BulletRevision {
    pub bullet: String,
    #[serde(default)]
    pub changes_made: String,
}
