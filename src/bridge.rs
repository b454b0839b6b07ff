//! Interaction bridges: where suspend requests meet an actual human.
//!
//! The engine is interface-agnostic; anything that can answer a
//! [`SuspendRequest`] implements [`Interaction`]. [`ConsoleBridge`]
//! answers over stdin/stdout, and [`drive`] runs a whole session
//! through a bridge, printing phase banners and job context the way an
//! interview-style console session reads.

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

use crate::interact::{HumanAnswer, SuspendRequest, parse_job_indices};
use crate::models::{ExperienceData, SkillGap};
use crate::runtimes::{RunOutcome, Runner, RunnerError};
use crate::state::Phase;

#[derive(Debug, Error, Diagnostic)]
pub enum BridgeError {
    #[error("console I/O failed: {0}")]
    #[diagnostic(code(burnish::bridge::io))]
    Io(#[from] std::io::Error),

    #[error("input stream closed")]
    #[diagnostic(
        code(burnish::bridge::closed),
        help("stdin reached end of file; the session remains suspended and can be resumed")
    )]
    Closed,
}

/// Answers suspend requests on behalf of a human.
#[async_trait]
pub trait Interaction: Send {
    /// Present the request and collect an answer.
    async fn ask(&mut self, request: &SuspendRequest) -> Result<HumanAnswer, BridgeError>;

    /// Display a contextual line (phase banners, job headers). Bridges
    /// without a display surface can ignore it.
    async fn banner(&mut self, _text: &str) -> Result<(), BridgeError> {
        Ok(())
    }
}

/// Line-oriented console bridge over stdin/stdout.
///
/// Input is coerced, never rejected: a confirmation accepts `y`/`yes`
/// case-insensitively and treats anything else as the default, and an
/// out-of-range selection falls back to the first option.
pub struct ConsoleBridge {
    lines: Lines<BufReader<Stdin>>,
    stdout: Stdout,
}

impl ConsoleBridge {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            stdout: tokio::io::stdout(),
        }
    }

    async fn print(&mut self, text: &str) -> Result<(), BridgeError> {
        self.stdout.write_all(text.as_bytes()).await?;
        self.stdout.write_all(b"\n").await?;
        self.stdout.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, BridgeError> {
        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(BridgeError::Closed),
        }
    }

    async fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, BridgeError> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        self.print(&format!("{prompt} {hint}")).await?;
        let line = self.read_line().await?;
        Ok(coerce_confirm(&line, default))
    }

    async fn select(&mut self, prompt: &str, options: &[String]) -> Result<String, BridgeError> {
        self.print(prompt).await?;
        for (i, option) in options.iter().enumerate() {
            self.print(&format!("  {}. {option}", i + 1)).await?;
        }
        self.print("Choice: ").await?;
        let line = self.read_line().await?;
        Ok(coerce_selection(&line, options))
    }
}

/// `y`/`yes` and `n`/`no`, case-insensitive; anything else is the default.
fn coerce_confirm(line: &str, default: bool) -> bool {
    match line.to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}

/// Resolve a 1-based menu entry. Out-of-range or non-numeric input falls
/// back to the first option.
fn coerce_selection(line: &str, options: &[String]) -> String {
    line.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| options.get(idx))
        .or_else(|| options.first())
        .cloned()
        .unwrap_or_default()
}

impl Default for ConsoleBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interaction for ConsoleBridge {
    async fn ask(&mut self, request: &SuspendRequest) -> Result<HumanAnswer, BridgeError> {
        match request {
            SuspendRequest::Confirm {
                prompt, default, ..
            } => {
                let value = self.confirm(prompt, *default).await?;
                Ok(HumanAnswer::confirmed(value))
            }
            SuspendRequest::Select {
                prompt, options, ..
            } => {
                let value = self.select(prompt, options).await?;
                Ok(HumanAnswer::choice(value))
            }
            SuspendRequest::TextInput {
                prompt,
                job_options: Some(job_options),
                ..
            } => {
                self.print(prompt).await?;
                let details = self.read_line().await?;

                self.print("\nWhich jobs involved this skill? (Enter comma-separated numbers)")
                    .await?;
                for option in job_options {
                    self.print(&format!("  {option}")).await?;
                }
                self.print("Job numbers (e.g., 0,2): ").await?;
                let job_input = self.read_line().await?;
                Ok(HumanAnswer::TextWithJobs {
                    details,
                    relevant_jobs: parse_job_indices(&job_input),
                })
            }
            SuspendRequest::TextInput { prompt, .. } => {
                self.print(prompt).await?;
                Ok(HumanAnswer::text(self.read_line().await?))
            }
        }
    }

    async fn banner(&mut self, text: &str) -> Result<(), BridgeError> {
        self.print(text).await
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum DriveError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Bridge(#[from] BridgeError),
}

/// Run one session end to end through a bridge.
///
/// Starts the session, answers every suspension via the bridge, and
/// returns the improved resume data. Phase banners and job context are
/// printed on transitions, matching an interview-style console flow.
pub async fn drive(
    runner: &mut Runner,
    bridge: &mut dyn Interaction,
    session_id: &str,
    experience_data: ExperienceData,
    skill_gaps: Vec<SkillGap>,
) -> Result<ExperienceData, DriveError> {
    let fallback = experience_data.clone();
    bridge
        .banner("\n=== Interactive Resume Improvement ===\n")
        .await?;
    bridge
        .banner("I'll help you improve your resume by exploring skill gaps and uncovering achievements.\n")
        .await?;

    let mut last_phase = Phase::Init;
    let mut outcome = runner.start(session_id, experience_data, skill_gaps).await?;

    loop {
        if let Some(session) = runner.session(session_id) {
            let phase = session.state.phase;
            if phase != last_phase {
                match phase {
                    Phase::GapExploration => {
                        bridge
                            .banner("--- Phase 1: Skill Gap Exploration ---\n")
                            .await?;
                    }
                    Phase::JobDeepDive => {
                        bridge
                            .banner("\n--- Phase 2: Job Experience Deep-Dive ---\n")
                            .await?;
                    }
                    Phase::Humanization => {
                        bridge.banner("\n--- Phase 3: Bullet Refinement ---\n").await?;
                    }
                    Phase::Init | Phase::Completed => {}
                }
                last_phase = phase;
            }
        }

        match outcome {
            RunOutcome::Completed(state) => {
                return Ok(state.final_experience_data.unwrap_or(fallback));
            }
            RunOutcome::Suspended(ref request) => {
                print_request_context(bridge, request).await?;
                let answer = bridge.ask(request).await?;
                outcome = runner.resume(session_id, answer).await?;
            }
        }
    }
}

/// Print job context ahead of a request, mirroring what an interviewer
/// would recap before a question.
async fn print_request_context(
    bridge: &mut dyn Interaction,
    request: &SuspendRequest,
) -> Result<(), BridgeError> {
    let context = request.context();
    match request {
        // First question of a job's deep dive: recap the job.
        SuspendRequest::TextInput { .. } if context.question_index == Some(0) => {
            if let Some(header) = &context.job_header {
                bridge.banner(&format!("\n>> {header}")).await?;
                bridge.banner("Current bullets:").await?;
                for (i, bullet) in context.bullets.iter().enumerate() {
                    bridge.banner(&format!("  {i}. {bullet}")).await?;
                }
            }
        }
        // Bullet review: name the job being refined.
        SuspendRequest::Select { .. } => {
            if let Some(header) = &context.job_header {
                bridge
                    .banner(&format!("\n>> Refining bullets for: {header}"))
                    .await?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_accepts_yes_and_no_case_insensitively() {
        assert!(coerce_confirm("y", false));
        assert!(coerce_confirm("YES", false));
        assert!(!coerce_confirm("n", true));
        assert!(!coerce_confirm("No", true));
    }

    #[test]
    fn confirm_falls_back_to_the_default() {
        assert!(coerce_confirm("", true));
        assert!(!coerce_confirm("", false));
        assert!(!coerce_confirm("maybe", false));
        assert!(coerce_confirm("ok", true));
    }

    #[test]
    fn selection_resolves_one_based_entries() {
        let options = vec!["first".to_string(), "second".to_string()];
        assert_eq!(coerce_selection("1", &options), "first");
        assert_eq!(coerce_selection("2", &options), "second");
    }

    #[test]
    fn selection_coerces_bad_input_to_the_first_option() {
        let options = vec!["first".to_string(), "second".to_string()];
        assert_eq!(coerce_selection("0", &options), "first");
        assert_eq!(coerce_selection("9", &options), "first");
        assert_eq!(coerce_selection("nope", &options), "first");
        assert_eq!(coerce_selection("", &options), "first");
        assert_eq!(coerce_selection("1", &[]), "");
    }
}
