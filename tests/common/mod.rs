//! Shared fixtures for the integration suites: a small résumé, a gap
//! analysis, and a scripted generator.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use burnish::generate::{GenerateError, Generator};
use burnish::models::{
    ExperienceData, ExperienceEntry, SkillCategory, SkillGap, SkillImportance, Skills,
};
use serde_json::{Value, json};

pub fn sample_resume() -> ExperienceData {
    ExperienceData {
        summary: "Backend engineer with seven years of shipping data-heavy services".to_string(),
        experience: vec![
            ExperienceEntry {
                title: "Senior Engineer".to_string(),
                company: "Acme Analytics".to_string(),
                date: "2021-2024".to_string(),
                bullets: vec![
                    "Maintained the ingestion pipeline".to_string(),
                    "Reviewed code and mentored juniors".to_string(),
                ],
            },
            ExperienceEntry {
                title: "Engineer".to_string(),
                company: "Initech".to_string(),
                date: "2017-2021".to_string(),
                bullets: vec!["Built internal reporting tools".to_string()],
            },
        ],
        education: vec![],
        skills: Skills {
            languages: vec!["English".to_string()],
            tools: vec!["Postgres".to_string(), "Kafka".to_string()],
            spoken: vec![],
        },
        awards: vec![],
        publications: vec![],
    }
}

pub fn sample_gaps() -> Vec<SkillGap> {
    vec![
        SkillGap {
            skill: "Kubernetes".to_string(),
            category: SkillCategory::Technical,
            importance: SkillImportance::Required,
            context: "The role deploys everything onto a managed cluster".to_string(),
        },
        SkillGap {
            skill: "Public speaking".to_string(),
            category: SkillCategory::Soft,
            importance: SkillImportance::Preferred,
            context: "Engineers present at the quarterly review".to_string(),
        },
    ]
}

/// Scripted generator that recognizes each prompt by the JSON shape it
/// asks for, and counts calls per shape.
#[derive(Default)]
pub struct MockGenerator {
    pub gap_questions: AtomicUsize,
    pub question_lists: AtomicUsize,
    pub xyz_rewrites: AtomicUsize,
    pub revisions: AtomicUsize,
}

impl MockGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<Value, GenerateError> {
        // Check "questions" before "question": the former contains the
        // latter as a substring.
        if prompt.contains("\"questions\"") {
            let n = self.question_lists.fetch_add(1, Ordering::SeqCst);
            Ok(json!({
                "questions": [format!("What outcome from this role are you proudest of? ({n})")],
            }))
        } else if prompt.contains("\"question\"") {
            let n = self.gap_questions.fetch_add(1, Ordering::SeqCst);
            Ok(json!({
                "question": format!("Have you used this anywhere, even informally? ({n})"),
            }))
        } else if prompt.contains("\"x_accomplished\"") {
            let n = self.xyz_rewrites.fetch_add(1, Ordering::SeqCst);
            Ok(json!({
                "x_accomplished": format!("Delivered improvement {n}"),
                "y_measured_by": "a 40% gain",
                "z_by_doing": "reworking the pipeline",
            }))
        } else if prompt.contains("\"changes_made\"") {
            let n = self.revisions.fetch_add(1, Ordering::SeqCst);
            Ok(json!({
                "bullet": format!("Punchier bullet {n}"),
                "changes_made": "tightened the wording",
            }))
        } else {
            Err(GenerateError::InvalidOutput {
                message: format!("unrecognized prompt: {prompt}"),
            })
        }
    }
}
