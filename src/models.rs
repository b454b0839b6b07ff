//! Domain models: the résumé document and the artifacts the workflow
//! derives from it.
//!
//! [`ExperienceData`] is the full résumé shape as loaded from disk;
//! [`SkillGap`] and friends describe the gap analysis the workflow
//! consumes; [`GapResponse`], [`AchievementDiscovery`] and
//! [`JobDeepDiveResult`] are produced as the session progresses. All of
//! it serializes to JSON, so session checkpoints carry the complete
//! picture.

use serde::{Deserialize, Serialize};

/// One job entry on the résumé.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub date: String,
    pub bullets: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub date: String,
    pub school: String,
    pub location: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    pub languages: Vec<String>,
    pub tools: Vec<String>,
    pub spoken: Vec<String>,
}

/// Award years appear as either a bare number or free text in source
/// documents; both forms round-trip unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AwardYear {
    Year(u16),
    Text(String),
}

impl Default for AwardYear {
    fn default() -> Self {
        AwardYear::Text(String::new())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardEntry {
    pub title: String,
    pub award: String,
    pub year: AwardYear,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationEntry {
    pub id: String,
    pub title: String,
    pub authors: String,
    pub conference: String,
}

/// The complete résumé document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceData {
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Skills,
    #[serde(default)]
    pub awards: Vec<AwardEntry>,
    #[serde(default)]
    pub publications: Vec<PublicationEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Technical,
    Soft,
    Certification,
    Education,
}

impl std::fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkillCategory::Technical => "technical",
            SkillCategory::Soft => "soft",
            SkillCategory::Certification => "certification",
            SkillCategory::Education => "education",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillImportance {
    Required,
    Preferred,
}

impl std::fmt::Display for SkillImportance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkillImportance::Required => "required",
            SkillImportance::Preferred => "preferred",
        };
        f.write_str(text)
    }
}

/// A skill the job posting asks for that the résumé does not show.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub category: SkillCategory,
    pub importance: SkillImportance,
    /// Why this gap matters for the specific role.
    pub context: String,
}

/// The human's verdict on one skill gap. Created once per gap, never
/// mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapResponse {
    pub gap: SkillGap,
    pub has_experience: bool,
    #[serde(default)]
    pub details: String,
    /// Indices into `ExperienceData::experience` the details apply to.
    #[serde(default)]
    pub relevant_jobs: Vec<usize>,
}

/// An achievement restated in XYZ form: accomplished X, measured by Y,
/// by doing Z.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDiscovery {
    #[serde(default)]
    pub original_bullet_index: Option<usize>,
    pub x_accomplished: String,
    pub y_measured_by: String,
    pub z_by_doing: String,
    /// What the human actually said, kept for the refinement review.
    pub raw_user_input: String,
}

/// Everything the deep dive uncovered about one job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDeepDiveResult {
    pub job_index: usize,
    pub original_entry: ExperienceEntry,
    #[serde(default)]
    pub achievements: Vec<AchievementDiscovery>,
    /// Refined bullets approved during humanization; filled in after
    /// the deep dive completes.
    #[serde(default)]
    pub enhanced_bullets: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn experience_data_round_trips_with_optional_sections() {
        let json = json!({
            "summary": "Engineer with a decade of shipping",
            "experience": [{
                "title": "Engineer",
                "company": "Acme",
                "date": "2020-2023",
                "bullets": ["Built things"],
            }],
            "education": [],
            "skills": {"languages": ["English"], "tools": ["Git"], "spoken": []},
        });
        let data: ExperienceData = serde_json::from_value(json).unwrap();
        assert!(data.awards.is_empty());
        assert!(data.publications.is_empty());

        let back = serde_json::to_value(&data).unwrap();
        let again: ExperienceData = serde_json::from_value(back).unwrap();
        assert_eq!(again, data);
    }

    #[test]
    fn award_year_accepts_number_or_text() {
        let numeric: AwardEntry = serde_json::from_value(json!({
            "title": "Best Paper",
            "award": "ACM",
            "year": 2021,
        }))
        .unwrap();
        assert_eq!(numeric.year, AwardYear::Year(2021));

        let textual: AwardEntry = serde_json::from_value(json!({
            "title": "Best Paper",
            "award": "ACM",
            "year": "2021 (runner-up)",
        }))
        .unwrap();
        assert_eq!(textual.year, AwardYear::Text("2021 (runner-up)".to_string()));
    }

    #[test]
    fn skill_enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_value(SkillCategory::Technical).unwrap(),
            json!("technical")
        );
        assert_eq!(
            serde_json::to_value(SkillImportance::Preferred).unwrap(),
            json!("preferred")
        );
    }

    #[test]
    fn gap_response_defaults_details_and_jobs() {
        let response: GapResponse = serde_json::from_value(json!({
            "gap": {
                "skill": "Kafka",
                "category": "technical",
                "importance": "required",
                "context": "Event streaming backbone",
            },
            "has_experience": false,
        }))
        .unwrap();
        assert_eq!(response.details, "");
        assert!(response.relevant_jobs.is_empty());
    }
}
