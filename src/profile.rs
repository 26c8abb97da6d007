use crate::error::WorkflowError;
use crate::prompts::strip_code_blocks;
use serde::{Deserialize, Serialize};

/// Structured candidate profile as returned by the extraction instruction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Profile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EducationEntry {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub year: String,
}

impl Profile {
    pub fn from_json(raw: &str) -> Result<Self, WorkflowError> {
        let clean = strip_code_blocks(raw);
        serde_json::from_str(&clean)
            .map_err(|e| WorkflowError::Parse(format!("profile JSON did not parse: {}", e)))
    }
}

/// Profile as held by the workflow: the raw model text verbatim, plus a
/// best-effort structured parse. A failed parse is non-fatal; the raw text is
/// what gets displayed instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileData {
    pub raw_text: String,
    pub structured: Option<Profile>,
}

impl ProfileData {
    pub fn from_response(raw: &str) -> Self {
        let structured = match Profile::from_json(raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                log::debug!("falling back to raw profile text: {}", e);
                None
            }
        };
        Self {
            raw_text: raw.to_string(),
            structured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_json_populates_structured_profile() {
        let raw = r#"{"skills":["Python"],"experience":[],"education":[]}"#;
        let data = ProfileData::from_response(raw);
        assert_eq!(data.raw_text, raw);
        let profile = data.structured.expect("should parse");
        assert_eq!(profile.skills, vec!["Python"]);
        assert!(profile.experience.is_empty());
        assert!(profile.education.is_empty());
    }

    #[test]
    fn test_fenced_json_is_unwrapped() {
        let raw = "```json\n{\"skills\":[\"Rust\"]}\n```";
        let data = ProfileData::from_response(raw);
        let profile = data.structured.expect("should parse");
        assert_eq!(profile.skills, vec!["Rust"]);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let profile = Profile::from_json(r#"{"skills":["Go"]}"#).unwrap();
        assert!(profile.experience.is_empty());
        assert!(profile.education.is_empty());
    }

    #[test]
    fn test_full_entries_round_through() {
        let raw = r#"{
            "skills": ["Rust", "SQL"],
            "experience": [
                {"title": "Engineer", "company": "Acme", "duration": "2019-2023", "description": "Backend work"}
            ],
            "education": [
                {"degree": "BSc CS", "institution": "MIT", "year": "2019"}
            ]
        }"#;
        let profile = Profile::from_json(raw).unwrap();
        assert_eq!(profile.experience[0].company, "Acme");
        assert_eq!(profile.education[0].year, "2019");
    }

    #[test]
    fn test_malformed_json_keeps_raw_text_only() {
        let raw = "The candidate knows Python and has 5 years of experience.";
        let data = ProfileData::from_response(raw);
        assert_eq!(data.raw_text, raw);
        assert!(data.structured.is_none());
    }

    #[test]
    fn test_parse_error_variant() {
        let err = Profile::from_json("not json").unwrap_err();
        assert!(matches!(err, WorkflowError::Parse(_)));
    }
}
