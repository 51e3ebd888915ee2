use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on questions per generated interview
pub const MAX_QUESTIONS: u32 = 20;

/// Minimum length of the free-text fields
const MIN_FIELD_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Technical,
    Behavioural,
    Mixed,
}

/// Request to generate a new interview, as submitted by the interview form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateInterviewRequest {
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    pub role: String,
    pub level: String,
    /// Comma-separated technologies
    pub techstack: String,
    /// Number of questions, as entered
    pub amount: String,
    pub userid: String,
}

impl GenerateInterviewRequest {
    /// Check the form constraints. Returns the number of questions requested.
    pub fn validate(&self) -> Result<u32> {
        for (field, value) in [
            ("role", &self.role),
            ("level", &self.level),
            ("techstack", &self.techstack),
        ] {
            if value.trim().chars().count() < MIN_FIELD_CHARS {
                bail!("{} must be at least {} characters", field, MIN_FIELD_CHARS);
            }
        }

        if self.userid.trim().is_empty() {
            bail!("userid is required");
        }

        let amount: u32 = self
            .amount
            .trim()
            .parse()
            .with_context(|| format!("amount must be a number, got {:?}", self.amount))?;

        if !(1..=MAX_QUESTIONS).contains(&amount) {
            bail!("amount must be between 1 and {}", MAX_QUESTIONS);
        }

        Ok(amount)
    }

    /// Tech stack split into trimmed, non-empty entries
    pub fn techstack_list(&self) -> Vec<String> {
        self.techstack
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInterviewResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_id: Option<String>,
}

impl GenerateInterviewResponse {
    pub fn created(interview_id: impl Into<String>) -> Self {
        Self {
            success: true,
            interview_id: Some(interview_id.into()),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            interview_id: None,
        }
    }
}
