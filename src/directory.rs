//! Users, interviews and existing feedback records
//!
//! The directory answers the lookups a session needs before it can be
//! created: who the caller is, which questions the interview asks, and
//! whether a feedback record already exists for this interview. It also
//! backs the landing page lists and the feedback detail view.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    pub id: String,
    pub user_id: String,
    pub role: String,
    /// technical, behavioural or mixed
    #[serde(rename = "type")]
    pub interview_type: String,
    pub level: String,
    #[serde(default)]
    pub techstack: Vec<String>,
    pub questions: Vec<String>,
    /// Only finalized interviews are offered to other users
    #[serde(default = "default_finalized")]
    pub finalized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_finalized() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: String,
    pub score: u32,
    pub comment: String,
}

/// Evaluation stored by the feedback generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub interview_id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_score: Option<u32>,
    #[serde(default)]
    pub category_scores: Vec<CategoryScore>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_assessment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[async_trait::async_trait]
pub trait Directory: Send + Sync {
    async fn user(&self, user_id: &str) -> Result<Option<User>>;

    async fn interview(&self, interview_id: &str) -> Result<Option<Interview>>;

    /// Interviews created by a user, newest first
    async fn interviews_by_user(&self, user_id: &str) -> Result<Vec<Interview>>;

    /// Newest finalized interviews created by anyone but `exclude_user`
    async fn latest_interviews(&self, exclude_user: &str, limit: usize) -> Result<Vec<Interview>>;

    /// Latest feedback stored for this interview and user
    async fn feedback_for(&self, interview_id: &str, user_id: &str) -> Result<Option<FeedbackRecord>>;

    /// Id of the feedback already stored for this interview and user
    async fn feedback_id(&self, interview_id: &str, user_id: &str) -> Result<Option<String>> {
        Ok(self
            .feedback_for(interview_id, user_id)
            .await?
            .map(|record| record.id))
    }
}

/// On-disk shape of a directory seed file
#[derive(Debug, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub interviews: Vec<Interview>,
    #[serde(default)]
    pub feedback: Vec<FeedbackRecord>,
}

#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<String, User>>,
    interviews: RwLock<HashMap<String, Interview>>,
    feedback: RwLock<Vec<FeedbackRecord>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        Self {
            users: RwLock::new(seed.users.into_iter().map(|u| (u.id.clone(), u)).collect()),
            interviews: RwLock::new(
                seed.interviews
                    .into_iter()
                    .map(|i| (i.id.clone(), i))
                    .collect(),
            ),
            feedback: RwLock::new(seed.feedback),
        }
    }

    /// Load a JSON seed file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read directory seed {}", path.display()))?;
        let seed: DirectorySeed = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid directory seed {}", path.display()))?;

        info!(
            "Loaded directory: {} users, {} interviews, {} feedback records",
            seed.users.len(),
            seed.interviews.len(),
            seed.feedback.len()
        );

        Ok(Self::from_seed(seed))
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn insert_interview(&self, interview: Interview) {
        self.interviews
            .write()
            .await
            .insert(interview.id.clone(), interview);
    }

    pub async fn insert_feedback(&self, record: FeedbackRecord) {
        self.feedback.write().await.push(record);
    }
}

#[async_trait::async_trait]
impl Directory for InMemoryDirectory {
    async fn user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn interview(&self, interview_id: &str) -> Result<Option<Interview>> {
        Ok(self.interviews.read().await.get(interview_id).cloned())
    }

    async fn interviews_by_user(&self, user_id: &str) -> Result<Vec<Interview>> {
        let mut interviews: Vec<Interview> = self
            .interviews
            .read()
            .await
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut interviews);
        Ok(interviews)
    }

    async fn latest_interviews(&self, exclude_user: &str, limit: usize) -> Result<Vec<Interview>> {
        let mut interviews: Vec<Interview> = self
            .interviews
            .read()
            .await
            .values()
            .filter(|i| i.finalized && i.user_id != exclude_user)
            .cloned()
            .collect();
        sort_newest_first(&mut interviews);
        interviews.truncate(limit);
        Ok(interviews)
    }

    async fn feedback_for(&self, interview_id: &str, user_id: &str) -> Result<Option<FeedbackRecord>> {
        let feedback = self.feedback.read().await;
        // Latest record wins
        Ok(feedback
            .iter()
            .rev()
            .find(|f| f.interview_id == interview_id && f.user_id == user_id)
            .cloned())
    }
}

/// Newest first; undated interviews last, ties broken by id
fn sort_newest_first(interviews: &mut [Interview]) {
    interviews.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> DirectorySeed {
        serde_json::from_str(
            r#"{
                "users": [{ "id": "u1", "name": "Ada" }, { "id": "u2", "name": "Grace" }],
                "interviews": [
                    {
                        "id": "i1", "user_id": "u1", "role": "Backend", "type": "technical",
                        "level": "Senior", "questions": ["Explain REST"],
                        "created_at": "2025-01-01T10:00:00Z"
                    },
                    {
                        "id": "i2", "user_id": "u1", "role": "Frontend", "type": "mixed",
                        "level": "Junior", "questions": [], "created_at": "2025-03-01T10:00:00Z"
                    },
                    {
                        "id": "i3", "user_id": "u2", "role": "Data", "type": "behavioural",
                        "level": "Mid", "questions": [], "created_at": "2025-02-01T10:00:00Z"
                    },
                    {
                        "id": "i4", "user_id": "u2", "role": "Draft", "type": "technical",
                        "level": "Mid", "questions": [], "finalized": false,
                        "created_at": "2025-04-01T10:00:00Z"
                    }
                ],
                "feedback": [
                    { "id": "fb-old", "interview_id": "i1", "user_id": "u1", "total_score": 40 },
                    {
                        "id": "fb-new", "interview_id": "i1", "user_id": "u1", "total_score": 72,
                        "category_scores": [
                            { "name": "Technical Knowledge", "score": 75, "comment": "Solid" }
                        ],
                        "strengths": ["Clear answers"],
                        "final_assessment": "Good progress"
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_lookups() {
        let dir = InMemoryDirectory::from_seed(seed());

        assert_eq!(dir.user("u1").await.unwrap().unwrap().name, "Ada");
        assert!(dir.user("nobody").await.unwrap().is_none());

        let interview = dir.interview("i1").await.unwrap().unwrap();
        assert_eq!(interview.interview_type, "technical");
        assert!(interview.techstack.is_empty());
    }

    #[tokio::test]
    async fn test_latest_feedback_record_wins() {
        let dir = InMemoryDirectory::from_seed(seed());

        assert_eq!(dir.feedback_id("i1", "u1").await.unwrap().as_deref(), Some("fb-new"));
        assert_eq!(dir.feedback_id("i1", "someone-else").await.unwrap(), None);

        let record = dir.feedback_for("i1", "u1").await.unwrap().unwrap();
        assert_eq!(record.total_score, Some(72));
        assert_eq!(record.category_scores[0].name, "Technical Knowledge");
        assert!(record.areas_for_improvement.is_empty());
    }

    #[tokio::test]
    async fn test_interviews_by_user_newest_first() {
        let dir = InMemoryDirectory::from_seed(seed());

        let ids: Vec<String> = dir
            .interviews_by_user("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["i2", "i1"]);
        assert!(dir.interviews_by_user("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_interviews_skip_own_and_drafts() {
        let dir = InMemoryDirectory::from_seed(seed());

        let for_ada = dir.latest_interviews("u1", 20).await.unwrap();
        assert_eq!(for_ada.len(), 1);
        assert_eq!(for_ada[0].id, "i3");

        let for_grace: Vec<String> = dir
            .latest_interviews("u2", 20)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(for_grace, vec!["i2", "i1"]);

        assert_eq!(dir.latest_interviews("u2", 1).await.unwrap().len(), 1);
    }
}
