use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::screening::features::CandidateFeatures;
use crate::screening::scoring::{Confidence, JobRequirement, ScoreResult};
use crate::screening::store::{CandidateProfileRecord, JobOpening, StoreError};

/// Column list shared by every `candidate_profiles` read.
pub const CANDIDATE_PROFILE_COLUMNS: &str = "id, tenant_id, user_id, opening_id, \
    resume_filename, resume_key, content_type, page_count, resume_text_excerpt, \
    features, requirement_snapshot, skill_score, experience_score, location_score, \
    final_score, confidence, score_reason, latency_ms, created_at";

#[derive(Debug, Clone, FromRow)]
pub struct JobOpeningRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub required_skills: Vec<String>,
    pub required_experience_years: f64,
    pub required_location: String,
}

impl From<JobOpeningRow> for JobOpening {
    fn from(row: JobOpeningRow) -> Self {
        JobOpening {
            id: row.id,
            tenant_id: row.tenant_id,
            title: row.title,
            requirement: JobRequirement {
                required_skills: row.required_skills,
                required_experience_years: row.required_experience_years,
                required_location: row.required_location,
            },
        }
    }
}

/// Score columns are nullable only while a row is inside its creating
/// transaction; a committed row has all of them or none.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateProfileRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub opening_id: Uuid,
    pub resume_filename: String,
    pub resume_key: String,
    pub content_type: String,
    pub page_count: i32,
    pub resume_text_excerpt: String,
    pub features: Json<CandidateFeatures>,
    pub requirement_snapshot: Json<JobRequirement>,
    pub skill_score: Option<f64>,
    pub experience_score: Option<f64>,
    pub location_score: Option<f64>,
    pub final_score: Option<f64>,
    pub confidence: Option<String>,
    pub score_reason: Option<String>,
    pub latency_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl CandidateProfileRow {
    pub fn into_record(self) -> Result<CandidateProfileRecord, StoreError> {
        let (
            Some(skill_score),
            Some(experience_score),
            Some(location_score),
            Some(final_score),
            Some(confidence),
            Some(reason),
        ) = (
            self.skill_score,
            self.experience_score,
            self.location_score,
            self.final_score,
            self.confidence,
            self.score_reason,
        )
        else {
            return Err(StoreError::Corrupt(format!(
                "profile {} has no score",
                self.id
            )));
        };
        let confidence = Confidence::parse(&confidence).ok_or_else(|| {
            StoreError::Corrupt(format!("profile {} has confidence '{confidence}'", self.id))
        })?;

        Ok(CandidateProfileRecord {
            id: self.id,
            tenant_id: self.tenant_id,
            user_id: self.user_id,
            opening_id: self.opening_id,
            resume_filename: self.resume_filename,
            resume_key: self.resume_key,
            content_type: self.content_type,
            page_count: u32::try_from(self.page_count).unwrap_or_default(),
            text_excerpt: self.resume_text_excerpt,
            features: self.features.0,
            requirement_snapshot: self.requirement_snapshot.0,
            score: ScoreResult {
                skill_score,
                experience_score,
                location_score,
                final_score,
                confidence,
                reason,
            },
            latency_ms: self.latency_ms.unwrap_or_default(),
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::features::{EducationLevel, MatchMeta};
    use std::collections::BTreeSet;

    fn row() -> CandidateProfileRow {
        CandidateProfileRow {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            opening_id: Uuid::new_v4(),
            resume_filename: "jane.pdf".to_string(),
            resume_key: "resumes/a/b/c/jane.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            page_count: 2,
            resume_text_excerpt: "Jane Doe".to_string(),
            features: Json(CandidateFeatures {
                skills: BTreeSet::from(["React".to_string()]),
                experience_years: 4.0,
                location: "Pune".to_string(),
                education_level: EducationLevel::Bachelors,
                match_meta: MatchMeta {
                    skills_found_count: 1,
                    experience_matched: true,
                    location_matched: true,
                    education_matched: true,
                },
            }),
            requirement_snapshot: Json(JobRequirement {
                required_skills: vec!["React".to_string()],
                required_experience_years: 4.0,
                required_location: "Pune".to_string(),
            }),
            skill_score: Some(1.0),
            experience_score: Some(1.0),
            location_score: Some(1.0),
            final_score: Some(1.0),
            confidence: Some("HIGH".to_string()),
            score_reason: Some("All good.".to_string()),
            latency_ms: Some(42),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_scored_row_converts() {
        let record = row().into_record().unwrap();
        assert_eq!(record.score.confidence, Confidence::High);
        assert_eq!(record.page_count, 2);
        assert_eq!(record.latency_ms, 42);
        assert_eq!(record.text_excerpt, "Jane Doe");
    }

    #[test]
    fn test_partially_scored_row_is_corrupt() {
        let mut partial = row();
        partial.final_score = None;
        assert!(matches!(partial.into_record(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_unknown_confidence_is_corrupt() {
        let mut bad = row();
        bad.confidence = Some("VERY HIGH".to_string());
        assert!(matches!(bad.into_record(), Err(StoreError::Corrupt(_))));
    }
}
