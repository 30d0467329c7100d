//! Collaborator contracts for the screening pipeline.
//!
//! The orchestrator only sees these traits; `postgres.rs` and `archive.rs`
//! provide the production backends.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::screening::features::CandidateFeatures;
use crate::screening::scoring::{JobRequirement, ScoreResult};

/// (filename, opening, user, tenant): one logical submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey {
    pub filename: String,
    pub opening_id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
}

/// A job opening as resolved for a tenant.
#[derive(Debug, Clone)]
pub struct JobOpening {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub requirement: JobRequirement,
}

/// Everything needed to create a scored candidate profile in one write.
#[derive(Debug, Clone)]
pub struct NewCandidateProfile {
    pub key: IdempotencyKey,
    pub resume_key: String,
    pub content_type: String,
    pub page_count: u32,
    pub text_excerpt: String,
    pub features: CandidateFeatures,
    pub requirement_snapshot: JobRequirement,
    pub score: ScoreResult,
    pub latency_ms: i64,
}

/// A persisted, fully scored candidate profile. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfileRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub opening_id: Uuid,
    pub resume_filename: String,
    pub resume_key: String,
    pub content_type: String,
    pub page_count: u32,
    pub text_excerpt: String,
    pub features: CandidateFeatures,
    pub requirement_snapshot: JobRequirement,
    pub score: ScoreResult,
    pub latency_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl CandidateProfileRecord {
    pub fn idempotency_key(&self) -> IdempotencyKey {
        IdempotencyKey {
            filename: self.resume_filename.clone(),
            opening_id: self.opening_id,
            user_id: self.user_id,
            tenant_id: self.tenant_id,
        }
    }
}

/// Result of the atomic create. A concurrent duplicate on the same key is
/// folded into the record that won.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Created(CandidateProfileRecord),
    Existing(CandidateProfileRecord),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("stored record is incomplete: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("object storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait JobRequirementStore: Send + Sync {
    /// Resolves an opening visible to `tenant_id`, or `None`.
    async fn fetch_opening(
        &self,
        opening_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<JobOpening>, StoreError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Option<CandidateProfileRecord>, StoreError>;

    /// Creates and scores a profile as one all-or-nothing write. Must enforce
    /// uniqueness of the idempotency key.
    async fn create_finalized(
        &self,
        profile: NewCandidateProfile,
    ) -> Result<CreateOutcome, StoreError>;

    async fn get(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<CandidateProfileRecord>, StoreError>;

    /// Profiles for one opening, best score first.
    async fn list_for_opening(
        &self,
        tenant_id: Uuid,
        opening_id: Uuid,
    ) -> Result<Vec<CandidateProfileRecord>, StoreError>;
}

/// Object storage for the raw uploaded document.
#[async_trait]
pub trait ResumeArchive: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StoreError>;
}

/// Deterministic object key for an upload, so retries overwrite in place.
pub fn resume_object_key(key: &IdempotencyKey) -> String {
    let filename: String = key
        .filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "resumes/{}/{}/{}/{}",
        key.tenant_id, key.opening_id, key.user_id, filename
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_object_key_is_deterministic_and_sanitized() {
        let key = IdempotencyKey {
            filename: "Jane Doe (final)/v2.pdf".to_string(),
            opening_id: Uuid::nil(),
            user_id: Uuid::nil(),
            tenant_id: Uuid::nil(),
        };
        let object_key = resume_object_key(&key);
        assert_eq!(object_key, resume_object_key(&key.clone()));
        assert!(object_key.ends_with("/Jane_Doe__final__v2.pdf"));
        assert_eq!(object_key.matches('/').count(), 4);
    }
}
