//! In-process stores for exercising the orchestrator, with fault injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::screening::scoring::JobRequirement;
use crate::screening::store::{
    CandidateProfileRecord, CreateOutcome, IdempotencyKey, JobOpening, JobRequirementStore,
    NewCandidateProfile, ProfileStore, ResumeArchive, StoreError,
};

// ────────────────────────────────────────────────────────────────────────────
// Openings
// ────────────────────────────────────────────────────────────────────────────

/// Looks openings up by id only; tenant scoping is left to the caller so the
/// orchestrator's own check is exercised.
#[derive(Default)]
pub struct MemoryOpenings {
    openings: Mutex<HashMap<Uuid, JobOpening>>,
}

impl MemoryOpenings {
    pub fn insert(&self, id: Uuid, tenant_id: Uuid, requirement: JobRequirement) {
        self.insert_under(
            id,
            JobOpening {
                id,
                tenant_id,
                title: "Senior Frontend Engineer".to_string(),
                requirement,
            },
        );
    }

    /// Files `opening` under `key`, which need not be its own id.
    pub fn insert_under(&self, key: Uuid, opening: JobOpening) {
        self.openings.lock().unwrap().insert(key, opening);
    }

    pub fn update_requirement(&self, id: Uuid, requirement: JobRequirement) {
        if let Some(opening) = self.openings.lock().unwrap().get_mut(&id) {
            opening.requirement = requirement;
        }
    }
}

#[async_trait]
impl JobRequirementStore for MemoryOpenings {
    async fn fetch_opening(
        &self,
        opening_id: Uuid,
        _tenant_id: Uuid,
    ) -> Result<Option<JobOpening>, StoreError> {
        Ok(self.openings.lock().unwrap().get(&opening_id).cloned())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Profiles
// ────────────────────────────────────────────────────────────────────────────

struct Row {
    record: CandidateProfileRecord,
    finalized: bool,
}

/// Rows are staged, then finalized, under one lock. An injected failure
/// between the two removes the staged row again.
#[derive(Default)]
pub struct MemoryProfiles {
    rows: Mutex<Vec<Row>>,
    fail_before_finalize: AtomicBool,
}

impl MemoryProfiles {
    pub fn fail_next_finalize(&self) {
        self.fail_before_finalize.store(true, Ordering::SeqCst);
    }

    /// Records a reader can see.
    pub fn visible_count(&self) -> usize {
        self.rows.lock().unwrap().iter().filter(|r| r.finalized).count()
    }

    /// Every stored row, finalized or not.
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfiles {
    async fn find_by_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Option<CandidateProfileRecord>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.finalized && r.record.idempotency_key() == *key)
            .map(|r| r.record.clone()))
    }

    async fn create_finalized(
        &self,
        profile: NewCandidateProfile,
    ) -> Result<CreateOutcome, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows
            .iter()
            .find(|r| r.record.idempotency_key() == profile.key)
        {
            return Ok(CreateOutcome::Existing(existing.record.clone()));
        }

        let record = CandidateProfileRecord {
            id: Uuid::new_v4(),
            tenant_id: profile.key.tenant_id,
            user_id: profile.key.user_id,
            opening_id: profile.key.opening_id,
            resume_filename: profile.key.filename,
            resume_key: profile.resume_key,
            content_type: profile.content_type,
            page_count: profile.page_count,
            text_excerpt: profile.text_excerpt,
            features: profile.features,
            requirement_snapshot: profile.requirement_snapshot,
            score: profile.score,
            latency_ms: profile.latency_ms,
            created_at: Utc::now(),
        };
        rows.push(Row {
            record,
            finalized: false,
        });

        if self.fail_before_finalize.swap(false, Ordering::SeqCst) {
            rows.pop();
            return Err(StoreError::Unavailable(
                "connection lost before finalize".to_string(),
            ));
        }

        let row = rows
            .last_mut()
            .ok_or_else(|| StoreError::Corrupt("staged row vanished".to_string()))?;
        row.finalized = true;
        Ok(CreateOutcome::Created(row.record.clone()))
    }

    async fn get(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<CandidateProfileRecord>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.finalized && r.record.id == id && r.record.tenant_id == tenant_id)
            .map(|r| r.record.clone()))
    }

    async fn list_for_opening(
        &self,
        tenant_id: Uuid,
        opening_id: Uuid,
    ) -> Result<Vec<CandidateProfileRecord>, StoreError> {
        let mut records: Vec<CandidateProfileRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.finalized && r.record.tenant_id == tenant_id && r.record.opening_id == opening_id
            })
            .map(|r| r.record.clone())
            .collect();
        records.sort_by(|a, b| b.score.final_score.total_cmp(&a.score.final_score));
        Ok(records)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Archive
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryArchive {
    objects: Mutex<HashMap<String, Bytes>>,
    puts: AtomicUsize,
    fail_next: AtomicBool,
}

impl MemoryArchive {
    pub fn fail_next_put(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl ResumeArchive for MemoryArchive {
    async fn put(&self, key: &str, bytes: Bytes, _content_type: &str) -> Result<(), StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Storage("bucket unreachable".to_string()));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }
}
