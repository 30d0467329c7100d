//! PostgreSQL-backed opening and profile stores.
//!
//! `create_finalized` inserts the profile and writes its score columns inside
//! one transaction. The unique key on (tenant, opening, user, filename) turns a
//! concurrent duplicate into `ON CONFLICT DO NOTHING`, after which the winner's
//! row is read back.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::candidate::{CandidateProfileRow, JobOpeningRow, CANDIDATE_PROFILE_COLUMNS};
use crate::screening::store::{
    CandidateProfileRecord, CreateOutcome, IdempotencyKey, JobOpening, JobRequirementStore,
    NewCandidateProfile, ProfileStore, StoreError,
};

#[derive(Clone)]
pub struct PgJobRequirementStore {
    pool: PgPool,
}

impl PgJobRequirementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRequirementStore for PgJobRequirementStore {
    async fn fetch_opening(
        &self,
        opening_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<JobOpening>, StoreError> {
        let row: Option<JobOpeningRow> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, title, required_skills, required_experience_years,
                   required_location
            FROM job_openings
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(opening_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(JobOpening::from))
    }
}

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Option<CandidateProfileRecord>, StoreError> {
        let sql = format!(
            "SELECT {CANDIDATE_PROFILE_COLUMNS} FROM candidate_profiles \
             WHERE tenant_id = $1 AND opening_id = $2 AND user_id = $3 \
             AND resume_filename = $4 AND final_score IS NOT NULL"
        );
        let row: Option<CandidateProfileRow> = sqlx::query_as(&sql)
            .bind(key.tenant_id)
            .bind(key.opening_id)
            .bind(key.user_id)
            .bind(&key.filename)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CandidateProfileRow::into_record).transpose()
    }

    async fn create_finalized(
        &self,
        profile: NewCandidateProfile,
    ) -> Result<CreateOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;
        let id = Uuid::new_v4();

        // 1. Stage the row without a score
        let inserted = sqlx::query(
            r#"
            INSERT INTO candidate_profiles
                (id, tenant_id, user_id, opening_id, resume_filename, resume_key,
                 content_type, page_count, resume_text_excerpt, features, requirement_snapshot)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (tenant_id, opening_id, user_id, resume_filename) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(profile.key.tenant_id)
        .bind(profile.key.user_id)
        .bind(profile.key.opening_id)
        .bind(&profile.key.filename)
        .bind(&profile.resume_key)
        .bind(&profile.content_type)
        .bind(i32::try_from(profile.page_count).unwrap_or(i32::MAX))
        .bind(&profile.text_excerpt)
        .bind(Json(&profile.features))
        .bind(Json(&profile.requirement_snapshot))
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            debug!("Idempotency key already taken; reading committed profile");
            return self
                .find_by_key(&profile.key)
                .await?
                .map(CreateOutcome::Existing)
                .ok_or(StoreError::Conflict);
        }

        // 2. Finalize the score in the same transaction
        let sql = format!(
            "UPDATE candidate_profiles SET skill_score = $2, experience_score = $3, \
             location_score = $4, final_score = $5, confidence = $6, score_reason = $7, \
             latency_ms = $8 WHERE id = $1 RETURNING {CANDIDATE_PROFILE_COLUMNS}"
        );
        let row: CandidateProfileRow = sqlx::query_as(&sql)
            .bind(id)
            .bind(profile.score.skill_score)
            .bind(profile.score.experience_score)
            .bind(profile.score.location_score)
            .bind(profile.score.final_score)
            .bind(profile.score.confidence.as_str())
            .bind(&profile.score.reason)
            .bind(profile.latency_ms)
            .fetch_one(&mut *tx)
            .await?;
        let record = row.into_record()?;

        // 3. Nothing is visible until here; an early return drops `tx` and rolls back
        tx.commit().await?;
        info!("Committed candidate profile {id}");

        Ok(CreateOutcome::Created(record))
    }

    async fn get(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<CandidateProfileRecord>, StoreError> {
        let sql = format!(
            "SELECT {CANDIDATE_PROFILE_COLUMNS} FROM candidate_profiles \
             WHERE id = $1 AND tenant_id = $2 AND final_score IS NOT NULL"
        );
        let row: Option<CandidateProfileRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CandidateProfileRow::into_record).transpose()
    }

    async fn list_for_opening(
        &self,
        tenant_id: Uuid,
        opening_id: Uuid,
    ) -> Result<Vec<CandidateProfileRecord>, StoreError> {
        let sql = format!(
            "SELECT {CANDIDATE_PROFILE_COLUMNS} FROM candidate_profiles \
             WHERE tenant_id = $1 AND opening_id = $2 AND final_score IS NOT NULL \
             ORDER BY final_score DESC, created_at ASC"
        );
        let rows: Vec<CandidateProfileRow> = sqlx::query_as(&sql)
            .bind(tenant_id)
            .bind(opening_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CandidateProfileRow::into_record).collect()
    }
}

// Run with `cargo test -- --ignored` against a disposable database named by
// DATABASE_URL; each test gets a fresh migrated schema.
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::screening::features::extract_as_of;
    use crate::screening::scoring::{score, JobRequirement};

    async fn seed_opening(pool: &PgPool) -> (Uuid, Uuid, JobRequirement) {
        let (opening_id, tenant_id) = (Uuid::new_v4(), Uuid::new_v4());
        let requirement = JobRequirement {
            required_skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            required_experience_years: 3.0,
            required_location: "Berlin".to_string(),
        };
        sqlx::query(
            "INSERT INTO job_openings (id, tenant_id, title, required_skills, \
             required_experience_years, required_location) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(opening_id)
        .bind(tenant_id)
        .bind("Backend Engineer")
        .bind(&requirement.required_skills)
        .bind(requirement.required_experience_years)
        .bind(&requirement.required_location)
        .execute(pool)
        .await
        .unwrap();
        (opening_id, tenant_id, requirement)
    }

    fn new_profile(
        opening_id: Uuid,
        tenant_id: Uuid,
        requirement: JobRequirement,
    ) -> NewCandidateProfile {
        let text = "Location: Berlin\n5 years of experience with Rust and Postgres";
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let features = extract_as_of(text, &requirement.required_skills, today);
        let score = score(&features, &requirement);
        NewCandidateProfile {
            key: IdempotencyKey {
                filename: "ada.txt".to_string(),
                opening_id,
                user_id: Uuid::new_v4(),
                tenant_id,
            },
            resume_key: "resumes/ada.txt".to_string(),
            content_type: "text/plain".to_string(),
            page_count: 1,
            text_excerpt: text.to_string(),
            features,
            requirement_snapshot: requirement,
            score,
            latency_ms: 12,
        }
    }

    async fn profile_rows(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM candidate_profiles")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_create_finalized_commits_once_per_key(pool: PgPool) {
        let (opening_id, tenant_id, requirement) = seed_opening(&pool).await;
        let store = PgProfileStore::new(pool.clone());
        let profile = new_profile(opening_id, tenant_id, requirement);

        let first = match store.create_finalized(profile.clone()).await.unwrap() {
            CreateOutcome::Created(record) => record,
            CreateOutcome::Existing(_) => panic!("first write must create"),
        };
        assert_eq!(first.score.final_score, profile.score.final_score);

        match store.create_finalized(profile.clone()).await.unwrap() {
            CreateOutcome::Existing(record) => assert_eq!(record.id, first.id),
            CreateOutcome::Created(_) => panic!("duplicate key must fold into the existing row"),
        }
        assert_eq!(profile_rows(&pool).await, 1);
        assert_eq!(
            store.find_by_key(&profile.key).await.unwrap().map(|r| r.id),
            Some(first.id)
        );
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_failed_score_write_rolls_back_staged_row(pool: PgPool) {
        let (opening_id, tenant_id, requirement) = seed_opening(&pool).await;
        let store = PgProfileStore::new(pool.clone());
        let profile = new_profile(opening_id, tenant_id, requirement);

        // PostgreSQL rejects NUL in text, so the UPDATE after the INSERT fails
        let mut poisoned = profile.clone();
        poisoned.score.reason = "unreadable\0reason".to_string();
        let err = store.create_finalized(poisoned).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
        assert_eq!(profile_rows(&pool).await, 0);

        // nothing was committed, so the same key can still be written
        let retry = store.create_finalized(profile).await.unwrap();
        assert!(matches!(retry, CreateOutcome::Created(_)));
        assert_eq!(profile_rows(&pool).await, 1);
    }
}
