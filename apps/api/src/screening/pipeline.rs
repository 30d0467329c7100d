//! Screening pipeline: sequences extraction, scoring and persistence for one upload.
//!
//! Flow: idempotency check → resolve opening → parse → extract → score →
//!       archive raw document → atomic create-and-finalize → return.
//!
//! A prior record for the same (filename, opening, user, tenant) short-circuits
//! the whole run and is returned unchanged. The existence check is only a fast
//! path; the profile store's uniqueness guarantee is what keeps one record per key.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::screening::document::{extract_text, ParsedText, RawDocument};
use crate::screening::features::{extract, CandidateFeatures};
use crate::screening::scoring::{score, JobRequirement, ScoreResult};
use crate::screening::store::{
    resume_object_key, CandidateProfileRecord, CreateOutcome, IdempotencyKey,
    JobRequirementStore, NewCandidateProfile, ProfileStore, ResumeArchive, StoreError,
};
use crate::screening::PipelineError;

/// Default cap on the stored text excerpt, in characters.
pub const DEFAULT_EXCERPT_CHARS: usize = 20_000;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Parsing,
    Extracting,
    Scoring,
    Persisting,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Parsing => "parsing",
            PipelineStage::Extracting => "extracting",
            PipelineStage::Scoring => "scoring",
            PipelineStage::Persisting => "persisting",
            PipelineStage::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One upload to screen against one opening.
#[derive(Debug, Clone)]
pub struct ScreeningRequest {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub opening_id: Uuid,
    pub document: RawDocument,
}

impl ScreeningRequest {
    pub fn idempotency_key(&self) -> IdempotencyKey {
        IdempotencyKey {
            filename: self.document.filename.clone(),
            opening_id: self.opening_id,
            user_id: self.user_id,
            tenant_id: self.tenant_id,
        }
    }
}

/// Wall-clock milliseconds spent in each stage of a fresh run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageTimings {
    pub parse_ms: u64,
    pub extract_ms: u64,
    pub score_ms: u64,
    pub persist_ms: u64,
    pub total_ms: u64,
}

/// What a run returns: the stored record, and whether it was replayed.
#[derive(Debug, Clone)]
pub struct ScreeningOutcome {
    pub record: CandidateProfileRecord,
    pub replayed: bool,
    /// `None` when the record was replayed without recomputation.
    pub timings: Option<StageTimings>,
}

/// Output of the CPU-bound stages.
struct Analysis {
    parsed: ParsedText,
    features: CandidateFeatures,
    score: ScoreResult,
    parse_ms: u64,
    extract_ms: u64,
    score_ms: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PipelineOrchestrator {
    openings: Arc<dyn JobRequirementStore>,
    profiles: Arc<dyn ProfileStore>,
    archive: Arc<dyn ResumeArchive>,
    excerpt_chars: usize,
}

impl PipelineOrchestrator {
    pub fn new(
        openings: Arc<dyn JobRequirementStore>,
        profiles: Arc<dyn ProfileStore>,
        archive: Arc<dyn ResumeArchive>,
    ) -> Self {
        Self {
            openings,
            profiles,
            archive,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }

    pub fn with_excerpt_chars(mut self, excerpt_chars: usize) -> Self {
        self.excerpt_chars = excerpt_chars;
        self
    }

    /// Screens one upload. Either returns a fully scored record (fresh or
    /// replayed) or fails with nothing persisted.
    pub async fn run(&self, request: ScreeningRequest) -> Result<ScreeningOutcome, PipelineError> {
        let span = info_span!(
            "screening",
            tenant_id = %request.tenant_id,
            opening_id = %request.opening_id,
            user_id = %request.user_id,
            filename = %request.document.filename,
        );

        let result = self.run_stages(request).instrument(span.clone()).await;

        if let Err(e) = &result {
            span.in_scope(|| {
                if e.is_retryable() {
                    error!("Screening failed (retryable): {e}");
                } else {
                    warn!("Screening rejected: {e}");
                }
            });
        }
        result
    }

    async fn run_stages(&self, request: ScreeningRequest) -> Result<ScreeningOutcome, PipelineError> {
        let started = Instant::now();
        let key = request.idempotency_key();
        enter(PipelineStage::Idle);

        // Fast path: an earlier submission of the same key is replayed as-is
        if let Some(record) = self
            .profiles
            .find_by_key(&key)
            .await
            .map_err(persistence_failure)?
        {
            info!("Replaying existing profile {}", record.id);
            enter(PipelineStage::Done);
            return Ok(ScreeningOutcome {
                record,
                replayed: true,
                timings: None,
            });
        }

        let opening = self
            .openings
            .fetch_opening(request.opening_id, request.tenant_id)
            .await
            .map_err(persistence_failure)?
            .filter(|opening| {
                opening.id == request.opening_id && opening.tenant_id == request.tenant_id
            })
            .ok_or(PipelineError::OpeningNotFound(request.opening_id))?;
        debug!("Resolved opening '{}'", opening.title);
        let requirement = opening.requirement;

        let document = request.document.clone();
        let requirement_for_worker = requirement.clone();
        let analysis = tokio::task::spawn_blocking(move || {
            analyze(&document, &requirement_for_worker)
        })
        .await
        .map_err(|e| PipelineError::ParseFailure(format!("analysis worker failed: {e}")))??;

        info!(
            "Scored {:.4} ({}) from {} chars, {} pages, {} skills",
            analysis.score.final_score,
            analysis.score.confidence.as_str(),
            analysis.parsed.text.chars().count(),
            analysis.parsed.page_count,
            analysis.features.skills.len()
        );

        enter(PipelineStage::Persisting);
        let persist_started = Instant::now();

        let resume_key = resume_object_key(&key);
        self.archive
            .put(
                &resume_key,
                request.document.bytes.clone(),
                analysis.parsed.kind.mime(),
            )
            .await
            .map_err(persistence_failure)?;

        let profile = NewCandidateProfile {
            key,
            resume_key,
            content_type: analysis.parsed.kind.mime().to_string(),
            page_count: analysis.parsed.page_count,
            text_excerpt: analysis.parsed.excerpt(self.excerpt_chars),
            features: analysis.features,
            requirement_snapshot: requirement,
            score: analysis.score,
            latency_ms: elapsed_ms(started) as i64,
        };

        let outcome = self
            .profiles
            .create_finalized(profile)
            .await
            .map_err(persistence_failure)?;

        let timings = StageTimings {
            parse_ms: analysis.parse_ms,
            extract_ms: analysis.extract_ms,
            score_ms: analysis.score_ms,
            persist_ms: elapsed_ms(persist_started),
            total_ms: elapsed_ms(started),
        };
        enter(PipelineStage::Done);

        match outcome {
            CreateOutcome::Created(record) => {
                info!("Persisted profile {} in {}ms", record.id, timings.total_ms);
                Ok(ScreeningOutcome {
                    record,
                    replayed: false,
                    timings: Some(timings),
                })
            }
            CreateOutcome::Existing(record) => {
                // a concurrent request with the same key committed first
                info!("Profile {} already written for this key; returning it", record.id);
                Ok(ScreeningOutcome {
                    record,
                    replayed: true,
                    timings: None,
                })
            }
        }
    }
}

/// Parse → extract → score. Synchronous; runs on the blocking pool.
fn analyze(document: &RawDocument, requirement: &JobRequirement) -> Result<Analysis, PipelineError> {
    enter(PipelineStage::Parsing);
    let stage_started = Instant::now();
    let parsed = extract_text(document)?;
    if parsed.text.is_empty() {
        return Err(PipelineError::EmptyExtraction);
    }
    let parse_ms = elapsed_ms(stage_started);

    enter(PipelineStage::Extracting);
    let stage_started = Instant::now();
    let features = extract(&parsed.text, &requirement.required_skills);
    let extract_ms = elapsed_ms(stage_started);

    enter(PipelineStage::Scoring);
    let stage_started = Instant::now();
    let score = score(&features, requirement);
    let score_ms = elapsed_ms(stage_started);

    Ok(Analysis {
        parsed,
        features,
        score,
        parse_ms,
        extract_ms,
        score_ms,
    })
}

fn enter(stage: PipelineStage) {
    debug!(stage = stage.as_str(), "pipeline stage");
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn persistence_failure(e: StoreError) -> PipelineError {
    PipelineError::PersistenceFailure(e.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
