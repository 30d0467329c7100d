use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::document::{DocumentKind, RawDocument};
use crate::screening::features::CandidateFeatures;
use crate::screening::pipeline::{ScreeningRequest, StageTimings};
use crate::screening::scoring::ScoreResult;
use crate::screening::store::CandidateProfileRecord;
use crate::state::AppState;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const USER_HEADER: &str = "x-user-id";

/// Multipart field carrying the résumé.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub profile_id: Uuid,
    pub replayed: bool,
    pub features: CandidateFeatures,
    pub score: ScoreResult,
    pub timings: Option<StageTimings>,
}

/// POST /api/v1/openings/:opening_id/candidates
///
/// 201 for a fresh profile, 200 when an earlier submission is replayed.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(opening_id): Path<Uuid>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let tenant_id = identity_header(&headers, TENANT_HEADER)?;
    let user_id = identity_header(&headers, USER_HEADER)?;
    let document = read_document(multipart).await?;

    let outcome = state
        .pipeline
        .run(ScreeningRequest {
            tenant_id,
            user_id,
            opening_id,
            document,
        })
        .await?;

    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(UploadResponse {
            profile_id: outcome.record.id,
            replayed: outcome.replayed,
            features: outcome.record.features,
            score: outcome.record.score,
            timings: outcome.timings,
        }),
    ))
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<CandidateProfileRecord>, AppError> {
    let tenant_id = identity_header(&headers, TENANT_HEADER)?;
    let record = state
        .profiles
        .get(tenant_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate profile {id} not found")))?;
    Ok(Json(record))
}

/// GET /api/v1/openings/:opening_id/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Path(opening_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<CandidateProfileRecord>>, AppError> {
    let tenant_id = identity_header(&headers, TENANT_HEADER)?;
    let records = state.profiles.list_for_opening(tenant_id, opening_id).await?;
    Ok(Json(records))
}

// ────────────────────────────────────────────────────────────────────────────
// Request helpers
// ────────────────────────────────────────────────────────────────────────────

fn identity_header(headers: &HeaderMap, name: &str) -> Result<Uuid, AppError> {
    let raw = headers
        .get(name)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Validation(format!("{name} is not valid text")))?;
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Validation(format!("{name} must be a UUID, got '{raw}'")))
}

async fn read_document(mut multipart: Multipart) -> Result<RawDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("The file field needs a filename".to_string()))?;
        let content_type = resolve_content_type(field.content_type(), &filename);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;

        return Ok(RawDocument {
            bytes,
            content_type,
            filename,
        });
    }

    Err(AppError::Validation(format!(
        "Multipart body has no '{FILE_FIELD}' field"
    )))
}

/// Browsers often send `application/octet-stream`; fall back to the extension.
fn resolve_content_type(declared: Option<&str>, filename: &str) -> String {
    match declared {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
        fallback => {
            let lower = filename.to_ascii_lowercase();
            if lower.ends_with(".pdf") {
                DocumentKind::Pdf.mime().to_string()
            } else if lower.ends_with(".txt") {
                DocumentKind::PlainText.mime().to_string()
            } else {
                fallback.unwrap_or("application/octet-stream").to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_missing_identity_header_is_unauthorized() {
        let headers = HeaderMap::new();
        assert!(matches!(
            identity_header(&headers, TENANT_HEADER),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_malformed_identity_header_is_validation_error() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_static("acme"));
        assert!(matches!(
            identity_header(&headers, TENANT_HEADER),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_identity_header_parses_uuid() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(identity_header(&headers, USER_HEADER).unwrap(), id);
    }

    #[test]
    fn test_content_type_falls_back_to_extension() {
        assert_eq!(
            resolve_content_type(Some("application/octet-stream"), "CV.PDF"),
            "application/pdf"
        );
        assert_eq!(resolve_content_type(None, "cv.txt"), "text/plain");
        assert_eq!(
            resolve_content_type(Some("application/pdf"), "cv.bin"),
            "application/pdf"
        );
        assert_eq!(
            resolve_content_type(None, "cv.docx"),
            "application/octet-stream"
        );
    }
}
