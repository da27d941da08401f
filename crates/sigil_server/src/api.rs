//! API routes and handlers.
//!
//! Every verification request resolves to exactly one outcome; handler
//! errors are reserved for validation failures, malformed input, and
//! store problems.

use crate::error::ApiError;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use sigil_certify::{CertificateAuthority, CertificateExport, VerifyOutcome};
use sigil_core::{CertId, CertificateDraft, CertificateRecord};
use sigil_store::{RecordStore, StoreError, StoreStats, StoredCertificate};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state: the deployment keypair and the record store.
///
/// Key material is read-only after startup, so the whole state is shared
/// by reference across requests.
pub struct AppState {
    /// The signing/verification authority
    pub authority: CertificateAuthority,
    /// The record store backend
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    /// Create the shared state
    #[must_use]
    pub fn new(authority: CertificateAuthority, store: Arc<dyn RecordStore>) -> Self {
        Self { authority, store }
    }
}

/// Build the API router
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/certificates",
            post(issue_certificate).get(list_certificates),
        )
        .route("/api/certificates/{id}", get(get_certificate))
        .route("/api/certificates/{id}/export", get(export_certificate))
        .route("/api/certificates/{id}/revoke", post(revoke_certificate))
        .route("/api/certificates/{id}/unrevoke", post(unrevoke_certificate))
        .route("/api/verify", post(verify_upload))
        .route("/api/verify/{id}", get(verify_by_id))
        .route("/api/stats", get(stats))
        .route("/api/public-key", get(public_key))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Issuance request body
#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    /// Recipient name (mandatory, non-empty)
    pub name: String,
    /// Course title
    #[serde(default)]
    pub course: String,
    /// Cohort label
    #[serde(default)]
    pub cohort: String,
}

/// Issued certificate response
#[derive(Debug, Serialize)]
pub struct IssueResponse {
    /// The signed record
    pub certificate: CertificateRecord,
    /// Base64 signature over the record's canonical bytes
    pub signature: String,
    /// The issuer's published public key
    pub public_key: String,
}

/// Stored certificate response
#[derive(Debug, Serialize)]
pub struct CertificateResponse {
    /// The signed record
    pub certificate: CertificateRecord,
    /// Base64 signature
    pub signature: String,
    /// Revocation flag
    pub revoked: bool,
    /// The issuer's published public key
    pub public_key: String,
}

/// Verification response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// The classified outcome
    pub outcome: VerifyOutcome,
    /// Human-readable explanation
    pub message: &'static str,
    /// The record under verification, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateRecord>,
    /// The issuer's published public key, for out-of-band cross-checking
    pub public_key: String,
}

impl VerifyResponse {
    fn new(
        outcome: VerifyOutcome,
        certificate: Option<CertificateRecord>,
        public_key: String,
    ) -> Self {
        Self {
            outcome,
            message: outcome.message(),
            certificate,
            public_key,
        }
    }
}

/// Public key response
#[derive(Debug, Serialize)]
pub struct PublicKeyResponse {
    /// Base64 of the 32 raw Ed25519 public key bytes
    pub public_key: String,
}

fn parse_id(id: &str) -> Result<CertId, ApiError> {
    id.parse::<CertId>().map_err(|_| ApiError::InvalidId)
}

async fn issue_certificate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IssueRequest>,
) -> Result<(StatusCode, Json<IssueResponse>), ApiError> {
    let draft = CertificateDraft::new(&req.name, &req.course, &req.cohort)?;
    let stored = state.authority.issue(state.store.as_ref(), draft)?;

    Ok((
        StatusCode::CREATED,
        Json(IssueResponse {
            certificate: stored.record,
            signature: stored.signature,
            public_key: state.authority.public_key_base64(),
        }),
    ))
}

async fn list_certificates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoredCertificate>>, ApiError> {
    Ok(Json(state.store.list()?))
}

async fn get_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CertificateResponse>, ApiError> {
    let id = parse_id(&id)?;
    let stored = state
        .store
        .get(&id)?
        .ok_or(StoreError::NotFound { id: id.to_string() })?;

    Ok(Json(CertificateResponse {
        certificate: stored.record,
        signature: stored.signature,
        revoked: stored.revoked,
        public_key: state.authority.public_key_base64(),
    }))
}

async fn export_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CertificateExport>, ApiError> {
    let id = parse_id(&id)?;
    let stored = state
        .store
        .get(&id)?
        .ok_or(StoreError::NotFound { id: id.to_string() })?;

    Ok(Json(CertificateExport::from_stored(&stored)))
}

async fn verify_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let public_key = state.authority.public_key_base64();

    // Anything that is not a certificate ID cannot name a record.
    let Ok(id) = id.parse::<CertId>() else {
        return Ok(Json(VerifyResponse::new(
            VerifyOutcome::NotFound,
            None,
            public_key,
        )));
    };

    let outcome = state.authority.verify_stored(state.store.as_ref(), &id)?;
    let certificate = match outcome {
        VerifyOutcome::NotFound => None,
        _ => state.store.get(&id)?.map(|stored| stored.record),
    };

    Ok(Json(VerifyResponse::new(outcome, certificate, public_key)))
}

async fn verify_upload(
    State(state): State<Arc<AppState>>,
    Json(export): Json<CertificateExport>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let outcome = state
        .authority
        .verify_export(state.store.as_ref(), &export)?;

    Ok(Json(VerifyResponse::new(
        outcome,
        Some(export.data),
        state.authority.public_key_base64(),
    )))
}

async fn revoke_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.store.set_revoked(&id, true)?;
    tracing::info!(id = %id, "certificate revoked");
    Ok(StatusCode::NO_CONTENT)
}

async fn unrevoke_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.store.set_revoked(&id, false)?;
    tracing::info!(id = %id, "certificate unrevoked");
    Ok(StatusCode::NO_CONTENT)
}

async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StoreStats>, ApiError> {
    Ok(Json(state.store.stats()?))
}

async fn public_key(State(state): State<Arc<AppState>>) -> Json<PublicKeyResponse> {
    Json(PublicKeyResponse {
        public_key: state.authority.public_key_base64(),
    })
}
