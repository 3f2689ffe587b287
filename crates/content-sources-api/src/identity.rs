//! Caller identity from the `x-rh-identity` header.
//!
//! The header carries base64-encoded JSON:
//! `{"identity": {"account_number": "...", "internal": {"org_id": "..."}}}`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;

pub const IDENTITY_HEADER: &str = "x-rh-identity";

/// The account and organization a request acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: String,
    pub org_id: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("missing {IDENTITY_HEADER} header")]
    Missing,

    #[error("header is not valid ASCII")]
    InvalidHeader,

    #[error("{0}")]
    Base64(#[from] base64::DecodeError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("identity has no org_id")]
    MissingOrgId,
}

#[derive(Debug, Serialize, Deserialize)]
struct XRhIdentity {
    identity: IdentityBody,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IdentityBody {
    #[serde(default)]
    account_number: String,
    #[serde(default)]
    org_id: String,
    #[serde(default)]
    internal: Internal,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Internal {
    #[serde(default)]
    org_id: String,
}

impl Identity {
    pub fn new(account_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            org_id: org_id.into(),
        }
    }

    /// Decode a header value. `internal.org_id` wins over a top-level `org_id`.
    pub fn decode(header: &str) -> Result<Self, IdentityError> {
        let raw = STANDARD.decode(header.trim())?;
        let parsed: XRhIdentity = serde_json::from_slice(&raw)?;
        let body = parsed.identity;

        let org_id = if body.internal.org_id.is_empty() {
            body.org_id
        } else {
            body.internal.org_id
        };
        if org_id.is_empty() {
            return Err(IdentityError::MissingOrgId);
        }

        Ok(Self {
            account_id: body.account_number,
            org_id,
        })
    }

    /// Encode as a header value.
    pub fn encode(&self) -> String {
        let identity = XRhIdentity {
            identity: IdentityBody {
                account_number: self.account_id.clone(),
                org_id: self.org_id.clone(),
                internal: Internal {
                    org_id: self.org_id.clone(),
                },
            },
        };
        // Serializing plain strings cannot fail.
        let json = serde_json::to_vec(&identity).unwrap_or_default();
        STANDARD.encode(json)
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let parse = || {
            let value = parts
                .headers
                .get(IDENTITY_HEADER)
                .ok_or(IdentityError::Missing)?
                .to_str()
                .map_err(|_| IdentityError::InvalidHeader)?;
            Identity::decode(value)
        };

        parse().map_err(|err| {
            tracing::debug!(error = %err, "Rejected identity header");
            ApiError::BadRequest(format!("Error parsing identity: {err}"))
        })
    }
}
