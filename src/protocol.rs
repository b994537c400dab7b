//! Public protocol structs for the HTTP endpoints (serde ready).
//! Question requests and results reuse the domain types directly; this module
//! holds the envelopes around them.

use serde::{Deserialize, Serialize};

use crate::domain::ResolvedContent;

/// Body returned when the request body could not be parsed. `fallback` is
/// resolved from the default request so the caller still has content.
#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<ResolvedContent>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub remote: bool,
}

#[derive(Debug, Deserialize)]
pub struct RegisterIn {
    pub name: String,
    pub email: String,
    pub grade: u8,
}
