//! Shared response bodies for API handlers.

use serde::Serialize;

/// `{ "ok": true }` acknowledgement returned by delete endpoints.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
