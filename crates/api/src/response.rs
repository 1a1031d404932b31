//! Shared response envelope for API handlers.
//!
//! Client-facing responses use a `{ "data": ... }` envelope. The one
//! exception is the provider callback endpoint, which answers with the
//! bare `{ "status": ... }` shape the provider expects.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
