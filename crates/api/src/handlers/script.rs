//! Handler for screenplay analysis.
//!
//! Unlike generation, analysis is synchronous: the screenplay goes to
//! the text model inside the request and the result comes back in the
//! response body.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use cineforge_core::script;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Response payload for a completed analysis.
#[derive(Debug, Serialize)]
pub struct ScriptAnalysis {
    pub analysis: String,
}

/// POST /api/v1/script-analysis
///
/// Multipart form with an optional `text` field and an optional `file`
/// part. The two are mutually exclusive inputs; when both are present
/// the file takes priority. Neither present, an unreadable file, or
/// empty content answers 400 before any model call is made.
pub async fn analyze_script(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<ScriptAnalysis>>> {
    let mut text: Option<String> = None;
    let mut file: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        // Capture the name up front: reading the field consumes it.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("text") => {
                text = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Unreadable text field: {e}")))?,
                );
            }
            Some("file") => {
                file = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Unreadable file part: {e}")))?
                        .to_vec(),
                );
            }
            // Unknown parts are ignored rather than rejected.
            _ => {}
        }
    }

    let content = match (file, text) {
        (Some(bytes), _) => script::script_from_bytes(&bytes).map_err(AppError::Core)?,
        (None, Some(text)) => script::script_from_text(&text).map_err(AppError::Core)?,
        (None, None) => {
            return Err(AppError::BadRequest(
                "Provide a script file or a text field".to_string(),
            ));
        }
    };

    let prompt = script::build_analysis_prompt(&content);

    let analysis = state
        .gemini
        .generate(&prompt)
        .await
        .map_err(|e| AppError::InternalError(format!("Script analysis failed: {e}")))?;

    tracing::info!(bytes = content.len(), "Screenplay analysis completed");

    Ok(Json(DataResponse {
        data: ScriptAnalysis { analysis },
    }))
}
