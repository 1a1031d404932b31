//! Screenplay content handling for the script analysis endpoint.
//!
//! Clients may send the screenplay as an uploaded file or as raw text;
//! these helpers normalise both into a single analysis prompt.

use crate::error::CoreError;

/// Maximum accepted screenplay size, in bytes.
pub const MAX_SCRIPT_BYTES: usize = 2 * 1024 * 1024;

/// Instruction prepended to the screenplay before it is sent to the
/// text model.
pub const ANALYSIS_INSTRUCTION: &str =
    "Analyze the following screenplay for plot structure, character development, \
     and dialogue quality:";

/// Decode an uploaded screenplay file into text.
///
/// The file must be valid UTF-8 and non-empty; binary uploads are
/// rejected with a validation error rather than passed downstream.
pub fn script_from_bytes(bytes: &[u8]) -> Result<String, CoreError> {
    if bytes.len() > MAX_SCRIPT_BYTES {
        return Err(CoreError::Validation(format!(
            "Script file must not exceed {MAX_SCRIPT_BYTES} bytes"
        )));
    }
    let text = std::str::from_utf8(bytes).map_err(|_| {
        CoreError::Validation("Script file is not readable as UTF-8 text".to_string())
    })?;
    script_from_text(text)
}

/// Validate screenplay text supplied directly in the request body.
pub fn script_from_text(text: &str) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Script content must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_SCRIPT_BYTES {
        return Err(CoreError::Validation(format!(
            "Script content must not exceed {MAX_SCRIPT_BYTES} bytes"
        )));
    }
    Ok(trimmed.to_string())
}

/// Build the full prompt handed to the text model.
pub fn build_analysis_prompt(script: &str) -> String {
    format!("{ANALYSIS_INSTRUCTION}\n\n{script}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
