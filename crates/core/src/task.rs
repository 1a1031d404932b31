//! Task domain types and input validation.
//!
//! Pure functions and constants used by the ledger, the submission
//! dispatcher, and the HTTP handlers.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Maximum length of a generation prompt, in characters.
pub const MAX_PROMPT_LEN: usize = 4000;

/// Maximum length of an owner identifier.
const MAX_OWNER_LEN: usize = 128;

// ---------------------------------------------------------------------------
// Task kind
// ---------------------------------------------------------------------------

/// The kind of generation job a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Video,
    Image,
}

impl TaskKind {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Video => "video",
            TaskKind::Image => "image",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(TaskKind::Video),
            "image" => Ok(TaskKind::Image),
            other => Err(CoreError::Validation(format!("Unknown task kind: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Correlation mode
// ---------------------------------------------------------------------------

/// How an inbound callback is matched back to its originating task.
///
/// `Embedded` puts the internal task id into the callback URL handed to
/// the provider at submission time; the reconciler reads it back from the
/// request's query string. `Linked` hands out a bare callback URL and
/// stores the provider-assigned job id on the task instead; the
/// reconciler resolves the id the provider reports inside the callback
/// body. Recorded per task at creation, so the two strategies are never
/// active against the same task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationMode {
    Embedded,
    Linked,
}

impl CorrelationMode {
    /// Database / config representation.
    pub fn as_str(self) -> &'static str {
        match self {
            CorrelationMode::Embedded => "embedded",
            CorrelationMode::Linked => "linked",
        }
    }
}

impl fmt::Display for CorrelationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrelationMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "embedded" => Ok(CorrelationMode::Embedded),
            "linked" => Ok(CorrelationMode::Linked),
            other => Err(CoreError::Validation(format!(
                "Unknown correlation mode: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a generation prompt.
///
/// Rules:
/// - Must not be empty (after trimming).
/// - Must not exceed `MAX_PROMPT_LEN` characters.
pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation(
            "Prompt must not be empty".to_string(),
        ));
    }
    if prompt.chars().count() > MAX_PROMPT_LEN {
        return Err(CoreError::Validation(format!(
            "Prompt must not exceed {MAX_PROMPT_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an optional owner identifier.
///
/// Owners scope task queries; an empty or oversized identifier is
/// rejected rather than silently stored.
pub fn validate_owner(owner: Option<&str>) -> Result<(), CoreError> {
    let Some(owner) = owner else {
        return Ok(());
    };
    if owner.trim().is_empty() {
        return Err(CoreError::Validation(
            "Owner must not be empty when provided".to_string(),
        ));
    }
    if owner.len() > MAX_OWNER_LEN {
        return Err(CoreError::Validation(format!(
            "Owner must not exceed {MAX_OWNER_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- task kind ------------------------------------------------------------

    #[test]
    fn task_kind_round_trips() {
        assert_eq!("video".parse::<TaskKind>().unwrap(), TaskKind::Video);
        assert_eq!("image".parse::<TaskKind>().unwrap(), TaskKind::Image);
        assert_eq!(TaskKind::Video.as_str(), "video");
        assert_eq!(TaskKind::Image.as_str(), "image");
    }

    #[test]
    fn unknown_task_kind_rejected() {
        assert!("audio".parse::<TaskKind>().is_err());
    }

    // -- correlation mode -----------------------------------------------------

    #[test]
    fn correlation_mode_round_trips() {
        assert_eq!(
            "embedded".parse::<CorrelationMode>().unwrap(),
            CorrelationMode::Embedded
        );
        assert_eq!(
            "linked".parse::<CorrelationMode>().unwrap(),
            CorrelationMode::Linked
        );
    }

    #[test]
    fn unknown_correlation_mode_rejected() {
        assert!("guessed".parse::<CorrelationMode>().is_err());
    }

    // -- validate_prompt ------------------------------------------------------

    #[test]
    fn valid_prompt() {
        assert!(validate_prompt("A cinematic shot of a futuristic city at sunset.").is_ok());
    }

    #[test]
    fn empty_prompt_rejected() {
        assert!(validate_prompt("").is_err());
        assert!(validate_prompt("   ").is_err());
    }

    #[test]
    fn oversized_prompt_rejected() {
        let prompt = "x".repeat(MAX_PROMPT_LEN + 1);
        assert!(validate_prompt(&prompt).is_err());
    }

    // -- validate_owner -------------------------------------------------------

    #[test]
    fn absent_owner_is_valid() {
        assert!(validate_owner(None).is_ok());
    }

    #[test]
    fn present_owner_is_valid() {
        assert!(validate_owner(Some("studio-42")).is_ok());
    }

    #[test]
    fn blank_owner_rejected() {
        assert!(validate_owner(Some("  ")).is_err());
    }

    #[test]
    fn oversized_owner_rejected() {
        let owner = "o".repeat(129);
        assert!(validate_owner(Some(&owner)).is_err());
    }
}
