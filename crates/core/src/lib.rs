//! Pure domain logic shared by every Cineforge crate.
//!
//! No internal dependencies and no I/O. Holds the error taxonomy, shared
//! type aliases, and the validation rules for generation prompts and
//! screenplay content.

pub mod error;
pub mod script;
pub mod task;
pub mod types;
