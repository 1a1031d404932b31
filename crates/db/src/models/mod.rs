//! Entity models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct
//! matching the database row, plus the `Deserialize` DTOs used by the
//! HTTP layer.

pub mod status;
pub mod task;
