//! HTTP handler implementations, one module per resource.

pub mod callback;
pub mod script;
pub mod tasks;
