//! Cineforge API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! submission dispatcher, callback reconciliation) so integration tests
//! and the binary entrypoint can both access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod reconcile;
pub mod response;
pub mod routes;
pub mod state;
pub mod submit;
