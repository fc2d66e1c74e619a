//! Library crate for quiz-rooms-back, exposing modules for binaries and integration tests.

/// Runtime configuration from file and environment.
pub mod config;
/// Entities and room store backends.
pub mod dao;
/// Wire types of the HTTP API.
pub mod dto;
/// Service errors and their HTTP mapping.
pub mod error;
/// axum routers and handlers.
pub mod routes;
/// Room, game and history operations.
pub mod services;
/// Shared application state and room rules.
pub mod state;
