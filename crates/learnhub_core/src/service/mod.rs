//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and remote calls into use-case level APIs.
//! - Keep FFI/UI layers decoupled from storage and transport details.
//!
//! # Invariants
//! - Input validation happens here, before any remote call or write.
//! - Each service reports failures through its own error enum with a
//!   human-readable `Display`.

pub mod auth_service;
pub mod content_service;
pub mod engagement_service;
pub mod progress_service;
pub mod quiz_service;
pub mod teacher_service;
