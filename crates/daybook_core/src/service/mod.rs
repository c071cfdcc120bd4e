//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and search calls into use-case level APIs.
//! - Keep embedding layers decoupled from storage details.

pub mod calendar_service;
