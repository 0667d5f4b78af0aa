//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the external collaborators of the
//! pipeline:
//! - Chat services (e.g., Slack)
//! - The retrieval-augmented answer service
//!
//! Each service module defines a generic trait plus concrete implementations,
//! allowing for extensibility and easy testing.

pub mod answer;
pub mod chat;
