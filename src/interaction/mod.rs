//! Event handling for answer-bot.
//!
//! This module contains the message pipeline and its leaf components:
//! - Filtering and orchestration of direct-message events
//! - Transcript formatting of conversation history
//! - Deduplication of cited source documents
//! - Rendering of the placeholder and final messages

pub mod direct_message;
pub mod render;
pub mod sources;
pub mod transcript;
