//! Library root for `answer-bot`.
//!
//! Answer-bot is a Slack assistant that answers direct messages with help
//! from a retrieval-augmented answer service:
//! - Posts a "Thinking..." placeholder as soon as a question arrives
//! - Gathers recent conversation history as a role-labeled transcript
//! - Queries the answer service with the question and transcript
//! - Edits the placeholder in place with the answer and deduplicated source
//!   citations
//!
//! The bot integrates with Slack for chat and an HTTP answer service for
//! responses. The architecture is built around extensible traits that allow
//! for different implementations of each service.

#[warn(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the answer-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with answer and chat clients
/// - Starts the socket-mode event loop for processing direct messages
pub async fn start(config: Config) -> Void {
    info!("Starting answer-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().unwrap();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
