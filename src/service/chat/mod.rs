//! Chat service integration.
//!
//! This module provides functionality for interacting with chat platforms
//! like Slack:
//! - Receiving direct-message events
//! - Posting and updating messages
//! - Retrieving conversation history
//!
//! It defines the `GenericChatClient` trait that can be implemented for
//! different chat services, with a default implementation for Slack.

pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{HistoryMessage, MessageHandle, RenderedMessage, Res, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat
/// platforms. Implementing this trait allows different chat services to be
/// used with answer-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Returns the unique identifier for the bot in the chat platform, used
    /// to filter out the bot's own messages.
    fn bot_user_id(&self) -> &str;

    /// Start the chat client listener.
    ///
    /// This sets up event listeners for the chat platform and begins
    /// processing incoming direct messages.
    async fn start(&self) -> Void;

    /// Post a new message to a channel.
    ///
    /// Returns the handle of the created message so it can later be edited
    /// in place.
    async fn post_message(&self, channel_id: &str, message: &RenderedMessage) -> Res<MessageHandle>;

    /// Overwrite a previously posted message with new content.
    async fn update_message(&self, handle: &MessageHandle, message: &RenderedMessage) -> Void;

    /// Fetch up to `limit` of the most recent messages strictly preceding
    /// `before_ts`, newest-first.
    async fn fetch_history(&self, channel_id: &str, before_ts: &str, limit: u16) -> Res<Vec<HistoryMessage>>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
