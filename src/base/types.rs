//! Common types and result aliases used throughout the application.

use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// The kind of conversation an inbound message arrived on.
///
/// Only [`ChannelKind::Direct`] messages are answered; everything else is
/// filtered out by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// A direct-message conversation between the bot and one user.
    Direct,
    /// Any other conversation type (public channel, group, mpim, etc.).
    Other,
}

/// An inbound message event, normalized from the chat platform's push event.
///
/// Consumed exactly once by a single pipeline run.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel_id: String,
    pub channel_kind: ChannelKind,
    pub user_id: String,
    pub text: String,
    /// Platform timestamp id of the event; also the exclusive upper bound for
    /// the history fetch.
    pub ts: String,
}

/// A single historical message, as returned by the platform's history API.
///
/// History batches arrive newest-first.
#[derive(Debug, Clone)]
pub struct HistoryMessage {
    /// Author of the message; `None` for bot/system messages.
    pub user_id: Option<String>,
    pub text: String,
    pub ts: String,
}

/// The answer service's response to a single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    pub text: String,
    #[serde(default, rename = "sourceDocuments")]
    pub source_documents: Vec<SourceDocument>,
}

/// A cited source document returned alongside an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub metadata: SourceMetadata,
}

/// Source document metadata. The title is the deduplication key; unknown
/// fields are retained so foreign metadata shapes deserialize cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SourceDocument {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            metadata: SourceMetadata {
                title: Some(title.into()),
                url: Some(url.into()),
                extra: Default::default(),
            },
        }
    }
}

/// A platform-neutral display block within a rendered message.
///
/// The chat client converts these to the platform's block format at the wire
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBlock {
    Markdown(String),
    Divider,
}

/// A fully rendered message: fallback text plus structured blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub text: String,
    pub blocks: Vec<MessageBlock>,
}

/// Identity of a posted message, returned by the post step and threaded
/// explicitly into the update step. Exclusively owned by one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub channel_id: String,
    pub ts: String,
}
