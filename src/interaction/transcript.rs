//! Turns a raw history batch into a role-labeled transcript.
//!
//! The platform delivers history newest-first; the answer service wants the
//! conversation in reading order, so the formatted lines come out
//! oldest-first.

use crate::base::types::HistoryMessage;

/// Role labels attached to transcript lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptRole {
    /// The message was authored by the user who asked the current question.
    User,
    /// Anything else, including the bot's own replies.
    System,
}

impl TranscriptRole {
    pub fn label(&self) -> &'static str {
        match self {
            TranscriptRole::User => "USER MESSAGE",
            TranscriptRole::System => "SYSTEM RESPONSE",
        }
    }
}

/// Classify a history message relative to the user who triggered the run.
///
/// Messages without an author id (bot and system messages) classify as
/// [`TranscriptRole::System`].
pub fn classify(message: &HistoryMessage, asking_user_id: &str) -> TranscriptRole {
    if message.user_id.as_deref() == Some(asking_user_id) {
        TranscriptRole::User
    } else {
        TranscriptRole::System
    }
}

/// Format a newest-first history batch into oldest-first transcript lines of
/// the form `"<ROLE LABEL>:<text>"`.
///
/// Empty texts pass through untouched; an empty batch yields an empty vec.
pub fn format_transcript(history: &[HistoryMessage], asking_user_id: &str) -> Vec<String> {
    let mut lines: Vec<String> = history
        .iter()
        .map(|message| format!("{}:{}", classify(message, asking_user_id).label(), message.text))
        .collect();

    lines.reverse();

    lines
}
