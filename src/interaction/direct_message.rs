//! The per-event message pipeline.
//!
//! Each accepted direct message flows through a fixed sequence of stages:
//! post a loading placeholder, fetch recent history, query the answer
//! service, deduplicate the cited sources, and edit the placeholder with the
//! final answer. Stages are modeled explicitly so retry or timeout policies
//! can later be attached per stage without restructuring control flow.

use std::fmt;

use tracing::{Instrument, debug, error, instrument};

use crate::{
    base::types::{ChannelKind, Err, InboundMessage, MessageHandle},
    interaction::{render, sources, transcript},
    service::{answer::AnswerClient, chat::ChatClient},
};

/// The stages of a pipeline run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Filtering,
    PostingPlaceholder,
    FetchingHistory,
    QueryingAnswerService,
    Deduplicating,
    UpdatingMessage,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Filtering => "filtering",
            PipelineStage::PostingPlaceholder => "posting placeholder",
            PipelineStage::FetchingHistory => "fetching history",
            PipelineStage::QueryingAnswerService => "querying answer service",
            PipelineStage::Deduplicating => "deduplicating sources",
            PipelineStage::UpdatingMessage => "updating message",
            PipelineStage::Done => "done",
        };

        f.write_str(name)
    }
}

/// A collaborator failure, tagged with the stage it occurred in.
///
/// The placeholder message, if already posted, is left in its last-written
/// state; there is no rollback.
#[derive(Debug)]
pub struct PipelineError {
    pub stage: PipelineStage,
    pub source: Err,
}

impl PipelineError {
    fn at(stage: PipelineStage) -> impl FnOnce(Err) -> Self {
        move |source| Self { stage, source }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipeline failed while {}: {}", self.stage, self.source)
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Terminal result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The event did not match the direct-message criteria; nothing was
    /// posted and no collaborator was called.
    Filtered,
    /// The placeholder identified by the handle was updated with the final
    /// answer.
    Completed(MessageHandle),
}

/// Whether an inbound message should be answered at all.
///
/// Only non-empty direct messages from someone other than the bot itself
/// pass. Everything else is dropped without a diagnostic; this is a filter,
/// not a validator.
pub fn accepts(event: &InboundMessage, bot_user_id: &str) -> bool {
    event.channel_kind == ChannelKind::Direct && !event.text.is_empty() && event.user_id != bot_user_id
}

/// Handle an inbound message event.
///
/// Spawns an independent task per event; concurrent runs do not interact and
/// each owns its placeholder handle exclusively.
#[instrument(skip_all)]
pub fn handle_direct_message(event: InboundMessage, chat: ChatClient, answer: AnswerClient, history_limit: u16) {
    tokio::spawn(async move {
        // Process the event.
        let result = run_pipeline(&event, &chat, &answer, history_limit).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Run the pipeline for one inbound message.
///
/// Exactly one placeholder post and exactly one update happen per accepted
/// event; the four collaborator calls occur strictly in this order.
#[instrument(skip_all)]
pub async fn run_pipeline(
    event: &InboundMessage,
    chat: &ChatClient,
    answer: &AnswerClient,
    history_limit: u16,
) -> Result<PipelineOutcome, PipelineError> {
    // Filtering.
    if !accepts(event, chat.bot_user_id()) {
        debug!("Ignoring event that is not a non-empty direct message.");
        return Ok(PipelineOutcome::Filtered);
    }

    // Posting placeholder.
    let handle = chat
        .post_message(&event.channel_id, &render::render_loading())
        .await
        .map_err(PipelineError::at(PipelineStage::PostingPlaceholder))?;

    // Fetching history.
    let history = chat
        .fetch_history(&event.channel_id, &event.ts, history_limit)
        .await
        .map_err(PipelineError::at(PipelineStage::FetchingHistory))?;

    let lines = transcript::format_transcript(&history, &event.user_id);

    // Querying answer service.
    let result = answer
        .answer(&event.text, &lines)
        .await
        .map_err(PipelineError::at(PipelineStage::QueryingAnswerService))?;

    // Deduplicating. Synchronous and infallible.
    let deduped = sources::dedup_sources(result.source_documents);

    // Updating message.
    chat.update_message(&handle, &render::render_final(&result.text, &deduped))
        .await
        .map_err(PipelineError::at(PipelineStage::UpdatingMessage))?;

    Ok(PipelineOutcome::Completed(handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: ChannelKind, user_id: &str, text: &str) -> InboundMessage {
        InboundMessage {
            channel_id: "D123".to_string(),
            channel_kind: kind,
            user_id: user_id.to_string(),
            text: text.to_string(),
            ts: "1700000000.000100".to_string(),
        }
    }

    #[test]
    fn accepts_non_empty_direct_messages() {
        assert!(accepts(&event(ChannelKind::Direct, "U1", "What is X?"), "UBOT"));
    }

    #[test]
    fn rejects_non_direct_channels() {
        assert!(!accepts(&event(ChannelKind::Other, "U1", "What is X?"), "UBOT"));
    }

    #[test]
    fn rejects_empty_text() {
        assert!(!accepts(&event(ChannelKind::Direct, "U1", ""), "UBOT"));
    }

    #[test]
    fn rejects_own_messages() {
        assert!(!accepts(&event(ChannelKind::Direct, "UBOT", "Thinking..."), "UBOT"));
    }

    #[test]
    fn error_display_names_the_stage() {
        let err = PipelineError {
            stage: PipelineStage::FetchingHistory,
            source: anyhow::anyhow!("boom"),
        };

        assert_eq!(err.to_string(), "pipeline failed while fetching history: boom");
    }
}
