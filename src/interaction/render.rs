//! Pure builders for the two messages a pipeline run posts: the loading
//! placeholder and the final answer with its source citations.

use crate::base::types::{MessageBlock, RenderedMessage, SourceDocument};

/// Fallback text of the loading placeholder.
pub const LOADING_TEXT: &str = "Thinking...";

/// Markdown shown in the placeholder's block form.
const LOADING_MARKDOWN: &str = "Thinking... :thinking_face:";

/// Header above the cited sources in the final message.
const SOURCES_HEADER: &str = "*Top Source Documents:*";

/// Build the loading placeholder posted immediately on receipt of a question.
pub fn render_loading() -> RenderedMessage {
    RenderedMessage {
        text: LOADING_TEXT.to_string(),
        blocks: vec![MessageBlock::Markdown(LOADING_MARKDOWN.to_string())],
    }
}

/// Build the final answer message.
///
/// Blocks are: the answer text, a divider, the sources header, then one block
/// per source. The header is emitted even when there are no sources. Indexing
/// is 1-based and reflects the post-deduplication order.
pub fn render_final(answer_text: &str, sources: &[SourceDocument]) -> RenderedMessage {
    let mut blocks = vec![
        MessageBlock::Markdown(answer_text.to_string()),
        MessageBlock::Divider,
        MessageBlock::Markdown(SOURCES_HEADER.to_string()),
    ];

    blocks.extend(
        sources
            .iter()
            .enumerate()
            .map(|(i, doc)| MessageBlock::Markdown(source_line(i + 1, doc))),
    );

    RenderedMessage {
        text: answer_text.to_string(),
        blocks,
    }
}

/// Render one source citation line.
///
/// A source without a url renders as bold text instead of a link; a missing
/// title falls back to `(untitled)`. Malformed sources never abort the run.
fn source_line(index: usize, doc: &SourceDocument) -> String {
    let title = doc.metadata.title.as_deref().unwrap_or("(untitled)");

    match doc.metadata.url.as_deref() {
        Some(url) => format!("*<{url}|Source {index}: {title}>*"),
        None => format!("*Source {index}: {title}*"),
    }
}
