//! Deduplication of cited source documents.

use std::collections::HashSet;

use crate::base::types::SourceDocument;

/// Drop every source whose title already appeared earlier in the sequence.
///
/// First occurrence wins and the surviving documents keep their relative
/// order. Titles compare by exact string equality. A document with no title
/// is treated as always-unique and is never dropped.
pub fn dedup_sources(sources: Vec<SourceDocument>) -> Vec<SourceDocument> {
    let mut seen = HashSet::new();

    sources
        .into_iter()
        .filter(|doc| match &doc.metadata.title {
            Some(title) => seen.insert(title.clone()),
            None => true,
        })
        .collect()
}
