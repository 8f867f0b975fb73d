//! Context assembly: grouped article text, source list and summary

use super::SearchResult;

/// Delimiter between article groups in the assembled context block
pub const GROUP_DELIMITER: &str = "\n\n---\n\n";

const NO_RESULTS_CONTEXT: &str = "No relevant news articles were found for this query.";
const NO_RESULTS_SUMMARY: &str = "No relevant information found.";

/// Assembled retrieval output handed to the orchestrator: one delimited
/// context block grouped by article, a deduplicated source list, and a
/// one-line summary.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedContext {
    pub context: String,
    pub sources: Vec<String>,
    pub summary: String,
}

impl RetrievedContext {
    /// Fixed output for an empty result set
    pub fn no_results() -> Self {
        Self {
            context: NO_RESULTS_CONTEXT.to_string(),
            sources: Vec::new(),
            summary: NO_RESULTS_SUMMARY.to_string(),
        }
    }

    /// Assembles search results into a context block.
    ///
    /// Results are expected in the order `search` returns them (descending
    /// relevance). Chunks sharing (source, title) are merged into one group
    /// in first-seen order, headed by the group's highest-relevance member.
    pub fn assemble(results: &[SearchResult]) -> Self {
        if results.is_empty() {
            return Self::no_results();
        }

        let mut groups: Vec<((String, String), Vec<&SearchResult>)> = Vec::new();
        for result in results {
            let key = (
                result.chunk.metadata.source.clone(),
                result.chunk.metadata.title.clone(),
            );
            match groups.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, members)) => members.push(result),
                None => groups.push((key, vec![result])),
            }
        }

        let blocks: Vec<String> = groups
            .iter()
            .map(|(_, members)| {
                let head = members[0];
                let text = members
                    .iter()
                    .map(|m| m.chunk.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "[{}] ({}, {}, relevance: {:.0}%)\n{}",
                    head.chunk.metadata.title,
                    head.chunk.metadata.source,
                    head.chunk.metadata.published_at.format("%Y-%m-%d"),
                    head.relevance * 100.0,
                    text
                )
            })
            .collect();

        let mut sources = Vec::new();
        for ((source, title), _) in &groups {
            let entry = format!("{} - {}", source, title);
            if !sources.contains(&entry) {
                sources.push(entry);
            }
        }

        let average_relevance =
            results.iter().map(|r| r.relevance).sum::<f32>() / results.len() as f32;
        let summary = format!(
            "Retrieved {} chunks from {} articles (average relevance {:.0}%)",
            results.len(),
            groups.len(),
            average_relevance * 100.0
        );

        Self {
            context: blocks.join(GROUP_DELIMITER),
            sources,
            summary,
        }
    }
}
