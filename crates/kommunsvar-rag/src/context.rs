// Context assembly: retrieved chunks become the grounding blob, page
// metadata becomes the deduplicated sources list, and conversation
// history becomes a transcript for the prompt.

use kommunsvar_core::{ConversationTurn, TurnType};
use kommunsvar_store::{ChunkMatch, PageMeta};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Label shown when a chunk carried no category.
const UNKNOWN_CATEGORY: &str = "Okänd";

/// One source link shown next to the answer.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub url: String,
    pub title: String,
    pub category: String,
}

/// Concatenate chunk contents in retrieval order (similarity order, not
/// document order), separated by blank lines.
pub fn build_context(matches: &[ChunkMatch]) -> String {
    matches
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Distinct page ids of the matches, first-seen order.
pub fn distinct_page_ids(matches: &[ChunkMatch]) -> Vec<i64> {
    let mut seen = HashSet::new();
    matches
        .iter()
        .map(|m| m.page_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Deduplicated url -> {title, category} map over the pages behind the
/// matches. Category comes from the chunk (denormalized at ingestion);
/// pages whose chunks carried none show as "Okänd".
pub fn build_sources(matches: &[ChunkMatch], pages: &[PageMeta]) -> Vec<Source> {
    let mut category_by_page: HashMap<i64, &str> = HashMap::new();
    for m in matches {
        if let Some(category) = m.category {
            category_by_page.insert(m.page_id, category.label());
        }
    }

    let mut seen_urls = HashSet::new();
    pages
        .iter()
        .filter(|page| !page.url.is_empty() && !page.title.is_empty())
        .filter(|page| seen_urls.insert(page.url.clone()))
        .map(|page| Source {
            url: page.url.clone(),
            title: page.title.clone(),
            category: category_by_page
                .get(&page.id)
                .copied()
                .unwrap_or(UNKNOWN_CATEGORY)
                .to_string(),
        })
        .collect()
}

/// Textual transcript of the recent turns for the generation prompt.
pub fn build_transcript(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| match turn.turn_type {
            TurnType::Question => format!("Användare: {}", turn.text),
            TurnType::Answer => format!("Assistent: {}", turn.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kommunsvar_core::Category;

    fn chunk(id: i64, page_id: i64, content: &str, similarity: f32, category: Option<Category>) -> ChunkMatch {
        ChunkMatch {
            id,
            page_id,
            content: content.to_string(),
            similarity,
            category,
        }
    }

    fn page(id: i64, url: &str, title: &str) -> PageMeta {
        PageMeta {
            id,
            url: url.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_context_preserves_retrieval_order() {
        let matches = vec![
            chunk(1, 10, "Mest relevant.", 0.9, None),
            chunk(2, 11, "Näst mest relevant.", 0.7, None),
        ];
        assert_eq!(
            build_context(&matches),
            "Mest relevant.\n\nNäst mest relevant."
        );
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn test_sources_deduplicate_by_url() {
        let matches = vec![
            chunk(1, 10, "a", 0.9, Some(Category::ByggaBoMiljo)),
            chunk(2, 10, "b", 0.8, Some(Category::ByggaBoMiljo)),
            chunk(3, 11, "c", 0.7, None),
        ];
        let pages = vec![
            page(10, "https://sandviken.se/bygglov", "Bygglov"),
            page(11, "https://sandviken.se/avgifter", "Avgifter"),
        ];
        let sources = build_sources(&matches, &pages);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].category, "Bygga, bo och miljö");
        assert_eq!(sources[1].category, "Okänd");
    }

    #[test]
    fn test_sources_skip_incomplete_pages() {
        let matches = vec![chunk(1, 10, "a", 0.9, None)];
        let pages = vec![page(10, "", "Utan URL")];
        assert!(build_sources(&matches, &pages).is_empty());
    }

    #[test]
    fn test_distinct_page_ids() {
        let matches = vec![
            chunk(1, 10, "a", 0.9, None),
            chunk(2, 11, "b", 0.8, None),
            chunk(3, 10, "c", 0.7, None),
        ];
        assert_eq!(distinct_page_ids(&matches), vec![10, 11]);
    }

    #[test]
    fn test_transcript_tags() {
        let history = vec![
            ConversationTurn::question("Vad kostar bygglov?"),
            ConversationTurn::answer("Avgiften beror på åtgärden."),
        ];
        assert_eq!(
            build_transcript(&history),
            "Användare: Vad kostar bygglov?\nAssistent: Avgiften beror på åtgärden."
        );
    }
}
