// Follow-up resolution. Short acknowledgements ("ja", "ok") carry no
// topical signal of their own, so the effective category comes from the
// most recent substantive question in the conversation.

use crate::category::{classify_query, Category};
use crate::{ConversationTurn, TurnType};
use regex::Regex;
use std::sync::OnceLock;

/// A prior question shorter than this is ignored when walking history;
/// it is most likely another acknowledgement.
const MIN_QUESTION_LEN: usize = 10;

fn ack_pattern() -> &'static Regex {
    static ACK: OnceLock<Regex> = OnceLock::new();
    ACK.get_or_init(|| {
        Regex::new(r"(?i)^(ja|nej|ok|gärna|kanske|inte|visst|absolut)$").unwrap()
    })
}

/// Whole-string, case-insensitive match against the closed set of
/// affirmative/neutral tokens.
pub fn is_acknowledgement(query: &str) -> bool {
    ack_pattern().is_match(query.trim())
}

/// Decide the effective category for `query`.
///
/// Acknowledgements inherit the category of the latest substantive
/// question in `history` (most-recent-last); anything else is classified
/// directly. Returns `None` when no topical signal exists either way.
pub fn resolve_category(query: &str, history: &[ConversationTurn]) -> Option<Category> {
    if is_acknowledgement(query) {
        history
            .iter()
            .rev()
            .find(|turn| {
                turn.turn_type == TurnType::Question && turn.text.chars().count() > MIN_QUESTION_LEN
            })
            .and_then(|turn| classify_query(&turn.text))
    } else {
        classify_query(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acknowledgement_set() {
        for token in ["ja", "nej", "ok", "gärna", "kanske", "inte", "visst", "absolut"] {
            assert!(is_acknowledgement(token), "{token} should match");
        }
        assert!(is_acknowledgement("JA"));
        assert!(is_acknowledgement(" ok "));
        // whole-string only
        assert!(!is_acknowledgement("ja tack så mycket"));
        assert!(!is_acknowledgement("okej"));
    }

    #[test]
    fn test_follow_up_inherits_category() {
        let history = vec![
            ConversationTurn::question("Hur ansöker jag om bygglov?"),
            ConversationTurn::answer("Du ansöker via kommunens e-tjänst..."),
        ];
        assert_eq!(
            resolve_category("ja", &history),
            Some(Category::ByggaBoMiljo)
        );
    }

    #[test]
    fn test_follow_up_skips_short_questions() {
        let history = vec![
            ConversationTurn::question("Vad kostar en plats på förskolan?"),
            ConversationTurn::answer("Avgiften beror på inkomst..."),
            ConversationTurn::question("ja"),
            ConversationTurn::answer("Här är mer information..."),
        ];
        // "ja" in history is too short; the real question wins.
        assert_eq!(
            resolve_category("gärna", &history),
            Some(Category::UtbildningForskola)
        );
    }

    #[test]
    fn test_follow_up_without_usable_history() {
        assert_eq!(resolve_category("ja", &[]), None);

        let only_answers = vec![ConversationTurn::answer("Ett långt svar om någonting.")];
        assert_eq!(resolve_category("ok", &only_answers), None);
    }

    #[test]
    fn test_substantive_query_classified_directly() {
        let history = vec![
            ConversationTurn::question("När öppnar biblioteket?"),
            ConversationTurn::answer("Klockan 10."),
        ];
        // A real question ignores history even when history exists.
        assert_eq!(
            resolve_category("Var hittar jag parkering?", &history),
            Some(Category::TrafikInfrastruktur)
        );
    }
}
