//! Core types for the municipal assistant.
//! This crate contains the shared domain vocabulary and the pure decision
//! logic (chunking, category detection, follow-up resolution). No I/O.

pub mod category;
pub mod chunker;
pub mod followup;

pub use category::{classify_query, classify_url, Category};
pub use chunker::{chunks, ChunkConfig};
pub use followup::{is_acknowledgement, resolve_category};

use serde::{Deserialize, Serialize};

// CONVERSATION TURN //

/// One turn of the widget conversation, supplied by the client on each
/// request as a bounded recent-history window. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(rename = "type")]
    pub turn_type: TurnType,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnType {
    Question,
    Answer,
}

impl ConversationTurn {
    pub fn question(text: impl Into<String>) -> Self {
        Self {
            turn_type: TurnType::Question,
            text: text.into(),
        }
    }

    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            turn_type: TurnType::Answer,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_wire_format() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"type":"question","text":"Vad kostar bygglov?"}"#).unwrap();
        assert_eq!(turn.turn_type, TurnType::Question);
        assert_eq!(turn.text, "Vad kostar bygglov?");

        let json = serde_json::to_string(&ConversationTurn::answer("...")).unwrap();
        assert!(json.contains(r#""type":"answer""#));
    }
}
