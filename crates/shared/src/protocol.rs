use serde::{Deserialize, Serialize};

use crate::domain::Word;

pub const WORDS_ROUTE: &str = "/api/words";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertWordRequest {
    pub word: String,
    pub definition: String,
}

/// What an upsert response body may carry. Services that echo the stored
/// record give the client an authoritative value; anything else is opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Stored(Word),
    Accepted,
}

impl UpsertOutcome {
    pub fn from_body(request: &UpsertWordRequest, body: &[u8]) -> Self {
        match serde_json::from_slice::<Word>(body) {
            Ok(stored) if stored.word == request.word => Self::Stored(stored),
            _ => Self::Accepted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(word: &str) -> UpsertWordRequest {
        UpsertWordRequest {
            word: word.to_string(),
            definition: String::new(),
        }
    }

    #[test]
    fn echoed_record_is_authoritative() {
        let body = br#"{"word":"cat","definition":"server side","reviewed":3}"#;
        assert_eq!(
            UpsertOutcome::from_body(&request("cat"), body),
            UpsertOutcome::Stored(Word {
                word: "cat".to_string(),
                definition: "server side".to_string(),
                reviewed: 3,
            })
        );
    }

    #[test]
    fn status_only_bodies_are_opaque() {
        assert_eq!(
            UpsertOutcome::from_body(&request("cat"), br#"{"status":"created"}"#),
            UpsertOutcome::Accepted
        );
        assert_eq!(
            UpsertOutcome::from_body(&request("cat"), b""),
            UpsertOutcome::Accepted
        );
    }

    #[test]
    fn record_for_another_word_is_ignored() {
        let body = br#"{"word":"dog","definition":"","reviewed":0}"#;
        assert_eq!(
            UpsertOutcome::from_body(&request("cat"), body),
            UpsertOutcome::Accepted
        );
    }
}
