use serde::{Deserialize, Serialize};

/// One vocabulary entry. `word` identifies the entry within a pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub reviewed: u32,
}

impl Word {
    pub fn new(word: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            definition: definition.into(),
            reviewed: 0,
        }
    }

    /// Applies a client-side upsert: a blank definition never clears an existing one.
    pub fn merge_definition(&mut self, definition: &str) {
        if !definition.is_empty() {
            self.definition = definition.to_string();
        }
    }
}

/// Returns the words that occur more than once, in first-seen order.
pub fn duplicate_words(words: &[Word]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates = Vec::new();
    for entry in words {
        if !seen.insert(entry.word.as_str()) && !duplicates.contains(&entry.word.as_str()) {
            duplicates.push(entry.word.as_str());
        }
    }
    duplicates
}
