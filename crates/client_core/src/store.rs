use std::sync::Arc;

use rand::RngExt;
use shared::{
    domain::{duplicate_words, Word},
    protocol::{UpsertOutcome, UpsertWordRequest},
};
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};

use crate::{
    api::WordApi,
    cache::SnapshotCache,
    error::StoreError,
    lanes::{LaneKey, Lanes},
};

pub const DEFAULT_CACHE_KEY: &str = "words";

/// Observable state of the word pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordPoolSnapshot {
    pub words: Vec<Word>,
    pub loading: bool,
}

/// Word pool state holder. Mirrors every successful backend mutation into
/// the snapshot cache and notifies subscribers.
///
/// Operations targeting the same word run one at a time in call order.
/// `load_words` runs alone: it waits for running word operations and holds
/// off new ones until the list is committed. The in-memory update
/// and the cache write that mirrors it happen under one commit lock, so the
/// cache always holds the latest committed pool.
pub struct WordStore {
    api: Arc<dyn WordApi>,
    cache: Arc<dyn SnapshotCache>,
    cache_key: String,
    state: watch::Sender<WordPoolSnapshot>,
    commit: Mutex<()>,
    lanes: Lanes,
}

struct LoadingFlag<'a> {
    state: &'a watch::Sender<WordPoolSnapshot>,
}

impl<'a> LoadingFlag<'a> {
    fn raise(state: &'a watch::Sender<WordPoolSnapshot>) -> Self {
        state.send_modify(|snapshot| snapshot.loading = true);
        Self { state }
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|snapshot| snapshot.loading = false);
    }
}

impl WordStore {
    /// Seeds the pool from the cached snapshot under `cache_key`. A missing
    /// snapshot starts empty; an unreadable one is logged and ignored.
    pub async fn open(
        api: Arc<dyn WordApi>,
        cache: Arc<dyn SnapshotCache>,
        cache_key: impl Into<String>,
    ) -> Self {
        let cache_key = cache_key.into();
        let words = match cache.read_snapshot(&cache_key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Word>>(&raw) {
                Ok(words) => words,
                Err(err) => {
                    warn!(key = %cache_key, error = %err, "ignoring corrupt word pool snapshot");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(key = %cache_key, error = %format!("{err:#}"), "failed to read word pool snapshot");
                Vec::new()
            }
        };
        info!(count = words.len(), key = %cache_key, "seeded word pool from local cache");

        let (state, _) = watch::channel(WordPoolSnapshot {
            words,
            loading: false,
        });
        Self {
            api,
            cache,
            cache_key,
            state,
            commit: Mutex::new(()),
            lanes: Lanes::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WordPoolSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> WordPoolSnapshot {
        self.state.borrow().clone()
    }

    pub fn words(&self) -> Vec<Word> {
        self.state.borrow().words.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn len(&self) -> usize {
        self.state.borrow().words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().words.is_empty()
    }

    pub fn find(&self, word: &str) -> Option<Word> {
        self.state
            .borrow()
            .words
            .iter()
            .find(|entry| entry.word == word)
            .cloned()
    }

    /// Number of operations currently running or queued, one per busy lane.
    pub fn in_flight(&self) -> usize {
        self.lanes.active_lanes()
    }

    /// Replaces the pool with the backend's full list. Returns the number of
    /// words loaded.
    pub async fn load_words(&self) -> Result<usize, StoreError> {
        let _lane = self.lanes.acquire(LaneKey::Collection).await;
        let _loading = LoadingFlag::raise(&self.state);

        let result = self.replace_from_backend().await;
        if let Err(err) = &result {
            error!(error = %err, "failed to load word pool");
        }
        result
    }

    async fn replace_from_backend(&self) -> Result<usize, StoreError> {
        let fetched = self.api.list_words().await?;
        let duplicates = duplicate_words(&fetched);
        if !duplicates.is_empty() {
            warn!(?duplicates, "word service returned duplicate entries");
        }

        let count = fetched.len();
        self.commit(move |words| *words = fetched).await?;
        info!(count, "loaded word pool");
        Ok(count)
    }

    /// Upserts `word` on the backend and returns the entry as now held locally.
    /// A record echoed by the backend wins; otherwise a blank `definition`
    /// keeps whatever definition the entry already had.
    pub async fn add_word(&self, word: &str, definition: &str) -> Result<Word, StoreError> {
        let _lane = self.lanes.acquire(LaneKey::Word(word.to_string())).await;

        let request = UpsertWordRequest {
            word: word.to_string(),
            definition: definition.to_string(),
        };
        let result = self.upsert(request).await;
        if let Err(err) = &result {
            error!(word, error = %err, "failed to write word");
        }
        result
    }

    async fn upsert(&self, request: UpsertWordRequest) -> Result<Word, StoreError> {
        let outcome = self.api.upsert_word(&request).await?;
        let authoritative = matches!(outcome, UpsertOutcome::Stored(_));
        let stored = self
            .commit(|words| apply_upsert(words, &request, outcome))
            .await?;
        info!(word = %stored.word, authoritative, "stored word");
        Ok(stored)
    }

    /// Deletes `word` on the backend, then drops every local entry with that
    /// exact word. Returns whether anything was removed locally.
    pub async fn delete_word(&self, word: &str) -> Result<bool, StoreError> {
        let _lane = self.lanes.acquire(LaneKey::Word(word.to_string())).await;

        let result = self.remove(word).await;
        if let Err(err) = &result {
            error!(word, error = %err, "failed to delete word");
        }
        result
    }

    async fn remove(&self, word: &str) -> Result<bool, StoreError> {
        self.api.delete_word(word).await?;
        let removed = self
            .commit(|words| {
                let before = words.len();
                words.retain(|entry| entry.word != word);
                words.len() != before
            })
            .await?;
        info!(word, removed, "deleted word");
        Ok(removed)
    }

    /// Uniformly random entry of the current pool, `None` when it is empty.
    pub fn random_word(&self) -> Option<Word> {
        let state = self.state.borrow();
        if state.words.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..state.words.len());
        state.words.get(index).cloned()
    }

    /// Writes the whole pool to the cache, replacing the previous snapshot.
    pub async fn save_local(&self) -> Result<(), StoreError> {
        let _commit = self.commit.lock().await;
        let result = self.persist().await;
        if let Err(err) = &result {
            error!(error = %err, "failed to save word pool snapshot");
        }
        result
    }

    /// Flushes the pool to the cache and tears the store down.
    pub async fn close(self) -> Result<(), StoreError> {
        self.save_local().await
    }

    /// Applies `apply` to the pool, notifies subscribers and mirrors the
    /// result to the cache. The in-memory update stands even if the cache
    /// write fails.
    async fn commit<R>(&self, apply: impl FnOnce(&mut Vec<Word>) -> R) -> Result<R, StoreError> {
        let _commit = self.commit.lock().await;

        let mut words = self.state.borrow().words.clone();
        let outcome = apply(&mut words);
        self.state.send_modify(|snapshot| snapshot.words = words);

        self.persist().await?;
        Ok(outcome)
    }

    // callers hold the commit lock
    async fn persist(&self) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(&self.state.borrow().words)?;
        self.cache
            .write_snapshot(&self.cache_key, &serialized)
            .await
            .map_err(StoreError::Cache)
    }
}

fn apply_upsert(words: &mut Vec<Word>, request: &UpsertWordRequest, outcome: UpsertOutcome) -> Word {
    let existing = words.iter().position(|entry| entry.word == request.word);
    match (existing, outcome) {
        (Some(index), UpsertOutcome::Stored(stored)) => {
            words[index] = stored.clone();
            stored
        }
        (None, UpsertOutcome::Stored(stored)) => {
            words.push(stored.clone());
            stored
        }
        (Some(index), UpsertOutcome::Accepted) => {
            words[index].merge_definition(&request.definition);
            words[index].clone()
        }
        (None, UpsertOutcome::Accepted) => {
            let created = Word::new(request.word.clone(), request.definition.clone());
            words.push(created.clone());
            created
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
