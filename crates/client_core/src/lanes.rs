use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use tokio::sync::{
    Mutex, OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock,
};

/// What an operation targets. Operations with equal keys never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LaneKey {
    Collection,
    Word(String),
}

/// Per-key FIFO sequencing. Waiters are admitted in the order they called
/// [`Lanes::acquire`]. The collection lane also excludes every word lane:
/// word operations share `scope`, a collection operation holds it alone.
#[derive(Default)]
pub struct Lanes {
    lanes: StdMutex<HashMap<LaneKey, Arc<Mutex<()>>>>,
    scope: Arc<RwLock<()>>,
}

pub struct LaneGuard {
    _shared: Option<OwnedRwLockReadGuard<()>>,
    _exclusive: Option<OwnedRwLockWriteGuard<()>>,
    _lane: OwnedMutexGuard<()>,
}

impl Lanes {
    pub async fn acquire(&self, key: LaneKey) -> LaneGuard {
        let exclusive = key == LaneKey::Collection;
        let lane = {
            let mut lanes = self
                .lanes
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            // a count of one means only the map still references the lane
            lanes.retain(|_, lane| Arc::strong_count(lane) > 1);
            lanes.entry(key).or_default().clone()
        };
        let lane = lane.lock_owned().await;
        let (shared, exclusive) = if exclusive {
            (None, Some(self.scope.clone().write_owned().await))
        } else {
            (Some(self.scope.clone().read_owned().await), None)
        };
        LaneGuard {
            _shared: shared,
            _exclusive: exclusive,
            _lane: lane,
        }
    }

    pub fn active_lanes(&self) -> usize {
        self.lanes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|lane| Arc::strong_count(lane) > 1)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_key_waits_for_previous_holder() {
        let lanes = Arc::new(Lanes::default());
        let first = lanes.acquire(LaneKey::Word("cat".into())).await;

        let waiter = {
            let lanes = lanes.clone();
            tokio::spawn(async move {
                let _guard = lanes.acquire(LaneKey::Word("cat".into())).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(first);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter admitted")
            .expect("join");
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let lanes = Lanes::default();
        let _cat = lanes.acquire(LaneKey::Word("cat".into())).await;
        let _dog = tokio::time::timeout(
            Duration::from_secs(1),
            lanes.acquire(LaneKey::Word("dog".into())),
        )
        .await
        .expect("independent lane");
        assert_eq!(lanes.active_lanes(), 2);
    }

    #[tokio::test]
    async fn collection_lane_waits_for_word_lanes_and_blocks_new_ones() {
        let lanes = Arc::new(Lanes::default());
        let cat = lanes.acquire(LaneKey::Word("cat".into())).await;

        let collection = {
            let lanes = lanes.clone();
            tokio::spawn(async move {
                let _guard = lanes.acquire(LaneKey::Collection).await;
                tokio::time::sleep(Duration::from_millis(100)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!collection.is_finished());

        drop(cat);
        tokio::time::sleep(Duration::from_millis(20)).await;
        let dog = tokio::time::timeout(
            Duration::from_millis(30),
            lanes.acquire(LaneKey::Word("dog".into())),
        )
        .await;
        assert!(dog.is_err(), "word lane admitted while collection lane is held");

        collection.await.expect("join");
        tokio::time::timeout(
            Duration::from_secs(1),
            lanes.acquire(LaneKey::Word("dog".into())),
        )
        .await
        .expect("word lane after collection lane");
    }

    #[tokio::test]
    async fn idle_lanes_are_pruned() {
        let lanes = Lanes::default();
        drop(lanes.acquire(LaneKey::Word("cat".into())).await);
        drop(lanes.acquire(LaneKey::Word("dog".into())).await);
        let _fox = lanes.acquire(LaneKey::Word("fox".into())).await;

        let tracked = lanes
            .lanes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len();
        assert_eq!(tracked, 1);
        assert_eq!(lanes.active_lanes(), 1);
    }
}
