//! Client side of the word pool: backend access, local snapshot cache,
//! the observable store, and the view route table.

pub mod api;
pub mod cache;
pub mod error;
mod lanes;
pub mod router;
pub mod store;

pub use api::{HttpWordApi, WordApi};
pub use cache::{EphemeralCache, SnapshotCache};
pub use error::StoreError;
pub use router::{routes, Route};
pub use store::{WordPoolSnapshot, WordStore, DEFAULT_CACHE_KEY};
