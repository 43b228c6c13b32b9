mod session;
mod snapshot_store;

pub use session::{FileSessionStore, MemorySessionStore, SessionStore, StoreWriteError};
pub use snapshot_store::{HistoryStats, SnapshotStore, MAX_ENTRIES};
