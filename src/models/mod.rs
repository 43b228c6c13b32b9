mod category;
mod document;
mod item;
mod snapshot;

pub use category::{Category, ALL_CATEGORIES};
pub use document::Document;
pub use item::{Item, ItemField};
pub use snapshot::{HistoryLog, Snapshot};
