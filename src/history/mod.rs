mod bridge;
mod navigation;

pub use bridge::{HistoryBridge, Resolution, ResolvedFrom};
pub use navigation::{MemoryHistory, NavEvent, NavState, NavigationHistory};
