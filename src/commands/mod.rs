mod config_cmd;
mod history_cmd;
mod item;
mod project;
mod session;

pub use config_cmd::ConfigCommand;
pub use history_cmd::HistoryCommand;
pub use item::{AddCommand, DeleteCommand, ListCommand, UpdateCommand};
pub use project::{ExportCommand, ImportCommand, ResetCommand};
pub use session::SessionCommand;

use std::sync::Arc;

use crate::config::Config;
use crate::controller::{Clock, DocumentController, SystemClock};
use crate::history::{HistoryBridge, MemoryHistory};
use crate::store::{FileSessionStore, SnapshotStore};

/// Wires a controller over the configured session directory.
///
/// `state` is the snapshot id to start from, playing the role of the
/// address-bar query parameter.
pub(crate) fn open_controller(config: &Config, state: Option<&str>) -> DocumentController {
    let session = FileSessionStore::new(&config.data_dir);
    let store = SnapshotStore::open(Box::new(session), SystemClock.now_ms());

    let initial_url = match state {
        Some(id) => format!("{}?state={}", config.base_url, urlencoding::encode(id)),
        None => config.base_url.clone(),
    };
    let bridge = HistoryBridge::new(
        Box::new(MemoryHistory::with_initial_url(&initial_url)),
        &config.base_url,
    );

    DocumentController::new(
        store,
        bridge,
        Arc::new(SystemClock),
        &config.project_name,
        Some(&initial_url),
    )
}
