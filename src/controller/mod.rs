mod clock;
mod controller;
mod export;

pub use clock::{Clock, SystemClock};
#[allow(unused_imports)]
pub use clock::ManualClock;
pub use controller::{
    ControllerError, DocumentController, ImportSummary, PendingSave, ResetFinal, ResetOverview,
    AUTOSAVE_INTERVAL_MS, DEBOUNCE_MS,
};
pub use export::{parse_import, ExportEnvelope, ExportMetadata, ImportError, ImportPayload};
