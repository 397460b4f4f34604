pub mod session;
pub mod state;
pub mod transitions;

pub use session::{
    save_response_applies, AutoSave, BuilderSession, CloneOutcome, EditGuard, SaveTicket,
    SessionError,
};
pub use state::{BuilderState, SyncState};
pub use transitions::{apply_command, BuilderCommand, CommandOutcome};
