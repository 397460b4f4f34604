pub mod ids;
pub mod logging;

pub use ids::{allocate_local_id, LocalIdError, LOCAL_ID_MAX_GENERATION_ATTEMPTS};
pub use logging::{append_builder_log_line, builder_log_path};
