pub mod api;

pub use api::{
    FlowApiClient, FlowItemPayload, FlowItemRecord, FlowPayload, FlowRecord, PublicFlowRecord,
    SaveResponse, ShareRecord,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("authentication required")]
    AuthRequired,
    #[error("flow not found")]
    NotFound,
    #[error("shared link has expired")]
    ExpiredLink,
    #[error("flow store rejected the request: {0}")]
    Rejected(String),
    #[error("flow store request failed with status {status}")]
    Server { status: u16 },
    #[error("flow store request failed: {0}")]
    Transport(String),
    #[error("failed to decode flow store response: {0}")]
    Decode(String),
}
