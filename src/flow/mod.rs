pub mod items;
pub mod model;

pub use items::{add_item, clear_items, remove_item, reorder_items, update_item, ItemPatch};
pub use model::{Flow, FlowId, FlowItem, FlowLevel, FlowStyle, Side};

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("flow already holds the maximum of {max_items} items")]
    ItemLimitReached { max_items: usize },
    #[error("unknown flow item `{local_id}`")]
    UnknownItem { local_id: String },
    #[error("item duration must be greater than zero")]
    InvalidDuration,
    #[error("failed to allocate item id: {0}")]
    LocalId(#[from] crate::shared::LocalIdError),
}
