use super::state::BuilderState;
use crate::catalog::CatalogEntry;
use crate::flow::{
    add_item, remove_item, reorder_items, update_item, FlowError, FlowLevel, FlowStyle, ItemPatch,
};

/// Discrete editing inputs. Every command is a pure transition over the
/// builder state; network effects live in the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderCommand {
    AddItem { entry: CatalogEntry },
    UpdateItem { local_id: String, patch: ItemPatch },
    RemoveItem { local_id: String },
    ClearFlow,
    Reorder { source: usize, target: usize },
    SetTitle { title: String },
    SetStyle { style: FlowStyle },
    SetLevel { level: FlowLevel },
    SetTargetDuration { minutes: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    ItemAdded { local_id: String },
    ItemUpdated { local_id: String },
    ItemRemoved { local_id: String },
    FlowCleared,
    Reordered,
    ReorderIgnored,
    MetadataChanged,
}

/// Applies one command. Successful mutations mark the state dirty; a rejected
/// command leaves both the flow and the sync state untouched. A reorder that
/// resolves to a no-op is not a mutation and stays clean.
pub fn apply_command(
    state: &mut BuilderState,
    command: BuilderCommand,
    now_ms: i64,
) -> Result<CommandOutcome, FlowError> {
    match command {
        BuilderCommand::AddItem { entry } => {
            let max_items = state.quota().max_items_per_flow;
            let local_id = add_item(&mut state.flow, &entry, max_items, now_ms)?;
            state.mark_dirty();
            Ok(CommandOutcome::ItemAdded { local_id })
        }
        BuilderCommand::UpdateItem { local_id, patch } => {
            update_item(&mut state.flow, &local_id, patch)?;
            state.mark_dirty();
            Ok(CommandOutcome::ItemUpdated { local_id })
        }
        BuilderCommand::RemoveItem { local_id } => {
            remove_item(&mut state.flow, &local_id)?;
            state.mark_dirty();
            Ok(CommandOutcome::ItemRemoved { local_id })
        }
        BuilderCommand::ClearFlow => {
            state.reset();
            Ok(CommandOutcome::FlowCleared)
        }
        BuilderCommand::Reorder { source, target } => {
            if reorder_items(&mut state.flow, source, target) {
                state.mark_dirty();
                Ok(CommandOutcome::Reordered)
            } else {
                Ok(CommandOutcome::ReorderIgnored)
            }
        }
        BuilderCommand::SetTitle { title } => {
            state.flow.title = title;
            state.mark_dirty();
            Ok(CommandOutcome::MetadataChanged)
        }
        BuilderCommand::SetStyle { style } => {
            state.flow.style = style;
            state.mark_dirty();
            Ok(CommandOutcome::MetadataChanged)
        }
        BuilderCommand::SetLevel { level } => {
            state.flow.level = level;
            state.mark_dirty();
            Ok(CommandOutcome::MetadataChanged)
        }
        BuilderCommand::SetTargetDuration { minutes } => {
            state.flow.target_duration_minutes = minutes;
            state.mark_dirty();
            Ok(CommandOutcome::MetadataChanged)
        }
    }
}
