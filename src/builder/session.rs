use super::state::{BuilderState, SyncState};
use super::transitions::{apply_command, BuilderCommand, CommandOutcome};
use crate::catalog::DEFAULT_ITEM_DURATION_SECONDS;
use crate::config::Settings;
use crate::flow::{Flow, FlowError, FlowId, FlowItem};
use crate::quota::{SubscriptionTier, Tier};
use crate::remote::{
    ApiError, FlowApiClient, FlowItemPayload, FlowItemRecord, FlowPayload, FlowRecord,
    SaveResponse, ShareRecord,
};
use crate::shared::{allocate_local_id, append_builder_log_line};
use std::path::PathBuf;

const UNTITLED_CLONE_TITLE: &str = "Shared flow";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("sign in to save flows")]
    SaveRequiresAccount,
    #[error("flow title must not be empty")]
    EmptyTitle,
    #[error("sign in to keep building: guests are limited to {max_items} items per flow")]
    GuestItemLimit { max_items: usize },
    #[error("the open flow has unsaved changes")]
    UnsavedChanges,
    #[error("the open flow has never been saved")]
    NeverSaved,
    #[error("a newer save superseded this response")]
    StaleSave,
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What to do with unsaved local edits when a load would replace them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditGuard {
    KeepEdits,
    DiscardEdits,
}

/// Issued when a save is dispatched; a completed save is applied only while
/// its ticket is still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    pub generation: u64,
    pub target: Option<FlowId>,
}

/// A save response may be applied only when no newer save was dispatched and
/// the flow it targeted is still the open flow.
pub fn save_response_applies(
    ticket: &SaveTicket,
    current_generation: u64,
    open_flow_id: Option<&FlowId>,
) -> bool {
    ticket.generation == current_generation && ticket.target.as_ref() == open_flow_id
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneOutcome {
    pub title: String,
    pub items_loaded: usize,
    pub items_dropped: usize,
    pub auto_save: AutoSave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSave {
    Saved { id: FlowId },
    Failed { reason: String },
    NotAttempted,
}

/// Owns the open flow, the saved-flows list, and the remote client. All
/// mutation goes through `apply`; all persistence goes through the explicit
/// save/load/delete/clone/share operations.
#[derive(Debug)]
pub struct BuilderSession {
    state: BuilderState,
    client: FlowApiClient,
    saved: Vec<FlowRecord>,
    saved_list_loaded: bool,
    save_generation: u64,
    state_root: Option<PathBuf>,
}

impl BuilderSession {
    pub fn new(settings: &Settings) -> Self {
        let client = FlowApiClient::new(
            &settings.api_base_url,
            settings.auth_token.clone(),
            settings.request_timeout_seconds,
        );
        Self {
            state: BuilderState::new(settings.tier()),
            client,
            saved: Vec::new(),
            saved_list_loaded: false,
            save_generation: 0,
            state_root: settings.resolve_state_root().ok(),
        }
    }

    pub fn state(&self) -> &BuilderState {
        &self.state
    }

    pub fn saved_flows(&self) -> &[FlowRecord] {
        &self.saved
    }

    pub fn quota_usage(&self) -> (usize, Option<usize>) {
        (self.saved.len(), self.state.quota().max_saved_flows)
    }

    /// Re-classifies the tier after a sign-in or subscription refresh.
    pub fn set_identity(&mut self, is_authenticated: bool, subscription: SubscriptionTier) {
        self.state
            .set_tier(Tier::classify(is_authenticated, subscription));
    }

    pub fn apply(&mut self, command: BuilderCommand) -> Result<CommandOutcome, SessionError> {
        let tier = self.state.tier;
        let outcome = apply_command(&mut self.state, command, now_ms()).map_err(|err| match err {
            FlowError::ItemLimitReached { max_items } if tier == Tier::Guest => {
                SessionError::GuestItemLimit { max_items }
            }
            other => SessionError::Flow(other),
        })?;
        if outcome == CommandOutcome::FlowCleared {
            self.invalidate_pending_saves();
        }
        Ok(outcome)
    }

    pub fn refresh_saved_flows(&mut self) -> Result<(), SessionError> {
        self.saved = self.client.list_flows()?;
        self.saved_list_loaded = true;
        Ok(())
    }

    /// Saves the open flow: create when no identity is retained, update when
    /// one is. Never both, never neither. A failed save leaves the flow and
    /// its dirty flag untouched.
    pub fn save(&mut self) -> Result<FlowId, SessionError> {
        if !self.state.quota().can_save {
            return Err(SessionError::SaveRequiresAccount);
        }
        if self.state.flow.title.trim().is_empty() {
            return Err(SessionError::EmptyTitle);
        }
        let ticket = self.begin_save();
        let payload = payload_from_flow(&self.state.flow);
        let result = match &ticket.target {
            Some(id) => self.client.update_flow(id, &payload),
            None => self.client.create_flow(&payload),
        };
        self.complete_save(ticket, result)
    }

    /// Allocates the next save generation. `save` is the normal path; this
    /// seam exists so a response that lands late can be validated first.
    pub fn begin_save(&mut self) -> SaveTicket {
        self.save_generation += 1;
        SaveTicket {
            generation: self.save_generation,
            target: self.state.flow.id.clone(),
        }
    }

    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<SaveResponse, ApiError>,
    ) -> Result<FlowId, SessionError> {
        if !save_response_applies(&ticket, self.save_generation, self.state.flow.id.as_ref()) {
            self.log(&format!(
                "discarded stale save response: ticket generation {} is no longer current",
                ticket.generation
            ));
            return Err(SessionError::StaleSave);
        }
        let response = result?;
        self.state.flow.id = Some(response.id.clone());
        self.state.mark_clean();
        if let Err(err) = self.refresh_saved_flows() {
            self.log(&format!(
                "saved flow {} but failed to refresh the saved list: {err}",
                response.id
            ));
        }
        Ok(response.id)
    }

    /// Deletes a saved flow. When it is the open flow, the editor resets to
    /// the empty, unsaved state.
    pub fn delete(&mut self, id: &FlowId) -> Result<(), SessionError> {
        self.client.delete_flow(id)?;
        self.saved.retain(|record| &record.id != id);
        if self.state.flow.id.as_ref() == Some(id) {
            self.state.reset();
            self.invalidate_pending_saves();
        }
        Ok(())
    }

    /// Loads an owned flow into the editor, from the saved list when already
    /// fetched, otherwise by id. Refuses while dirty unless told to discard.
    pub fn load_owned(&mut self, id: &FlowId, guard: EditGuard) -> Result<(), SessionError> {
        if self.state.is_dirty() && guard == EditGuard::KeepEdits {
            return Err(SessionError::UnsavedChanges);
        }
        // Decide memory-vs-fetch only once the list fetch has completed.
        if !self.saved_list_loaded {
            match self.refresh_saved_flows() {
                Ok(()) => {}
                Err(SessionError::Api(ApiError::AuthRequired)) => {
                    return Err(SessionError::Api(ApiError::AuthRequired))
                }
                Err(err) => self.log(&format!(
                    "saved list fetch failed before loading {id}: {err}"
                )),
            }
        }
        let now = now_ms();
        let flow = match self.saved.iter().find(|record| &record.id == id) {
            Some(record) => flow_from_record(record, now)?,
            None => {
                let record = self.client.fetch_flow(id)?;
                flow_from_record(&record, now)?
            }
        };
        self.state.replace_flow(flow, SyncState::Clean);
        self.invalidate_pending_saves();
        Ok(())
    }

    /// Clones a public flow into the editor: items truncated to the current
    /// quota, title suffixed with "(Copy)", auto-saved when the identity can
    /// save. Auto-save failure keeps the clone in memory as dirty: unsaved,
    /// not lost.
    pub fn clone_public(
        &mut self,
        slug: &str,
        guard: EditGuard,
    ) -> Result<CloneOutcome, SessionError> {
        if self.state.is_dirty() && guard == EditGuard::KeepEdits {
            return Err(SessionError::UnsavedChanges);
        }
        let record = self.client.fetch_public_flow(slug)?;
        let total = record.items.len();
        let keep = match self.state.quota().max_items_per_flow {
            Some(cap) => total.min(cap),
            None => total,
        };
        let now = now_ms();
        let flow = Flow {
            id: None,
            title: cloned_title(&record.title),
            style: record.style,
            level: record.level,
            target_duration_minutes: record.target_duration_minutes,
            items: items_from_records(&record.items[..keep], now)?,
        };
        self.state.replace_flow(flow, SyncState::Dirty);
        self.invalidate_pending_saves();

        let auto_save = if self.state.quota().can_save {
            match self.save() {
                Ok(id) => AutoSave::Saved { id },
                Err(err) => {
                    self.log(&format!("auto-save after cloning `{slug}` failed: {err}"));
                    AutoSave::Failed {
                        reason: err.to_string(),
                    }
                }
            }
        } else {
            AutoSave::NotAttempted
        };

        Ok(CloneOutcome {
            title: self.state.flow.title.clone(),
            items_loaded: keep,
            items_dropped: total - keep,
            auto_save,
        })
    }

    /// Mints a share link for the open flow; only a saved flow can be shared.
    pub fn share(&mut self) -> Result<ShareRecord, SessionError> {
        let id = self.state.flow.id.clone().ok_or(SessionError::NeverSaved)?;
        Ok(self.client.share_flow(&id)?)
    }

    fn invalidate_pending_saves(&mut self) {
        self.save_generation += 1;
    }

    fn log(&self, line: &str) {
        let Some(root) = &self.state_root else {
            return;
        };
        let _ = append_builder_log_line(root, line);
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn cloned_title(original: &str) -> String {
    let trimmed = original.trim();
    if trimmed.is_empty() {
        format!("{UNTITLED_CLONE_TITLE} (Copy)")
    } else {
        format!("{trimmed} (Copy)")
    }
}

fn payload_from_flow(flow: &Flow) -> FlowPayload {
    FlowPayload {
        title: flow.title.clone(),
        style: flow.style,
        level: flow.level,
        target_duration_minutes: flow.target_duration_minutes,
        items: flow
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| FlowItemPayload {
                source_item_id: item.source_item_id.clone(),
                position,
                duration_seconds: item.duration_seconds,
                side: item.side,
                notes: item.notes.clone(),
            })
            .collect(),
    }
}

fn items_from_records(records: &[FlowItemRecord], now_ms: i64) -> Result<Vec<FlowItem>, FlowError> {
    let mut items: Vec<FlowItem> = Vec::with_capacity(records.len());
    for record in records {
        let local_id = allocate_local_id(&record.source_item_id, now_ms, |candidate| {
            items.iter().any(|item| item.local_id == candidate)
        })?;
        let duration_seconds = if record.duration_seconds == 0 {
            DEFAULT_ITEM_DURATION_SECONDS
        } else {
            record.duration_seconds
        };
        items.push(FlowItem {
            local_id,
            source_item_id: record.source_item_id.clone(),
            source_item_slug: record.source_item_slug.clone(),
            source_item_name: record.source_item_name.clone(),
            source_item_image: record.source_item_image.clone(),
            duration_seconds,
            side: record.side,
            notes: record.notes.clone(),
        });
    }
    Ok(items)
}

/// Hydrates an owned record into an editable flow. Items keep the transmitted
/// array order; fresh local ids are allocated for the session.
fn flow_from_record(record: &FlowRecord, now_ms: i64) -> Result<Flow, FlowError> {
    Ok(Flow {
        id: Some(record.id.clone()),
        title: record.title.clone(),
        style: record.style,
        level: record.level,
        target_duration_minutes: record.target_duration_minutes,
        items: items_from_records(&record.items, now_ms)?,
    })
}
