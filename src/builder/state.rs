use crate::flow::Flow;
use crate::quota::{QuotaPolicy, Tier};

/// Whether local state has diverged from the last confirmed remote save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Clean,
    Dirty,
}

/// The tuple the reducer operates on: the open flow, its sync state, and the
/// identity tier the quota derives from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderState {
    pub flow: Flow,
    pub sync_state: SyncState,
    pub tier: Tier,
}

impl BuilderState {
    pub fn new(tier: Tier) -> Self {
        Self {
            flow: Flow::default(),
            sync_state: SyncState::Clean,
            tier,
        }
    }

    pub fn quota(&self) -> QuotaPolicy {
        self.tier.quota()
    }

    pub fn is_dirty(&self) -> bool {
        self.sync_state == SyncState::Dirty
    }

    pub fn mark_dirty(&mut self) {
        self.sync_state = SyncState::Dirty;
    }

    pub fn mark_clean(&mut self) {
        self.sync_state = SyncState::Clean;
    }

    /// Discards the open flow for a fresh, unsaved, clean one.
    pub fn reset(&mut self) {
        self.flow = Flow::default();
        self.sync_state = SyncState::Clean;
    }

    pub fn replace_flow(&mut self, flow: Flow, sync_state: SyncState) {
        self.flow = flow;
        self.sync_state = sync_state;
    }

    /// Quota is derived state: re-classify whenever auth or subscription
    /// changes.
    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_clean_and_empty() {
        let state = BuilderState::new(Tier::Guest);
        assert!(!state.is_dirty());
        assert!(state.flow.items.is_empty());
        assert!(state.flow.id.is_none());
    }

    #[test]
    fn reset_discards_flow_and_dirt() {
        let mut state = BuilderState::new(Tier::Free);
        state.flow.title = "Morning".to_string();
        state.mark_dirty();
        state.reset();
        assert!(!state.is_dirty());
        assert!(state.flow.title.is_empty());
    }

    #[test]
    fn tier_change_changes_quota() {
        let mut state = BuilderState::new(Tier::Guest);
        assert!(!state.quota().can_save);
        state.set_tier(Tier::Pro);
        assert!(state.quota().can_save);
        assert_eq!(state.quota().max_items_per_flow, None);
    }
}
