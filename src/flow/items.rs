use super::{Flow, FlowError, FlowItem, Side};
use crate::catalog::CatalogEntry;
use crate::shared::allocate_local_id;

/// Partial update for a single item. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemPatch {
    pub duration_seconds: Option<u32>,
    pub side: Option<Side>,
    pub notes: Option<String>,
}

/// Appends a snapshot of `entry` to the flow. Rejected once the item cap is
/// reached; the caller decides how to surface that (for guests it doubles as
/// a sign-in prompt).
pub fn add_item(
    flow: &mut Flow,
    entry: &CatalogEntry,
    max_items: Option<usize>,
    now_ms: i64,
) -> Result<String, FlowError> {
    if let Some(max_items) = max_items {
        if flow.items.len() >= max_items {
            return Err(FlowError::ItemLimitReached { max_items });
        }
    }

    let local_id = allocate_local_id(&entry.id, now_ms, |candidate| {
        flow.items.iter().any(|item| item.local_id == candidate)
    })?;
    let side = if entry.sided { Side::Left } else { Side::Both };
    flow.items.push(FlowItem {
        local_id: local_id.clone(),
        source_item_id: entry.id.clone(),
        source_item_slug: entry.slug.clone(),
        source_item_name: entry.name.clone(),
        source_item_image: entry.image.clone(),
        duration_seconds: entry.starting_duration_seconds(),
        side,
        notes: String::new(),
    });
    Ok(local_id)
}

pub fn update_item(flow: &mut Flow, local_id: &str, patch: ItemPatch) -> Result<(), FlowError> {
    if let Some(seconds) = patch.duration_seconds {
        if seconds == 0 {
            return Err(FlowError::InvalidDuration);
        }
    }
    let index = flow
        .item_index(local_id)
        .ok_or_else(|| FlowError::UnknownItem {
            local_id: local_id.to_string(),
        })?;
    let item = &mut flow.items[index];
    if let Some(seconds) = patch.duration_seconds {
        item.duration_seconds = seconds;
    }
    if let Some(side) = patch.side {
        item.side = side;
    }
    if let Some(notes) = patch.notes {
        item.notes = notes;
    }
    Ok(())
}

pub fn remove_item(flow: &mut Flow, local_id: &str) -> Result<FlowItem, FlowError> {
    let index = flow
        .item_index(local_id)
        .ok_or_else(|| FlowError::UnknownItem {
            local_id: local_id.to_string(),
        })?;
    Ok(flow.items.remove(index))
}

pub fn clear_items(flow: &mut Flow) {
    flow.items.clear();
}

/// Moves the item at `source` to `target`, preserving every other item's
/// relative order. Returns false (and leaves the flow untouched) when the
/// move is a no-op or either index is out of range.
pub fn reorder_items(flow: &mut Flow, source: usize, target: usize) -> bool {
    let len = flow.items.len();
    if source == target || source >= len || target >= len {
        return false;
    }
    let item = flow.items.remove(source);
    flow.items.insert(target, item);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            slug: id.to_string(),
            name: id.to_string(),
            image: None,
            default_duration_seconds: Some(30),
            sided: false,
        }
    }

    fn flow_with_items(count: usize) -> Flow {
        let mut flow = Flow::default();
        for index in 0..count {
            add_item(&mut flow, &entry(&format!("pose-{index}")), None, 1_000 + index as i64)
                .expect("add");
        }
        flow
    }

    #[test]
    fn add_rejects_when_cap_reached() {
        let mut flow = flow_with_items(6);
        let err = add_item(&mut flow, &entry("extra"), Some(6), 9_000).expect_err("cap");
        assert!(matches!(err, FlowError::ItemLimitReached { max_items: 6 }));
        assert_eq!(flow.items.len(), 6);
    }

    #[test]
    fn add_defaults_side_from_catalog_sidedness() {
        let mut flow = Flow::default();
        let mut sided = entry("warrior");
        sided.sided = true;
        add_item(&mut flow, &sided, None, 1_000).expect("add sided");
        add_item(&mut flow, &entry("mountain"), None, 1_001).expect("add unsided");
        assert_eq!(flow.items[0].side, Side::Left);
        assert_eq!(flow.items[1].side, Side::Both);
    }

    #[test]
    fn update_patches_only_provided_fields() {
        let mut flow = flow_with_items(1);
        let local_id = flow.items[0].local_id.clone();
        update_item(
            &mut flow,
            &local_id,
            ItemPatch {
                duration_seconds: Some(90),
                side: None,
                notes: Some("hold longer".to_string()),
            },
        )
        .expect("update");
        assert_eq!(flow.items[0].duration_seconds, 90);
        assert_eq!(flow.items[0].side, Side::Both);
        assert_eq!(flow.items[0].notes, "hold longer");
    }

    #[test]
    fn update_rejects_zero_duration_without_mutating() {
        let mut flow = flow_with_items(1);
        let local_id = flow.items[0].local_id.clone();
        let err = update_item(
            &mut flow,
            &local_id,
            ItemPatch {
                duration_seconds: Some(0),
                ..ItemPatch::default()
            },
        )
        .expect_err("zero duration");
        assert!(matches!(err, FlowError::InvalidDuration));
        assert_eq!(flow.items[0].duration_seconds, 30);
    }

    #[test]
    fn unknown_local_id_is_an_error() {
        let mut flow = flow_with_items(1);
        assert!(matches!(
            update_item(&mut flow, "missing", ItemPatch::default()),
            Err(FlowError::UnknownItem { .. })
        ));
        assert!(matches!(
            remove_item(&mut flow, "missing"),
            Err(FlowError::UnknownItem { .. })
        ));
    }

    #[test]
    fn reorder_is_a_single_element_permutation() {
        let mut flow = flow_with_items(4);
        let ids: Vec<String> = flow.items.iter().map(|i| i.local_id.clone()).collect();
        assert!(reorder_items(&mut flow, 0, 3));
        let moved: Vec<String> = flow.items.iter().map(|i| i.local_id.clone()).collect();
        assert_eq!(moved, vec![ids[1].clone(), ids[2].clone(), ids[3].clone(), ids[0].clone()]);
    }

    #[test]
    fn reorder_preserves_item_multiset_for_all_index_pairs() {
        for source in 0..5 {
            for target in 0..5 {
                let mut flow = flow_with_items(5);
                let mut before: Vec<String> =
                    flow.items.iter().map(|i| i.local_id.clone()).collect();
                reorder_items(&mut flow, source, target);
                let mut after: Vec<String> =
                    flow.items.iter().map(|i| i.local_id.clone()).collect();
                before.sort();
                after.sort();
                assert_eq!(before, after, "source={source} target={target}");
            }
        }
    }

    #[test]
    fn reorder_no_ops_on_equal_or_out_of_range_indexes() {
        let mut flow = flow_with_items(3);
        let before = flow.clone();
        assert!(!reorder_items(&mut flow, 1, 1));
        assert!(!reorder_items(&mut flow, 3, 0));
        assert!(!reorder_items(&mut flow, 0, 3));
        assert_eq!(flow, before);
    }

    #[test]
    fn local_ids_stay_unique_within_a_session() {
        let mut flow = Flow::default();
        for _ in 0..20 {
            add_item(&mut flow, &entry("same-pose"), None, 42).expect("add");
        }
        let mut ids: Vec<String> = flow.items.iter().map(|i| i.local_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }
}
