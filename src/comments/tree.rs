use std::collections::HashMap;

use super::model::{Comment, TreeComment};

/// Link a flat list of comments into reply trees.
///
/// Records without an id are skipped. When an id repeats, the last record
/// supplies the fields and the first one fixes the position. Replies whose
/// parent is not in `comments` are dropped together with their own replies,
/// and so are parent cycles. Every reply list and the returned root list are
/// ascending by `created_at`, ties kept in input order.
pub fn build_tree(comments: &[Comment]) -> Vec<TreeComment> {
    // Pass 1: one slot per distinct id.
    let mut slots: Vec<Option<Comment>> = Vec::with_capacity(comments.len());
    let mut by_id: HashMap<&str, usize> = HashMap::with_capacity(comments.len());
    let mut missing_id = 0usize;

    for c in comments {
        let Some(id) = c.id.as_deref() else {
            missing_id += 1;
            continue;
        };
        match by_id.get(id) {
            Some(&slot) => slots[slot] = Some(c.clone()),
            None => {
                by_id.insert(id, slots.len());
                slots.push(Some(c.clone()));
            }
        }
    }

    // Pass 2: attach every slot to its parent, or to the root list.
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (slot, c) in slots.iter().enumerate() {
        let Some(c) = c else { continue };
        match c.parent_id.as_deref() {
            None => roots.push(slot),
            Some(parent_id) => match by_id.get(parent_id) {
                Some(&parent) => children[parent].push(slot),
                None => {
                    tracing::debug!(
                        "dropping reply {:?}: parent {parent_id} not in thread",
                        c.id
                    );
                }
            },
        }
    }

    // Pre-order walk from the roots. Children always come after their
    // parent, so building in reverse sees every reply before its parent.
    let mut order: Vec<usize> = Vec::with_capacity(slots.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(slot) = stack.pop() {
        order.push(slot);
        stack.extend(children[slot].iter().rev().copied());
    }

    let unreachable = slots.len() - order.len();
    if unreachable > 0 || missing_id > 0 {
        tracing::debug!(
            "comment tree: {} linked, {unreachable} unreachable, {missing_id} without id",
            order.len()
        );
    }

    let mut built: Vec<Option<TreeComment>> = vec![None; slots.len()];
    for &slot in order.iter().rev() {
        let Some(comment) = slots[slot].take() else {
            continue;
        };
        let mut replies: Vec<TreeComment> = children[slot]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        sort_chronological(&mut replies);
        built[slot] = Some(TreeComment { comment, replies });
    }

    let mut tree: Vec<TreeComment> = roots
        .iter()
        .filter_map(|&slot| built[slot].take())
        .collect();
    sort_chronological(&mut tree);
    tree
}

/// Ascending `created_at`, stable.
pub fn sort_chronological(nodes: &mut [TreeComment]) {
    nodes.sort_by_key(|n| n.comment.created_at);
}
