use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    foundation::{
        core::MAX_DEPTH,
        error::{FigError, FigResult},
    },
    model::{Child, Placement, VisualNode},
};

/// One node of a flat design description: the node itself plus a reference to
/// its parent by id. Children of a frame keep the order their records appear in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub placement: Option<Placement>,
    pub node: VisualNode,
}

/// Build a nested [`VisualNode`] tree out of flat records.
///
/// Exactly one record may omit `parent`; it becomes the root and must be a frame.
/// Records whose `parent` does not name another record in the set are rejected,
/// as are chains nested deeper than [`MAX_DEPTH`].
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn assemble(records: Vec<NodeRecord>) -> FigResult<VisualNode> {
    let mut index_of = HashMap::<String, usize>::with_capacity(records.len());
    for (idx, rec) in records.iter().enumerate() {
        if index_of.insert(rec.id.clone(), idx).is_some() {
            return Err(FigError::malformed(format!(
                "duplicate node id '{}'",
                rec.id
            )));
        }
    }

    let mut root = None;
    let mut children_of = vec![Vec::<usize>::new(); records.len()];
    for (idx, rec) in records.iter().enumerate() {
        match &rec.parent {
            None => {
                if let Some(prev) = root.replace(idx) {
                    return Err(FigError::malformed(format!(
                        "multiple roots: '{}' and '{}'",
                        records[prev].id, rec.id
                    )));
                }
            }
            Some(parent) => {
                let &p = index_of.get(parent).ok_or_else(|| {
                    FigError::malformed(format!(
                        "node '{}' references parent '{parent}' that is not part of the tree",
                        rec.id
                    ))
                })?;
                if !matches!(records[p].node, VisualNode::Frame(_)) {
                    return Err(FigError::malformed(format!(
                        "node '{}' has parent '{parent}' which is a {}, not a frame",
                        rec.id,
                        records[p].node.kind()
                    )));
                }
                children_of[p].push(idx);
            }
        }
    }

    let root = root.ok_or_else(|| FigError::malformed("no root node (every record has a parent)"))?;
    if !matches!(records[root].node, VisualNode::Frame(_)) {
        return Err(FigError::malformed(format!(
            "root '{}' must be a frame, got {}",
            records[root].id,
            records[root].node.kind()
        )));
    }
    if records[root].placement.is_some() {
        tracing::debug!(id = %records[root].id, "ignoring placement on root");
    }

    // Everything must hang off the root; anything left over sits on a cycle.
    let mut reachable = HashSet::with_capacity(records.len());
    let mut stack = vec![(root, 0usize)];
    while let Some((idx, depth)) = stack.pop() {
        if depth > MAX_DEPTH {
            return Err(FigError::malformed(format!(
                "node '{}' is nested deeper than {MAX_DEPTH} levels",
                records[idx].id
            )));
        }
        reachable.insert(idx);
        stack.extend(children_of[idx].iter().map(|&c| (c, depth + 1)));
    }
    if let Some(orphan) = (0..records.len()).find(|i| !reachable.contains(i)) {
        return Err(FigError::malformed(format!(
            "node '{}' is not reachable from root '{}' (parent cycle)",
            records[orphan].id, records[root].id
        )));
    }

    let mut slots: Vec<Option<NodeRecord>> = records.into_iter().map(Some).collect();
    build(root, &children_of, &mut slots)
}

fn build(
    idx: usize,
    children_of: &[Vec<usize>],
    slots: &mut [Option<NodeRecord>],
) -> FigResult<VisualNode> {
    let rec = slots[idx]
        .take()
        .ok_or_else(|| FigError::malformed("node visited twice while assembling"))?;
    let mut node = rec.node;
    if let VisualNode::Frame(frame) = &mut node {
        for &c in &children_of[idx] {
            let placement = slots[c].as_ref().and_then(|r| r.placement);
            let id = slots[c].as_ref().map(|r| r.id.clone());
            let child = build(c, children_of, slots)?;
            frame.children.push(Child {
                id,
                placement,
                node: child,
            });
        }
    }
    Ok(node)
}
