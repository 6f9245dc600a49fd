//! Tree reconstruction for lazy-loaded, filtered menu trees.
//!
//! Lazy-loaded tree UIs fetch one level at a time; with a search filter
//! active, a per-level fetch would hide matches nested deeper in the tree.
//! Given the full match set and the current-level render set, this module
//! decides which nodes to show directly (top of their matched branch) and
//! which hidden matches surface when a parent is expanded.

use std::collections::{HashMap, HashSet};

use tracing::warn;
use uuid::Uuid;

use admin_shared::constants::MAX_ANCESTOR_DEPTH;

use crate::domain::Menu;

/// Which id set a request wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Direct matches, represented by the top of each matched branch.
    Show,
    /// Nodes to reveal when a collapsed parent is expanded.
    Expand,
}

/// Flat id -> parent-id arena. All traversal is by id lookup; a parent id
/// that does not resolve terminates the chain.
#[derive(Debug, Default)]
pub struct NodeArena {
    parents: HashMap<Uuid, Option<Uuid>>,
}

impl NodeArena {
    pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a Menu>) -> Self {
        Self {
            parents: nodes.into_iter().map(|n| (n.id, n.parent_id)).collect(),
        }
    }

    fn parent_of(&self, id: &Uuid) -> Option<Uuid> {
        self.parents.get(id).copied().flatten()
    }

    /// Whether any ancestor of `id` is in `set`. Bounded and cycle-safe:
    /// a revisited node or an exhausted step budget ends the walk with a
    /// data-integrity warning.
    fn ancestor_in_set(&self, id: &Uuid, set: &HashSet<Uuid>) -> bool {
        let mut visited = HashSet::from([*id]);
        let mut current = *id;
        for _ in 0..MAX_ANCESTOR_DEPTH {
            let Some(parent) = self.parent_of(&current) else {
                return false;
            };
            if !visited.insert(parent) {
                warn!(node = %id, at = %parent, "cycle detected in menu parent chain");
                return false;
            }
            if set.contains(&parent) {
                return true;
            }
            current = parent;
        }
        warn!(node = %id, "menu parent chain exceeded depth bound");
        false
    }
}

/// The on-show/on-expand split for one filtered request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSelection {
    /// Matched nodes with no matched ancestor.
    pub on_show: HashSet<Uuid>,
    /// Hidden matches that belong to the current render level.
    pub on_expand: HashSet<Uuid>,
}

/// Splits the match set against the render level.
///
/// A matched node with a matched ancestor is hidden behind it; the rest
/// show directly. `on_expand` keeps only the hidden nodes the caller's
/// current level would render.
pub fn split(filter_ids: &HashSet<Uuid>, render_ids: &HashSet<Uuid>, arena: &NodeArena) -> TreeSelection {
    let mut hidden = HashSet::new();
    for id in filter_ids {
        if arena.ancestor_in_set(id, filter_ids) {
            hidden.insert(*id);
        }
    }
    TreeSelection {
        on_show: filter_ids.difference(&hidden).copied().collect(),
        on_expand: hidden.intersection(render_ids).copied().collect(),
    }
}

/// Resolves the id set a filtered request must return.
///
/// When filtering had no effect at this level the render set passes
/// through unchanged.
pub fn resolve(
    filter_ids: &HashSet<Uuid>,
    render_ids: &HashSet<Uuid>,
    arena: &NodeArena,
    mode: RequestMode,
) -> HashSet<Uuid> {
    if filter_ids == render_ids {
        return render_ids.clone();
    }
    let selection = split(filter_ids, render_ids, arena);
    match mode {
        RequestMode::Show => selection.on_show,
        RequestMode::Expand => selection.on_expand,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MenuType;

    fn node(name: &str, parent: Option<&Menu>) -> Menu {
        Menu::new(
            parent.map(|p| p.id),
            name.to_string(),
            MenuType::Menu,
            None,
            None,
            None,
            1,
        )
        .unwrap()
    }

    fn ids(nodes: &[&Menu]) -> HashSet<Uuid> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_match_below_render_level_show_and_expand() {
        // Root -> Catalog -> Menu; filter matches only the leaf.
        let root = node("Root", None);
        let catalog = node("Catalog", Some(&root));
        let leaf = node("Menu", Some(&catalog));
        let arena = NodeArena::from_nodes([&root, &catalog, &leaf]);

        let filter_ids = ids(&[&leaf]);
        let render_ids = ids(&[&catalog]); // children of Root

        // No matched ancestor: the leaf itself shows.
        let shown = resolve(&filter_ids, &render_ids, &arena, RequestMode::Show);
        assert_eq!(shown, ids(&[&leaf]));
        // Nothing at this level is hidden behind a match.
        let expanded = resolve(&filter_ids, &render_ids, &arena, RequestMode::Expand);
        assert!(expanded.is_empty());
    }

    #[test]
    fn test_matched_ancestor_hides_descendant() {
        let root = node("Root", None);
        let catalog = node("Catalog", Some(&root));
        let leaf = node("Menu", Some(&catalog));
        let arena = NodeArena::from_nodes([&root, &catalog, &leaf]);

        // Both the catalog and its descendant match.
        let filter_ids = ids(&[&catalog, &leaf]);
        let render_ids = ids(&[&leaf]); // children of Catalog

        let selection = split(&filter_ids, &render_ids, &arena);
        assert_eq!(selection.on_show, ids(&[&catalog]));
        assert_eq!(selection.on_expand, ids(&[&leaf]));
    }

    #[test]
    fn test_grandparent_match_hides_too() {
        let root = node("Root", None);
        let mid = node("Mid", Some(&root));
        let leaf = node("Leaf", Some(&mid));
        let arena = NodeArena::from_nodes([&root, &mid, &leaf]);

        // Root and leaf match, mid does not: leaf is still hidden.
        let filter_ids = ids(&[&root, &leaf]);
        let selection = split(&filter_ids, &HashSet::new(), &arena);
        assert_eq!(selection.on_show, ids(&[&root]));
    }

    #[test]
    fn test_ancestor_preservation() {
        // Every match is either shown or has a shown ancestor.
        let root = node("Root", None);
        let a = node("A", Some(&root));
        let b = node("B", Some(&a));
        let c = node("C", Some(&b));
        let arena = NodeArena::from_nodes([&root, &a, &b, &c]);

        let filter_ids = ids(&[&a, &b, &c]);
        let selection = split(&filter_ids, &HashSet::new(), &arena);
        for id in &filter_ids {
            let represented = selection.on_show.contains(id)
                || arena.ancestor_in_set(id, &selection.on_show);
            assert!(represented, "match {id} has no visible representative");
        }
    }

    #[test]
    fn test_disjointness_and_idempotence() {
        let root = node("Root", None);
        let a = node("A", Some(&root));
        let b = node("B", Some(&a));
        let arena = NodeArena::from_nodes([&root, &a, &b]);

        let filter_ids = ids(&[&a, &b]);
        let render_ids = ids(&[&a, &b]);
        let first = split(&filter_ids, &render_ids, &arena);
        let hidden: HashSet<_> = filter_ids.difference(&first.on_show).copied().collect();
        assert!(first.on_show.is_disjoint(&hidden));

        let second = split(&filter_ids, &render_ids, &arena);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_effect_shortcut_returns_render_set() {
        let root = node("Root", None);
        let a = node("A", Some(&root));
        let arena = NodeArena::from_nodes([&root, &a]);

        let same = ids(&[&root, &a]);
        assert_eq!(resolve(&same, &same, &arena, RequestMode::Show), same);
        assert_eq!(resolve(&same, &same, &arena, RequestMode::Expand), same);
    }

    #[test]
    fn test_cyclic_parent_chain_terminates() {
        let mut x = node("X", None);
        let mut y = node("Y", None);
        x.parent_id = Some(y.id);
        y.parent_id = Some(x.id);
        let arena = NodeArena::from_nodes([&x, &y]);

        let other = node("Other", None);
        let filter_ids = ids(&[&x, &other]);
        // Must return, not hang; X's chain never reaches a match.
        let selection = split(&filter_ids, &HashSet::new(), &arena);
        assert!(selection.on_show.contains(&x.id));
        assert!(selection.on_show.contains(&other.id));
    }

    #[test]
    fn test_dangling_parent_terminates_chain() {
        let mut orphan = node("Orphan", None);
        orphan.parent_id = Some(Uuid::new_v4()); // parent no longer resolves
        let arena = NodeArena::from_nodes([&orphan]);

        let filter_ids = ids(&[&orphan]);
        let selection = split(&filter_ids, &HashSet::new(), &arena);
        assert_eq!(selection.on_show, filter_ids);
    }
}
