// In crates/treemap/src/navigator.rs

use core_types::HierarchyNode;

/// One step below the root: which child was entered, and under what name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub index: usize,
    pub name: String,
}

/// Outcome of a drill request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drill {
    Descended,
    /// The target has no children; nothing changed.
    Leaf,
    OutOfRange,
}

/// Tracks the current subtree as a path from the root.
///
/// The navigator never owns the hierarchy. Every query takes the root, so a
/// replaced hierarchy is picked up on the next call and [`Navigator::reconcile`]
/// can trim a path that no longer exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    path: Vec<Crumb>,
}

/// Prefers the recorded index while its name still matches, then the first
/// sibling with that name.
fn resolve(node: &HierarchyNode, crumb: &Crumb) -> Option<usize> {
    match node.children.get(crumb.index) {
        Some(child) if child.name == crumb.name => Some(crumb.index),
        _ => node.children.iter().position(|c| c.name == crumb.name),
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of levels below the root.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn path(&self) -> &[Crumb] {
        &self.path
    }

    /// The node the view is showing. Walks as far as the path still resolves.
    pub fn current<'a>(&self, root: &'a HierarchyNode) -> &'a HierarchyNode {
        let mut node = root;
        for crumb in &self.path {
            match resolve(node, crumb) {
                Some(i) => node = &node.children[i],
                None => break,
            }
        }
        node
    }

    /// Enters child `index` of the current node if it has children.
    pub fn drill(&mut self, root: &HierarchyNode, index: usize) -> Drill {
        let current = self.current(root);
        let Some(child) = current.children.get(index) else {
            return Drill::OutOfRange;
        };
        if child.is_leaf() {
            return Drill::Leaf;
        }
        self.path.push(Crumb {
            index,
            name: child.name.clone(),
        });
        Drill::Descended
    }

    /// Returns false when already at the root.
    pub fn up(&mut self) -> bool {
        self.path.pop().is_some()
    }

    /// Truncates the path to `depth` levels below the root; 0 is the root.
    pub fn jump(&mut self, depth: usize) -> bool {
        if depth >= self.path.len() {
            return false;
        }
        self.path.truncate(depth);
        true
    }

    pub fn reset(&mut self) {
        self.path.clear();
    }

    /// Breadcrumb labels, root first.
    pub fn breadcrumb(&self, root: &HierarchyNode) -> Vec<String> {
        std::iter::once(root.name.clone())
            .chain(self.path.iter().map(|c| c.name.clone()))
            .collect()
    }

    /// Re-resolves the path against a (possibly replaced) hierarchy.
    ///
    /// Indices are refreshed; the path is cut at the first crumb that no
    /// longer resolves to a node with children. Returns true if it was cut.
    pub fn reconcile(&mut self, root: &HierarchyNode) -> bool {
        let mut node = root;
        let mut kept = 0;
        for crumb in self.path.iter_mut() {
            match resolve(node, crumb) {
                Some(i) if !node.children[i].is_leaf() => {
                    crumb.index = i;
                    node = &node.children[i];
                    kept += 1;
                }
                _ => break,
            }
        }
        let cut = kept < self.path.len();
        self.path.truncate(kept);
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    fn leaf(name: &str, value: f64) -> HierarchyNode {
        HierarchyNode::tag(name, value, vec![]).with_symbol(name)
    }

    fn sample() -> HierarchyNode {
        HierarchyNode::root(
            "Portfolio",
            100.0,
            vec![
                HierarchyNode::tag("Tech", 60.0, vec![
                    HierarchyNode::tag("Chips", 40.0, vec![leaf("NVDA", 30.0), leaf("AMD", 10.0)]),
                    leaf("MSFT", 20.0),
                ]),
                HierarchyNode::tag("Energy", 40.0, vec![leaf("XOM", 40.0)]),
            ],
        )
    }

    #[test]
    fn test_drill_then_breadcrumb_root_restores_identity() {
        let root = sample();
        let mut nav = Navigator::new();
        let before = nav.current(&root);

        assert_eq!(nav.drill(&root, 0), Drill::Descended);
        assert_eq!(nav.current(&root).name, "Tech");
        assert!(nav.jump(0));

        assert!(ptr::eq(nav.current(&root), before));
        assert_eq!(nav.breadcrumb(&root), vec!["Portfolio"]);
    }

    #[test]
    fn test_drill_into_leaf_changes_nothing() {
        let root = sample();
        let mut nav = Navigator::new();
        nav.drill(&root, 1);

        assert_eq!(nav.drill(&root, 0), Drill::Leaf);
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.drill(&root, 9), Drill::OutOfRange);
        assert_eq!(nav.current(&root).name, "Energy");
    }

    #[test]
    fn test_breadcrumb_jump_to_middle_level() {
        let root = sample();
        let mut nav = Navigator::new();
        nav.drill(&root, 0);
        nav.drill(&root, 0);
        assert_eq!(nav.breadcrumb(&root), vec!["Portfolio", "Tech", "Chips"]);

        assert!(nav.jump(1));
        assert!(ptr::eq(nav.current(&root), &root.children[0]));
        assert!(!nav.jump(1));
        assert!(nav.up());
        assert!(!nav.up());
    }

    #[test]
    fn test_duplicate_sibling_names_navigate_by_index() {
        let root = HierarchyNode::root(
            "P",
            2.0,
            vec![
                HierarchyNode::tag("Other", 1.0, vec![leaf("A", 1.0)]),
                HierarchyNode::tag("Other", 1.0, vec![leaf("B", 1.0)]),
            ],
        );
        let mut nav = Navigator::new();
        nav.drill(&root, 1);

        assert!(ptr::eq(nav.current(&root), &root.children[1]));
        assert_eq!(nav.current(&root).children[0].name, "B");
    }

    #[test]
    fn test_reconcile_follows_moved_child_by_name() {
        let root = sample();
        let mut nav = Navigator::new();
        nav.drill(&root, 1);

        let mut replaced = sample();
        replaced.children.reverse();

        assert!(!nav.reconcile(&replaced));
        assert_eq!(nav.path()[0].index, 0);
        assert_eq!(nav.current(&replaced).name, "Energy");
    }

    #[test]
    fn test_reconcile_trims_vanished_path() {
        let root = sample();
        let mut nav = Navigator::new();
        nav.drill(&root, 0);
        nav.drill(&root, 0);

        let mut replaced = sample();
        replaced.children[0].children.remove(0);

        assert!(nav.reconcile(&replaced));
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.current(&replaced).name, "Tech");
    }

    #[test]
    fn test_current_stops_at_unresolvable_crumb() {
        let root = sample();
        let mut nav = Navigator::new();
        nav.drill(&root, 0);

        let empty = HierarchyNode::root("Portfolio", 0.0, vec![]);
        assert!(ptr::eq(nav.current(&empty), &empty));
    }
}
