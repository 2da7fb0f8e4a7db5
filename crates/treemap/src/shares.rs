// In crates/treemap/src/shares.rs

use core_types::HierarchyNode;

/// One child's slice of its sibling group.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub name: String,
    /// Percentage of the sibling total, in `0.0..=100.0`.
    pub percent: f64,
    /// Position of the child in its parent's `children`.
    pub index: usize,
    pub leaf: bool,
}

impl Share {
    pub fn label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

/// Normalizes `children` to percentages of their sum.
///
/// A zero total yields all-zero shares.
pub fn shares(children: &[HierarchyNode]) -> Vec<Share> {
    let total: f64 = children.iter().map(|c| c.value).sum();

    children
        .iter()
        .enumerate()
        .map(|(index, child)| Share {
            name: child.name.clone(),
            percent: if total > 0.0 { child.value / total * 100.0 } else { 0.0 },
            index,
            leaf: child.is_leaf(),
        })
        .collect()
}
