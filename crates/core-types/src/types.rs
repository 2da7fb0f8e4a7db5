// In crates/core-types/src/types.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a hierarchy node is the portfolio root or a tag/sector beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    #[default]
    Tag,
}

/// One level of the portfolio's tag/sector tree.
///
/// Values are raw as served by the reporter; they are not normalized. Shares
/// are only ever computed per sibling group at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub children: Vec<HierarchyNode>,
    #[serde(rename = "node_type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub tag_id: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl HierarchyNode {
    /// Builds a root node. Roots never carry a tag id, symbol or weight.
    pub fn root(name: impl Into<String>, value: f64, children: Vec<HierarchyNode>) -> Self {
        Self {
            name: name.into(),
            value,
            children,
            kind: NodeKind::Root,
            tag_id: None,
            symbol: None,
            weight: None,
        }
    }

    /// Builds a tag node with no optional attributes set.
    pub fn tag(name: impl Into<String>, value: f64, children: Vec<HierarchyNode>) -> Self {
        Self {
            name: name.into(),
            value,
            children,
            kind: NodeKind::Tag,
            tag_id: None,
            symbol: None,
            weight: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_tag_id(mut self, tag_id: impl Into<String>) -> Self {
        self.tag_id = Some(tag_id.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }

    pub fn is_tag(&self) -> bool {
        self.kind == NodeKind::Tag
    }

    /// A node with no children is symbol level.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Holding-period return for one sub-period of the TWR window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HprResult {
    #[serde(default)]
    pub start_ts: String,
    #[serde(default)]
    pub end_ts: String,
    #[serde(default)]
    pub start_val: f64,
    #[serde(default)]
    pub hpr: f64,
    #[serde(default)]
    pub profit_by_symbol: BTreeMap<String, f64>,
    #[serde(default)]
    pub hpr_by_symbol: BTreeMap<String, f64>,
}

/// A full time-weighted-return snapshot. Always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TwrSnapshot {
    #[serde(default)]
    pub hpr_results: Vec<HprResult>,
    pub twr: f64,
    #[serde(default)]
    pub twr_contribution_by_symbol: BTreeMap<String, f64>,
}

impl TwrSnapshot {
    /// Formats the TWR as a signed percentage with four decimals, e.g. `+1.5000%`.
    pub fn formatted(&self) -> String {
        let percentage = self.twr * 100.0;
        let sign = if percentage >= 0.0 { "+" } else { "" };
        format!("{}{:.4}%", sign, percentage)
    }

    pub fn is_gain(&self) -> bool {
        self.twr >= 0.0
    }
}
