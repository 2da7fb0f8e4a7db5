// In app/src/report.rs

use serde_json::{Value, json};
use store::{Slice, Status, Store};
use treemap::{hex_for, shares};

fn status_name(status: Status) -> &'static str {
    match status {
        Status::Idle => "idle",
        Status::Loading => "loading",
        Status::Succeeded => "succeeded",
        Status::Failed => "failed",
    }
}

fn slice_header<T>(slice: &Slice<T>) -> Value {
    json!({
        "status": status_name(slice.status()),
        "error": slice.error(),
        "last_updated": slice.last_updated().map(|t| t.to_rfc3339()),
    })
}

/// The one-shot snapshot as a JSON document.
pub fn snapshot_json(store: &Store) -> Value {
    let mut twr = slice_header(store.twr());
    if let Some(snapshot) = store.twr().data() {
        twr["value"] = json!(snapshot.twr);
        twr["formatted"] = json!(snapshot.formatted());
        twr["contribution_by_symbol"] = json!(snapshot.twr_contribution_by_symbol);
    }

    let mut hierarchy = slice_header(store.hierarchy());
    if let Some(root) = store.hierarchy().data() {
        hierarchy["root"] = json!(root.name);
        hierarchy["shares"] = shares(&root.children)
            .iter()
            .map(|s| json!({"name": s.name, "percent": s.percent, "color": hex_for(s.index), "leaf": s.leaf}))
            .collect();
    }

    json!({ "twr": twr, "hierarchy": hierarchy })
}

/// The one-shot snapshot as plain text lines.
pub fn snapshot_lines(store: &Store) -> Vec<String> {
    let mut lines = Vec::new();

    match (store.twr().data(), store.twr().error()) {
        (Some(snapshot), _) => lines.push(format!("TWR: {}", snapshot.formatted())),
        (None, Some(error)) => lines.push(format!("TWR unavailable: {error}")),
        (None, None) => lines.push("TWR: --".to_string()),
    }

    match (store.hierarchy().data(), store.hierarchy().error()) {
        (Some(root), _) => {
            lines.push(format!("{} ({:.2})", root.name, root.value));
            for share in shares(&root.children) {
                let marker = if share.leaf { " " } else { "+" };
                lines.push(format!("  {marker} {:<24} {:>6}", share.name, share.label()));
            }
        }
        (None, Some(error)) => lines.push(format!("Error: {error}")),
        (None, None) => lines.push("No hierarchy.".to_string()),
    }
    lines
}

/// True when neither fetch produced data.
pub fn nothing_loaded(store: &Store) -> bool {
    store.twr().status() == Status::Failed && store.hierarchy().status() == Status::Failed
}
