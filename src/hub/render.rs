//! Terminal presentation of listings, breadcrumbs and the full tree.

use std::fmt::Write;

use colored::Colorize;

use crate::ext::SystemTimeExt;
use crate::resources::{Crumb, Node, NodeKind, TreeStore, listing};

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
const EMPTY_FOLDER: &str = "No files have been uploaded yet.";

/// Base-1024 size with at most two decimals, trailing zeros trimmed.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return format!("0 {}", SIZE_UNITS[0]);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

pub fn size_label(node: &Node) -> String {
    match node.kind() {
        NodeKind::Folder => "Folder".to_string(),
        NodeKind::Link => "Web Link".to_string(),
        NodeKind::File => format_file_size(node.size()),
    }
}

fn styled_name(node: &Node) -> String {
    match node.kind() {
        NodeKind::Folder => node.name().blue().bold().to_string(),
        NodeKind::Link => node.name().green().to_string(),
        NodeKind::File => node.name().to_string(),
    }
}

pub fn row(node: &Node) -> String {
    let mut row = format!(
        "[{:>4}] {:<6} {}  ({} - {})",
        node.id().to_string(),
        node.kind().to_string(),
        styled_name(node),
        size_label(node),
        node.created_at().to_date_string()
    );
    if let (NodeKind::Link, Some(url)) = (node.kind(), node.resource()) {
        let _ = write!(row, "  {}", url.dimmed());
    }
    row
}

pub fn listing(nodes: &[&Node]) -> String {
    if nodes.is_empty() {
        return EMPTY_FOLDER.dimmed().to_string();
    }
    nodes.iter().map(|node| row(node)).collect::<Vec<_>>().join("\n")
}

pub fn breadcrumb(crumbs: &[Crumb]) -> String {
    crumbs
        .iter()
        .map(|crumb| match crumb.id {
            Some(id) => format!("{} ({id})", crumb.name),
            None => crumb.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Every node under the root, indented by depth, in presentation order.
pub fn tree(store: &TreeStore, root_label: &str) -> String {
    let mut out = root_label.bold().to_string();
    if store.is_empty() {
        let _ = write!(out, "\n  {}", EMPTY_FOLDER.dimmed());
        return out;
    }

    let mut pending: Vec<(&Node, usize)> = listing::list(store, None)
        .into_iter()
        .rev()
        .map(|node| (node, 1))
        .collect();

    while let Some((node, depth)) = pending.pop() {
        let _ = write!(out, "\n{}{}", "  ".repeat(depth), row(node));
        if node.is_folder() {
            pending.extend(
                listing::list(store, Some(node.id()))
                    .into_iter()
                    .rev()
                    .map(|child| (child, depth + 1)),
            );
        }
    }

    out
}

/// Node counts by kind plus the number of uploads still held.
pub fn summary(store: &TreeStore, live_uploads: usize) -> String {
    let count = |kind: NodeKind| store.iter().filter(|node| node.kind() == kind).count();
    format!(
        "{} folder(s), {} file(s), {} link(s), {} upload(s) held",
        count(NodeKind::Folder),
        count(NodeKind::File),
        count(NodeKind::Link),
        live_uploads
    )
}
