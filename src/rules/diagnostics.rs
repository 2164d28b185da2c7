//! Diagnostic sink: every rule reports by appending a child node to the
//! element it is about. Reporting never fails and never stops a pass.

use serde::Serialize;
use tracing::debug;

use crate::document::{Document, NodeId, ERROR_TAG, INFO_TAG};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Error,
    Info,
}

/// Appends `<SidValidationError message="..."/>` to `node`.
pub fn report_error(doc: &mut Document, node: NodeId, message: &str) {
    debug!(target: "plcopen::diagnostic", location = %doc.location(node), "error: {}", message);
    let err = doc.append_child(node, ERROR_TAG);
    doc.set_attr(err, "message", message);
}

/// Appends `<SidValidationInfo value="..."/>` to `node`.
pub fn report_info(doc: &mut Document, node: NodeId, value: &str) {
    debug!(target: "plcopen::diagnostic", location = %doc.location(node), "info: {}", value);
    let info = doc.append_child(node, INFO_TAG);
    doc.set_attr(info, "value", value);
}

/// Diagnostics attached directly to `node`, in the order they were added.
pub fn diagnostics_of(doc: &Document, node: NodeId) -> Vec<(DiagnosticKind, String)> {
    doc.children(node)
        .iter()
        .filter_map(|&child| match doc.tag(child) {
            ERROR_TAG => Some((DiagnosticKind::Error, doc.attr(child, "message").unwrap_or("").to_string())),
            INFO_TAG => Some((DiagnosticKind::Info, doc.attr(child, "value").unwrap_or("").to_string())),
            _ => None,
        })
        .collect()
}

/// Error messages attached directly to `node`.
pub fn errors_of(doc: &Document, node: NodeId) -> Vec<String> {
    diagnostics_of(doc, node)
        .into_iter()
        .filter(|(kind, _)| *kind == DiagnosticKind::Error)
        .map(|(_, message)| message)
        .collect()
}

/// Info values attached directly to `node`.
pub fn infos_of(doc: &Document, node: NodeId) -> Vec<String> {
    diagnostics_of(doc, node)
        .into_iter()
        .filter(|(kind, _)| *kind == DiagnosticKind::Info)
        .map(|(_, value)| value)
        .collect()
}

/// `true` if any error node exists anywhere in the tree.
pub fn has_errors(doc: &Document) -> bool {
    doc.descendants(doc.root())
        .into_iter()
        .any(|n| doc.tag(n) == ERROR_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_accumulate_on_the_node() {
        let mut doc = Document::new("project");
        let root = doc.root();
        assert!(!has_errors(&doc));
        report_error(&mut doc, root, "first");
        report_info(&mut doc, root, "42");
        report_error(&mut doc, root, "second");
        assert_eq!(errors_of(&doc, root), vec!["first", "second"]);
        assert_eq!(infos_of(&doc, root), vec!["42"]);
        assert!(has_errors(&doc));
        assert!(doc.elements(root).is_empty());
    }
}
