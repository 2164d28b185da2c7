//! Flat, serialisable view of the diagnostics attached to a document.

use serde::Serialize;

use crate::document::{Document, ERROR_TAG, INFO_TAG};
use crate::rules::DiagnosticKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    pub kind: DiagnosticKind,
    /// Error message, or the canonical value for an info.
    pub message: String,
    /// Location of the annotated element, e.g. `/project/types/pous/pou[Main]`.
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<DiagnosticRecord>,
    pub error_count: usize,
    pub info_count: usize,
}

impl ValidationReport {
    /// Gathers every diagnostic node in document order.
    pub fn collect(doc: &Document) -> Self {
        let mut report = ValidationReport::default();
        for node in doc.descendants(doc.root()) {
            let (kind, attr) = match doc.tag(node) {
                ERROR_TAG => (DiagnosticKind::Error, "message"),
                INFO_TAG => (DiagnosticKind::Info, "value"),
                _ => continue,
            };
            let Some(parent) = doc.parent(node) else {
                continue;
            };
            report.push(DiagnosticRecord {
                kind,
                message: doc.attr(node, attr).unwrap_or("").to_string(),
                path: doc.location(parent),
            });
        }
        report
    }

    /// A report holding one error at `/`, used when the document or the
    /// configuration could not be loaded.
    pub fn failure(message: impl Into<String>) -> Self {
        let mut report = ValidationReport::default();
        report.push(DiagnosticRecord {
            kind: DiagnosticKind::Error,
            message: message.into(),
            path: "/".to_string(),
        });
        report
    }

    fn push(&mut self, record: DiagnosticRecord) {
        match record.kind {
            DiagnosticKind::Error => self.error_count += 1,
            DiagnosticKind::Info => self.info_count += 1,
        }
        self.diagnostics.push(record);
    }

    pub fn is_ok(&self) -> bool {
        self.error_count == 0
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticRecord> {
        self.diagnostics.iter().filter(|d| d.kind == DiagnosticKind::Error)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".into())
    }
}
