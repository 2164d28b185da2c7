//! Registry of the POUs declared under `types/pous`.

use crate::document::{Document, NodeId};
use crate::types::PouKind;

#[derive(Debug, Clone)]
pub struct PouEntry {
    pub node: NodeId,
    pub name: String,
    /// `None` when `pouType` holds something outside the TC6 vocabulary.
    pub kind: Option<PouKind>,
    pub interface: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct PouRegistry {
    entries: Vec<PouEntry>,
}

impl PouRegistry {
    pub fn build(doc: &Document) -> Self {
        let entries = doc
            .path(doc.root(), &["types", "pous"])
            .map(|holder| doc.find_children(holder, "pou"))
            .unwrap_or_default()
            .into_iter()
            .map(|node| PouEntry {
                node,
                name: doc.attr_trimmed(node, "name").to_string(),
                kind: PouKind::from_attr(doc.attr_trimmed(node, "pouType")),
                interface: doc.find_child(node, "interface"),
            })
            .collect();
        PouRegistry { entries }
    }

    pub fn entries(&self) -> &[PouEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&PouEntry> {
        let name = name.trim();
        self.entries.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn is_user_pou(&self, name: &str) -> bool {
        !name.trim().is_empty() && self.find(name).is_some()
    }

    /// `true` when at most one POU carries this name.
    pub fn is_unique_pou_type_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.entries
            .iter()
            .filter(|e| e.name.eq_ignore_ascii_case(name))
            .count()
            <= 1
    }

    pub fn user_function_block(&self, name: &str) -> Option<&PouEntry> {
        self.find(name)
            .filter(|e| e.kind == Some(PouKind::FunctionBlock))
    }
}
