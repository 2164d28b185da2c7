//! Registry of the user data types declared under `types/dataTypes`.

use std::collections::HashSet;

use crate::document::{Document, NodeId};
use crate::types::{ElementaryKind, TypeSpec};

#[derive(Debug, Clone)]
pub struct DataTypeEntry {
    pub node: NodeId,
    /// Trimmed `name` attribute, original case.
    pub name: String,
    /// The `baseType` child's single element, if present.
    pub base: Option<(NodeId, TypeSpec)>,
}

#[derive(Debug, Clone, Default)]
pub struct DataTypeRegistry {
    entries: Vec<DataTypeEntry>,
}

impl DataTypeRegistry {
    pub fn build(doc: &Document) -> Self {
        let entries = doc
            .path(doc.root(), &["types", "dataTypes"])
            .map(|holder| doc.find_children(holder, "dataType"))
            .unwrap_or_default()
            .into_iter()
            .map(|node| DataTypeEntry {
                node,
                name: doc.attr_trimmed(node, "name").to_string(),
                base: doc
                    .find_child(node, "baseType")
                    .and_then(|base| TypeSpec::of(doc, base)),
            })
            .collect();
        DataTypeRegistry { entries }
    }

    pub fn entries(&self) -> &[DataTypeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, name: &str) -> Option<&DataTypeEntry> {
        let name = name.trim();
        self.entries.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// `true` when at most one declared type carries this name.
    pub fn is_unique_type_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.entries
            .iter()
            .filter(|e| e.name.eq_ignore_ascii_case(name))
            .count()
            <= 1
    }

    pub fn is_user_type(&self, name: &str) -> bool {
        !name.trim().is_empty() && self.find(name).is_some()
    }

    /// Elementary ancestor of one particular declaration, starting from its
    /// own base rather than the first entry that shares its name.
    pub fn entry_base_type(&self, entry: &DataTypeEntry) -> Option<ElementaryKind> {
        match &entry.base {
            Some((_, TypeSpec::Elementary(kind))) => Some(*kind),
            Some((_, TypeSpec::Derived(name))) if !name.is_empty() => self.base_type(name),
            _ => None,
        }
    }

    /// Nearest elementary ancestor of the named type, following `derived`
    /// references. `None` means the type is not well defined: unknown, an
    /// unsupported base, a missing base, or a reference loop.
    pub fn base_type(&self, name: &str) -> Option<ElementaryKind> {
        let mut visited = HashSet::new();
        let mut current = name.trim().to_ascii_uppercase();
        loop {
            if !visited.insert(current.clone()) {
                return None;
            }
            let entry = self.find(&current)?;
            match &entry.base {
                Some((_, TypeSpec::Elementary(kind))) => return Some(*kind),
                Some((_, TypeSpec::Derived(next))) if !next.is_empty() => {
                    current = next.to_ascii_uppercase();
                }
                _ => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_type(doc: &mut Document, holder: NodeId, name: &str, base: &str) {
        let dt = doc.append_child(holder, "dataType");
        doc.set_attr(dt, "name", name);
        let bt = doc.append_child(dt, "baseType");
        if let Some(derived) = base.strip_prefix("derived:") {
            let d = doc.append_child(bt, "derived");
            doc.set_attr(d, "name", derived);
        } else {
            doc.append_child(bt, base);
        }
    }

    fn registry(types: &[(&str, &str)]) -> DataTypeRegistry {
        let mut doc = Document::new("project");
        let t = doc.append_child(doc.root(), "types");
        let holder = doc.append_child(t, "dataTypes");
        for (name, base) in types {
            add_type(&mut doc, holder, name, base);
        }
        DataTypeRegistry::build(&doc)
    }

    #[test]
    fn walks_derived_chains_to_elementary() {
        let reg = registry(&[("Speed", "INT"), ("Rpm", "derived:speed"), ("Fast", "derived:Rpm")]);
        assert_eq!(reg.base_type("FAST"), Some(ElementaryKind::Int));
        assert_eq!(reg.base_type("speed"), Some(ElementaryKind::Int));
        assert!(reg.is_user_type("rpm"));
        assert!(!reg.is_user_type(""));
    }

    #[test]
    fn broken_chains_are_not_well_defined() {
        let reg = registry(&[
            ("A", "derived:B"),
            ("B", "derived:A"),
            ("Rec", "struct"),
            ("Dangling", "derived:Nowhere"),
        ]);
        assert_eq!(reg.base_type("A"), None);
        assert_eq!(reg.base_type("Rec"), None);
        assert_eq!(reg.base_type("Dangling"), None);
        assert_eq!(reg.base_type("Unknown"), None);
    }

    #[test]
    fn duplicate_declarations_resolve_their_own_base() {
        let reg = registry(&[("Speed", "INT"), ("SPEED", "LREAL"), ("Self", "derived:Self")]);
        let second = &reg.entries()[1];
        assert_eq!(reg.entry_base_type(second), Some(ElementaryKind::LReal));
        assert_eq!(reg.entry_base_type(&reg.entries()[2]), None);
    }

    #[test]
    fn uniqueness_is_case_insensitive() {
        let reg = registry(&[("Speed", "INT"), ("SPEED", "DINT"), ("Other", "BOOL")]);
        assert!(!reg.is_unique_type_name("speed"));
        assert!(reg.is_unique_type_name("Other"));
        assert_eq!(reg.len(), 3);
    }
}
