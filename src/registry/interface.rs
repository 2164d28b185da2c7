//! Flattened view of one POU `interface` element.

use crate::document::{Document, NodeId};
use crate::types::ListKind;

#[derive(Debug, Clone)]
pub struct VarList {
    pub node: NodeId,
    pub kind: ListKind,
    /// Trimmed `constant` attribute; empty when absent.
    pub constant: String,
}

impl VarList {
    pub fn is_constant(&self) -> bool {
        self.constant == "true"
    }
}

#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub node: NodeId,
    /// Index into [`InterfaceView::lists`].
    pub list: usize,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceView {
    pub lists: Vec<VarList>,
    pub variables: Vec<VariableDecl>,
}

impl InterfaceView {
    /// Collects the variable lists (in document order) and every variable
    /// they declare. `returnType` and documentation children are skipped.
    pub fn build(doc: &Document, interface: NodeId) -> Self {
        let mut view = InterfaceView::default();
        for node in doc.elements(interface) {
            let Some(kind) = ListKind::from_tag(doc.tag(node)) else {
                continue;
            };
            let list = view.lists.len();
            view.lists.push(VarList {
                node,
                kind,
                constant: doc.attr_trimmed(node, "constant").to_string(),
            });
            for var in doc.find_children(node, "variable") {
                view.variables.push(VariableDecl {
                    node: var,
                    list,
                    name: doc.attr_trimmed(var, "name").to_string(),
                });
            }
        }
        view
    }

    pub fn list_of(&self, var: &VariableDecl) -> &VarList {
        &self.lists[var.list]
    }

    /// Uniqueness is scoped to the whole interface, not a single list.
    pub fn is_unique_variable_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.variables
            .iter()
            .filter(|v| v.name.eq_ignore_ascii_case(name))
            .count()
            <= 1
    }
}
