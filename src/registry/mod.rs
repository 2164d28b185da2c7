//! Name and type registries built from a loaded document, bundled with
//! the lexical rules into a [`Project`].

pub mod data_types;
pub mod interface;
pub mod pous;

pub use data_types::DataTypeRegistry;
pub use interface::InterfaceView;
pub use pous::PouRegistry;

use crate::document::{Document, NodeId};
use crate::lexicon::{IecLexicon, LexicalRules};
use crate::types::{ElementaryKind, TypeCategory, TypeSpec};

/// One member of a function block layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub category: TypeCategory,
}

/// Everything the validation passes look up, populated before they run.
pub struct Project<L: LexicalRules = IecLexicon> {
    pub data_types: DataTypeRegistry,
    pub pous: PouRegistry,
    pub lexicon: L,
}

impl<L: LexicalRules> Project<L> {
    pub fn build(doc: &Document, lexicon: L) -> Self {
        Project {
            data_types: DataTypeRegistry::build(doc),
            pous: PouRegistry::build(doc),
            lexicon,
        }
    }

    /// Standard, configured or user-defined function block.
    pub fn is_function_block_type(&self, name: &str) -> bool {
        self.lexicon.is_standard_function_block_name(name)
            || self.pous.user_function_block(name).is_some()
    }

    pub fn categorize(&self, spec: &TypeSpec) -> TypeCategory {
        match spec {
            TypeSpec::Elementary(kind) => TypeCategory::Elementary(*kind),
            TypeSpec::Derived(name) => self.categorize_derived(name),
            TypeSpec::Unsupported(_) => TypeCategory::Unknown,
        }
    }

    /// Resolves the name of a `derived` reference. Only user data types and
    /// function blocks qualify; elementary names are spelled as their own
    /// elements, so `<derived name="INT"/>` is unknown.
    pub fn categorize_derived(&self, name: &str) -> TypeCategory {
        let name = name.trim();
        if name.is_empty() {
            TypeCategory::Unknown
        } else if self.data_types.is_user_type(name) {
            TypeCategory::UserType(name.to_string())
        } else if self.is_function_block_type(name) {
            TypeCategory::FunctionBlock(name.to_string())
        } else {
            TypeCategory::Unknown
        }
    }

    /// Resolves a type name from a library member layout, where elementary
    /// types are written by name.
    pub fn categorize_member_type(&self, name: &str) -> TypeCategory {
        match self.categorize_derived(name) {
            TypeCategory::Unknown => ElementaryKind::from_name(name.trim())
                .map(TypeCategory::Elementary)
                .unwrap_or(TypeCategory::Unknown),
            category => category,
        }
    }

    /// Declared type of a `variable` element: the `type` child's element
    /// and what it resolves to.
    pub fn variable_type(&self, doc: &Document, variable: NodeId) -> Option<(NodeId, TypeSpec, TypeCategory)> {
        let holder = doc.find_child(variable, "type")?;
        let (node, spec) = TypeSpec::of(doc, holder)?;
        let category = self.categorize(&spec);
        Some((node, spec, category))
    }

    /// Elementary type a literal must fit, or `None` when the category has
    /// no well-defined elementary ancestor.
    pub fn elementary_of(&self, category: &TypeCategory) -> Option<ElementaryKind> {
        match category {
            TypeCategory::Elementary(kind) => Some(*kind),
            TypeCategory::UserType(name) => self.data_types.base_type(name),
            TypeCategory::FunctionBlock(_) | TypeCategory::Unknown => None,
        }
    }

    /// Member layout of a function block type. User function blocks take
    /// precedence over library ones of the same name.
    pub fn function_block_members(&self, doc: &Document, fb: &str) -> Vec<Member> {
        if let Some(entry) = self.pous.user_function_block(fb) {
            let Some(interface) = entry.interface else {
                return Vec::new();
            };
            let view = InterfaceView::build(doc, interface);
            return view
                .variables
                .iter()
                .map(|v| Member {
                    name: v.name.clone(),
                    category: self
                        .variable_type(doc, v.node)
                        .map(|(_, _, category)| category)
                        .unwrap_or(TypeCategory::Unknown),
                })
                .collect();
        }
        self.lexicon
            .function_block_members(fb)
            .unwrap_or(&[])
            .iter()
            .map(|(name, type_name)| Member {
                name: name.clone(),
                category: self.categorize_member_type(type_name),
            })
            .collect()
    }
}
