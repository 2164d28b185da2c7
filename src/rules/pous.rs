//! Pass over `types/pous`: POU names, return types, interface lists and
//! every declared variable.

use tracing::debug;

use crate::document::{Document, NodeId};
use crate::lexicon::LexicalRules;
use crate::registry::interface::{VarList, VariableDecl};
use crate::registry::pous::PouEntry;
use crate::registry::{InterfaceView, Project};
use crate::types::{ListKind, PouKind, TypeCategory, TypeSpec};

use super::address::{classify, validate_full_address, validate_partial_address, AddressForm};
use super::data_types::DataTypesChecked;
use super::diagnostics::report_error;
use super::literals::{validate_simple_value, validate_struct_value};
use super::names::{validate_name, NameScope};

pub fn validate<L: LexicalRules>(doc: &mut Document, project: &Project<L>, _types: &DataTypesChecked) {
    for pou in project.pous.entries() {
        debug!(pou = %pou.name, kind = ?pou.kind, "checking pou");
        validate_name(doc, project, &NameScope::Pou, pou.node);
        let Some(interface) = pou.interface else {
            continue;
        };
        validate_return_type(doc, project, pou, interface);

        let view = InterfaceView::build(doc, interface);
        for list in &view.lists {
            validate_list(doc, list);
        }
        for var in &view.variables {
            PouVariable {
                pou,
                view: &view,
                var,
                list: view.list_of(var),
            }
            .validate(doc, project);
        }
    }
}

fn validate_return_type<L: LexicalRules>(doc: &mut Document, project: &Project<L>, pou: &PouEntry, interface: NodeId) {
    let Some(holder) = doc.find_child(interface, "returnType") else {
        return;
    };
    if pou.kind != Some(PouKind::Function) {
        report_error(doc, pou.node, "Only pou elements with pouType function can have a return type.");
        return;
    }
    let Some((node, spec)) = TypeSpec::of(doc, holder) else {
        return;
    };
    match spec {
        TypeSpec::Elementary(_) => {}
        TypeSpec::Derived(name) => {
            if !project.data_types.is_user_type(&name) {
                report_error(doc, node, &format!("Unknown data type name: {}.", name));
            }
        }
        TypeSpec::Unsupported(tag) => {
            report_error(doc, node, &format!("Unknown return type child element: {}.", tag));
        }
    }
}

fn validate_list(doc: &mut Document, list: &VarList) {
    if list.kind.must_be_empty() && doc.single_child(list.node).is_some() {
        report_error(
            doc,
            list.node,
            "List types AccessVars or GlobalVars inside an interface element are only supported without child elements.",
        );
    }
    if list.is_constant() && !list.kind.may_be_constant() {
        report_error(
            doc,
            list.node,
            "The constant attribute can only be true on localVars or externalVars lists.",
        );
    }
}

/// One variable together with everything its rules look at.
struct PouVariable<'a> {
    pou: &'a PouEntry,
    view: &'a InterfaceView,
    var: &'a VariableDecl,
    list: &'a VarList,
}

impl PouVariable<'_> {
    fn validate<L: LexicalRules>(&self, doc: &mut Document, project: &Project<L>) {
        let node = self.var.node;
        validate_name(doc, project, &NameScope::Variable(self.view), node);

        let declared = project.variable_type(doc, node);
        let category = declared
            .as_ref()
            .map(|(_, _, category)| category.clone())
            .unwrap_or(TypeCategory::Unknown);
        let is_bool = project.elementary_of(&category).is_some_and(|k| k.is_bool());

        self.check_enable_flags(doc, is_bool);
        self.check_address(doc, &category, is_bool);
        if let Some((type_node, spec, _)) = &declared {
            self.check_type(doc, *type_node, spec, &category);
        }
        self.check_initial_value(doc, project, &category);
    }

    /// `EN` and `ENO` are the implicit enable input and output.
    fn check_enable_flags(&self, doc: &mut Document, is_bool: bool) {
        let expected = match self.var.name.as_str() {
            "EN" => (ListKind::InputVars, "The variable parent node can only be an inputVar element."),
            "ENO" => (ListKind::OutputVars, "The variable parent node can only be an outputVars element."),
            _ => return,
        };
        if self.list.kind != expected.0 {
            report_error(doc, self.var.node, expected.1);
        }
        if !is_bool {
            report_error(doc, self.var.node, "The variable must be of type boolean.");
        }
    }

    fn check_address(&self, doc: &mut Document, category: &TypeCategory, is_bool: bool) {
        let Some(kind) = self.pou.kind else {
            return;
        };
        if self.list.kind != ListKind::LocalVars || !kind.allows_addresses() {
            return;
        }
        let address = doc.attr_trimmed(self.var.node, "address").to_string();
        if address.is_empty() {
            return;
        }
        if matches!(category, TypeCategory::FunctionBlock(_)) {
            report_error(doc, self.var.node, "The variable type can't be of function block type.");
            return;
        }
        match classify(&address) {
            Some(AddressForm::Partial) => validate_partial_address(doc, self.var.node, self.list),
            Some(AddressForm::Full) if kind == PouKind::Program => {
                validate_full_address(doc, self.var.node, &address, is_bool)
            }
            _ => {}
        }
    }

    fn check_type(&self, doc: &mut Document, type_node: NodeId, spec: &TypeSpec, category: &TypeCategory) {
        match spec {
            TypeSpec::Elementary(_) => {}
            TypeSpec::Derived(name) if name.is_empty() => {
                report_error(doc, type_node, "Variable child type name of user defined type cannot be empty.");
            }
            TypeSpec::Derived(name) => {
                if *category == TypeCategory::Unknown {
                    report_error(doc, type_node, &format!("Unknown variable type name: {}.", name));
                } else if name.eq_ignore_ascii_case(&self.pou.name) {
                    report_error(
                        doc,
                        type_node,
                        "A derived type child cannot have the same name as its pou parent element.",
                    );
                }
            }
            TypeSpec::Unsupported(tag) => {
                report_error(doc, type_node, &format!("Unsupported variable child type: {}.", tag));
            }
        }
    }

    fn check_initial_value<L: LexicalRules>(&self, doc: &mut Document, project: &Project<L>, category: &TypeCategory) {
        let Some(initial) = doc.find_child(self.var.node, "initialValue") else {
            return;
        };
        if self.list.kind.forbids_initial_value() {
            report_error(
                doc,
                self.var.node,
                "Variable with a initialValue child element can't have inOutVars or externalVars parent elements.",
            );
            return;
        }
        let value = doc.single_child(initial);
        let value_tag = value.map(|v| doc.tag(v).to_string()).unwrap_or_default();
        match category {
            TypeCategory::Elementary(_) | TypeCategory::UserType(_) => match value {
                Some(simple) if value_tag == "simpleValue" => {
                    validate_simple_value(doc, simple, initial, project.elementary_of(category));
                }
                _ => report_error(
                    doc,
                    initial,
                    "Variable of any type can only have a simpleValue as initialValue child element.",
                ),
            },
            TypeCategory::FunctionBlock(fb) => match value {
                Some(structured) if value_tag == "structValue" => {
                    validate_struct_value(doc, project, structured, fb, self.list.kind);
                }
                _ => report_error(
                    doc,
                    initial,
                    "Variable of function block type can only have structValue as initialValue child element.",
                ),
            },
            TypeCategory::Unknown => {}
        }
    }
}
